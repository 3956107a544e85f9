//! PNG chart rendering over a windowed class distribution.
//!
//! The chart is drawn directly on an `RgbImage` with the shared bitmap-font
//! helpers, so rendering needs no font files or plotting backends and works
//! in minimal container images.

use std::collections::BTreeMap;
use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};

use fpulse_draw::{class_color, draw_text, fill_rect, outline_rect, text_width};

use crate::error::ExportResult;

const WIDTH: u32 = 1000;
const HEIGHT: u32 = 520;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([40, 40, 40]);
const AXIS: Rgb<u8> = Rgb([90, 90, 90]);

// Bar panel geometry
const BAR_LEFT: i32 = 60;
const BAR_RIGHT: i32 = 460;
const BAR_TOP: i32 = 80;
const BAR_BASELINE: i32 = 420;

// Pie geometry
const PIE_CX: i32 = 640;
const PIE_CY: i32 = 250;
const PIE_RADIUS: i32 = 150;

// Legend column
const LEGEND_X: i32 = 820;
const LEGEND_TOP: i32 = 100;
const LEGEND_ROW: i32 = 16;
const LEGEND_MAX_ROWS: usize = 20;

/// Render a bar + pie chart of the class distribution as PNG bytes.
///
/// An empty distribution renders a placeholder panel instead of failing, so
/// the chart endpoint always has something to serve.
pub fn render_chart_png(class_totals: &BTreeMap<String, u64>) -> ExportResult<Vec<u8>> {
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);

    if class_totals.is_empty() {
        draw_placeholder(&mut img);
    } else {
        draw_title(&mut img, "DETECTION CLASS DISTRIBUTION");
        draw_bars(&mut img, class_totals);
        draw_pie(&mut img, class_totals);
        draw_legend(&mut img, class_totals);
    }

    encode_png(img)
}

fn encode_png(img: RgbImage) -> ExportResult<Vec<u8>> {
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(img).write_to(&mut Cursor::new(&mut out), ImageOutputFormat::Png)?;
    Ok(out)
}

fn draw_title(img: &mut RgbImage, title: &str) {
    let x = (WIDTH as i32 - text_width(title, 2) as i32) / 2;
    draw_text(img, title, x, 20, 2, INK, None);
}

fn draw_placeholder(img: &mut RgbImage) {
    outline_rect(img, 20, 20, WIDTH - 40, HEIGHT - 40, AXIS, 2);
    let message = "NO DETECTION DATA AVAILABLE";
    let x = (WIDTH as i32 - text_width(message, 2) as i32) / 2;
    draw_text(img, message, x, HEIGHT as i32 / 2 - 7, 2, AXIS, None);
}

fn draw_bars(img: &mut RgbImage, class_totals: &BTreeMap<String, u64>) {
    let max = class_totals.values().copied().max().unwrap_or(1).max(1);
    let panel_width = (BAR_RIGHT - BAR_LEFT) as u32;
    let panel_height = (BAR_BASELINE - BAR_TOP) as u32;

    // Axes
    fill_rect(img, BAR_LEFT - 2, BAR_TOP - 10, 2, panel_height + 10, AXIS);
    fill_rect(img, BAR_LEFT - 2, BAR_BASELINE, panel_width + 4, 2, AXIS);

    let n = class_totals.len() as u32;
    let slot = (panel_width / n).max(8);
    let bar_width = (slot * 7 / 10).max(3);

    for (i, (label, count)) in class_totals.iter().enumerate() {
        let slot_x = BAR_LEFT + (i as u32 * slot) as i32;
        let bar_x = slot_x + ((slot - bar_width) / 2) as i32;

        let bar_height =
            ((*count as f32 / max as f32) * panel_height as f32).round().max(1.0) as u32;
        let bar_top = BAR_BASELINE - bar_height as i32;

        fill_rect(img, bar_x, bar_top, bar_width, bar_height, class_color(label));

        // Count above the bar, centered on the slot
        let value = count.to_string();
        let value_x = slot_x + (slot as i32 - text_width(&value, 1) as i32) / 2;
        draw_text(img, &value, value_x, bar_top - 10, 1, INK, None);

        // Class label below the baseline, truncated to the slot width
        let fit = (slot / 6).max(1) as usize;
        let short: String = label.chars().take(fit).collect();
        let label_x = slot_x + (slot as i32 - text_width(&short, 1) as i32) / 2;
        draw_text(img, &short, label_x, BAR_BASELINE + 8, 1, INK, None);
    }
}

fn draw_pie(img: &mut RgbImage, class_totals: &BTreeMap<String, u64>) {
    let total: u64 = class_totals.values().sum();
    let total = total.max(1) as f32;

    // Cumulative slice boundaries as fractions of the full turn
    let mut boundaries: Vec<(f32, Rgb<u8>)> = Vec::with_capacity(class_totals.len());
    let mut cumulative = 0.0f32;
    for (label, count) in class_totals {
        cumulative += *count as f32 / total;
        boundaries.push((cumulative, class_color(label)));
    }

    let r2 = (PIE_RADIUS * PIE_RADIUS) as f32;
    for dy in -PIE_RADIUS..=PIE_RADIUS {
        for dx in -PIE_RADIUS..=PIE_RADIUS {
            if (dx * dx + dy * dy) as f32 > r2 {
                continue;
            }
            let px = PIE_CX + dx;
            let py = PIE_CY + dy;
            if px < 0 || py < 0 || px as u32 >= WIDTH || py as u32 >= HEIGHT {
                continue;
            }

            // Angle measured clockwise from twelve o'clock
            let mut angle = (dx as f32).atan2(-(dy as f32));
            if angle < 0.0 {
                angle += std::f32::consts::TAU;
            }
            let fraction = angle / std::f32::consts::TAU;

            let color = boundaries
                .iter()
                .find(|(end, _)| fraction < *end)
                .map(|(_, c)| *c)
                .unwrap_or_else(|| boundaries.last().map(|(_, c)| *c).unwrap_or(AXIS));
            img.put_pixel(px as u32, py as u32, color);
        }
    }

    // Percentage labels at the middle of each slice; slivers are covered by
    // the legend instead.
    let mut start = 0.0f32;
    for count in class_totals.values() {
        let fraction = *count as f32 / total;
        let mid = (start + fraction / 2.0) * std::f32::consts::TAU;
        start += fraction;

        if fraction < 0.04 {
            continue;
        }

        let text = format!("{:.1}%", fraction * 100.0);
        let lx = PIE_CX as f32 + mid.sin() * PIE_RADIUS as f32 * 0.6;
        let ly = PIE_CY as f32 - mid.cos() * PIE_RADIUS as f32 * 0.6;
        draw_text(
            img,
            &text,
            lx as i32 - text_width(&text, 1) as i32 / 2,
            ly as i32 - 3,
            1,
            BACKGROUND,
            None,
        );
    }
}

fn draw_legend(img: &mut RgbImage, class_totals: &BTreeMap<String, u64>) {
    let mut y = LEGEND_TOP;
    for (i, (label, count)) in class_totals.iter().enumerate() {
        if i == LEGEND_MAX_ROWS {
            let rest = class_totals.len() - LEGEND_MAX_ROWS;
            draw_text(img, &format!("+{} MORE", rest), LEGEND_X, y, 1, AXIS, None);
            break;
        }
        fill_rect(img, LEGEND_X, y, 10, 10, class_color(label));
        draw_text(
            img,
            &format!("{} {}", label, count),
            LEGEND_X + 16,
            y + 2,
            1,
            INK,
            None,
        );
        y += LEGEND_ROW;
    }
}
