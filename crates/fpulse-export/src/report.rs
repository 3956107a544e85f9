//! PDF analytics report: a vector line chart of detection totals per frame.

use fpulse_models::DetectionRecord;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Pt,
    Rgb, TextMatrix,
};

use crate::error::{ExportError, ExportResult};

// A4 landscape
const PAGE_WIDTH: f64 = 297.0;
const PAGE_HEIGHT: f64 = 210.0;

// Plot rectangle in page millimeters, origin bottom-left
const PLOT_LEFT: f64 = 35.0;
const PLOT_RIGHT: f64 = 270.0;
const PLOT_BOTTOM: f64 = 40.0;
const PLOT_TOP: f64 = 170.0;

const SERIES_ORANGE: (f64, f64, f64) = (1.0, 0.647, 0.0);
const GRID_GRAY: (f64, f64, f64) = (0.85, 0.85, 0.85);
const BLACK: (f64, f64, f64) = (0.0, 0.0, 0.0);

/// Render the snapshot as a one-page PDF report.
pub fn render_report_pdf(records: &[DetectionRecord]) -> ExportResult<Vec<u8>> {
    if records.is_empty() {
        return Err(ExportError::EmptyStore);
    }

    let (doc, page, layer) = PdfDocument::new(
        "Live Detection Analytics",
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "chart",
    );
    let layer = doc.get_page(page).get_layer(layer);

    let font = builtin_font(&doc, BuiltinFont::Helvetica)?;
    let bold = builtin_font(&doc, BuiltinFont::HelveticaBold)?;

    let max_total = records
        .iter()
        .map(|r| r.total_detections)
        .max()
        .unwrap_or(0)
        .max(1);

    draw_title(&layer, &bold);
    draw_grid_and_ticks(&layer, &font, records, max_total);
    draw_axes(&layer);
    draw_series(&layer, records, max_total);
    draw_legend(&layer, &font);
    draw_axis_labels(&layer, &font);

    doc.save_to_bytes()
        .map_err(|e| ExportError::pdf(e.to_string()))
}

fn builtin_font(
    doc: &printpdf::PdfDocumentReference,
    font: BuiltinFont,
) -> ExportResult<IndirectFontRef> {
    doc.add_builtin_font(font)
        .map_err(|e| ExportError::pdf(e.to_string()))
}

/// Helvetica glyphs average roughly half an em; close enough for centering
/// and right-aligning labels.
fn approx_width_mm(text: &str, size_pt: f64) -> f64 {
    text.chars().count() as f64 * size_pt * 0.5 * 0.3528
}

fn stroke(layer: &PdfLayerReference, points: Vec<(f64, f64)>, color: (f64, f64, f64), thickness: f64) {
    layer.set_outline_color(Color::Rgb(Rgb::new(color.0, color.1, color.2, None)));
    layer.set_outline_thickness(thickness);
    layer.add_shape(Line {
        points: points
            .into_iter()
            .map(|(x, y)| (Point::new(Mm(x), Mm(y)), false))
            .collect(),
        is_closed: false,
        has_fill: false,
        has_stroke: true,
        is_clipping_path: false,
    });
}

fn point_x(index: usize, len: usize) -> f64 {
    if len > 1 {
        PLOT_LEFT + (PLOT_RIGHT - PLOT_LEFT) * index as f64 / (len - 1) as f64
    } else {
        (PLOT_LEFT + PLOT_RIGHT) / 2.0
    }
}

fn point_y(total: u64, max_total: u64) -> f64 {
    PLOT_BOTTOM + (PLOT_TOP - PLOT_BOTTOM) * total as f64 / max_total as f64
}

fn draw_title(layer: &PdfLayerReference, bold: &IndirectFontRef) {
    let title = "Live Detection Analytics";
    let x = (PAGE_WIDTH - approx_width_mm(title, 18.0)) / 2.0;
    layer.use_text(title, 18.0, Mm(x), Mm(PAGE_HEIGHT - 22.0), bold);
}

fn draw_grid_and_ticks(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    records: &[DetectionRecord],
    max_total: u64,
) {
    // Horizontal gridlines with y tick labels
    for step in 0..=4u64 {
        let value = max_total * step / 4;
        let y = PLOT_BOTTOM + (PLOT_TOP - PLOT_BOTTOM) * step as f64 / 4.0;
        if step > 0 {
            stroke(layer, vec![(PLOT_LEFT, y), (PLOT_RIGHT, y)], GRID_GRAY, 0.3);
        }
        let label = value.to_string();
        let x = PLOT_LEFT - 4.0 - approx_width_mm(&label, 9.0);
        layer.use_text(label, 9.0, Mm(x), Mm(y - 1.2), font);
    }

    // X tick labels on sampled frame ordinals
    let len = records.len();
    let ticks = len.min(8);
    let mut last_index = usize::MAX;
    for t in 0..ticks {
        let index = if ticks > 1 { t * (len - 1) / (ticks - 1) } else { 0 };
        if index == last_index {
            continue;
        }
        last_index = index;

        let label = records[index].frame_ordinal.to_string();
        let x = point_x(index, len) - approx_width_mm(&label, 9.0) / 2.0;
        layer.use_text(label, 9.0, Mm(x), Mm(PLOT_BOTTOM - 6.0), font);
    }
}

fn draw_axes(layer: &PdfLayerReference) {
    stroke(
        layer,
        vec![(PLOT_LEFT, PLOT_TOP), (PLOT_LEFT, PLOT_BOTTOM), (PLOT_RIGHT, PLOT_BOTTOM)],
        BLACK,
        0.8,
    );
}

fn draw_series(layer: &PdfLayerReference, records: &[DetectionRecord], max_total: u64) {
    let len = records.len();
    let points: Vec<(f64, f64)> = records
        .iter()
        .enumerate()
        .map(|(i, r)| (point_x(i, len), point_y(r.total_detections, max_total)))
        .collect();

    if len == 1 {
        // A lone sample still gets a visible mark
        let (x, y) = points[0];
        stroke(layer, vec![(x - 1.0, y), (x + 1.0, y)], SERIES_ORANGE, 1.5);
        return;
    }
    stroke(layer, points, SERIES_ORANGE, 1.5);
}

fn draw_legend(layer: &PdfLayerReference, font: &IndirectFontRef) {
    let y = PLOT_TOP - 6.0;
    stroke(
        layer,
        vec![(PLOT_RIGHT - 62.0, y + 1.2), (PLOT_RIGHT - 52.0, y + 1.2)],
        SERIES_ORANGE,
        1.5,
    );
    layer.use_text("Total detections per frame", 9.0, Mm(PLOT_RIGHT - 49.0), Mm(y), font);
}

fn draw_axis_labels(layer: &PdfLayerReference, font: &IndirectFontRef) {
    let x_label = "Frame";
    let x = (PLOT_LEFT + PLOT_RIGHT - approx_width_mm(x_label, 11.0)) / 2.0;
    layer.use_text(x_label, 11.0, Mm(x), Mm(PLOT_BOTTOM - 14.0), font);

    // Y label rotated along the axis
    let y_label = "Total Detections";
    let y_start = (PLOT_BOTTOM + PLOT_TOP - approx_width_mm(y_label, 11.0)) / 2.0;
    layer.begin_text_section();
    layer.set_font(font, 11.0);
    layer.set_text_matrix(TextMatrix::TranslateRotate(
        Pt::from(Mm(16.0)),
        Pt::from(Mm(y_start)),
        90.0,
    ));
    layer.write_text(y_label, font);
    layer.end_text_section();
}
