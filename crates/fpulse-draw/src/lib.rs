//! Pixel drawing helpers shared by frame annotation and chart rendering.
//!
//! Text is rendered with a built-in 5x7 bitmap font, so no font files or
//! system font lookups are needed at runtime.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

/// Glyph cell width in pixels.
pub const GLYPH_WIDTH: u32 = 5;
/// Glyph cell height in pixels.
pub const GLYPH_HEIGHT: u32 = 7;
/// Horizontal advance per character (glyph plus one pixel of spacing).
pub const GLYPH_ADVANCE: u32 = GLYPH_WIDTH + 1;

/// Pixel width of a rendered string at the given scale.
pub fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH_ADVANCE * scale.max(1)
}

/// Pixel height of rendered text at the given scale.
pub fn text_height(scale: u32) -> u32 {
    GLYPH_HEIGHT * scale.max(1)
}

/// Fill a rectangle, clipped to the image bounds.
pub fn fill_rect(img: &mut RgbImage, x: i32, y: i32, width: u32, height: u32, color: Rgb<u8>) {
    if width == 0 || height == 0 {
        return;
    }
    draw_filled_rect_mut(img, Rect::at(x, y).of_size(width, height), color);
}

/// Draw a rectangle outline with the given border thickness.
pub fn outline_rect(
    img: &mut RgbImage,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    color: Rgb<u8>,
    thickness: u32,
) {
    let rect = Rect::at(x, y).of_size(width.max(1), height.max(1));

    // Thicker borders are concentric 1px outlines
    for offset in 0..thickness.max(1) as i32 {
        let expanded = Rect::at(rect.left() - offset, rect.top() - offset).of_size(
            rect.width() + (offset * 2) as u32,
            rect.height() + (offset * 2) as u32,
        );
        draw_hollow_rect_mut(img, expanded, color);
    }
}

/// Draw text with the bitmap font. Input is rendered uppercase; characters
/// without a glyph fall back to a hollow box.
pub fn draw_text(
    img: &mut RgbImage,
    text: &str,
    x: i32,
    y: i32,
    scale: u32,
    color: Rgb<u8>,
    background: Option<Rgb<u8>>,
) {
    let scale = scale.max(1);

    if let Some(bg) = background {
        fill_rect(
            img,
            x - 1,
            y - 1,
            text_width(text, scale) + 2,
            text_height(scale) + 2,
            bg,
        );
    }

    for (i, ch) in text.to_uppercase().chars().enumerate() {
        let origin_x = x + (i as u32 * GLYPH_ADVANCE * scale) as i32;
        let pattern = glyph(ch);

        for (row, bits) in pattern.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if (bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 1 {
                    fill_rect(
                        img,
                        origin_x + (col * scale) as i32,
                        y + (row as u32 * scale) as i32,
                        scale,
                        scale,
                        color,
                    );
                }
            }
        }
    }
}

/// Deterministic per-label color, kept dark enough to read on light
/// backgrounds.
pub fn class_color(label: &str) -> Rgb<u8> {
    // FNV-1a over the label, then a golden-ratio mix per channel
    let mut hash: u32 = 0x811c_9dc5;
    for byte in label.bytes() {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(0x0100_0193);
    }

    let channel = |shift: u32| -> u8 {
        let mixed = hash.rotate_left(shift).wrapping_mul(2_654_435_761);
        (30 + (mixed >> 24) % 170) as u8
    };

    Rgb([channel(0), channel(11), channel(22)])
}

/// 5x7 glyph patterns, one row per byte, most significant bit on the left.
fn glyph(ch: char) -> [u8; 7] {
    match ch {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00110, 0b01000, 0b10000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        '%' => [0b11001, 0b11010, 0b00010, 0b00100, 0b01000, 0b01011, 0b10011],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00110, 0b00110],
        ':' => [0b00000, 0b00110, 0b00110, 0b00000, 0b00110, 0b00110, 0b00000],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '_' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b11111],
        '/' => [0b00001, 0b00010, 0b00010, 0b00100, 0b01000, 0b01000, 0b10000],
        '(' => [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010],
        ')' => [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000],
        ' ' => [0; 7],
        // Box for unknown characters
        _ => [0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("cat", 1), 18);
        assert_eq!(text_width("cat", 2), 36);
        assert_eq!(text_width("", 1), 0);
    }

    #[test]
    fn test_draw_text_sets_pixels() {
        let mut img = RgbImage::from_pixel(40, 12, Rgb([255, 255, 255]));
        draw_text(&mut img, "A1", 2, 2, 1, Rgb([0, 0, 0]), None);

        let black = img.pixels().filter(|p| p.0 == [0, 0, 0]).count();
        assert!(black > 0, "expected glyph pixels to be drawn");
    }

    #[test]
    fn test_draw_text_background_fill() {
        let mut img = RgbImage::from_pixel(40, 12, Rgb([255, 255, 255]));
        draw_text(&mut img, "A", 2, 2, 1, Rgb([0, 0, 0]), Some(Rgb([200, 0, 0])));

        assert_eq!(img.get_pixel(1, 1).0, [200, 0, 0]);
    }

    #[test]
    fn test_draw_text_clips_at_borders() {
        let mut img = RgbImage::from_pixel(8, 8, Rgb([255, 255, 255]));
        // Partly off-canvas on every side; must not panic
        draw_text(&mut img, "WW", -3, -3, 2, Rgb([0, 0, 0]), Some(Rgb([10, 10, 10])));
    }

    #[test]
    fn test_outline_rect_draws_border() {
        let mut img = RgbImage::from_pixel(20, 20, Rgb([255, 255, 255]));
        outline_rect(&mut img, 5, 5, 10, 10, Rgb([255, 0, 0]), 1);

        assert_eq!(img.get_pixel(5, 5).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(14, 5).0, [255, 0, 0]);
        // Interior untouched
        assert_eq!(img.get_pixel(10, 10).0, [255, 255, 255]);
    }

    #[test]
    fn test_class_color_deterministic() {
        assert_eq!(class_color("person"), class_color("person"));
        assert_ne!(class_color("person"), class_color("car"));
    }

    #[test]
    fn test_class_color_in_legible_range() {
        for label in ["person", "car", "dog", "traffic light"] {
            let Rgb([r, g, b]) = class_color(label);
            for c in [r, g, b] {
                assert!((30..200).contains(&c), "channel {} out of range", c);
            }
        }
    }
}
