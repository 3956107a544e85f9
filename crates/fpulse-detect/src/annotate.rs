//! Frame annotation: detection boxes and label tags.

use fpulse_draw::{class_color, draw_text, outline_rect, text_height};
use fpulse_models::Detection;
use image::{Rgb, RgbImage};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
/// Color for detections without a class label.
const UNLABELED: Rgb<u8> = Rgb([190, 60, 60]);

/// Draw detection boxes and `label confidence` tags on a copy of the frame.
pub fn annotate(frame: &RgbImage, detections: &[Detection]) -> RgbImage {
    let mut out = frame.clone();
    let (fw, fh) = (frame.width() as f32, frame.height() as f32);

    for detection in detections {
        let x = (detection.x * fw).round() as i32;
        let y = (detection.y * fh).round() as i32;
        let width = ((detection.width * fw).round() as u32).max(1);
        let height = ((detection.height * fh).round() as u32).max(1);

        let color = detection.label().map(class_color).unwrap_or(UNLABELED);
        outline_rect(&mut out, x, y, width, height, color, 2);

        let tag = match detection.label() {
            Some(label) => format!("{} {:.0}%", label, detection.confidence * 100.0),
            None => format!("{:.0}%", detection.confidence * 100.0),
        };

        // Tag sits above the box, or inside it at the top edge of the frame
        let tag_height = text_height(1) as i32;
        let tag_y = if y >= tag_height + 4 {
            y - tag_height - 3
        } else {
            y + 3
        };
        draw_text(&mut out, &tag, x + 2, tag_y, 1, WHITE, Some(color));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_detections_leaves_frame_unchanged() {
        let frame = RgbImage::from_pixel(32, 32, Rgb([10, 20, 30]));
        let out = annotate(&frame, &[]);
        assert_eq!(out, frame);
    }

    #[test]
    fn test_box_drawn_in_class_color() {
        let frame = RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]));
        let detection = Detection::labeled(0, "person", 0.9, (0.2, 0.2, 0.4, 0.4));
        let out = annotate(&frame, &[detection]);

        let expected = class_color("person");
        assert_eq!(*out.get_pixel(20, 20), expected);
        // Original frame untouched
        assert_eq!(*frame.get_pixel(20, 20), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_unlabeled_detection_uses_fallback_color() {
        let frame = RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]));
        let detection = Detection::unlabeled(0.5, (0.5, 0.5, 0.3, 0.3));
        let out = annotate(&frame, &[detection]);
        assert_eq!(*out.get_pixel(50, 50), UNLABELED);
    }

    #[test]
    fn test_degenerate_box_does_not_panic() {
        let frame = RgbImage::from_pixel(10, 10, Rgb([0, 0, 0]));
        let detection = Detection::unlabeled(0.5, (0.0, 0.0, 0.0, 0.0));
        annotate(&frame, &[detection]);
    }
}
