//! Drawing detections onto an image.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use pillcount_models::{format_confidence, Detection, LabelStyle};

use crate::font::LabelFont;

/// Box outline and label background color (`#00FF00`).
pub const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Label text color.
pub const TEXT_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// Outline thickness in pixels, drawn inward from the box edge.
pub const STROKE_WIDTH: i32 = 3;

/// Approximate per-character width used to size label backgrounds.
pub const LABEL_CHAR_WIDTH: i64 = 9;

const TOP_LABEL_HEIGHT: i32 = 22;
const BOTTOM_LABEL_HEIGHT: i32 = 20;
const TEXT_INSET: i32 = 2;

// Keeps pixel arithmetic far away from i32 overflow
const COORD_LIMIT: f64 = 1_048_576.0;

/// Draws detections in a fixed label style with a preloaded font.
#[derive(Debug)]
pub struct Annotator {
    font: LabelFont,
    style: LabelStyle,
}

impl Annotator {
    pub fn new(font: LabelFont, style: LabelStyle) -> Self {
        Self { font, style }
    }

    pub fn style(&self) -> LabelStyle {
        self.style
    }

    pub fn font(&self) -> &LabelFont {
        &self.font
    }

    /// Annotate `image` in place.
    pub fn annotate(&self, image: &mut RgbImage, detections: &[Detection]) {
        annotate(image, detections, self.style, &self.font);
    }
}

/// Draw every detection onto `image` in place.
///
/// Each detection gets a 3px outline; labels follow `style`. Records with
/// missing fields are drawn with defaults and never cause an error.
pub fn annotate(image: &mut RgbImage, detections: &[Detection], style: LabelStyle, font: &LabelFont) {
    for (index, detection) in detections.iter().enumerate() {
        let corners = detection.corners();
        let (x0, y0) = (to_pixel(corners.x0), to_pixel(corners.y0));
        let (x1, y1) = (to_pixel(corners.x1), to_pixel(corners.y1));

        draw_outline(image, x0, y0, x1, y1);

        let confidence = format_confidence(detection.confidence_or_zero());
        match style {
            LabelStyle::Numbered => {
                draw_label(image, font, x0, y0 - TOP_LABEL_HEIGHT, TOP_LABEL_HEIGHT, &format!("#{}: {}", index + 1, confidence));
                draw_label(image, font, x0, y1, BOTTOM_LABEL_HEIGHT, detection.label());
            }
            LabelStyle::Combined => {
                draw_label(image, font, x0, y0 - TOP_LABEL_HEIGHT, TOP_LABEL_HEIGHT, &format!("{} {}", detection.label(), confidence));
            }
        }
    }
}

fn to_pixel(value: f64) -> i32 {
    value.round().clamp(-COORD_LIMIT, COORD_LIMIT) as i32
}

/// Outline spanning (x0, y0)..=(x1, y1); inverted boxes draw nothing.
fn draw_outline(image: &mut RgbImage, x0: i32, y0: i32, x1: i32, y1: i32) {
    for inset in 0..STROKE_WIDTH {
        let width = x1 - x0 + 1 - 2 * inset;
        let height = y1 - y0 + 1 - 2 * inset;
        if width <= 0 || height <= 0 {
            break;
        }
        let rect = Rect::at(x0 + inset, y0 + inset).of_size(width as u32, height as u32);
        draw_hollow_rect_mut(image, rect, BOX_COLOR);
    }
}

/// Filled background `chars * 9` wide starting at (`x`, `top`), text inset by 2px.
fn draw_label(image: &mut RgbImage, font: &LabelFont, x: i32, top: i32, band_height: i32, text: &str) {
    let text_width = (text.chars().count() as i64 * LABEL_CHAR_WIDTH).min(COORD_LIMIT as i64);
    let background = Rect::at(x, top).of_size(text_width as u32 + 1, band_height as u32 + 1);
    draw_filled_rect_mut(image, background, BOX_COLOR);
    font.draw_text(image, TEXT_COLOR, x + TEXT_INSET, top + TEXT_INSET, text);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BLACK: [u8; 3] = [0, 0, 0];
    const GREEN: [u8; 3] = [0, 255, 0];

    fn canvas() -> RgbImage {
        RgbImage::new(120, 100)
    }

    fn sample() -> Detection {
        // corners (30, 40) .. (70, 60)
        Detection::new(50.0, 50.0, 40.0, 20.0, 0.5, "pill")
    }

    #[test]
    fn test_outline_is_three_pixels_inward() {
        let mut image = canvas();
        annotate(&mut image, &[sample()], LabelStyle::Combined, &LabelFont::Bitmap);

        for x in 30..33 {
            assert_eq!(image.get_pixel(x, 50).0, GREEN, "stroke pixel at x={x}");
        }
        assert_eq!(image.get_pixel(33, 50).0, BLACK);
        assert_eq!(image.get_pixel(50, 50).0, BLACK);
        for x in 68..71 {
            assert_eq!(image.get_pixel(x, 50).0, GREEN, "stroke pixel at x={x}");
        }
        assert_eq!(image.get_pixel(71, 50).0, BLACK);
    }

    #[test]
    fn test_numbered_style_draws_both_labels() {
        let mut image = canvas();
        annotate(&mut image, &[sample()], LabelStyle::Numbered, &LabelFont::Bitmap);

        // "#1: 50%" band spans y 18..=40 from x 30
        assert_eq!(image.get_pixel(30, 18).0, GREEN);
        assert_eq!(image.get_pixel(31, 39).0, GREEN);
        // "pill" band spans y 60..=80, 36px wide
        assert_eq!(image.get_pixel(30, 75).0, GREEN);
        assert_eq!(image.get_pixel(66, 75).0, GREEN);
        assert_eq!(image.get_pixel(67, 75).0, BLACK);
    }

    #[test]
    fn test_combined_style_has_no_bottom_label() {
        let mut image = canvas();
        annotate(&mut image, &[sample()], LabelStyle::Combined, &LabelFont::Bitmap);

        assert_eq!(image.get_pixel(30, 18).0, GREEN);
        assert_eq!(image.get_pixel(30, 75).0, BLACK);
    }

    #[test]
    fn test_label_text_is_rendered() {
        let mut image = canvas();
        annotate(&mut image, &[sample()], LabelStyle::Combined, &LabelFont::Bitmap);

        let text_pixels = (32..100)
            .flat_map(|x| (18..40).map(move |y| (x, y)))
            .filter(|&(x, y)| image.get_pixel(x, y).0 == BLACK)
            .count();
        assert!(text_pixels > 0);
    }

    #[test]
    fn test_dimensions_unchanged() {
        let mut image = canvas();
        let detections = vec![sample(), Detection::new(5.0, 5.0, 300.0, 300.0, 0.99, "capsule")];
        annotate(&mut image, &detections, LabelStyle::Numbered, &LabelFont::Bitmap);
        assert_eq!(image.dimensions(), (120, 100));
    }

    #[test]
    fn test_no_detections_leaves_image_untouched() {
        let mut image = canvas();
        annotate(&mut image, &[], LabelStyle::Numbered, &LabelFont::Bitmap);
        assert!(image.pixels().all(|p| p.0 == BLACK));
    }

    #[test]
    fn test_malformed_records_do_not_panic() {
        let records: Vec<Detection> = vec![
            serde_json::from_value(json!({})).unwrap(),
            serde_json::from_value(json!({"x": "left", "width": -40, "height": 10})).unwrap(),
            Detection::new(f64::NAN, f64::INFINITY, 1e300, -1e300, f64::NAN, ""),
            Detection::new(-500.0, -500.0, 10.0, 10.0, 2.5, "offscreen"),
        ];
        let mut image = canvas();
        for style in [LabelStyle::Numbered, LabelStyle::Combined] {
            annotate(&mut image, &records, style, &LabelFont::Bitmap);
        }
        assert_eq!(image.dimensions(), (120, 100));
    }

    #[test]
    fn test_annotator_uses_its_style() {
        let annotator = Annotator::new(LabelFont::Bitmap, LabelStyle::Numbered);
        let mut image = canvas();
        annotator.annotate(&mut image, &[sample()]);
        assert_eq!(annotator.style(), LabelStyle::Numbered);
        assert_eq!(image.get_pixel(30, 75).0, GREEN);
    }
}
