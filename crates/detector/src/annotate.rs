use crate::detection::Detection;
use crate::vocabulary::Vocabulary;
use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

const BOX_THICKNESS: i32 = 2;
const LABEL_FONT_SIZE: f32 = 16.0;
const LABEL_TEXT_HEIGHT: i32 = 18;
const LABEL_CHAR_WIDTH: f32 = 8.0; // rough average glyph width
const LABEL_TEXT_VERTICAL_PADDING: i32 = 2;

// Per-class palette, cycled when the vocabulary is larger.
const CLASS_COLORS: [[u8; 3]; 6] = [
    [220, 20, 60],  // crimson
    [30, 144, 255], // dodger blue
    [50, 205, 50],  // lime green
    [255, 165, 0],
    [186, 85, 211],
    [0, 206, 209],
];

fn class_color(class_id: u32) -> [u8; 3] {
    CLASS_COLORS[class_id as usize % CLASS_COLORS.len()]
}

/// Draws detection boxes (and labels, when a font is configured) onto an
/// image in place. Without a font the boxes still carry the class color.
pub struct Annotator {
    font: Option<FontVec>,
    font_size: f32,
}

impl Annotator {
    pub fn new() -> Self {
        Self {
            font: None,
            font_size: LABEL_FONT_SIZE,
        }
    }

    pub fn with_font(path: &str) -> anyhow::Result<Self> {
        let data = std::fs::read(path)?;
        let font = FontVec::try_from_vec(data)
            .map_err(|e| anyhow::anyhow!("failed to parse font {path}: {e}"))?;
        Ok(Self {
            font: Some(font),
            font_size: LABEL_FONT_SIZE,
        })
    }

    pub fn annotate(
        &self,
        image: &mut RgbImage,
        vocabulary: &Vocabulary,
        detections: &[Detection],
    ) {
        for detection in detections {
            let color = class_color(detection.class_id);
            self.draw_box(image, detection, color);

            if let Some(font) = &self.font {
                let name = vocabulary.name(detection.class_id).unwrap_or("?");
                let label = format!("{} {:.2}", name, detection.confidence);
                self.draw_label(image, detection, &label, color, font);
            }
        }
    }

    fn draw_box(&self, image: &mut RgbImage, detection: &Detection, color: [u8; 3]) {
        let (w, h) = (image.width() as i32, image.height() as i32);
        if w == 0 || h == 0 {
            return;
        }

        let x_min = (detection.bbox.x1.floor() as i32).clamp(0, w - 1);
        let y_min = (detection.bbox.y1.floor() as i32).clamp(0, h - 1);
        let x_max = (detection.bbox.x2.ceil() as i32).clamp(0, w - 1);
        let y_max = (detection.bbox.y2.ceil() as i32).clamp(0, h - 1);

        if x_min >= x_max || y_min >= y_max {
            return;
        }

        for t in 0..BOX_THICKNESS {
            let width = x_max - x_min - 2 * t;
            let height = y_max - y_min - 2 * t;
            if width <= 0 || height <= 0 {
                break;
            }
            let rect = Rect::at(x_min + t, y_min + t).of_size(width as u32, height as u32);
            draw_hollow_rect_mut(image, rect, Rgb(color));
        }
    }

    fn draw_label(
        &self,
        image: &mut RgbImage,
        detection: &Detection,
        label: &str,
        color: [u8; 3],
        font: &FontVec,
    ) {
        let w = image.width() as i32;

        let x_min = detection.bbox.x1.floor() as i32;
        let y_min = detection.bbox.y1.floor() as i32;

        let text_width = (label.len() as f32 * LABEL_CHAR_WIDTH) as i32;
        let label_x = x_min.clamp(0, (w - 1).max(0));
        let label_y = (y_min - LABEL_TEXT_HEIGHT).max(0);

        let max_width = (w - label_x).max(0);
        let label_width = text_width.min(max_width) as u32;
        let label_height = LABEL_TEXT_HEIGHT as u32;

        if label_width == 0 || label_height == 0 {
            return;
        }

        let rect = Rect::at(label_x, label_y).of_size(label_width, label_height);
        draw_filled_rect_mut(image, rect, Rgb(color));

        draw_text_mut(
            image,
            Rgb([255u8, 255u8, 255u8]),
            label_x,
            label_y + LABEL_TEXT_VERTICAL_PADDING,
            PxScale::from(self.font_size),
            font,
            label,
        );
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::BoundingBox;

    fn detection(x1: f32, y1: f32, x2: f32, y2: f32, class_id: u32) -> Detection {
        Detection {
            bbox: BoundingBox { x1, y1, x2, y2 },
            confidence: 0.9,
            class_id,
        }
    }

    #[test]
    fn annotation_preserves_dimensions() {
        let mut image = RgbImage::from_pixel(200, 150, Rgb([0, 0, 0]));
        let annotator = Annotator::new();
        let vocabulary = Vocabulary::blood_cells();

        annotator.annotate(
            &mut image,
            &vocabulary,
            &[detection(20.0, 20.0, 100.0, 80.0, 0)],
        );

        assert_eq!(image.dimensions(), (200, 150));
    }

    #[test]
    fn box_edges_take_the_class_color() {
        let mut image = RgbImage::from_pixel(200, 150, Rgb([0, 0, 0]));
        let annotator = Annotator::new();
        let vocabulary = Vocabulary::blood_cells();

        annotator.annotate(
            &mut image,
            &vocabulary,
            &[detection(20.0, 20.0, 100.0, 80.0, 1)],
        );

        let expected = Rgb(class_color(1));
        assert_eq!(*image.get_pixel(20, 20), expected, "corner pixel");
        assert_eq!(*image.get_pixel(60, 20), expected, "top edge");
        assert_eq!(*image.get_pixel(20, 50), expected, "left edge");
        // Interior stays untouched
        assert_eq!(*image.get_pixel(60, 50), Rgb([0, 0, 0]));
    }

    #[test]
    fn degenerate_and_out_of_bounds_boxes_are_skipped() {
        let mut image = RgbImage::from_pixel(100, 100, Rgb([7, 7, 7]));
        let annotator = Annotator::new();
        let vocabulary = Vocabulary::blood_cells();

        annotator.annotate(
            &mut image,
            &vocabulary,
            &[
                detection(50.0, 50.0, 50.0, 50.0, 0), // zero area
                detection(400.0, 400.0, 500.0, 500.0, 1), // fully outside
            ],
        );

        assert!(
            image.pixels().all(|p| *p == Rgb([7, 7, 7])),
            "nothing should have been drawn"
        );
    }

    #[test]
    fn class_colors_cycle_past_the_palette() {
        assert_eq!(class_color(0), class_color(CLASS_COLORS.len() as u32));
    }
}
