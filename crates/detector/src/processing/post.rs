use crate::detection::{BoundingBox, Detection};
use thiserror::Error;

/// Mapping from model input space back to original-image coordinates,
/// produced by the letterbox preprocessing step.
pub struct TransformParams {
    pub orig_width: u32,
    pub orig_height: u32,
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unexpected prediction shape {0:?}, want [1, N, 5 + num_classes]")]
    BadShape(Vec<usize>),
    #[error("model predicts {found} classes but the vocabulary has {expected}")]
    ClassCountMismatch { expected: usize, found: usize },
}

pub struct PostProcessor {
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    num_classes: usize,
}

impl PostProcessor {
    pub fn new(confidence_threshold: f32, iou_threshold: f32, num_classes: usize) -> Self {
        Self {
            confidence_threshold,
            iou_threshold,
            num_classes,
        }
    }

    /// Decode a YOLOv5 prediction tensor into detections in original-image
    /// coordinates.
    ///
    /// Each row is [cx, cy, w, h, objectness, class scores...] in letterboxed
    /// input pixels. Confidence is objectness times the best class score;
    /// rows below the threshold are dropped, the rest are letterbox-inverted,
    /// clamped to the image, and deduplicated with per-class greedy NMS.
    #[tracing::instrument(skip(self, predictions, transform))]
    pub fn parse_detections(
        &self,
        predictions: &ndarray::ArrayViewD<f32>,
        transform: &TransformParams,
    ) -> Result<Vec<Detection>, DecodeError> {
        let shape = predictions.shape();
        if shape.len() != 3 || shape[0] != 1 || shape[2] < 5 {
            return Err(DecodeError::BadShape(shape.to_vec()));
        }

        let found = shape[2] - 5;
        if found != self.num_classes {
            return Err(DecodeError::ClassCountMismatch {
                expected: self.num_classes,
                found,
            });
        }

        let num_rows = shape[1];
        let mut candidates = Vec::new();

        for i in 0..num_rows {
            let objectness = predictions[[0, i, 4]];

            // Argmax over class scores
            let mut best_score = f32::NEG_INFINITY;
            let mut class_id = 0usize;
            for c in 0..self.num_classes {
                let score = predictions[[0, i, 5 + c]];
                if score > best_score {
                    best_score = score;
                    class_id = c;
                }
            }

            let confidence = objectness * best_score;
            if confidence < self.confidence_threshold {
                continue;
            }

            // Box in cxcywh, letterboxed input pixels
            let cx = predictions[[0, i, 0]];
            let cy = predictions[[0, i, 1]];
            let w = predictions[[0, i, 2]];
            let h = predictions[[0, i, 3]];

            let (x1_input, y1_input, x2_input, y2_input) = cxcywh_to_xyxy(cx, cy, w, h);

            // Apply inverse letterbox transform to original image coordinates
            let x1 = ((x1_input - transform.offset_x) / transform.scale)
                .max(0.0)
                .min(transform.orig_width as f32);
            let y1 = ((y1_input - transform.offset_y) / transform.scale)
                .max(0.0)
                .min(transform.orig_height as f32);
            let x2 = ((x2_input - transform.offset_x) / transform.scale)
                .max(0.0)
                .min(transform.orig_width as f32);
            let y2 = ((y2_input - transform.offset_y) / transform.scale)
                .max(0.0)
                .min(transform.orig_height as f32);

            candidates.push(Detection {
                bbox: BoundingBox { x1, y1, x2, y2 },
                confidence,
                class_id: class_id as u32,
            });
        }

        Ok(non_max_suppression(candidates, self.iou_threshold))
    }
}

/// Greedy per-class NMS: walk candidates in descending confidence and drop
/// any box overlapping an already-kept box of the same class.
fn non_max_suppression(mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut keep: Vec<Detection> = Vec::with_capacity(detections.len());
    for detection in detections {
        let suppressed = keep.iter().any(|kept| {
            kept.class_id == detection.class_id && kept.bbox.iou(&detection.bbox) > iou_threshold
        });
        if !suppressed {
            keep.push(detection);
        }
    }
    keep
}

/// Convert bounding box from center-width-height format to corner format
#[inline]
fn cxcywh_to_xyxy(cx: f32, cy: f32, w: f32, h: f32) -> (f32, f32, f32, f32) {
    let x1 = cx - w / 2.0;
    let y1 = cy - h / 2.0;
    let x2 = cx + w / 2.0;
    let y2 = cy + h / 2.0;
    (x1, y1, x2, y2)
}
