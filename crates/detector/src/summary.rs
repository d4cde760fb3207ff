use crate::detection::Detection;
use crate::vocabulary::Vocabulary;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SummaryError {
    #[error("class id {class_id} is outside the {vocabulary_size}-class vocabulary")]
    InvalidClassId {
        class_id: u32,
        vocabulary_size: usize,
    },
}

/// One table row: how many instances of a class were detected in a single
/// inference call and their mean confidence (0.0 when none were).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassSummary {
    pub class_name: String,
    pub detections: u32,
    pub mean_confidence: f32,
}

/// Fold per-detection confidences into one row per vocabulary class.
///
/// Rows come out in vocabulary order, zero-count rows included. The
/// accumulators are sized by the vocabulary, so a class id past the end
/// is a contract violation from the model and fails the whole call.
pub fn summarize(
    vocabulary: &Vocabulary,
    detections: &[Detection],
) -> Result<Vec<ClassSummary>, SummaryError> {
    let mut counts = vec![0u32; vocabulary.len()];
    let mut confidence_sums = vec![0.0f32; vocabulary.len()];

    for detection in detections {
        let Some(count) = counts.get_mut(detection.class_id as usize) else {
            return Err(SummaryError::InvalidClassId {
                class_id: detection.class_id,
                vocabulary_size: vocabulary.len(),
            });
        };
        *count += 1;
        confidence_sums[detection.class_id as usize] += detection.confidence;
    }

    let rows = vocabulary
        .names()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let mean_confidence = if counts[idx] > 0 {
                confidence_sums[idx] / counts[idx] as f32
            } else {
                0.0
            };
            ClassSummary {
                class_name: name.clone(),
                detections: counts[idx],
                mean_confidence,
            }
        })
        .collect();

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::BoundingBox;

    fn detection(class_id: u32, confidence: f32) -> Detection {
        Detection {
            bbox: BoundingBox {
                x1: 0.0,
                y1: 0.0,
                x2: 10.0,
                y2: 10.0,
            },
            confidence,
            class_id,
        }
    }

    #[test]
    fn empty_input_yields_all_zero_rows() {
        let vocabulary = Vocabulary::blood_cells();
        let rows = summarize(&vocabulary, &[]).unwrap();

        assert_eq!(rows.len(), 3);
        for (row, expected_name) in rows.iter().zip(["RBC", "WBC", "Platelets"]) {
            assert_eq!(row.class_name, expected_name);
            assert_eq!(row.detections, 0);
            assert_eq!(row.mean_confidence, 0.0);
        }
    }

    #[test]
    fn counts_and_means_per_class() {
        let vocabulary = Vocabulary::blood_cells();
        let detections = [
            detection(0, 0.9),
            detection(0, 0.7),
            detection(1, 0.8),
        ];
        let rows = summarize(&vocabulary, &detections).unwrap();

        assert_eq!(rows[0].class_name, "RBC");
        assert_eq!(rows[0].detections, 2);
        assert!((rows[0].mean_confidence - 0.8).abs() < 1e-6);

        assert_eq!(rows[1].class_name, "WBC");
        assert_eq!(rows[1].detections, 1);
        assert!((rows[1].mean_confidence - 0.8).abs() < 1e-6);

        assert_eq!(rows[2].class_name, "Platelets");
        assert_eq!(rows[2].detections, 0);
        assert_eq!(rows[2].mean_confidence, 0.0);
    }

    #[test]
    fn counts_sum_to_total_detections() {
        let vocabulary = Vocabulary::blood_cells();
        let detections: Vec<Detection> = (0..17)
            .map(|i| detection(i % 3, 0.25 + 0.02 * i as f32))
            .collect();

        let rows = summarize(&vocabulary, &detections).unwrap();
        let total: u32 = rows.iter().map(|r| r.detections).sum();
        assert_eq!(total as usize, detections.len());
    }

    #[test]
    fn means_stay_within_unit_interval() {
        let vocabulary = Vocabulary::blood_cells();
        let detections = [
            detection(0, 0.0),
            detection(0, 1.0),
            detection(1, 0.5),
            detection(2, 0.999),
        ];
        let rows = summarize(&vocabulary, &detections).unwrap();
        for row in rows {
            assert!((0.0..=1.0).contains(&row.mean_confidence));
        }
    }

    #[test]
    fn summarize_is_idempotent() {
        let vocabulary = Vocabulary::blood_cells();
        let detections = [detection(2, 0.6), detection(0, 0.4)];

        let first = summarize(&vocabulary, &detections).unwrap();
        let second = summarize(&vocabulary, &detections).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn class_id_outside_vocabulary_fails() {
        let vocabulary = Vocabulary::blood_cells();
        let detections = [detection(0, 0.9), detection(5, 0.8)];

        let err = summarize(&vocabulary, &detections).unwrap_err();
        assert_eq!(
            err,
            SummaryError::InvalidClassId {
                class_id: 5,
                vocabulary_size: 3,
            }
        );
    }
}
