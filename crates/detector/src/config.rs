use std::env;

pub const DEFAULT_INPUT_SIZE: (u32, u32) = (640, 640);
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.25;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.45;

#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub model_path: String,
    pub input_size: (u32, u32),
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    /// TTF font for box labels; boxes are drawn without text when unset.
    pub font_path: Option<String>,
    /// Override of the built-in blood-cell vocabulary, comma separated.
    pub class_names: Option<Vec<String>>,
}

impl DetectorConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> anyhow::Result<Self> {
        let model_path = env::var("DETECTOR_MODEL_PATH")
            .unwrap_or_else(|_| "models/bccd_yolov5s.onnx".to_string());

        let input_width = env::var("DETECTOR_INPUT_WIDTH")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_INPUT_SIZE.0);

        let input_height = env::var("DETECTOR_INPUT_HEIGHT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_INPUT_SIZE.1);

        let confidence_threshold = env::var("DETECTOR_CONFIDENCE_THRESHOLD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD);

        let iou_threshold = env::var("DETECTOR_IOU_THRESHOLD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_IOU_THRESHOLD);

        let font_path = env::var("DETECTOR_FONT_PATH").ok();

        let class_names = env::var("DETECTOR_CLASS_NAMES")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|names| !names.is_empty());

        Ok(Self {
            model_path,
            input_size: (input_width, input_height),
            confidence_threshold,
            iou_threshold,
            font_path,
            class_names,
        })
    }

    /// Create default configuration for testing
    #[cfg(test)]
    pub fn test_default() -> Self {
        Self {
            model_path: "/models/model.onnx".to_string(),
            input_size: DEFAULT_INPUT_SIZE,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            font_path: None,
            class_names: None,
        }
    }
}
