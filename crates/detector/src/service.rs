use crate::{
    annotate::Annotator,
    backend::DetectorBackend,
    config::DetectorConfig,
    detection::Detection,
    processing::{
        post::{PostProcessor, TransformParams},
        pre::PreProcessor,
    },
    vocabulary::Vocabulary,
};
use image::RgbImage;

/// Everything one inference call produces: the image with boxes drawn plus
/// the structured detections the summary step consumes.
pub struct Detected {
    pub annotated: RgbImage,
    pub detections: Vec<Detection>,
}

/// Explicitly constructed detector handle: owns the model session, the
/// pre/post processors and the vocabulary. Callers hold it wherever they
/// want (the gateway keeps it in shared state) instead of relying on a
/// process-global model.
pub struct Detector<B: DetectorBackend> {
    backend: B,
    vocabulary: Vocabulary,
    preprocessor: PreProcessor,
    postprocessor: PostProcessor,
    annotator: Annotator,
}

impl<B: DetectorBackend> Detector<B> {
    pub fn new(
        backend: B,
        config: &DetectorConfig,
        vocabulary: Vocabulary,
    ) -> anyhow::Result<Self> {
        let preprocessor = PreProcessor::new(config.input_size);
        let postprocessor = PostProcessor::new(
            config.confidence_threshold,
            config.iou_threshold,
            vocabulary.len(),
        );
        let annotator = match config.font_path.as_deref() {
            Some(path) => Annotator::with_font(path)?,
            None => Annotator::new(),
        };

        Ok(Self {
            backend,
            vocabulary,
            preprocessor,
            postprocessor,
            annotator,
        })
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// One synchronous inference cycle: preprocess, run the model, decode,
    /// draw. No state survives the call.
    pub fn detect(&mut self, image: &RgbImage) -> anyhow::Result<Detected> {
        let (width, height) = image.dimensions();

        let span = tracing::info_span!("detect", width, height);
        let _enter = span.enter();

        let (input, scale, offset_x, offset_y) = self.preprocessor.preprocess(image)?;

        let output = self.backend.infer(&input)?;

        let transform = TransformParams {
            orig_width: width,
            orig_height: height,
            scale,
            offset_x,
            offset_y,
        };

        let detections = self
            .postprocessor
            .parse_detections(&output.view(), &transform)?;

        tracing::debug!(detections = detections.len(), "Image processed");

        let mut annotated = image.clone();
        self.annotator
            .annotate(&mut annotated, &self.vocabulary, &detections);

        Ok(Detected {
            annotated,
            detections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::summarize;
    use image::Rgb;
    use ndarray::{Array, ArrayD, IxDyn};

    /// Backend returning a canned prediction tensor, letting the whole
    /// pipeline run without a model file.
    struct StubBackend {
        predictions: ArrayD<f32>,
    }

    impl DetectorBackend for StubBackend {
        fn load_model(_path: &str) -> anyhow::Result<Self> {
            unimplemented!("stub backends are constructed directly")
        }

        fn infer(&mut self, _input: &Array<f32, IxDyn>) -> anyhow::Result<ArrayD<f32>> {
            Ok(self.predictions.clone())
        }
    }

    /// Rows of (box cxcywh in input pixels, objectness, class idx, score)
    /// packed as a YOLOv5 [1, N, 5 + 3] tensor.
    fn stub_predictions(rows: Vec<([f32; 4], f32, usize, f32)>) -> ArrayD<f32> {
        let stride = 8;
        let n = rows.len();
        let mut data = vec![0.01f32; n * stride];
        for (i, (bbox, objectness, class_idx, score)) in rows.iter().enumerate() {
            data[i * stride..i * stride + 4].copy_from_slice(bbox);
            data[i * stride + 4] = *objectness;
            data[i * stride + 5 + class_idx] = *score;
        }
        Array::from_shape_vec(IxDyn(&[1, n, stride]), data).unwrap()
    }

    fn test_detector(rows: Vec<([f32; 4], f32, usize, f32)>) -> Detector<StubBackend> {
        let backend = StubBackend {
            predictions: stub_predictions(rows),
        };
        Detector::new(
            backend,
            &DetectorConfig::test_default(),
            Vocabulary::blood_cells(),
        )
        .unwrap()
    }

    #[test]
    fn detect_runs_the_full_pipeline() {
        let mut detector = test_detector(vec![
            ([200.0, 200.0, 80.0, 80.0], 0.9, 0, 0.9),
            ([400.0, 400.0, 60.0, 60.0], 0.9, 1, 0.8),
        ]);

        let image = RgbImage::from_pixel(640, 640, Rgb([50, 50, 50]));
        let detected = detector.detect(&image).unwrap();

        assert_eq!(detected.annotated.dimensions(), (640, 640));
        assert_eq!(detected.detections.len(), 2);
        assert_eq!(detected.detections[0].class_id, 0);
    }

    #[test]
    fn detect_then_summarize_matches_spec_rows() {
        let mut detector = test_detector(vec![
            ([100.0, 100.0, 40.0, 40.0], 1.0, 0, 0.9),
            ([300.0, 300.0, 40.0, 40.0], 1.0, 0, 0.7),
            ([500.0, 500.0, 40.0, 40.0], 1.0, 1, 0.8),
        ]);

        let image = RgbImage::from_pixel(640, 640, Rgb([0, 0, 0]));
        let detected = detector.detect(&image).unwrap();
        let rows = summarize(detector.vocabulary(), &detected.detections).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].detections, 2);
        assert!((rows[0].mean_confidence - 0.8).abs() < 1e-5);
        assert_eq!(rows[1].detections, 1);
        assert!((rows[1].mean_confidence - 0.8).abs() < 1e-5);
        assert_eq!(rows[2].detections, 0);
        assert_eq!(rows[2].mean_confidence, 0.0);
    }

    #[test]
    fn no_detections_is_not_an_error() {
        let mut detector = test_detector(vec![([100.0, 100.0, 40.0, 40.0], 0.01, 0, 0.1)]);

        let image = RgbImage::from_pixel(640, 640, Rgb([0, 0, 0]));
        let detected = detector.detect(&image).unwrap();

        assert!(detected.detections.is_empty());
        let rows = summarize(detector.vocabulary(), &detected.detections).unwrap();
        assert!(rows.iter().all(|r| r.detections == 0));
    }
}
