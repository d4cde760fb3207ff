use ndarray::{Array, ArrayD, IxDyn};

#[cfg(feature = "ort-backend")]
pub mod ort;

/// Seam between the pipeline and the model runtime. Implementations own
/// the loaded session and run one forward pass per call.
pub trait DetectorBackend {
    fn load_model(path: &str) -> anyhow::Result<Self>
    where
        Self: Sized;

    /// Run the model over a preprocessed NCHW batch and return the raw
    /// prediction tensor, [1, N, 5 + num_classes] for YOLOv5 exports.
    fn infer(&mut self, input: &Array<f32, IxDyn>) -> anyhow::Result<ArrayD<f32>>;
}
