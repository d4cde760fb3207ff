use detector::Detector;
use detector::backend::ort::OrtBackend;
use std::sync::{Arc, Mutex};

/// The detector session needs `&mut` per inference, so requests take turns
/// through the mutex while axum handles connection concurrency. The handle
/// owns the vocabulary, so no other per-request state is needed.
pub type SharedDetector = Arc<Mutex<Detector<OrtBackend>>>;

#[derive(Clone)]
pub struct AppState {
    pub detector: SharedDetector,
}
