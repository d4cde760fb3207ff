use detector::backend::ort::OrtBackend;
use detector::{Detector, DetectorBackend, DetectorConfig, Vocabulary};
use gateway::{
    config::get_configuration, logging::setup_logging, routes::run_server, state::AppState,
};
use std::sync::{Arc, Mutex};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = get_configuration()?;
    setup_logging(&config);

    let detector_config = DetectorConfig::from_env()?;
    tracing::info!(
        config = ?detector_config,
        "Loaded detector configuration"
    );

    let vocabulary = match &detector_config.class_names {
        Some(names) => Vocabulary::new(names.clone())?,
        None => Vocabulary::blood_cells(),
    };

    tracing::info!(model_path = %detector_config.model_path, "Loading detection model");
    let backend = OrtBackend::load_model(&detector_config.model_path)?;
    tracing::info!("Model loaded successfully");

    let detector = Detector::new(backend, &detector_config, vocabulary)?;

    let state = AppState {
        detector: Arc::new(Mutex::new(detector)),
    };

    run_server(&config.http_addr, state).await
}
