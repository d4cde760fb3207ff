use crate::html;
use crate::state::AppState;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use base64::Engine;
use detector::{ClassSummary, Detection, summarize};
use image::RgbImage;
use serde::Serialize;
use std::io::Cursor;
use tower_http::cors::CorsLayer;

const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

pub async fn run_server(addr: &str, state: AppState) -> anyhow::Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict_html))
        .route("/api/predict", post(predict_json))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(html::INDEX)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

#[derive(Serialize)]
struct PredictResponse {
    detections: Vec<Detection>,
    summary: Vec<ClassSummary>,
    /// Annotated image, base64-encoded JPEG.
    image: String,
}

enum AppError {
    BadRequest(String),
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(msg) => {
                tracing::warn!(error = %msg, "Rejecting upload");
                (StatusCode::BAD_REQUEST, msg).into_response()
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Inference request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("inference failed: {err}"),
                )
                    .into_response()
            }
        }
    }
}

struct InferenceOutcome {
    detections: Vec<Detection>,
    summary: Vec<ClassSummary>,
    image_base64: String,
}

async fn predict_html(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let outcome = run_inference(&state, multipart).await?;
    Ok(Html(html::result_page(&outcome.summary, &outcome.image_base64)))
}

async fn predict_json(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PredictResponse>, AppError> {
    let outcome = run_inference(&state, multipart).await?;
    Ok(Json(PredictResponse {
        detections: outcome.detections,
        summary: outcome.summary,
        image: outcome.image_base64,
    }))
}

/// One request cycle: decode the upload, run detect + summarize on the
/// blocking pool, encode the annotated image for transport.
async fn run_inference(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<InferenceOutcome, AppError> {
    let image = read_image_field(&mut multipart).await?;

    let detector = state.detector.clone();

    let (annotated, detections, summary) = tokio::task::spawn_blocking(move || {
        let mut detector = detector
            .lock()
            .map_err(|_| anyhow::anyhow!("detector mutex poisoned"))?;
        let detected = detector.detect(&image)?;
        let summary = summarize(detector.vocabulary(), &detected.detections)?;
        Ok::<_, anyhow::Error>((detected.annotated, detected.detections, summary))
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("inference task failed: {e}")))??;

    let jpeg = encode_jpeg(&annotated)?;
    let image_base64 = base64::engine::general_purpose::STANDARD.encode(&jpeg);

    Ok(InferenceOutcome {
        detections,
        summary,
        image_base64,
    })
}

async fn read_image_field(multipart: &mut Multipart) -> Result<RgbImage, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart payload: {e}")))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read upload: {e}")))?;

        if bytes.is_empty() {
            return Err(AppError::BadRequest("empty image upload".to_string()));
        }

        let image = image::load_from_memory(&bytes)
            .map_err(|e| AppError::BadRequest(format!("could not decode image: {e}")))?;

        return Ok(image.to_rgb8());
    }

    Err(AppError::BadRequest(
        "missing multipart field `image`".to_string(),
    ))
}

fn encode_jpeg(image: &RgbImage) -> anyhow::Result<Vec<u8>> {
    let mut jpeg_bytes = Cursor::new(Vec::new());
    image.write_to(&mut jpeg_bytes, image::ImageFormat::Jpeg)?;

    Ok(jpeg_bytes.into_inner())
}
