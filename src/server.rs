use crate::{
    config::Config,
    error::{DecorError, Result},
    models::{GenerationRequest, ImageMime, RequestContext, VariationBatch},
    orchestrator::VariationOrchestrator,
    provider::ImageClient,
};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header::CONTENT_TYPE, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;
use std::{sync::Arc, time::Duration};
use tokio::{
    net::TcpListener,
    signal::{
        ctrl_c,
        unix::{signal, SignalKind},
    },
};
use tower_http::cors::{Any, CorsLayer};

pub const DEFAULT_PORT: u16 = 3000;

/// Transport ceiling on the multipart body.
pub const UPLOAD_CEILING_BYTES: usize = 50 * 1024 * 1024;

pub struct AppState {
    pub orchestrator: VariationOrchestrator,
}

pub type SharedState = Arc<AppState>;

impl IntoResponse for DecorError {
    fn into_response(self) -> Response {
        match self {
            DecorError::ValidationError(msg) | DecorError::SizeLimitError(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            DecorError::UploadError(msg) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "File upload error", "details": msg })),
            )
                .into_response(),
            DecorError::ProviderError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to generate variations", "details": msg })),
            )
                .into_response(),
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to generate variations",
                    "details": other.to_string(),
                })),
            )
                .into_response(),
        }
    }
}

pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_origin(Any)
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/generate-variations", post(generate_variations_handler))
        .layer(DefaultBodyLimit::max(UPLOAD_CEILING_BYTES))
        .layer(cors)
        .with_state(state)
}

/// Accepts the multipart submission, runs the orchestrator, relays the batch.
///
/// Auth is not required here; an `x-user-id` header (attached by the session
/// layer when present) only enriches the request context.
pub async fn generate_variations_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> std::result::Result<Json<VariationBatch>, DecorError> {
    let ctx = RequestContext {
        user_id: headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };

    let mut image: Option<(Vec<u8>, ImageMime)> = None;
    let mut style_text = String::new();
    let mut subject_text = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| DecorError::UploadError(e.to_string()))?
    {
        match field.name() {
            Some("image") => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let mime = ImageMime::from_content_type(&content_type).ok_or_else(|| {
                    DecorError::ValidationError("Only JPEG and PNG images are accepted".into())
                })?;
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| DecorError::UploadError(e.to_string()))?;
                image = Some((bytes.to_vec(), mime));
            }
            Some("prompt") => {
                style_text = field
                    .text()
                    .await
                    .map_err(|e| DecorError::UploadError(e.to_string()))?;
            }
            Some("textInput") => {
                subject_text = field
                    .text()
                    .await
                    .map_err(|e| DecorError::UploadError(e.to_string()))?;
            }
            _ => {}
        }
    }

    let (bytes, mime) = image.ok_or_else(|| DecorError::ValidationError("No image provided".into()))?;

    let request = GenerationRequest {
        subject_text,
        style_text,
        image: bytes,
        mime_type: mime,
    };

    let variations = state.orchestrator.generate_batch(&request, &ctx).await?;
    Ok(Json(VariationBatch { variations }))
}

pub async fn start_server(config: Config) -> Result<()> {
    let client = ImageClient::new(config.provider.clone())?;
    let state = Arc::new(AppState {
        orchestrator: VariationOrchestrator::new(client),
    });

    let app = router(state);

    let port = config.port.unwrap_or(DEFAULT_PORT);
    let address = format!("0.0.0.0:{}", port);
    log::info!("Binding to {}", address);

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| DecorError::ConfigError(format!("Failed to bind {}: {}", address, e)))?;

    log::info!("Server running on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| DecorError::ConfigError(e.to_string()))?;

    log::info!("Server shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");
        log::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        log::info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
