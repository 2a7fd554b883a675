//! HTTP Endpoints
//!
//! - `POST /data`   JSON `{data, thread_id?, audio_response?}`
//! - `POST /audio`  multipart `audio` file plus `thread_id?`, `audio_response?`
//! - `GET /health`  liveness and provider configuration
//! - `GET /metrics` Prometheus scrape
//!
//! Turn endpoints always answer 200 with a `ResponseEnvelope`; failures are
//! reported in the envelope, never as an HTTP error.

use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, DefaultBodyLimit, Multipart,
        State,
    },
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use voice_turn_agent::ResponseEnvelope;
use voice_turn_pipeline::UploadedAudio;

use crate::metrics::{record_latency, record_request};
use crate::state::AppState;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let server = &state.config.server;
    let cors_layer = build_cors_layer(&server.cors_origins, server.cors_enabled);
    let body_limit = server.max_upload_bytes;

    Router::new()
        // Conversation turns
        .route("/data", post(text_turn))
        .route("/audio", post(audio_turn))
        // Health check
        .route("/health", get(health_check))
        // Prometheus metrics
        .route("/metrics", get(metrics_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - disabled: permissive, no origin restrictions
/// - enabled with no origins: any origin, for the bundled browser client
/// - otherwise: the configured origins
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::info!("CORS restrictions disabled, allowing all origins");
        return CorsLayer::permissive();
    }

    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if origins.is_empty() {
        tracing::info!("No CORS origins configured, allowing any origin");
        return base.allow_origin(Any);
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::error!("All configured CORS origins are invalid, allowing same-origin only");
        return CorsLayer::new();
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    base.allow_origin(parsed_origins)
}

/// Text turn request
#[derive(Debug, Deserialize)]
struct DataRequest {
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    thread_id: Option<String>,
    #[serde(default)]
    audio_response: Option<bool>,
}

/// Text turn endpoint
async fn text_turn(
    State(state): State<AppState>,
    payload: Result<Json<DataRequest>, JsonRejection>,
) -> Json<ResponseEnvelope> {
    let start = Instant::now();

    let envelope = match payload {
        Ok(Json(request)) => {
            state
                .orchestrator
                .text_turn(
                    request.data.as_deref().unwrap_or_default(),
                    request.thread_id.as_deref(),
                    request.audio_response.unwrap_or(false),
                )
                .await
        },
        Err(rejection) => {
            tracing::warn!(operation = "text_turn", error = %rejection.body_text(), "Rejected request body");
            ResponseEnvelope::failure(format!("Error: {}", rejection.body_text()))
        },
    };

    finish("data", start, envelope)
}

/// Fields collected from an `/audio` form
#[derive(Debug, Default)]
struct AudioForm {
    audio: Option<UploadedAudio>,
    thread_id: Option<String>,
    audio_response: bool,
}

async fn read_audio_form(mut multipart: Multipart) -> Result<AudioForm, String> {
    let mut form = AudioForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| e.body_text())? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "audio" => {
                let content_type = field.content_type().map(str::to_string);
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| e.body_text())?;
                form.audio = Some(UploadedAudio::new(
                    bytes.to_vec(),
                    content_type.as_deref(),
                    file_name,
                ));
            },
            "thread_id" => {
                let value = field.text().await.map_err(|e| e.body_text())?;
                form.thread_id = Some(value);
            },
            "audio_response" => {
                let value = field.text().await.map_err(|e| e.body_text())?;
                form.audio_response = value.trim() == "true";
            },
            other => {
                tracing::debug!(field = other, "Ignoring unknown form field");
            },
        }
    }

    Ok(form)
}

/// Audio turn endpoint
async fn audio_turn(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Json<ResponseEnvelope> {
    let start = Instant::now();

    let form = match multipart {
        Ok(multipart) => read_audio_form(multipart).await,
        Err(rejection) => Err(rejection.body_text()),
    };

    let envelope = match form {
        Ok(AudioForm {
            audio: Some(upload),
            thread_id,
            audio_response,
        }) => {
            state
                .orchestrator
                .audio_turn(&upload, thread_id.as_deref(), audio_response)
                .await
        },
        Ok(_) => {
            tracing::warn!(operation = "audio_turn", "Request has no audio field");
            ResponseEnvelope::failure("Error: missing 'audio' file field")
        },
        Err(e) => {
            tracing::warn!(operation = "audio_turn", error = %e, "Rejected multipart body");
            ResponseEnvelope::failure(format!("Error: {}", e))
        },
    };

    finish("audio", start, envelope)
}

fn finish(endpoint: &'static str, start: Instant, envelope: ResponseEnvelope) -> Json<ResponseEnvelope> {
    record_request(endpoint, envelope.is_success());
    record_latency(endpoint, start.elapsed());
    Json(envelope)
}

/// Liveness check with provider configuration status
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let missing = state.config.missing_credentials();
    let configured = |prefix: &str| !missing.iter().any(|field| field.starts_with(prefix));

    Json(serde_json::json!({
        "status": if missing.is_empty() { "ok" } else { "degraded" },
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "providers": {
            "stt": configured("stt."),
            "assistant": configured("assistant."),
            "tts": configured("tts."),
        },
        "missing": missing,
    }))
}

/// Prometheus scrape endpoint
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        ),
        None => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "text/plain")],
            "metrics disabled".to_string(),
        ),
    }
}
