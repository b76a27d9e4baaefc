use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::analysis::Timeframe;
use crate::bus::{ClipboardItem, PasteBus, PasteEvent};
use crate::capture::{CaptureSource, InputMode};
use crate::config::AppConfig;
use crate::error::SessionError;
use crate::session::Session;

/// Header naming how an uploaded image was acquired (`file` or `drop`)
pub const CAPTURE_SOURCE_HEADER: &str = "x-capture-source";

pub struct AppState {
    pub session: Session,
    pub paste_bus: PasteBus,
    pub config: AppConfig,
}

pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.session.max_upload_bytes;
    Router::new()
        .route("/session", get(get_session))
        .route("/session/image", post(upload_image).delete(clear_image))
        .route("/session/paste", post(paste))
        .route("/session/text", post(select_text))
        .route("/session/mode", put(set_mode))
        .route("/session/pair", put(set_pair))
        .route("/session/analyze", post(analyze))
        .route("/session/chat", post(chat))
        .route("/session/report", get(get_report))
        .route("/session/reset", post(reset))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Serve the session API on an already bound listener
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("🌐 [API] Server listening on {}", addr);
    }
    axum::serve(listener, router(state)).await
}

pub async fn run_server(state: Arc<AppState>) -> std::io::Result<()> {
    let listener = TcpListener::bind(&state.config.server.bind_addr).await?;
    serve(listener, state).await
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let status = if self.is_input_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::BAD_GATEWAY
        };
        (
            status,
            Json(json!({ "error": self.code(), "message": self.to_string() })),
        )
            .into_response()
    }
}

async fn get_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.session.snapshot())
}

fn content_type(headers: &HeaderMap) -> String {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn capture_source(headers: &HeaderMap) -> CaptureSource {
    match headers
        .get(CAPTURE_SOURCE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_ascii_lowercase())
        .as_deref()
    {
        Some("drop") => CaptureSource::Drop,
        _ => CaptureSource::File,
    }
}

async fn upload_image(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, SessionError> {
    let source = capture_source(&headers);
    state
        .session
        .capture_image(source, &content_type(&headers), body.to_vec())?;
    Ok(Json(state.session.snapshot()))
}

async fn clear_image(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.session.clear_image();
    Json(state.session.snapshot())
}

async fn paste(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let item = ClipboardItem::new(content_type(&headers), body.to_vec());
    let listeners = state.paste_bus.publish(PasteEvent::single(item));
    if listeners == 0 {
        warn!("📋 [PASTE] Paste received with no listener attached");
    }
    (StatusCode::ACCEPTED, Json(json!({ "listeners": listeners })))
}

async fn select_text(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.session.select_text_protocol();
    Json(state.session.snapshot())
}

#[derive(Deserialize)]
struct ModeParams {
    mode: InputMode,
}

async fn set_mode(
    State(state): State<Arc<AppState>>,
    Json(params): Json<ModeParams>,
) -> impl IntoResponse {
    state.session.set_input_mode(params.mode);
    Json(state.session.snapshot())
}

#[derive(Deserialize)]
struct PairParams {
    pair: String,
    timeframe: Option<Timeframe>,
}

async fn set_pair(
    State(state): State<Arc<AppState>>,
    Json(params): Json<PairParams>,
) -> impl IntoResponse {
    state.session.set_pair(params.pair, params.timeframe);
    Json(state.session.snapshot())
}

async fn analyze(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, SessionError> {
    let outcome = state.session.start_analysis().await?;
    Ok(Json(outcome))
}

#[derive(Deserialize)]
struct ChatParams {
    message: String,
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(params): Json<ChatParams>,
) -> Result<impl IntoResponse, SessionError> {
    let outcome = state.session.send_message(&params.message).await?;
    Ok(Json(outcome))
}

async fn get_report(State(state): State<Arc<AppState>>) -> Response {
    match state.session.export_report(&state.config.app_name) {
        Some((filename, body)) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", filename),
                ),
            ],
            body,
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            "No analysis available yet. Run an analysis first.",
        )
            .into_response(),
    }
}

async fn reset(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.session.reset();
    Json(state.session.snapshot())
}
