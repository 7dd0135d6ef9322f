//! API Request Handlers

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Json, Path, State},
    http::StatusCode,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;

use super::types::*;
use crate::core::LabelRegistry;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::{Label, SequenceMode, StateView};

/// Shared application state
pub struct AppState {
    pub registry: LabelRegistry,
    /// Access-guard secret; `None` leaves the API open
    pub api_key: Option<String>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(registry: LabelRegistry, api_key: Option<String>) -> Self {
        Self {
            registry,
            api_key,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// Run a registry operation on the blocking pool.
/// Registry calls do synchronous file I/O under the write lock.
async fn with_registry<T, F>(state: Arc<AppState>, op: F) -> AppResult<T>
where
    F: FnOnce(&LabelRegistry) -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || op(&state.registry))
        .await
        .map_err(|e| AppError::with_source(ErrorCode::Internal, "registry task failed", e))?
}

/// Decode a JSON body. An empty body means "no fields given".
/// Rejections from buffering (e.g. over the size limit) keep the `{error}` shape.
fn parse_body<T: DeserializeOwned + Default>(body: Result<Bytes, BytesRejection>) -> AppResult<T> {
    let body = body.map_err(|rejection| {
        let code = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ErrorCode::PayloadTooLarge
        } else {
            ErrorCode::Validation
        };
        AppError::new(code, rejection.body_text())
    })?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(&body)
        .map_err(|e| AppError::validation(format!("invalid request body: {}", e)))
}

fn parse_id(raw: &str) -> AppResult<u64> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::validation(format!("invalid id: {}", raw)))
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthData> {
    Json(HealthData {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        mode: state.registry.mode().name().to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}

// ============================================
// State
// ============================================

pub async fn get_state(State(state): State<Arc<AppState>>) -> AppResult<Json<StateView>> {
    Ok(Json(with_registry(state, |r| r.state()).await?))
}

pub async fn patch_state(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<Json<StateView>> {
    // Derived mode ignores the body, even a malformed one
    if state.registry.mode() == SequenceMode::Derived {
        return get_state(State(state)).await;
    }
    let req: StatePatchRequest = parse_body(body)?;
    Ok(Json(with_registry(state, move |r| r.patch_state(req.into())).await?))
}

// ============================================
// Labels
// ============================================

pub async fn list_labels(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Label>>> {
    Ok(Json(with_registry(state, |r| r.list()).await?))
}

pub async fn generate_labels(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<Json<GenerateResponse>> {
    let req: GenerateRequest = parse_body(body)?;
    let generated = with_registry(state, move |r| r.generate(req.count, req.item.as_deref())).await?;

    Ok(Json(GenerateResponse {
        added: generated.added,
        state: generated.state,
    }))
}

pub async fn update_label(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<Json<Label>> {
    let id = parse_id(&id)?;
    let req: UpdateLabelRequest = parse_body(body)?;
    Ok(Json(with_registry(state, move |r| r.update(id, req.into())).await?))
}

pub async fn delete_label(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<OkResponse>> {
    let id = parse_id(&id)?;
    with_registry(state, move |r| r.delete(id)).await?;
    Ok(Json(OkResponse::ok()))
}

pub async fn delete_all_labels(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<OkResponse>> {
    let new_state = with_registry(state, |r| r.delete_all()).await?;
    Ok(Json(OkResponse::with_state(new_state)))
}
