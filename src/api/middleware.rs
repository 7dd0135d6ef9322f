//! API Middleware (Access Guard, Logging)

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::handlers::AppState;
use crate::models::errors::AppError;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Shared-secret access guard.
/// With no key configured every request passes.
pub async fn access_guard(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.api_key.as_deref() else {
        return next.run(request).await;
    };

    let provided = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());

    match provided {
        Some(key) if key == expected => next.run(request).await,
        Some(_) => {
            warn!(uri = %request.uri(), "Invalid API key attempted");
            AppError::unauthorized().into_response()
        }
        None => {
            warn!(uri = %request.uri(), "Missing API key");
            AppError::unauthorized().into_response()
        }
    }
}

/// Request logging middleware
pub async fn logging_middleware(
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    info!(
        method = %method,
        uri = %uri,
        status = %status.as_u16(),
        latency_ms = %latency.as_millis(),
        "Request completed"
    );

    response
}
