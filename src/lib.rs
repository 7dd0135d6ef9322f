//! Label Registry Library
//!
//! Barcode label generator and inventory registry:
//! - Sequential codes from a prefix + zero-padded number scheme
//! - Numbering derived from existing labels or from a persisted counter
//! - Labels persisted to a single flat JSON document
//! - CRUD over HTTP with an optional shared-secret guard

pub mod api;
pub mod core;
pub mod models;

pub use crate::core::{LabelRegistry, LabelStore};
pub use api::{create_router, AppState};
pub use models::{AppConfig, AppError, AppResult, CodeScheme, ErrorCode, Label, SequenceMode};

/// Build the registry and router for a configuration
pub fn build_app(config: &AppConfig) -> AppResult<axum::Router> {
    let store = LabelStore::new(config.db_file(), config.mode, config.scheme.clone());
    store.ensure_exists()?;
    let registry = LabelRegistry::new(store, config.mode, config.scheme.clone());
    let state = std::sync::Arc::new(AppState::new(registry, config.api_key.clone()));
    Ok(create_router(state, &config.public_dir))
}
