//! API Request/Response Types

use serde::{Deserialize, Serialize};

use crate::core::{LabelPatch, StatePatch};
use crate::models::types::{Label, StateView};

// ============================================
// Labels
// ============================================

#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    /// Batch size, 1..=999 (default 1)
    #[serde(default)]
    pub count: Option<i64>,
    /// Name for every label in the batch; blank falls back to the default
    #[serde(default)]
    pub item: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub added: Vec<Label>,
    pub state: StateView,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateLabelRequest {
    #[serde(default)]
    pub art: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

impl From<UpdateLabelRequest> for LabelPatch {
    fn from(req: UpdateLabelRequest) -> Self {
        Self {
            art: req.art,
            code: req.code,
        }
    }
}

// ============================================
// State
// ============================================

#[derive(Debug, Default, Deserialize)]
pub struct StatePatchRequest {
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub digits: Option<f64>,
    #[serde(default)]
    pub next: Option<f64>,
}

impl From<StatePatchRequest> for StatePatch {
    fn from(req: StatePatchRequest) -> Self {
        Self {
            prefix: req.prefix,
            digits: req.digits,
            next: req.next,
        }
    }
}

// ============================================
// Acknowledgements
// ============================================

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<StateView>,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            state: None,
        }
    }

    pub fn with_state(state: StateView) -> Self {
        Self {
            ok: true,
            state: Some(state),
        }
    }
}

// ============================================
// Health Check
// ============================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub mode: String,
    pub uptime_seconds: u64,
}
