//! Core domain types for the label registry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A generated barcode label.
///
/// Every field defaults when absent so a hand-edited document with a
/// missing field still loads instead of dropping the whole registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    /// Unique, assigned as `max(existing) + 1 ..` per batch
    #[serde(default)]
    pub id: u64,
    /// Unique barcode value, e.g. `KIOSCO-922-00042`
    #[serde(default)]
    pub code: String,
    /// Display name of the labelled article
    #[serde(default)]
    pub art: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

/// How the next correlative number is obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceMode {
    /// Recomputed from existing label codes on every read
    Derived,
    /// Explicit counter persisted next to the labels
    Stored,
}

impl SequenceMode {
    /// Parse from the `LABEL_MODE` value
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "derived" => Some(Self::Derived),
            "stored" => Some(Self::Stored),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Derived => "derived",
            Self::Stored => "stored",
        }
    }
}

/// Persisted counter (stored mode only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterState {
    pub prefix: String,
    pub digits: u32,
    pub next: u64,
}

/// The whole registry document as held in memory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub labels: Vec<Label>,
    /// Present only in stored mode
    pub state: Option<CounterState>,
}

/// State as reported by `GET /api/state`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateView {
    pub prefix: String,
    pub digits: u32,
    pub next: u64,
    /// Next default-name number (derived mode only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_seq: Option<u64>,
}

impl From<&CounterState> for StateView {
    fn from(state: &CounterState) -> Self {
        Self {
            prefix: state.prefix.clone(),
            digits: state.digits,
            next: state.next,
            name_seq: None,
        }
    }
}

/// Body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
