//! Flat JSON document store
//!
//! The whole registry lives in one document:
//!
//! ```json
//! { "labels": [ ... ], "state": { "prefix": "A-", "digits": 3, "next": 4 } }
//! ```
//!
//! `state` exists only in stored mode. Loads are lenient: unparseable content
//! is treated as an empty registry, and individual label entries that do not
//! decode are skipped. Saves rewrite the whole document through a temp file
//! and a rename, so readers never observe a half-written file.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::models::config::{CodeScheme, MAX_DIGITS};
use crate::models::errors::AppResult;
use crate::models::types::{CounterState, Document, Label, SequenceMode};

/// Shape written to disk. Anything else found in the file is dropped.
#[derive(Serialize)]
struct PersistedDocument<'a> {
    labels: &'a [Label],
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<&'a CounterState>,
}

/// Stored counter as found on disk; missing fields fall back to the scheme
#[derive(Deserialize)]
struct PartialState {
    prefix: Option<String>,
    digits: Option<u32>,
    next: Option<u64>,
}

/// Single-document repository backed by a JSON file
#[derive(Debug, Clone)]
pub struct LabelStore {
    path: PathBuf,
    mode: SequenceMode,
    scheme: CodeScheme,
}

impl LabelStore {
    pub fn new(path: impl Into<PathBuf>, mode: SequenceMode, scheme: CodeScheme) -> Self {
        Self {
            path: path.into(),
            mode,
            scheme,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Document with no labels and, in stored mode, a fresh counter
    pub fn empty_document(&self) -> Document {
        Document {
            labels: Vec::new(),
            state: match self.mode {
                SequenceMode::Stored => Some(self.scheme.initial_state()),
                SequenceMode::Derived => None,
            },
        }
    }

    /// Create the data directory and an initial document if missing
    pub fn ensure_exists(&self) -> AppResult<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        if !self.path.exists() {
            debug!(path = %self.path.display(), "Creating initial label document");
            self.save(&self.empty_document())?;
        }
        Ok(())
    }

    /// Load the current document
    pub fn load(&self) -> AppResult<Document> {
        self.ensure_exists()?;
        let raw = fs::read_to_string(&self.path)?;
        Ok(self.parse(&raw))
    }

    fn parse(&self, raw: &str) -> Document {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Malformed label document, treating as empty");
                return self.empty_document();
            }
        };

        let labels = match value.get("labels").and_then(Value::as_array) {
            Some(entries) => {
                let labels: Vec<Label> = entries
                    .iter()
                    .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                    .collect();
                if labels.len() != entries.len() {
                    warn!(
                        skipped = entries.len() - labels.len(),
                        "Skipped malformed label entries"
                    );
                }
                labels
            }
            None => Vec::new(),
        };

        let state = match self.mode {
            SequenceMode::Derived => None,
            SequenceMode::Stored => Some(self.parse_state(value.get("state"))),
        };

        Document { labels, state }
    }

    fn parse_state(&self, value: Option<&Value>) -> CounterState {
        let defaults = self.scheme.initial_state();
        let partial = value
            .cloned()
            .and_then(|v| serde_json::from_value::<PartialState>(v).ok());
        match partial {
            Some(p) => CounterState {
                prefix: p.prefix.unwrap_or(defaults.prefix),
                digits: p
                    .digits
                    .filter(|d| *d <= MAX_DIGITS)
                    .unwrap_or(defaults.digits),
                next: p.next.unwrap_or(defaults.next),
            },
            None => defaults,
        }
    }

    /// Persist the recognized shape of `doc`, replacing the whole file
    pub fn save(&self, doc: &Document) -> AppResult<()> {
        let persisted = PersistedDocument {
            labels: &doc.labels,
            state: match self.mode {
                SequenceMode::Stored => doc.state.as_ref(),
                SequenceMode::Derived => None,
            },
        };
        let json = serde_json::to_string_pretty(&persisted)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
