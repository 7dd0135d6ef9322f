//! Label Registry
//!
//! CRUD over the label document. Every mutation is one load-modify-save
//! cycle against the [`LabelStore`]; cycles are serialized by an in-process
//! mutex so overlapping requests cannot lose updates or hand out the same
//! ids and codes twice. Validation runs before anything is written, so a
//! failed request leaves the document untouched.

use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard};
use tracing::info;

use super::sequencer;
use super::store::LabelStore;
use crate::models::config::{CodeScheme, MAX_DIGITS};
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{CounterState, Document, Label, SequenceMode, StateView};

pub const MIN_BATCH: i64 = 1;
pub const MAX_BATCH: i64 = 999;

/// Result of a generate call
#[derive(Debug, Clone)]
pub struct Generated {
    pub added: Vec<Label>,
    pub state: StateView,
}

/// Requested edit of a single label
#[derive(Debug, Clone, Default)]
pub struct LabelPatch {
    pub art: Option<String>,
    pub code: Option<String>,
}

/// Requested edit of the stored counter
#[derive(Debug, Clone, Default)]
pub struct StatePatch {
    pub prefix: Option<String>,
    pub digits: Option<f64>,
    pub next: Option<f64>,
}

pub struct LabelRegistry {
    store: LabelStore,
    mode: SequenceMode,
    scheme: CodeScheme,
    write_lock: Mutex<()>,
}

impl LabelRegistry {
    pub fn new(store: LabelStore, mode: SequenceMode, scheme: CodeScheme) -> Self {
        Self {
            store,
            mode,
            scheme,
            write_lock: Mutex::new(()),
        }
    }

    pub fn mode(&self) -> SequenceMode {
        self.mode
    }

    pub fn store(&self) -> &LabelStore {
        &self.store
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guarded data is `()`, so a poisoned lock carries no broken state
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// All labels in insertion order
    pub fn list(&self) -> AppResult<Vec<Label>> {
        Ok(self.store.load()?.labels)
    }

    /// Current numbering state
    pub fn state(&self) -> AppResult<StateView> {
        let doc = self.store.load()?;
        Ok(self.state_view(&doc))
    }

    fn state_view(&self, doc: &Document) -> StateView {
        match self.mode {
            SequenceMode::Derived => StateView {
                prefix: self.scheme.prefix.clone(),
                digits: self.scheme.digits,
                // Exhausted number space reports the last number; generate refuses it
                next: sequencer::derived_next(&doc.labels).unwrap_or(u64::MAX),
                name_seq: Some(sequencer::derived_name_seq(&doc.labels)),
            },
            SequenceMode::Stored => match &doc.state {
                Some(state) => StateView::from(state),
                None => StateView::from(&self.scheme.initial_state()),
            },
        }
    }

    /// Patch `prefix`, `digits` or `next`.
    ///
    /// Derived mode has nothing mutable: the patch is ignored and the freshly
    /// derived state is returned.
    pub fn patch_state(&self, patch: StatePatch) -> AppResult<StateView> {
        if self.mode == SequenceMode::Derived {
            return self.state();
        }

        let digits = patch
            .digits
            .map(|d| non_negative("digits", d))
            .transpose()?;
        if let Some(d) = digits {
            if d > MAX_DIGITS as u64 {
                return Err(AppError::validation(format!(
                    "digits must be at most {}",
                    MAX_DIGITS
                )));
            }
        }
        let next = patch.next.map(|n| non_negative("next", n)).transpose()?;

        let _guard = self.lock();
        let mut doc = self.store.load()?;
        let state = doc
            .state
            .get_or_insert_with(|| self.scheme.initial_state());
        if let Some(prefix) = patch.prefix {
            state.prefix = prefix.trim().to_string();
        }
        if let Some(d) = digits {
            state.digits = d as u32;
        }
        if let Some(n) = next {
            state.next = n;
        }
        info!(prefix = %state.prefix, digits = state.digits, next = state.next, "State patched");
        self.store.save(&doc)?;
        Ok(self.state_view(&doc))
    }

    /// Generate `count` labels (default 1) in a single batch
    pub fn generate(&self, count: Option<i64>, item: Option<&str>) -> AppResult<Generated> {
        let count = count.unwrap_or(1);
        if !(MIN_BATCH..=MAX_BATCH).contains(&count) {
            return Err(AppError::validation(format!(
                "count must be between {} and {}",
                MIN_BATCH, MAX_BATCH
            )));
        }
        let item = item.map(str::trim).filter(|s| !s.is_empty());
        let now = Utc::now();

        let _guard = self.lock();
        let mut doc = self.store.load()?;
        let added = self.build_batch(&mut doc, count as u64, item, now)?;
        if let Some(clash) = added
            .iter()
            .find(|new| doc.labels.iter().any(|l| l.code == new.code))
        {
            return Err(AppError::duplicate_code(&clash.code));
        }
        doc.labels.extend(added.iter().cloned());
        self.store.save(&doc)?;

        info!(
            count = added.len(),
            first = %added.first().map(|l| l.code.as_str()).unwrap_or_default(),
            last = %added.last().map(|l| l.code.as_str()).unwrap_or_default(),
            "Labels generated"
        );

        Ok(Generated {
            added,
            state: self.state_view(&doc),
        })
    }

    /// Build the batch and, in stored mode, advance the counter in `doc`.
    /// Fails when ids or code numbers for the whole batch do not fit in `u64`.
    fn build_batch(
        &self,
        doc: &mut Document,
        count: u64,
        item: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Label>> {
        let first_id = sequencer::next_id(&doc.labels)
            .filter(|&id| sequencer::range_fits(id, count))
            .ok_or_else(|| AppError::validation("label ids exhausted"))?;

        let (prefix, digits, first_number, name_seq) = match self.mode {
            SequenceMode::Derived => {
                let first = sequencer::derived_next(&doc.labels)
                    .filter(|&n| sequencer::range_fits(n, count))
                    .ok_or_else(exhausted)?;
                let name_seq = sequencer::derived_name_seq(&doc.labels);
                (self.scheme.prefix.clone(), self.scheme.digits, first, Some(name_seq))
            }
            SequenceMode::Stored => {
                let state: &mut CounterState = doc
                    .state
                    .get_or_insert_with(|| self.scheme.initial_state());
                let first = sequencer::reserve(state, count).ok_or_else(exhausted)?;
                (state.prefix.clone(), state.digits, first, None)
            }
        };

        let labels = (0..count)
            .map(|i| {
                let art = match (item, name_seq) {
                    (Some(name), _) => name.to_string(),
                    (None, Some(seq)) => sequencer::derived_default_art(seq + i),
                    (None, None) => sequencer::STORED_DEFAULT_ART.to_string(),
                };
                Label {
                    id: first_id + i,
                    code: sequencer::format_code(&prefix, first_number + i, digits),
                    art,
                    created_at: now,
                }
            })
            .collect();
        Ok(labels)
    }

    /// Edit a label's name and/or code
    pub fn update(&self, id: u64, patch: LabelPatch) -> AppResult<Label> {
        let new_code = match patch.code {
            Some(code) => {
                let code = code.trim().to_string();
                if code.is_empty() {
                    return Err(AppError::validation("code must not be empty"));
                }
                Some(code)
            }
            None => None,
        };

        let _guard = self.lock();
        let mut doc = self.store.load()?;
        let idx = doc
            .labels
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| AppError::label_not_found(id))?;

        if let Some(code) = &new_code {
            if doc.labels.iter().any(|l| l.id != id && &l.code == code) {
                return Err(AppError::duplicate_code(code));
            }
        }

        let label = &mut doc.labels[idx];
        if let Some(art) = patch.art {
            label.art = art.trim().to_string();
        }
        if let Some(code) = new_code {
            label.code = code;
        }
        let updated = label.clone();
        self.store.save(&doc)?;

        info!(id, code = %updated.code, art = %updated.art, "Label updated");
        Ok(updated)
    }

    /// Remove one label
    pub fn delete(&self, id: u64) -> AppResult<()> {
        let _guard = self.lock();
        let mut doc = self.store.load()?;
        let before = doc.labels.len();
        doc.labels.retain(|l| l.id != id);
        if doc.labels.len() == before {
            return Err(AppError::label_not_found(id));
        }
        self.store.save(&doc)?;

        info!(id, "Label deleted");
        Ok(())
    }

    /// Remove every label and reset the counter to 1 (stored mode only)
    pub fn delete_all(&self) -> AppResult<StateView> {
        if self.mode != SequenceMode::Stored {
            return Err(AppError::validation(
                "deleting all labels is only available in stored mode",
            ));
        }

        let _guard = self.lock();
        let mut doc = self.store.load()?;
        let removed = doc.labels.len();
        doc.labels.clear();
        doc.state
            .get_or_insert_with(|| self.scheme.initial_state())
            .next = 1;
        self.store.save(&doc)?;

        info!(removed, "All labels deleted, counter reset");
        Ok(self.state_view(&doc))
    }
}

fn exhausted() -> AppError {
    AppError::validation("code numbers exhausted: batch would pass the largest code number")
}

fn non_negative(field: &str, value: f64) -> AppResult<u64> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::validation(format!(
            "{} must be a non-negative number",
            field
        )));
    }
    Ok(value.trunc() as u64)
}
