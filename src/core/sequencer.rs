//! Correlative numbering for label codes and default names
//!
//! Derived mode recomputes everything from the current labels:
//! - next code number = max trailing number among codes + 1 (or 1)
//! - next name number = label count + 1
//!
//! Both scans are O(n) over the registry. Codes without a trailing run of
//! digits (or whose digits overflow `u64`) are skipped, not rejected.
//! A code already at `u64::MAX` exhausts the number space: there is no
//! next number and generation must fail rather than repeat it.
//!
//! Stored mode reads `next` from the persisted [`CounterState`] and advances
//! it by the batch size. It never looks at label codes, so deleting or
//! editing labels does not move the counter.

use crate::models::types::{CounterState, Label};

/// Name used for stored-mode labels generated without an item name
pub const STORED_DEFAULT_ART: &str = "Articulo";

/// Zero-pad `num` to `width`. Wider numbers are kept whole, never clipped.
pub fn pad(num: u64, width: u32) -> String {
    format!("{:0width$}", num, width = width as usize)
}

/// `prefix + pad(number, digits)`
pub fn format_code(prefix: &str, number: u64, digits: u32) -> String {
    format!("{}{}", prefix, pad(number, digits))
}

/// Trailing decimal number of a code, if any
pub fn trailing_number(code: &str) -> Option<u64> {
    let digits_start = code
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    code[digits_start..].parse().ok()
}

/// Next code number derived from existing labels, `None` once exhausted
pub fn derived_next(labels: &[Label]) -> Option<u64> {
    match labels
        .iter()
        .filter_map(|label| trailing_number(&label.code))
        .max()
    {
        Some(max) => max.checked_add(1),
        None => Some(1),
    }
}

/// Next default-name number derived from existing labels
pub fn derived_name_seq(labels: &[Label]) -> u64 {
    labels.len() as u64 + 1
}

/// Default derived-mode name, e.g. `Articulo 07`
pub fn derived_default_art(seq: u64) -> String {
    format!("Articulo {}", pad(seq, 2))
}

/// Next label id for a new batch, `None` once exhausted
pub fn next_id(labels: &[Label]) -> Option<u64> {
    labels.iter().map(|l| l.id).max().unwrap_or(0).checked_add(1)
}

/// Whether `count` values starting at `start` all fit in `u64`
pub fn range_fits(start: u64, count: u64) -> bool {
    count == 0 || start.checked_add(count - 1).is_some()
}

/// Reserve `count` numbers from a stored counter.
/// Returns the first reserved number and advances `state.next` past the
/// batch, or `None` (counter untouched) when the batch does not fit.
pub fn reserve(state: &mut CounterState, count: u64) -> Option<u64> {
    let start = state.next;
    let after = start.checked_add(count)?;
    state.next = after;
    Some(start)
}
