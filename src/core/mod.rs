//! Core Module - Numbering, persistence and registry operations

pub mod registry;
pub mod sequencer;
pub mod store;

pub use registry::{Generated, LabelPatch, LabelRegistry, StatePatch};
pub use store::LabelStore;
