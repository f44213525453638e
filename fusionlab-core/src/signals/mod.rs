//! Signal pipeline: per-engine extraction, weighted fusion, direction rules.
//!
//! Everything here is a pure function of the current engine states. No
//! component remembers anything between calls.

pub mod classify;
pub mod extract;
pub mod fuse;

pub use classify::DirectionClassifier;
pub use extract::{
    energy_signal, extract_signal, liquidity_signal, sentiment_signal, ExtractedSignals,
};
pub use fuse::SignalFuser;
