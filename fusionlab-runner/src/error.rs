//! Replay errors.
//!
//! Anything discovered while walking the series carries the bar index and
//! timestamp so callers can report or resume precisely.

use chrono::{DateTime, Utc};
use thiserror::Error;

use fusionlab_core::config::ConfigError;
use fusionlab_core::domain::BarError;
use fusionlab_core::CoreError;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build policy composer: {0}")]
    Setup(#[source] CoreError),

    #[error("empty bar series")]
    EmptySeries,

    #[error(
        "stream lengths differ: {bars} bars, {energy} energy, {liquidity} liquidity, {sentiment} sentiment states"
    )]
    StreamLengthMismatch {
        bars: usize,
        energy: usize,
        liquidity: usize,
        sentiment: usize,
    },

    #[error("invalid bar at index {index} ({timestamp}): {source}")]
    InvalidBar {
        index: usize,
        timestamp: DateTime<Utc>,
        #[source]
        source: BarError,
    },

    #[error("bar at index {index} ({timestamp}) is not after previous bar ({previous})")]
    NonChronological {
        index: usize,
        timestamp: DateTime<Utc>,
        previous: DateTime<Utc>,
    },

    #[error("decision failed at index {index} ({timestamp}): {source}")]
    Decision {
        index: usize,
        timestamp: DateTime<Utc>,
        #[source]
        source: CoreError,
    },
}

impl SimulationError {
    /// Bar index the error refers to, if it is tied to one.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::InvalidBar { index, .. }
            | Self::NonChronological { index, .. }
            | Self::Decision { index, .. } => Some(*index),
            _ => None,
        }
    }
}
