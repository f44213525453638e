//! Bar: one step of the historical replay.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV bar. The replay assumes bars are time-ordered with no gaps or
/// duplicates; it checks ordering but never resamples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Reasons a bar is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarError {
    #[error("non-finite OHLCV field")]
    NonFinite,
    #[error("non-positive price")]
    NonPositivePrice,
    #[error("inconsistent range: high {high} low {low}")]
    InconsistentRange { high: f64, low: f64 },
    #[error("negative volume {0}")]
    NegativeVolume(f64),
}

impl Bar {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Returns true if any OHLCV field is NaN or infinite.
    pub fn is_void(&self) -> bool {
        ![self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite())
    }

    /// OHLCV sanity check: high >= low, high >= open/close, low <= open/close,
    /// strictly positive prices.
    pub fn validate(&self) -> Result<(), BarError> {
        if self.is_void() {
            return Err(BarError::NonFinite);
        }
        if self.open <= 0.0 || self.close <= 0.0 || self.low <= 0.0 {
            return Err(BarError::NonPositivePrice);
        }
        if self.high < self.low
            || self.high < self.open
            || self.high < self.close
            || self.low > self.open
            || self.low > self.close
        {
            return Err(BarError::InconsistentRange {
                high: self.high,
                low: self.low,
            });
        }
        if self.volume < 0.0 {
            return Err(BarError::NegativeVolume(self.volume));
        }
        Ok(())
    }

    pub fn is_sane(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}
