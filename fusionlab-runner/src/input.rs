//! Replay inputs: the bar series and the three engine-state streams.

use serde::{Deserialize, Serialize};

use fusionlab_core::domain::{Bar, EnergyState, LiquidityState, SentimentState};

use crate::error::SimulationError;

/// One engine state per bar, index-aligned with the bar series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineStreams {
    pub energy: Vec<EnergyState>,
    pub liquidity: Vec<LiquidityState>,
    pub sentiment: Vec<SentimentState>,
}

impl EngineStreams {
    pub fn new(
        energy: Vec<EnergyState>,
        liquidity: Vec<LiquidityState>,
        sentiment: Vec<SentimentState>,
    ) -> Self {
        Self {
            energy,
            liquidity,
            sentiment,
        }
    }

    pub fn len(&self) -> usize {
        self.energy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energy.is_empty()
    }
}

/// Shape checks done before the replay starts: non-empty and aligned.
pub(crate) fn check_shape(bars: &[Bar], streams: &EngineStreams) -> Result<(), SimulationError> {
    if bars.is_empty() {
        return Err(SimulationError::EmptySeries);
    }
    let n = bars.len();
    if streams.energy.len() != n || streams.liquidity.len() != n || streams.sentiment.len() != n {
        return Err(SimulationError::StreamLengthMismatch {
            bars: n,
            energy: streams.energy.len(),
            liquidity: streams.liquidity.len(),
            sentiment: streams.sentiment.len(),
        });
    }
    Ok(())
}

/// OHLCV sanity and strictly increasing timestamps for one bar.
fn check_bar(bars: &[Bar], index: usize) -> Result<(), SimulationError> {
    let bar = &bars[index];
    bar.validate().map_err(|source| SimulationError::InvalidBar {
        index,
        timestamp: bar.timestamp,
        source,
    })?;
    if index > 0 {
        let previous = bars[index - 1].timestamp;
        if bar.timestamp <= previous {
            return Err(SimulationError::NonChronological {
                index,
                timestamp: bar.timestamp,
                previous,
            });
        }
    }
    Ok(())
}

/// Check every bar before any mode starts, so bar faults surface the same
/// way whichever mode replays the series.
pub(crate) fn check_all_bars(bars: &[Bar]) -> Result<(), SimulationError> {
    (0..bars.len()).try_for_each(|i| check_bar(bars, i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn bars(n: usize) -> Vec<Bar> {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 2, 21, 0, 0).unwrap();
        (0..n)
            .map(|i| Bar::new(t0 + Duration::days(i as i64), 100.0, 101.0, 99.0, 100.0, 1e6))
            .collect()
    }

    #[test]
    fn empty_series_is_rejected() {
        assert!(matches!(
            check_shape(&[], &EngineStreams::default()),
            Err(SimulationError::EmptySeries)
        ));
    }

    #[test]
    fn misaligned_streams_are_rejected() {
        let err = check_shape(&bars(3), &EngineStreams::default()).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::StreamLengthMismatch { bars: 3, energy: 0, .. }
        ));
    }

    #[test]
    fn duplicate_timestamp_reports_index() {
        let mut series = bars(4);
        series[2].timestamp = series[1].timestamp;
        let err = check_all_bars(&series).unwrap_err();
        assert_eq!(err.index(), Some(2));
        assert!(matches!(err, SimulationError::NonChronological { .. }));
    }

    #[test]
    fn corrupt_bar_reports_index() {
        let mut series = bars(5);
        series[3].close = f64::NAN;
        let err = check_all_bars(&series).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidBar { index: 3, .. }));
    }
}
