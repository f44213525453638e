//! Realized volatility fed to the composer during a replay.
//!
//! Annualized standard deviation of log close-to-close returns over a
//! trailing window, floored so the sizer never sees a zero.

use fusionlab_core::domain::Bar;

const TRADING_DAYS: f64 = 252.0;

/// Volatility known at the close of each bar (no look-ahead).
///
/// Bars with fewer than `lookback` trailing returns get `default_vol`.
pub fn realized_volatility(bars: &[Bar], lookback: usize, floor: f64, default_vol: f64) -> Vec<f64> {
    let log_returns: Vec<f64> = bars
        .windows(2)
        .map(|w| (w[1].close / w[0].close).ln())
        .collect();

    (0..bars.len())
        .map(|i| {
            // returns available at bar i: log_returns[..i]
            if lookback < 2 || i < lookback {
                return default_vol.max(floor);
            }
            let window = &log_returns[i - lookback..i];
            let n = window.len() as f64;
            let mean = window.iter().sum::<f64>() / n;
            let var = window.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
            let vol = var.sqrt() * TRADING_DAYS.sqrt();
            if vol.is_finite() {
                vol.max(floor)
            } else {
                default_vol.max(floor)
            }
        })
        .collect()
}
