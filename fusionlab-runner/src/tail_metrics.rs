//! Tail statistics of per-bar equity returns.
//!
//! Reported next to [`PerformanceMetrics`](crate::metrics::PerformanceMetrics)
//! when the replay is long enough for the moments to mean anything.

use serde::{Deserialize, Serialize};

use fusionlab_core::monte_carlo::percentile_sorted;

use crate::metrics::{daily_returns, mean_f64, std_dev};

/// Fewer per-bar returns than this and every statistic is `None`.
pub const MIN_RETURN_OBSERVATIONS: usize = 30;

const TAIL_PERCENTILE: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TailMetrics {
    /// 5th percentile of per-bar returns (historical VaR, usually negative).
    pub var_95: Option<f64>,
    /// Mean of the returns at or below `var_95`.
    pub cvar_95: Option<f64>,
    pub skewness: Option<f64>,
    /// Excess kurtosis (0 for a normal distribution).
    pub kurtosis: Option<f64>,
    /// Downside deviation over total deviation.
    pub downside_deviation_ratio: Option<f64>,
    pub sample_size: usize,
}

impl TailMetrics {
    pub fn from_equity(equity_curve: &[f64]) -> Self {
        Self::from_returns(&daily_returns(equity_curve))
    }

    pub fn from_returns(returns: &[f64]) -> Self {
        let n = returns.len();
        if n < MIN_RETURN_OBSERVATIONS {
            return Self {
                var_95: None,
                cvar_95: None,
                skewness: None,
                kurtosis: None,
                downside_deviation_ratio: None,
                sample_size: n,
            };
        }

        let mut sorted = returns.to_vec();
        sorted.sort_by(f64::total_cmp);
        let var = percentile_sorted(&sorted, TAIL_PERCENTILE);
        let tail: Vec<f64> = sorted.iter().copied().take_while(|r| *r <= var).collect();

        Self {
            var_95: Some(var),
            cvar_95: Some(if tail.is_empty() { var } else { mean_f64(&tail) }),
            skewness: Some(standardized_moment(returns, 3)),
            kurtosis: Some(standardized_moment(returns, 4) - 3.0),
            downside_deviation_ratio: Some(downside_deviation_ratio(returns)),
            sample_size: n,
        }
    }
}

/// `(1/n) Σ ((x - mean) / std)^k`, 0 for a degenerate sample.
fn standardized_moment(returns: &[f64], k: i32) -> f64 {
    let mean = mean_f64(returns);
    let std = std_dev(returns);
    if std < 1e-15 {
        return if k == 4 { 3.0 } else { 0.0 };
    }
    returns.iter().map(|r| ((r - mean) / std).powi(k)).sum::<f64>() / returns.len() as f64
}

fn downside_deviation_ratio(returns: &[f64]) -> f64 {
    let total = std_dev(returns);
    if total < 1e-15 {
        return 0.0;
    }
    // full n, matching the Sortino convention
    let downside_sq: f64 = returns.iter().filter(|&&r| r < 0.0).map(|r| r * r).sum();
    (downside_sq / returns.len() as f64).sqrt() / total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alternating(n: usize, up: f64, down: f64) -> Vec<f64> {
        (0..n).map(|i| if i % 2 == 0 { up } else { down }).collect()
    }

    #[test]
    fn short_series_has_no_statistics() {
        let m = TailMetrics::from_returns(&[0.01; 10]);
        assert_eq!(m.sample_size, 10);
        assert!(m.var_95.is_none());
        assert!(m.cvar_95.is_none());
        assert!(m.kurtosis.is_none());
    }

    #[test]
    fn cvar_is_not_above_var() {
        let mut returns: Vec<f64> = (0..100).map(|i| (i as f64 - 50.0) / 1000.0).collect();
        returns.reverse();
        let m = TailMetrics::from_returns(&returns);
        let (var, cvar) = (m.var_95.unwrap(), m.cvar_95.unwrap());
        assert!(var < 0.0);
        assert!(cvar <= var + 1e-12);
    }

    #[test]
    fn symmetric_returns_have_no_skew() {
        let m = TailMetrics::from_returns(&alternating(100, 0.01, -0.01));
        assert!(m.skewness.unwrap().abs() < 1e-9);
    }

    #[test]
    fn one_large_loss_skews_left_and_fattens_tails() {
        let mut returns = vec![0.001; 99];
        returns.push(-0.2);
        let m = TailMetrics::from_returns(&returns);
        assert!(m.skewness.unwrap() < -1.0);
        assert!(m.kurtosis.unwrap() > 3.0);
        assert!(m.downside_deviation_ratio.unwrap() > 0.9);
    }

    #[test]
    fn constant_returns_are_degenerate() {
        let m = TailMetrics::from_returns(&[0.001; 40]);
        assert_eq!(m.skewness, Some(0.0));
        assert_eq!(m.kurtosis, Some(0.0));
        assert_eq!(m.downside_deviation_ratio, Some(0.0));
    }

    #[test]
    fn from_equity_uses_bar_returns() {
        let equity: Vec<f64> = (0..41).map(|i| 100.0 + i as f64).collect();
        assert_eq!(TailMetrics::from_equity(&equity).sample_size, 40);
    }
}
