//! Post-replay analysis over the trade log and equity curve.

use serde::{Deserialize, Serialize};

use fusionlab_core::domain::Trade;

use crate::attribution::PnlAttribution;
use crate::context::EquityPoint;
use crate::metrics::PerformanceMetrics;
use crate::tail_metrics::TailMetrics;

/// Everything derived from one replay's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub metrics: PerformanceMetrics,
    pub tail: TailMetrics,
    pub attribution: PnlAttribution,
}

/// Pure post-processing: no state, same inputs give the same report.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerformanceAnalyzer;

impl PerformanceAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(
        &self,
        equity_curve: &[EquityPoint],
        trades: &[Trade],
        initial_capital: f64,
        bars_in_market: usize,
    ) -> PerformanceReport {
        let equity: Vec<f64> = equity_curve.iter().map(|p| p.equity).collect();
        PerformanceReport {
            metrics: PerformanceMetrics::compute(&equity, trades, initial_capital, bars_in_market),
            tail: TailMetrics::from_equity(&equity),
            attribution: PnlAttribution::from_trades(trades),
        }
    }
}
