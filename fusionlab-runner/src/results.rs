//! The replay output artifact.

use serde::{Deserialize, Serialize};

use fusionlab_core::domain::Trade;

use crate::analyzer::PerformanceAnalyzer;
use crate::attribution::PnlAttribution;
use crate::context::{EquityPoint, SimulationContext};
use crate::metrics::PerformanceMetrics;
use crate::simulator::ExecutionMode;
use crate::tail_metrics::TailMetrics;

/// Bumped whenever the serialized layout changes.
pub const SCHEMA_VERSION: u32 = 1;

/// Aggregate of a full replay. Built once at the end and read-only afterwards.
///
/// `total_trades == winning_trades + losing_trades == trades.len()`, and with
/// every position closed `final_capital == initial_capital + Σ net_pnl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResults {
    pub schema_version: u32,
    pub symbol: String,
    pub mode: ExecutionMode,
    /// BLAKE3 fingerprint of the `BacktestConfig` used.
    pub config_fingerprint: String,
    pub initial_capital: f64,
    pub final_capital: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    /// Trades with net P&L <= 0.
    pub losing_trades: usize,
    pub metrics: PerformanceMetrics,
    pub tail: TailMetrics,
    pub attribution: PnlAttribution,
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<Trade>,
    pub bar_count: usize,
    pub ideas_composed: usize,
    pub ideas_rejected: usize,
}

impl BacktestResults {
    pub(crate) fn from_context(
        ctx: SimulationContext,
        mode: ExecutionMode,
        config_fingerprint: String,
        bar_count: usize,
    ) -> Self {
        let report = PerformanceAnalyzer::new().analyze(
            &ctx.equity_curve,
            &ctx.trades,
            ctx.initial_capital,
            ctx.bars_in_market,
        );
        let winning_trades = ctx.trades.iter().filter(|t| t.is_winner).count();
        Self {
            schema_version: SCHEMA_VERSION,
            symbol: ctx.symbol,
            mode,
            config_fingerprint,
            initial_capital: ctx.initial_capital,
            final_capital: ctx.current_capital,
            total_trades: ctx.trades.len(),
            winning_trades,
            losing_trades: ctx.trades.len() - winning_trades,
            metrics: report.metrics,
            tail: report.tail,
            attribution: report.attribution,
            equity_curve: ctx.equity_curve,
            trades: ctx.trades,
            bar_count,
            ideas_composed: ctx.ideas_composed,
            ideas_rejected: ctx.ideas_rejected,
        }
    }

    pub fn realized_pnl(&self) -> f64 {
        self.trades.iter().map(|t| t.net_pnl).sum()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
