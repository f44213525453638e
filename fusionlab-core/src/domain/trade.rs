//! Trade: a realized round-trip position from the backtest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::engine_state::SignalSource;
use super::trade_idea::{Direction, SignalSet};

/// Side of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    pub fn sign(self) -> f64 {
        match self {
            Self::Long => 1.0,
            Self::Short => -1.0,
        }
    }

    /// Side for a tradeable direction, `None` for NEUTRAL/AVOID.
    pub fn from_direction(direction: Direction) -> Option<Self> {
        match direction {
            Direction::Long => Some(Self::Long),
            Direction::Short => Some(Self::Short),
            Direction::Neutral | Direction::Avoid => None,
        }
    }
}

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    MaxHolding,
    EndOfData,
    /// Vectorized mode only: the position array changed.
    SignalReversal,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::StopLoss => "stop_loss",
            Self::TakeProfit => "take_profit",
            Self::MaxHolding => "max_holding",
            Self::EndOfData => "end_of_data",
            Self::SignalReversal => "signal_reversal",
        })
    }
}

/// Execution costs actually paid on a trade, in currency units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeCosts {
    pub entry_slippage: f64,
    pub entry_impact: f64,
    pub exit_slippage: f64,
    pub commission: f64,
}

impl TradeCosts {
    pub fn total(&self) -> f64 {
        self.entry_slippage + self.entry_impact + self.exit_slippage + self.commission
    }
}

/// A closed round-trip trade.
///
/// `gross_pnl` is measured on reference closes; `net_pnl` is measured on
/// the prices actually paid, minus commission. `net_pnl == gross_pnl - costs.total()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    // ── Identification ──
    pub symbol: String,
    pub side: PositionSide,

    // ── Entry ──
    pub entry_index: usize,
    pub entry_time: DateTime<Utc>,
    /// Bar close at entry.
    pub entry_price: f64,
    /// Entry price after slippage and impact.
    pub actual_entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,

    // ── Exit ──
    pub exit_index: usize,
    pub exit_time: DateTime<Utc>,
    pub exit_price: f64,
    pub actual_exit_price: f64,
    pub exit_reason: ExitReason,

    // ── Size ──
    pub quantity: f64,

    // ── PnL ──
    pub costs: TradeCosts,
    pub gross_pnl: f64,
    pub net_pnl: f64,
    pub is_winner: bool,

    // ── Duration / excursion ──
    pub bars_held: usize,
    /// Maximum adverse excursion (worst unrealized P&L while open, <= 0).
    pub mae: f64,
    /// Maximum favourable excursion (best unrealized P&L while open, >= 0).
    pub mfe: f64,

    // ── Signal traceability ──
    pub entry_signals: SignalSet,
}

impl Trade {
    /// Net return as a fraction of the capital committed at entry.
    pub fn return_pct(&self) -> f64 {
        let committed = self.actual_entry_price * self.quantity;
        if committed <= 0.0 {
            return 0.0;
        }
        self.net_pnl / committed
    }

    pub fn entry_notional(&self) -> f64 {
        self.actual_entry_price * self.quantity
    }

    /// Signal source credited with this trade's P&L.
    pub fn attributed_source(&self) -> SignalSource {
        self.entry_signals.dominant_source()
    }
}
