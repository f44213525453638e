//! Fill pricing and open-position bookkeeping.
//!
//! Entry pays slippage and impact, exit pays slippage; both legs pay
//! commission. All costs are adverse to the position side:
//! ```text
//! actual_entry = close * (1 + sign * (slippage_bps + impact_bps) / 10_000)
//! actual_exit  = close * (1 - sign * slippage_bps / 10_000)
//! ```
//! Gross P&L is measured on reference (close) prices; net P&L subtracts the
//! costs, so `net == gross - costs.total()` by construction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fusionlab_core::domain::{
    Bar, ExitReason, LiquidityState, PositionSide, SignalSet, Trade, TradeCosts,
};
use fusionlab_core::{CoreError, ExecutionCost, ExecutionCostEstimator};

const BPS: f64 = 10_000.0;

/// Priced entry leg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntryFill {
    pub price: f64,
    pub actual_price: f64,
    pub slippage_cost: f64,
    pub impact_cost: f64,
    pub commission: f64,
}

impl EntryFill {
    pub fn new(side: PositionSide, price: f64, quantity: f64, cost: &ExecutionCost, commission_bps: f64) -> Self {
        let sign = side.sign();
        let slippage = cost.slippage_fraction();
        let impact = cost.impact_fraction();
        let actual_price = price * (1.0 + sign * (slippage + impact));
        Self {
            price,
            actual_price,
            slippage_cost: price * slippage * quantity,
            impact_cost: price * impact * quantity,
            commission: actual_price * quantity * commission_bps / BPS,
        }
    }

    /// Slippage, impact and commission, in currency.
    pub fn cost(&self) -> f64 {
        self.slippage_cost + self.impact_cost + self.commission
    }
}

/// Priced exit leg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExitFill {
    pub price: f64,
    pub actual_price: f64,
    pub slippage_cost: f64,
    pub commission: f64,
}

impl ExitFill {
    pub fn new(side: PositionSide, price: f64, quantity: f64, slippage_bps: f64, commission_bps: f64) -> Self {
        let slippage = slippage_bps.max(0.0) / BPS;
        let actual_price = price * (1.0 - side.sign() * slippage);
        Self {
            price,
            actual_price,
            slippage_cost: price * slippage * quantity,
            commission: actual_price * quantity * commission_bps / BPS,
        }
    }

    /// Exit paying the liquidity engine's slippage scaled to the exit notional.
    pub fn priced(
        estimator: &ExecutionCostEstimator,
        liquidity: &LiquidityState,
        side: PositionSide,
        price: f64,
        quantity: f64,
        commission_bps: f64,
    ) -> Result<Self, CoreError> {
        let cost = estimator.estimate(liquidity, price * quantity)?;
        Ok(Self::new(side, price, quantity, cost.adjusted_slippage_bps, commission_bps))
    }

    /// Slippage plus commission, in currency.
    pub fn cost(&self) -> f64 {
        self.slippage_cost + self.commission
    }
}

/// A position between entry and exit. At most one per symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub side: PositionSide,
    pub entry_index: usize,
    pub entry_time: DateTime<Utc>,
    pub entry: EntryFill,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub quantity: f64,
    pub entry_signals: SignalSet,
    /// Worst unrealized P&L seen so far (<= 0).
    pub mae: f64,
    /// Best unrealized P&L seen so far (>= 0).
    pub mfe: f64,
}

impl OpenPosition {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        side: PositionSide,
        entry_index: usize,
        entry_time: DateTime<Utc>,
        entry: EntryFill,
        stop_loss: f64,
        take_profit: f64,
        quantity: f64,
        entry_signals: SignalSet,
    ) -> Self {
        Self {
            side,
            entry_index,
            entry_time,
            entry,
            stop_loss,
            take_profit,
            quantity,
            entry_signals,
            mae: 0.0,
            mfe: 0.0,
        }
    }

    /// Capital committed at entry.
    pub fn notional(&self) -> f64 {
        self.entry.actual_price * self.quantity
    }

    /// Mark-to-market P&L against the actual entry price.
    pub fn unrealized(&self, price: f64) -> f64 {
        (price - self.entry.actual_price) * self.side.sign() * self.quantity
    }

    /// Fold one bar's range into the excursion extremes.
    pub fn track_excursion(&mut self, bar: &Bar) {
        let (adverse, favorable) = match self.side {
            PositionSide::Long => (bar.low, bar.high),
            PositionSide::Short => (bar.high, bar.low),
        };
        let sign = self.side.sign();
        let worst = (adverse - self.entry.price) * sign * self.quantity;
        let best = (favorable - self.entry.price) * sign * self.quantity;
        self.mae = self.mae.min(worst);
        self.mfe = self.mfe.max(best);
    }

    /// Stop/target check on the bar's close.
    pub fn barrier_hit(&self, close: f64) -> Option<ExitReason> {
        match self.side {
            PositionSide::Long if close <= self.stop_loss => Some(ExitReason::StopLoss),
            PositionSide::Long if close >= self.take_profit => Some(ExitReason::TakeProfit),
            PositionSide::Short if close >= self.stop_loss => Some(ExitReason::StopLoss),
            PositionSide::Short if close <= self.take_profit => Some(ExitReason::TakeProfit),
            _ => None,
        }
    }

    /// Cash credited on exit: committed notional plus P&L at actual prices,
    /// less the exit commission.
    pub fn settlement(&self, exit: &ExitFill) -> f64 {
        self.notional() + self.unrealized(exit.actual_price) - exit.commission
    }

    /// Close into an immutable trade record.
    pub fn close(
        self,
        symbol: &str,
        exit_index: usize,
        exit_time: DateTime<Utc>,
        exit: ExitFill,
        reason: ExitReason,
    ) -> Trade {
        let costs = TradeCosts {
            entry_slippage: self.entry.slippage_cost,
            entry_impact: self.entry.impact_cost,
            exit_slippage: exit.slippage_cost,
            commission: self.entry.commission + exit.commission,
        };
        let gross_pnl = (exit.price - self.entry.price) * self.side.sign() * self.quantity;
        let net_pnl = gross_pnl - costs.total();
        Trade {
            symbol: symbol.to_string(),
            side: self.side,
            entry_index: self.entry_index,
            entry_time: self.entry_time,
            entry_price: self.entry.price,
            actual_entry_price: self.entry.actual_price,
            stop_loss: self.stop_loss,
            take_profit: self.take_profit,
            exit_index,
            exit_time,
            exit_price: exit.price,
            actual_exit_price: exit.actual_price,
            exit_reason: reason,
            quantity: self.quantity,
            costs,
            gross_pnl,
            net_pnl,
            is_winner: net_pnl > 0.0,
            bars_held: exit_index.saturating_sub(self.entry_index),
            mae: self.mae,
            mfe: self.mfe,
            entry_signals: self.entry_signals,
        }
    }
}
