//! Explicit per-symbol simulation state.
//!
//! Running capital, the open position, the trade log and the equity curve
//! live here and are passed by reference through the replay. Nothing is
//! shared between symbols, so parallel replays never interfere.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use fusionlab_core::domain::{Bar, ExitReason, PositionSide, Trade, TradeIdea};

use crate::fills::{EntryFill, ExitFill, OpenPosition};

/// Equity at the close of one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: f64,
}

#[derive(Debug, Clone)]
pub struct SimulationContext {
    pub symbol: String,
    pub initial_capital: f64,
    /// Cash not committed to the open position.
    pub current_capital: f64,
    pub open_position: Option<OpenPosition>,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    /// Net return fraction of each closed trade, oldest first.
    pub closed_returns: Vec<f64>,
    pub bars_in_market: usize,
    pub ideas_composed: usize,
    pub ideas_rejected: usize,
}

impl SimulationContext {
    pub fn new(symbol: &str, initial_capital: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            initial_capital,
            current_capital: initial_capital,
            open_position: None,
            trades: Vec::new(),
            equity_curve: Vec::new(),
            closed_returns: Vec::new(),
            bars_in_market: 0,
            ideas_composed: 0,
            ideas_rejected: 0,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.open_position.is_none()
    }

    /// Capital plus the open position marked at `price`.
    pub fn equity(&self, price: f64) -> f64 {
        match &self.open_position {
            Some(pos) => self.current_capital + pos.notional() + pos.unrealized(price),
            None => self.current_capital,
        }
    }

    /// Count a composed idea and whether validation rejected it.
    pub fn record_idea(&mut self, idea: &TradeIdea) {
        self.ideas_composed += 1;
        if !idea.is_valid {
            self.ideas_rejected += 1;
        }
    }

    /// Open from an actionable idea at the bar's close. Returns false (and
    /// stays flat) when already in a position or the idea is not actionable.
    pub fn open_from_idea(&mut self, idea: &TradeIdea, bar: &Bar, index: usize, commission_bps: f64) -> bool {
        if !self.is_flat() || !idea.is_actionable() {
            return false;
        }
        let Some(side) = PositionSide::from_direction(idea.direction) else {
            return false;
        };
        let entry = EntryFill::new(side, bar.close, idea.position_size, &idea.execution_cost, commission_bps);
        let position = OpenPosition::new(
            side,
            index,
            bar.timestamp,
            entry,
            idea.stop_loss,
            idea.take_profit,
            idea.position_size,
            idea.signals,
        );
        self.open(position);
        true
    }

    /// Debit committed notional and entry commission, then hold the position.
    pub fn open(&mut self, position: OpenPosition) {
        self.current_capital -= position.notional() + position.entry.commission;
        debug!(
            symbol = %self.symbol,
            side = ?position.side,
            index = position.entry_index,
            qty = position.quantity,
            price = position.entry.actual_price,
            "opened position"
        );
        self.open_position = Some(position);
    }

    /// Close the open position, credit capital and append the trade.
    pub fn close(
        &mut self,
        index: usize,
        timestamp: DateTime<Utc>,
        exit: ExitFill,
        reason: ExitReason,
    ) -> Option<&Trade> {
        let position = self.open_position.take()?;
        self.current_capital += position.settlement(&exit);
        let trade = position.close(&self.symbol, index, timestamp, exit, reason);
        debug!(
            symbol = %self.symbol,
            index,
            %reason,
            net_pnl = trade.net_pnl,
            "closed position"
        );
        self.closed_returns.push(trade.return_pct());
        self.trades.push(trade);
        self.trades.last()
    }

    /// Record equity at the bar's close.
    pub fn mark(&mut self, bar: &Bar) {
        if !self.is_flat() {
            self.bars_in_market += 1;
        }
        let equity = self.equity(bar.close);
        self.equity_curve.push(EquityPoint {
            timestamp: bar.timestamp,
            equity,
        });
    }

    /// Realized P&L so far.
    pub fn realized_pnl(&self) -> f64 {
        self.trades.iter().map(|t| t.net_pnl).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fusionlab_core::domain::SignalSet;
    use fusionlab_core::ExecutionCost;

    fn bar(day: u32, close: f64) -> Bar {
        Bar::new(
            Utc.with_ymd_and_hms(2024, 1, day, 21, 0, 0).unwrap(),
            close,
            close,
            close,
            close,
            1e6,
        )
    }

    fn position(entry_bar: &Bar) -> OpenPosition {
        let cost = ExecutionCost {
            adjusted_slippage_bps: 5.0,
            adjusted_impact_bps: 5.0,
            total_cost_bps: 10.0,
            ..ExecutionCost::default()
        };
        OpenPosition::new(
            PositionSide::Long,
            0,
            entry_bar.timestamp,
            EntryFill::new(PositionSide::Long, entry_bar.close, 100.0, &cost, 1.0),
            98.0,
            106.0,
            100.0,
            SignalSet {
                energy: 0.5,
                liquidity: 0.0,
                sentiment: 0.0,
                composite: 0.2,
            },
        )
    }

    #[test]
    fn capital_is_conserved_through_a_round_trip() {
        let mut ctx = SimulationContext::new("SPY", 100_000.0);
        let b0 = bar(2, 100.0);
        ctx.open(position(&b0));
        ctx.mark(&b0);
        assert!(!ctx.is_flat());

        let b1 = bar(3, 107.0);
        let exit = ExitFill::new(PositionSide::Long, b1.close, 100.0, 5.0, 1.0);
        ctx.close(1, b1.timestamp, exit, ExitReason::TakeProfit);
        ctx.mark(&b1);

        assert!(ctx.is_flat());
        assert_eq!(ctx.trades.len(), 1);
        let expected = ctx.initial_capital + ctx.realized_pnl();
        assert!((ctx.current_capital - expected).abs() < 1e-6);
        assert!((ctx.equity_curve[1].equity - expected).abs() < 1e-6);
        assert_eq!(ctx.closed_returns.len(), 1);
        assert_eq!(ctx.bars_in_market, 1);
    }

    #[test]
    fn equity_marks_open_position() {
        let mut ctx = SimulationContext::new("SPY", 100_000.0);
        let b0 = bar(2, 100.0);
        ctx.open(position(&b0));
        let at_entry = ctx.equity(100.0);
        let higher = ctx.equity(101.0);
        assert!((higher - at_entry - 100.0).abs() < 1e-9);
    }

    #[test]
    fn close_when_flat_is_a_noop() {
        let mut ctx = SimulationContext::new("SPY", 100_000.0);
        let b = bar(2, 100.0);
        let exit = ExitFill::new(PositionSide::Long, 100.0, 1.0, 0.0, 0.0);
        assert!(ctx.close(0, b.timestamp, exit, ExitReason::EndOfData).is_none());
        assert_eq!(ctx.current_capital, 100_000.0);
    }
}
