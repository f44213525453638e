//! Performance metrics: pure functions that compute replay statistics.
//!
//! Every metric is a pure function: equity curve and/or trade list in, scalar out.
//! No dependencies on the simulator or the composer.

use serde::{Deserialize, Serialize};

use fusionlab_core::domain::{PositionSide, Trade};

const TRADING_DAYS: f64 = 252.0;

/// Profit factor reported when there are profits but no losses.
pub const PROFIT_FACTOR_CAP: f64 = 100.0;

/// Aggregate performance metrics for a single replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    // ── Returns ──
    /// Final minus initial equity, in currency.
    pub total_return: f64,
    /// Total return in percent.
    pub total_return_pct: f64,
    pub cagr: f64,
    pub annualized_volatility: f64,

    // ── Risk ratios ──
    pub sharpe: f64,
    pub sortino: f64,
    /// `|total_return_pct / max_drawdown_pct|`.
    pub calmar: f64,
    /// Largest peak-to-trough equity decline, in currency (>= 0).
    pub max_drawdown: f64,
    /// Largest peak-to-trough decline in percent of the peak (>= 0).
    pub max_drawdown_pct: f64,
    /// Longest stretch of bars spent below a prior equity peak.
    pub max_drawdown_duration: usize,
    /// Total return over max drawdown (currency).
    pub recovery_factor: f64,

    // ── Trades ──
    pub trade_count: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub avg_win: f64,
    /// Mean net P&L of non-winning trades (<= 0).
    pub avg_loss: f64,
    pub avg_trade: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub expectancy: f64,
    pub payoff_ratio: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    pub total_costs: f64,
    pub long_trades: usize,
    pub short_trades: usize,
    pub long_win_rate: f64,
    pub short_win_rate: f64,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
    pub avg_losing_streak: f64,
    pub avg_bars_held: f64,
    pub turnover: f64,
    /// Fraction of bars with an open position at the close.
    pub exposure: f64,
}

impl PerformanceMetrics {
    /// Compute all metrics from an equity curve and trade list.
    pub fn compute(
        equity_curve: &[f64],
        trades: &[Trade],
        initial_capital: f64,
        bars_in_market: usize,
    ) -> Self {
        let trading_days = equity_curve.len();
        let final_equity = equity_curve.last().copied().unwrap_or(initial_capital);
        let total_return = final_equity - initial_capital;
        let total_return_pct = if initial_capital > 0.0 {
            total_return / initial_capital * 100.0
        } else {
            0.0
        };
        let (max_dd, max_dd_pct) = max_drawdown(equity_curve);
        let win_rate = win_rate(trades);
        let avg_win = avg_win(trades);
        let avg_loss = avg_loss(trades);

        let long: Vec<&Trade> = trades.iter().filter(|t| t.side == PositionSide::Long).collect();
        let short: Vec<&Trade> = trades.iter().filter(|t| t.side == PositionSide::Short).collect();

        Self {
            total_return,
            total_return_pct,
            cagr: cagr(equity_curve, trading_days),
            annualized_volatility: annualized_volatility(equity_curve),
            sharpe: sharpe_ratio(equity_curve, 0.0),
            sortino: sortino_ratio(equity_curve, 0.0),
            calmar: calmar_ratio(total_return_pct, max_dd_pct),
            max_drawdown: max_dd,
            max_drawdown_pct: max_dd_pct,
            max_drawdown_duration: max_drawdown_duration(equity_curve),
            recovery_factor: if max_dd > 0.0 { total_return / max_dd } else { 0.0 },
            trade_count: trades.len(),
            win_rate,
            profit_factor: profit_factor(trades),
            avg_win,
            avg_loss,
            avg_trade: mean_f64(&trades.iter().map(|t| t.net_pnl).collect::<Vec<_>>()),
            largest_win: trades.iter().map(|t| t.net_pnl).fold(0.0, f64::max),
            largest_loss: trades.iter().map(|t| t.net_pnl).fold(0.0, f64::min),
            expectancy: win_rate * avg_win + (1.0 - win_rate) * avg_loss,
            payoff_ratio: if avg_loss < 0.0 { avg_win / avg_loss.abs() } else { 0.0 },
            gross_profit: gross_profit(trades),
            gross_loss: gross_loss(trades),
            total_costs: trades.iter().map(|t| t.costs.total()).sum(),
            long_trades: long.len(),
            short_trades: short.len(),
            long_win_rate: ratio(long.iter().filter(|t| t.is_winner).count(), long.len()),
            short_win_rate: ratio(short.iter().filter(|t| t.is_winner).count(), short.len()),
            max_consecutive_wins: max_consecutive_wins(trades),
            max_consecutive_losses: max_consecutive_losses(trades),
            avg_losing_streak: avg_losing_streak(trades),
            avg_bars_held: mean_f64(&trades.iter().map(|t| t.bars_held as f64).collect::<Vec<_>>()),
            turnover: turnover(trades, initial_capital, trading_days),
            exposure: ratio(bars_in_market, equity_curve.len()),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Compound Annual Growth Rate.
///
/// Assumes 252 trading days per year. Returns 0.0 for single-bar or constant equity.
pub fn cagr(equity_curve: &[f64], trading_days: usize) -> f64 {
    let (Some(&initial), Some(&final_eq)) = (equity_curve.first(), equity_curve.last()) else {
        return 0.0;
    };
    if equity_curve.len() < 2 || trading_days < 2 || initial <= 0.0 || final_eq <= 0.0 {
        return 0.0;
    }
    let years = trading_days as f64 / TRADING_DAYS;
    (final_eq / initial).powf(1.0 / years) - 1.0
}

/// Annualized standard deviation of daily returns.
pub fn annualized_volatility(equity_curve: &[f64]) -> f64 {
    std_dev(&daily_returns(equity_curve)) * TRADING_DAYS.sqrt()
}

/// Annualized Sharpe ratio from daily returns.
///
/// Sharpe = mean(daily returns - rf) / std(daily returns) * sqrt(252).
/// Returns 0.0 if variance is zero or fewer than 2 bars.
pub fn sharpe_ratio(equity_curve: &[f64], risk_free_rate: f64) -> f64 {
    let returns = daily_returns(equity_curve);
    if returns.len() < 2 {
        return 0.0;
    }
    let daily_rf = risk_free_rate / TRADING_DAYS;
    let excess: Vec<f64> = returns.iter().map(|r| r - daily_rf).collect();
    let mean = mean_f64(&excess);
    let std = std_dev(&excess);
    if std < 1e-15 {
        return 0.0;
    }
    (mean / std) * TRADING_DAYS.sqrt()
}

/// Annualized Sortino ratio (downside deviation only).
///
/// Sortino = mean(daily returns - rf) / downside_std * sqrt(252).
/// Returns 0.0 if no downside deviation or fewer than 2 bars.
pub fn sortino_ratio(equity_curve: &[f64], risk_free_rate: f64) -> f64 {
    let returns = daily_returns(equity_curve);
    if returns.len() < 2 {
        return 0.0;
    }
    let daily_rf = risk_free_rate / TRADING_DAYS;
    let excess: Vec<f64> = returns.iter().map(|r| r - daily_rf).collect();
    let mean = mean_f64(&excess);

    let downside_sq: f64 = excess.iter().filter(|&&r| r < 0.0).map(|r| r * r).sum();
    if downside_sq <= 0.0 {
        return 0.0;
    }
    // Full n in the denominator, not just the count of negative days.
    let downside_std = (downside_sq / returns.len() as f64).sqrt();
    if downside_std < 1e-15 {
        return 0.0;
    }
    (mean / downside_std) * TRADING_DAYS.sqrt()
}

/// Calmar ratio: `|total_return_pct / max_drawdown_pct|`.
///
/// Returns 0.0 without a drawdown.
pub fn calmar_ratio(total_return_pct: f64, max_drawdown_pct: f64) -> f64 {
    if max_drawdown_pct <= 0.0 {
        return 0.0;
    }
    (total_return_pct / max_drawdown_pct).abs()
}

/// Maximum drawdown as `(currency, percent of peak)`, both >= 0.
pub fn max_drawdown(equity_curve: &[f64]) -> (f64, f64) {
    let Some(&first) = equity_curve.first() else {
        return (0.0, 0.0);
    };
    let mut peak = first;
    let mut max_dd = 0.0_f64;
    let mut max_dd_pct = 0.0_f64;

    for &eq in equity_curve {
        if eq > peak {
            peak = eq;
        }
        let dd = peak - eq;
        if dd > max_dd {
            max_dd = dd;
        }
        if peak > 0.0 {
            max_dd_pct = max_dd_pct.max(dd / peak * 100.0);
        }
    }
    (max_dd, max_dd_pct)
}

/// Longest run of consecutive bars below the running peak.
pub fn max_drawdown_duration(equity_curve: &[f64]) -> usize {
    let mut peak = f64::NEG_INFINITY;
    let mut current = 0;
    let mut longest = 0;
    for &eq in equity_curve {
        if eq >= peak {
            peak = eq;
            current = 0;
        } else {
            current += 1;
            longest = longest.max(current);
        }
    }
    longest
}

/// Win rate: fraction of trades that were winners.
pub fn win_rate(trades: &[Trade]) -> f64 {
    ratio(trades.iter().filter(|t| t.is_winner).count(), trades.len())
}

pub fn gross_profit(trades: &[Trade]) -> f64 {
    trades.iter().filter(|t| t.net_pnl > 0.0).map(|t| t.net_pnl).sum()
}

/// Sum of losing net P&L magnitudes (>= 0).
pub fn gross_loss(trades: &[Trade]) -> f64 {
    trades.iter().filter(|t| t.net_pnl < 0.0).map(|t| t.net_pnl.abs()).sum()
}

/// Profit factor: gross profits / gross losses.
///
/// Capped at 100.0 for edge cases (all winners, zero losses).
pub fn profit_factor(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let profit = gross_profit(trades);
    let loss = gross_loss(trades);
    if loss < 1e-10 {
        return if profit > 0.0 { PROFIT_FACTOR_CAP } else { 0.0 };
    }
    (profit / loss).min(PROFIT_FACTOR_CAP)
}

pub fn avg_win(trades: &[Trade]) -> f64 {
    let wins: Vec<f64> = trades.iter().filter(|t| t.is_winner).map(|t| t.net_pnl).collect();
    mean_f64(&wins)
}

pub fn avg_loss(trades: &[Trade]) -> f64 {
    let losses: Vec<f64> = trades.iter().filter(|t| !t.is_winner).map(|t| t.net_pnl).collect();
    mean_f64(&losses)
}

/// Annual turnover: total traded notional / initial capital / years.
pub fn turnover(trades: &[Trade], initial_capital: f64, trading_days: usize) -> f64 {
    if trades.is_empty() || initial_capital <= 0.0 || trading_days < 2 {
        return 0.0;
    }
    let total_notional: f64 = trades
        .iter()
        .map(|t| (t.actual_entry_price + t.actual_exit_price) * t.quantity)
        .sum();
    let years = trading_days as f64 / TRADING_DAYS;
    total_notional / initial_capital / years
}

/// Maximum consecutive winning trades.
pub fn max_consecutive_wins(trades: &[Trade]) -> usize {
    max_consecutive(trades, true)
}

/// Maximum consecutive losing trades.
pub fn max_consecutive_losses(trades: &[Trade]) -> usize {
    max_consecutive(trades, false)
}

/// Average length of losing streaks.
pub fn avg_losing_streak(trades: &[Trade]) -> f64 {
    let mut streaks: Vec<usize> = Vec::new();
    let mut current = 0;

    for trade in trades {
        if !trade.is_winner {
            current += 1;
        } else {
            if current > 0 {
                streaks.push(current);
            }
            current = 0;
        }
    }
    if current > 0 {
        streaks.push(current);
    }

    if streaks.is_empty() {
        return 0.0;
    }
    streaks.iter().sum::<usize>() as f64 / streaks.len() as f64
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Compute daily returns from an equity curve.
pub fn daily_returns(equity_curve: &[f64]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .map(|w| if w[0] > 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect()
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn max_consecutive(trades: &[Trade], winners: bool) -> usize {
    let mut max_streak = 0;
    let mut current = 0;

    for trade in trades {
        if trade.is_winner == winners {
            current += 1;
            max_streak = max_streak.max(current);
        } else {
            current = 0;
        }
    }
    max_streak
}
