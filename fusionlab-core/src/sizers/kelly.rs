//! Fractional Kelly sizing from a window of per-trade returns.
//!
//! # Formula
//! ```text
//! p = wins / n,  W = mean(winning returns),  L = mean(|losing returns|)
//! edge = p * W - (1 - p) * L
//! kelly_pct = clamp(edge / W, 0, 1) * kelly_fraction
//! quantity = account_value * kelly_pct / price
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, Component, CoreError};

/// Edge statistics estimated from historical returns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KellyEstimate {
    pub samples: usize,
    pub win_probability: f64,
    pub avg_win: f64,
    /// Average loss magnitude (positive).
    pub avg_loss: f64,
    /// Expected return per trade, `p * W - (1 - p) * L`.
    pub edge: f64,
    /// Fraction of account to commit, after `kelly_fraction`.
    pub kelly_pct: f64,
}

/// Estimate Kelly statistics. Returns `Ok(None)` when fewer than
/// `min_samples` returns are available.
pub fn estimate_kelly(
    returns: &[f64],
    kelly_fraction: f64,
    min_samples: usize,
) -> Result<Option<KellyEstimate>, CoreError> {
    if returns.len() < min_samples || returns.is_empty() {
        return Ok(None);
    }

    let mut win_sum = 0.0;
    let mut wins = 0usize;
    let mut loss_sum = 0.0;
    let mut losses = 0usize;
    for &r in returns {
        ensure_finite(Component::PositionSizer, "historical_return", r)?;
        if r > 0.0 {
            win_sum += r;
            wins += 1;
        } else if r < 0.0 {
            loss_sum += r.abs();
            losses += 1;
        }
    }

    let n = returns.len() as f64;
    let p = wins as f64 / n;
    let avg_win = if wins > 0 { win_sum / wins as f64 } else { 0.0 };
    let avg_loss = if losses > 0 { loss_sum / losses as f64 } else { 0.0 };
    let edge = p * avg_win - (1.0 - p) * avg_loss;

    let full_kelly = if avg_win > 0.0 {
        (edge / avg_win).clamp(0.0, 1.0)
    } else {
        0.0
    };

    Ok(Some(KellyEstimate {
        samples: returns.len(),
        win_probability: p,
        avg_win,
        avg_loss,
        edge,
        kelly_pct: full_kelly * kelly_fraction.max(0.0),
    }))
}

/// Quantity implied by a Kelly estimate.
pub fn kelly_size(account_value: f64, price: f64, estimate: &KellyEstimate) -> f64 {
    if price <= 0.0 || account_value <= 0.0 {
        return 0.0;
    }
    (account_value * estimate.kelly_pct / price).max(0.0)
}
