//! Trade idea validation: hard limits become errors, soft limits warnings.
//!
//! Every check runs; nothing short-circuits. An idea with any error has
//! `is_valid == false`, which is an ordinary outcome and not a fault.

use serde::{Deserialize, Serialize};

use crate::config::RiskParameters;
use crate::domain::{Direction, EnergyRegime, LiquidityRegime, RegimeSnapshot};
use crate::sizers::KellyEstimate;

/// Relative slack on the notional caps so a size computed to sit exactly
/// on a cap is not rejected by float rounding.
const CAP_TOLERANCE: f64 = 1e-9;

fn exceeds(value: f64, cap: f64) -> bool {
    value > cap + cap.abs() * CAP_TOLERANCE
}

/// Accumulated errors and warnings for one idea.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub is_valid: bool,
}

impl ValidationReport {
    fn finish(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// The parts of a proposed idea the validator inspects.
#[derive(Debug, Clone, Copy)]
pub struct ValidationInput<'a> {
    pub direction: Direction,
    pub position_size: f64,
    pub position_value: f64,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub account_value: f64,
    /// Notional already committed elsewhere in the portfolio.
    pub open_exposure: f64,
    pub regimes: RegimeSnapshot,
    pub movement_energy: f64,
    pub total_cost_bps: f64,
    pub kelly: Option<&'a KellyEstimate>,
}

#[derive(Debug, Clone)]
pub struct TradeIdeaValidator {
    risk: RiskParameters,
}

impl TradeIdeaValidator {
    pub fn new(risk: RiskParameters) -> Self {
        Self { risk }
    }

    pub fn validate(&self, input: &ValidationInput<'_>) -> ValidationReport {
        let risk = &self.risk;
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        // ── Hard limits ──
        if exceeds(input.position_value, risk.max_position_size) {
            errors.push(format!(
                "position value {:.2} exceeds max_position_size {:.2}",
                input.position_value, risk.max_position_size
            ));
        }
        let pct_cap = risk.max_position_pct * input.account_value;
        if exceeds(input.position_value, pct_cap) {
            errors.push(format!(
                "position value {:.2} exceeds {:.1}% of account ({:.2})",
                input.position_value,
                risk.max_position_pct * 100.0,
                pct_cap
            ));
        }
        let exposure_cap = risk.max_portfolio_exposure_pct * input.account_value;
        let exposure = input.open_exposure + input.position_value;
        if exceeds(exposure, exposure_cap) {
            errors.push(format!(
                "portfolio exposure {exposure:.2} exceeds cap {exposure_cap:.2}"
            ));
        }
        if input.regimes.energy == EnergyRegime::Plastic {
            errors.push("energy regime is plastic".to_string());
        }
        if input.regimes.liquidity == LiquidityRegime::Frozen {
            errors.push("liquidity regime is frozen".to_string());
        }
        if input.direction.is_tradeable() {
            if !levels_ordered(input.direction, input.entry_price, input.stop_loss, input.take_profit) {
                errors.push(format!(
                    "{} levels out of order: stop {:.4}, entry {:.4}, target {:.4}",
                    input.direction, input.stop_loss, input.entry_price, input.take_profit
                ));
            }
            if input.position_size <= 0.0 {
                errors.push(format!("{} idea has zero position size", input.direction));
            }
        }

        // ── Soft limits ──
        if input.total_cost_bps > risk.max_cost_bps {
            warnings.push(format!(
                "expected cost {:.2} bps exceeds max_cost_bps {:.2}",
                input.total_cost_bps, risk.max_cost_bps
            ));
        }
        match input.kelly {
            Some(est) if est.edge < risk.min_edge => warnings.push(format!(
                "kelly edge {:.5} below min_edge {:.5}",
                est.edge, risk.min_edge
            )),
            Some(_) => {}
            None if input.direction.is_tradeable() => warnings.push(
                "insufficient return history for kelly; sized by volatility target".to_string(),
            ),
            None => {}
        }
        if input.movement_energy > risk.max_movement_energy {
            warnings.push(format!(
                "movement energy {:.2} exceeds max_movement_energy {:.2}",
                input.movement_energy, risk.max_movement_energy
            ));
        }

        ValidationReport::finish(errors, warnings)
    }
}

/// LONG: stop < entry < target. SHORT: target < entry < stop.
pub fn levels_ordered(direction: Direction, entry: f64, stop: f64, target: f64) -> bool {
    match direction {
        Direction::Long => stop < entry && entry < target,
        Direction::Short => target < entry && entry < stop,
        Direction::Neutral | Direction::Avoid => true,
    }
}
