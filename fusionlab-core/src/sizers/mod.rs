//! Position sizing: four independent methods and a conservative reducer.
//!
//! Each method is a pure function returning a share/contract quantity:
//! - Kelly (edge-based, falls back to vol targeting without enough history)
//! - Volatility targeting
//! - Energy-aware (damped by movement energy and elasticity)
//! - Fixed notional cap
//!
//! `combine_sizes` takes the minimum of the four, floored at zero.

pub mod energy;
pub mod fixed;
pub mod kelly;
pub mod volatility;

pub use energy::{elasticity_factor, energy_aware_size, energy_factor};
pub use fixed::fixed_cap_size;
pub use kelly::{estimate_kelly, kelly_size, KellyEstimate};
pub use volatility::volatility_target_size;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{RiskParameters, SizingConfig};
use crate::error::{ensure_finite, ensure_positive, Component, CoreError};

/// Which method produced the final (smallest) size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizingMethod {
    Kelly,
    VolatilityTarget,
    EnergyAware,
    FixedCap,
}

impl fmt::Display for SizingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Kelly => "kelly",
            Self::VolatilityTarget => "volatility_target",
            Self::EnergyAware => "energy_aware",
            Self::FixedCap => "fixed_cap",
        })
    }
}

/// Every method's output and the reduced result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizingBreakdown {
    pub kelly: f64,
    pub volatility_target: f64,
    pub energy_aware: f64,
    pub fixed_cap: f64,
    pub final_size: f64,
    pub method: SizingMethod,
    /// `None` when Kelly fell back to volatility targeting.
    pub kelly_estimate: Option<KellyEstimate>,
}

impl SizingBreakdown {
    pub fn kelly_fell_back(&self) -> bool {
        self.kelly_estimate.is_none()
    }

    /// All-zero breakdown, used when no size applies.
    pub fn zero() -> Self {
        Self {
            kelly: 0.0,
            volatility_target: 0.0,
            energy_aware: 0.0,
            fixed_cap: 0.0,
            final_size: 0.0,
            method: SizingMethod::FixedCap,
            kelly_estimate: None,
        }
    }
}

/// Minimum of the four sizes, floored at zero. Ties prefer the order
/// Kelly, VolatilityTarget, EnergyAware, FixedCap.
pub fn combine_sizes(
    kelly: f64,
    volatility_target: f64,
    energy_aware: f64,
    fixed_cap: f64,
) -> (f64, SizingMethod) {
    let mut best = (kelly, SizingMethod::Kelly);
    for candidate in [
        (volatility_target, SizingMethod::VolatilityTarget),
        (energy_aware, SizingMethod::EnergyAware),
        (fixed_cap, SizingMethod::FixedCap),
    ] {
        if candidate.0 < best.0 {
            best = candidate;
        }
    }
    (best.0.max(0.0), best.1)
}

/// Market inputs to sizing for one decision point.
#[derive(Debug, Clone, Copy)]
pub struct SizingInputs<'a> {
    pub account_value: f64,
    pub price: f64,
    /// Annualized asset volatility.
    pub volatility: f64,
    pub movement_energy: f64,
    pub elasticity: f64,
    pub historical_returns: Option<&'a [f64]>,
}

/// Runs the four methods against one set of risk parameters.
#[derive(Debug, Clone)]
pub struct PositionSizer {
    risk: RiskParameters,
    config: SizingConfig,
}

impl PositionSizer {
    pub fn new(risk: RiskParameters, config: SizingConfig) -> Self {
        Self { risk, config }
    }

    pub fn risk(&self) -> &RiskParameters {
        &self.risk
    }

    pub fn size(&self, inputs: &SizingInputs<'_>) -> Result<SizingBreakdown, CoreError> {
        let account = ensure_positive(Component::PositionSizer, "account_value", inputs.account_value)?;
        let price = ensure_positive(Component::PositionSizer, "price", inputs.price)?;
        let movement_energy =
            ensure_finite(Component::PositionSizer, "movement_energy", inputs.movement_energy)?;
        let elasticity = ensure_finite(Component::PositionSizer, "elasticity", inputs.elasticity)?;

        let volatility_target =
            volatility_target_size(account, price, self.risk.target_volatility, inputs.volatility)?;

        let window = inputs
            .historical_returns
            .map(|r| &r[r.len().saturating_sub(self.config.kelly_lookback)..])
            .unwrap_or(&[]);
        let kelly_estimate =
            estimate_kelly(window, self.risk.kelly_fraction, self.config.kelly_min_samples)?;
        let kelly = match &kelly_estimate {
            Some(est) => kelly_size(account, price, est),
            None => volatility_target,
        };

        let base = account * self.risk.max_position_pct / price;
        let energy_aware = energy_aware_size(
            base,
            self.risk.max_movement_energy,
            movement_energy,
            elasticity,
            self.config.min_elasticity,
        );

        let fixed_cap = fixed_cap_size(self.risk.max_position_size, price);

        let (final_size, method) = combine_sizes(kelly, volatility_target, energy_aware, fixed_cap);

        Ok(SizingBreakdown {
            kelly,
            volatility_target,
            energy_aware,
            fixed_cap,
            final_size,
            method,
            kelly_estimate,
        })
    }
}
