//! Execution cost estimation.
//!
//! The liquidity engine reports base slippage and impact in basis points for
//! a reference order. Larger orders walk further into the book, so both are
//! scaled linearly with notional:
//! ```text
//! scale = 1 + notional / 100_000
//! adjusted_slippage_bps = slippage_bps * scale
//! adjusted_impact_bps   = impact_cost  * scale
//! total_cost_bps        = adjusted_slippage_bps + adjusted_impact_bps
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::LiquidityState;
use crate::error::{ensure_finite, Component, CoreError};

/// Notional at which costs double relative to the base estimate.
pub const COST_SCALE_NOTIONAL: f64 = 100_000.0;

/// Estimated cost of executing one order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ExecutionCost {
    pub base_slippage_bps: f64,
    pub base_impact_bps: f64,
    pub adjusted_slippage_bps: f64,
    pub adjusted_impact_bps: f64,
    pub total_cost_bps: f64,
    /// Order notional the estimate was computed for.
    pub notional: f64,
}

impl ExecutionCost {
    /// Total cost as a fraction of price (bps / 10_000).
    pub fn total_fraction(&self) -> f64 {
        self.total_cost_bps / 10_000.0
    }

    pub fn slippage_fraction(&self) -> f64 {
        self.adjusted_slippage_bps / 10_000.0
    }

    pub fn impact_fraction(&self) -> f64 {
        self.adjusted_impact_bps / 10_000.0
    }
}

/// Scales the liquidity engine's base costs with order size.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionCostEstimator;

impl ExecutionCostEstimator {
    pub fn new() -> Self {
        Self
    }

    pub fn estimate(
        &self,
        liquidity: &LiquidityState,
        notional: f64,
    ) -> Result<ExecutionCost, CoreError> {
        let c = Component::ExecutionCostEstimator;
        let slippage = ensure_finite(c, "slippage_bps", liquidity.slippage_bps)?.max(0.0);
        let impact = ensure_finite(c, "impact_cost", liquidity.impact_cost)?.max(0.0);
        let notional = ensure_finite(c, "notional", notional)?.abs();

        let scale = 1.0 + notional / COST_SCALE_NOTIONAL;
        let adjusted_slippage_bps = slippage * scale;
        let adjusted_impact_bps = impact * scale;

        Ok(ExecutionCost {
            base_slippage_bps: slippage,
            base_impact_bps: impact,
            adjusted_slippage_bps,
            adjusted_impact_bps,
            total_cost_bps: adjusted_slippage_bps + adjusted_impact_bps,
            notional,
        })
    }
}
