//! Typed faults raised by the fusion core.
//!
//! These are programmer/data errors: non-finite metrics, non-positive
//! volatility, bad prices. A trade idea that fails risk validation is NOT an
//! error; it is a `TradeIdea` with `is_valid == false`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The pipeline component that detected a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Component {
    SignalExtractor,
    SignalFuser,
    DirectionClassifier,
    PositionSizer,
    ExecutionCostEstimator,
    MonteCarloRiskSimulator,
    TradeIdeaValidator,
    PolicyComposer,
    BacktestSimulator,
    PerformanceAnalyzer,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SignalExtractor => "signal_extractor",
            Self::SignalFuser => "signal_fuser",
            Self::DirectionClassifier => "direction_classifier",
            Self::PositionSizer => "position_sizer",
            Self::ExecutionCostEstimator => "execution_cost_estimator",
            Self::MonteCarloRiskSimulator => "monte_carlo_risk_simulator",
            Self::TradeIdeaValidator => "trade_idea_validator",
            Self::PolicyComposer => "policy_composer",
            Self::BacktestSimulator => "backtest_simulator",
            Self::PerformanceAnalyzer => "performance_analyzer",
        };
        f.write_str(name)
    }
}

/// Faults from the fusion core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("{component}: non-finite value for '{field}': {value}")]
    NonFinite {
        component: Component,
        field: &'static str,
        value: f64,
    },
    #[error("{component}: volatility must be positive, got {value}")]
    InvalidVolatility { component: Component, value: f64 },
    #[error("{component}: '{field}' must be positive, got {value}")]
    NonPositive {
        component: Component,
        field: &'static str,
        value: f64,
    },
    #[error("{component}: invalid fusion weights: {reason}")]
    InvalidWeights { component: Component, reason: String },
    #[error("{component}: {reason}")]
    InvalidInput { component: Component, reason: String },
    #[error("{component}: invalid configuration: {reason}")]
    InvalidConfig { component: Component, reason: String },
}

impl CoreError {
    /// The component that raised this error.
    pub fn component(&self) -> Component {
        match self {
            Self::NonFinite { component, .. }
            | Self::InvalidVolatility { component, .. }
            | Self::NonPositive { component, .. }
            | Self::InvalidWeights { component, .. }
            | Self::InvalidInput { component, .. }
            | Self::InvalidConfig { component, .. } => *component,
        }
    }
}

/// Reject NaN/inf with a component-tagged error.
pub(crate) fn ensure_finite(
    component: Component,
    field: &'static str,
    value: f64,
) -> Result<f64, CoreError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CoreError::NonFinite {
            component,
            field,
            value,
        })
    }
}

/// Reject non-finite or `<= 0` values.
pub(crate) fn ensure_positive(
    component: Component,
    field: &'static str,
    value: f64,
) -> Result<f64, CoreError> {
    ensure_finite(component, field, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(CoreError::NonPositive {
            component,
            field,
            value,
        })
    }
}
