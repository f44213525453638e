//! FusionLab Core: signal fusion, sizing, risk simulation and trade ideas.
//!
//! This crate contains the decision half of the system:
//! - Domain types (bars, engine states, trade ideas, trades)
//! - Signal extraction, weighted fusion and the direction rule table
//! - Four position-sizing methods with a conservative min reducer
//! - Execution cost estimation and Monte Carlo trade simulation
//! - Trade idea validation and the policy composer that ties it together
//!
//! Everything here is a pure function of its inputs and an explicit seed.

pub mod composer;
pub mod config;
pub mod cost;
pub mod domain;
pub mod error;
pub mod monte_carlo;
pub mod rng;
pub mod signals;
pub mod sizers;
pub mod validation;

pub use composer::{DecisionInput, PolicyComposer};
pub use config::{
    ComposerConfig, ConfigError, DirectionConfig, FusionWeights, MonteCarloConfig,
    RiskParameters, SizingConfig,
};
pub use cost::{ExecutionCost, ExecutionCostEstimator};
pub use error::{Component, CoreError};
pub use monte_carlo::{MonteCarloSimulator, MonteCarloSummary, TradeSetup};
pub use signals::{DirectionClassifier, ExtractedSignals, SignalFuser};
pub use sizers::{PositionSizer, SizingBreakdown, SizingInputs, SizingMethod};
pub use validation::{TradeIdeaValidator, ValidationInput, ValidationReport};
