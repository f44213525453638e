//! Policy composer: assembles one trade idea per decision point.
//!
//! The composer binds together, in order:
//! - SignalExtractor + SignalFuser (what the engines are saying)
//! - DirectionClassifier (whether and which way to trade)
//! - PositionSizer (how much)
//! - ExecutionCostEstimator (what it will cost)
//! - MonteCarloRiskSimulator (how the trade might play out)
//! - TradeIdeaValidator (whether the idea is allowed)
//!
//! The composer is immutable after construction. Given the same inputs and
//! seed it returns the same idea.

pub mod levels;

pub use levels::trade_levels;

use tracing::debug;

use crate::config::{ComposerConfig, ConfigError, RiskParameters};
use crate::cost::ExecutionCostEstimator;
use crate::domain::{
    EnergyState, LiquidityState, RegimeSnapshot, SentimentState, TradeIdea,
};
use crate::error::{ensure_finite, ensure_positive, Component, CoreError};
use crate::monte_carlo::{MonteCarloSimulator, TradeSetup};
use crate::signals::{DirectionClassifier, ExtractedSignals, SignalFuser};
use crate::sizers::{PositionSizer, SizingInputs};
use crate::validation::{TradeIdeaValidator, ValidationInput};

/// Everything known at one decision point.
#[derive(Debug, Clone, Copy)]
pub struct DecisionInput<'a> {
    pub symbol: &'a str,
    pub price: f64,
    pub energy: &'a EnergyState,
    pub liquidity: &'a LiquidityState,
    pub sentiment: &'a SentimentState,
    pub account_value: f64,
    /// Annualized asset volatility.
    pub volatility: f64,
    /// Per-trade return fractions, oldest first.
    pub historical_returns: Option<&'a [f64]>,
    /// Notional already committed elsewhere in the portfolio.
    pub open_exposure: f64,
    /// Monte Carlo seed; the configured seed when `None`.
    pub seed: Option<u64>,
}

impl<'a> DecisionInput<'a> {
    /// A decision with no history, no other exposure and the default seed.
    pub fn new(
        symbol: &'a str,
        price: f64,
        energy: &'a EnergyState,
        liquidity: &'a LiquidityState,
        sentiment: &'a SentimentState,
        account_value: f64,
        volatility: f64,
    ) -> Self {
        Self {
            symbol,
            price,
            energy,
            liquidity,
            sentiment,
            account_value,
            volatility,
            historical_returns: None,
            open_exposure: 0.0,
            seed: None,
        }
    }

    pub fn with_history(mut self, returns: &'a [f64]) -> Self {
        self.historical_returns = Some(returns);
        self
    }

    pub fn with_exposure(mut self, open_exposure: f64) -> Self {
        self.open_exposure = open_exposure;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[derive(Debug, Clone)]
pub struct PolicyComposer {
    risk: RiskParameters,
    config: ComposerConfig,
    fuser: SignalFuser,
    classifier: DirectionClassifier,
    sizer: PositionSizer,
    cost: ExecutionCostEstimator,
    monte_carlo: MonteCarloSimulator,
    validator: TradeIdeaValidator,
}

impl PolicyComposer {
    /// Validates both configs before building the pipeline.
    pub fn new(risk: RiskParameters, config: ComposerConfig) -> Result<Self, CoreError> {
        let invalid = |e: ConfigError| CoreError::InvalidConfig {
            component: Component::PolicyComposer,
            reason: e.to_string(),
        };
        risk.validate().map_err(invalid)?;
        config.validate().map_err(invalid)?;
        Ok(Self {
            fuser: SignalFuser::new(config.weights)?,
            classifier: DirectionClassifier::new(config.direction),
            sizer: PositionSizer::new(risk.clone(), config.sizing),
            cost: ExecutionCostEstimator::new(),
            monte_carlo: MonteCarloSimulator::new(config.monte_carlo),
            validator: TradeIdeaValidator::new(risk.clone()),
            risk,
            config,
        })
    }

    pub fn risk(&self) -> &RiskParameters {
        &self.risk
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    pub fn fuser(&self) -> &SignalFuser {
        &self.fuser
    }

    pub fn classifier(&self) -> &DirectionClassifier {
        &self.classifier
    }

    /// Full pipeline: extract, fuse, classify, size, cost, simulate, validate.
    pub fn compose(&self, input: &DecisionInput<'_>) -> Result<TradeIdea, CoreError> {
        let signals = ExtractedSignals::extract(input.energy, input.liquidity, input.sentiment)?;
        self.compose_with_signals(input, signals)
    }

    /// Same as [`compose`](Self::compose) with signals extracted ahead of time
    /// (the hybrid replay precomputes them for the whole series).
    pub fn compose_with_signals(
        &self,
        input: &DecisionInput<'_>,
        signals: ExtractedSignals,
    ) -> Result<TradeIdea, CoreError> {
        let c = Component::PolicyComposer;
        let price = ensure_positive(c, "price", input.price)?;
        let account_value = ensure_positive(c, "account_value", input.account_value)?;
        let open_exposure = ensure_finite(c, "open_exposure", input.open_exposure)?;

        let signal_set = self.fuser.fuse(&signals);
        let regimes = RegimeSnapshot {
            energy: input.energy.regime,
            liquidity: input.liquidity.regime,
            sentiment: input.sentiment.regime,
        };
        let direction = self
            .classifier
            .classify(signal_set.composite, regimes.energy, regimes.liquidity);

        let sizing = self.sizer.size(&SizingInputs {
            account_value,
            price,
            volatility: input.volatility,
            movement_energy: input.energy.movement_energy,
            elasticity: input.energy.elasticity,
            historical_returns: input.historical_returns,
        })?;
        let position_size = if direction.is_tradeable() {
            sizing.final_size
        } else {
            0.0
        };
        let position_value = position_size * price;

        let (stop_loss, take_profit) = trade_levels(
            direction,
            price,
            self.risk.stop_loss_pct,
            self.risk.take_profit_pct,
        );

        let execution_cost = self.cost.estimate(input.liquidity, position_value)?;

        let monte_carlo = if self.config.monte_carlo.enabled && direction.is_tradeable() {
            let setup = TradeSetup {
                direction,
                entry_price: price,
                stop_loss,
                take_profit,
                position_size,
                volatility: input.volatility,
            };
            let seed = input.seed.unwrap_or(self.config.monte_carlo.seed);
            Some(self.monte_carlo.simulate_seeded(&setup, seed)?)
        } else {
            None
        };

        let validation = self.validator.validate(&ValidationInput {
            direction,
            position_size,
            position_value,
            entry_price: price,
            stop_loss,
            take_profit,
            account_value,
            open_exposure,
            regimes,
            movement_energy: input.energy.movement_energy,
            total_cost_bps: execution_cost.total_cost_bps,
            kelly: sizing.kelly_estimate.as_ref(),
        });

        let mean_stability =
            (input.energy.stability + input.liquidity.stability + input.sentiment.stability) / 3.0;
        let confidence = (signal_set.composite.abs() * mean_stability).clamp(0.0, 1.0);

        debug!(
            symbol = input.symbol,
            %direction,
            composite = signal_set.composite,
            size = position_size,
            sized_by = %sizing.method,
            is_valid = validation.is_valid,
            "composed trade idea"
        );

        Ok(TradeIdea {
            symbol: input.symbol.to_string(),
            direction,
            position_size,
            position_value,
            sizing,
            entry_price: price,
            stop_loss,
            take_profit,
            execution_cost,
            signals: signal_set,
            monte_carlo,
            regimes,
            movement_energy: input.energy.movement_energy,
            is_valid: validation.is_valid,
            validation,
            confidence,
        })
    }
}
