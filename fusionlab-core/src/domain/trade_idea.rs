//! TradeIdea: the composer's output for one decision point.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::engine_state::{RegimeSnapshot, SignalSource};
use crate::cost::ExecutionCost;
use crate::monte_carlo::MonteCarloSummary;
use crate::sizers::SizingBreakdown;
use crate::validation::ValidationReport;

/// Trade direction decided by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Long,
    Short,
    Neutral,
    Avoid,
}

impl Direction {
    /// +1 for long, -1 for short, 0 otherwise.
    pub fn sign(self) -> f64 {
        match self {
            Self::Long => 1.0,
            Self::Short => -1.0,
            Self::Neutral | Self::Avoid => 0.0,
        }
    }

    pub fn is_tradeable(self) -> bool {
        matches!(self, Self::Long | Self::Short)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Long => "LONG",
            Self::Short => "SHORT",
            Self::Neutral => "NEUTRAL",
            Self::Avoid => "AVOID",
        })
    }
}

/// The three normalized signals plus their weighted composite, all in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalSet {
    pub energy: f64,
    pub liquidity: f64,
    pub sentiment: f64,
    pub composite: f64,
}

impl SignalSet {
    /// Source with the largest absolute signal. Ties resolve in the order
    /// energy, liquidity, sentiment.
    pub fn dominant_source(&self) -> SignalSource {
        let mut best = (SignalSource::Energy, self.energy.abs());
        for (source, value) in [
            (SignalSource::Liquidity, self.liquidity.abs()),
            (SignalSource::Sentiment, self.sentiment.abs()),
        ] {
            if value > best.1 {
                best = (source, value);
            }
        }
        best.0
    }

    pub fn get(&self, source: SignalSource) -> f64 {
        match source {
            SignalSource::Energy => self.energy,
            SignalSource::Liquidity => self.liquidity,
            SignalSource::Sentiment => self.sentiment,
        }
    }
}

/// A fully populated decision for one symbol at one timestamp.
///
/// Created fresh per decision point and never mutated. `is_valid == false`
/// with populated `validation.errors` is the normal way to say "no trade".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeIdea {
    pub symbol: String,
    pub direction: Direction,

    // ── Size ──
    /// Quantity in shares/contracts, always >= 0.
    pub position_size: f64,
    /// `position_size * entry_price`.
    pub position_value: f64,
    pub sizing: SizingBreakdown,

    // ── Levels ──
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,

    // ── Cost ──
    pub execution_cost: ExecutionCost,

    // ── Signals ──
    pub signals: SignalSet,

    // ── Risk ──
    /// `None` for non-tradeable directions or when simulation is disabled.
    pub monte_carlo: Option<MonteCarloSummary>,
    pub regimes: RegimeSnapshot,
    /// Movement energy reported by the energy engine at decision time.
    pub movement_energy: f64,

    // ── Verdict ──
    pub validation: ValidationReport,
    pub is_valid: bool,
    /// `|composite| * mean(stability)`, in [0, 1].
    pub confidence: f64,
}

impl TradeIdea {
    /// True when the simulator should open a position from this idea.
    pub fn is_actionable(&self) -> bool {
        self.is_valid && self.direction.is_tradeable() && self.position_size > 0.0
    }

    pub fn expected_cost_bps(&self) -> f64 {
        self.execution_cost.total_cost_bps
    }

    pub fn validation_errors(&self) -> &[String] {
        &self.validation.errors
    }

    pub fn validation_warnings(&self) -> &[String] {
        &self.validation.warnings
    }
}
