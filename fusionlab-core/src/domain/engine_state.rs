//! Engine states: the contract emitted by the three upstream analytic engines.
//!
//! Each engine publishes one immutable state per decision timestamp. The core
//! reads a directional primary metric, a secondary magnitude/cost metric, a
//! categorical regime and a stability score in [0, 1]. Energy and liquidity
//! states carry a few extra typed fields consumed by sizing and cost estimation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Regime tag from the energy (elasticity) engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyRegime {
    Elastic,
    SuperElastic,
    Brittle,
    Plastic,
}

/// Regime tag from the liquidity engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiquidityRegime {
    Deep,
    Liquid,
    Thin,
    Frozen,
}

/// Regime tag from the sentiment engine. Informational only; never gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentRegime {
    Bullish,
    Bearish,
    Neutral,
    Euphoric,
    Panic,
}

impl fmt::Display for EnergyRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Elastic => "elastic",
            Self::SuperElastic => "super_elastic",
            Self::Brittle => "brittle",
            Self::Plastic => "plastic",
        })
    }
}

impl fmt::Display for LiquidityRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Deep => "deep",
            Self::Liquid => "liquid",
            Self::Thin => "thin",
            Self::Frozen => "frozen",
        })
    }
}

impl fmt::Display for SentimentRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
            Self::Neutral => "neutral",
            Self::Euphoric => "euphoric",
            Self::Panic => "panic",
        })
    }
}

/// Energy engine output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyState {
    /// Directional energy asymmetry (primary metric).
    pub asymmetry: f64,
    /// Elasticity asymmetry between up and down moves (secondary metric).
    pub elasticity_asymmetry: f64,
    /// Energy required to move price one unit.
    pub movement_energy: f64,
    /// Market elasticity; low values mean a "stiff" market.
    pub elasticity: f64,
    pub regime: EnergyRegime,
    pub stability: f64,
}

/// Liquidity engine output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidityState {
    /// Bid/ask depth imbalance in [-1, 1] (primary metric).
    pub depth_imbalance: f64,
    /// Market impact cost in bps (secondary metric).
    pub impact_cost: f64,
    /// Expected slippage in bps for a reference-size order.
    pub slippage_bps: f64,
    pub regime: LiquidityRegime,
    pub stability: f64,
}

/// Sentiment engine output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentState {
    /// Contrarian score in [-1, 1] (primary metric).
    pub contrarian: f64,
    /// Sentiment momentum (secondary metric).
    pub momentum: f64,
    /// Conviction in [0, 1].
    pub conviction: f64,
    pub regime: SentimentRegime,
    pub stability: f64,
}

/// Regime of any engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "engine", content = "regime", rename_all = "snake_case")]
pub enum Regime {
    Energy(EnergyRegime),
    Liquidity(LiquidityRegime),
    Sentiment(SentimentRegime),
}

/// Which engine a state or signal came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    Energy,
    Liquidity,
    Sentiment,
}

impl fmt::Display for SignalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Energy => "energy",
            Self::Liquidity => "liquidity",
            Self::Sentiment => "sentiment",
        })
    }
}

/// Closed set of engine states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "engine", rename_all = "snake_case")]
pub enum EngineState {
    Energy(EnergyState),
    Liquidity(LiquidityState),
    Sentiment(SentimentState),
}

impl EngineState {
    pub fn source(&self) -> SignalSource {
        match self {
            Self::Energy(_) => SignalSource::Energy,
            Self::Liquidity(_) => SignalSource::Liquidity,
            Self::Sentiment(_) => SignalSource::Sentiment,
        }
    }

    pub fn stability(&self) -> f64 {
        match self {
            Self::Energy(s) => s.stability,
            Self::Liquidity(s) => s.stability,
            Self::Sentiment(s) => s.stability,
        }
    }

    pub fn regime(&self) -> Regime {
        match self {
            Self::Energy(s) => Regime::Energy(s.regime),
            Self::Liquidity(s) => Regime::Liquidity(s.regime),
            Self::Sentiment(s) => Regime::Sentiment(s.regime),
        }
    }

    pub fn primary_metric(&self) -> f64 {
        match self {
            Self::Energy(s) => s.asymmetry,
            Self::Liquidity(s) => s.depth_imbalance,
            Self::Sentiment(s) => s.contrarian,
        }
    }

    pub fn secondary_metric(&self) -> f64 {
        match self {
            Self::Energy(s) => s.elasticity_asymmetry,
            Self::Liquidity(s) => s.impact_cost,
            Self::Sentiment(s) => s.momentum,
        }
    }
}

impl From<EnergyState> for EngineState {
    fn from(s: EnergyState) -> Self {
        Self::Energy(s)
    }
}

impl From<LiquidityState> for EngineState {
    fn from(s: LiquidityState) -> Self {
        Self::Liquidity(s)
    }
}

impl From<SentimentState> for EngineState {
    fn from(s: SentimentState) -> Self {
        Self::Sentiment(s)
    }
}

/// Regime snapshot recorded on every trade idea.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeSnapshot {
    pub energy: EnergyRegime,
    pub liquidity: LiquidityRegime,
    pub sentiment: SentimentRegime,
}

impl RegimeSnapshot {
    /// True when either gating regime forbids trading.
    pub fn is_gated(&self) -> bool {
        self.energy == EnergyRegime::Plastic || self.liquidity == LiquidityRegime::Frozen
    }
}
