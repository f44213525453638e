//! Direction rule table.
//!
//! Evaluated in order, first match wins:
//! 1. energy `plastic` or liquidity `frozen` → AVOID
//! 2. `|composite| < band` → NEUTRAL
//! 3. `composite > band`, energy ∈ {elastic, super_elastic}, liquidity ∈ {liquid, deep} → LONG
//! 4. `composite < -band`, energy ∈ {elastic, brittle}, liquidity ∈ {liquid, thin} → SHORT
//! 5. otherwise → NEUTRAL

use crate::config::DirectionConfig;
use crate::domain::{Direction, EnergyRegime, LiquidityRegime};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionClassifier {
    neutral_band: f64,
}

impl DirectionClassifier {
    pub fn new(config: DirectionConfig) -> Self {
        Self {
            neutral_band: config.neutral_band,
        }
    }

    pub fn neutral_band(&self) -> f64 {
        self.neutral_band
    }

    pub fn classify(
        &self,
        composite: f64,
        energy: EnergyRegime,
        liquidity: LiquidityRegime,
    ) -> Direction {
        use EnergyRegime as E;
        use LiquidityRegime as L;

        if energy == E::Plastic || liquidity == L::Frozen {
            return Direction::Avoid;
        }
        if composite.abs() < self.neutral_band {
            return Direction::Neutral;
        }
        if composite > self.neutral_band
            && matches!(energy, E::Elastic | E::SuperElastic)
            && matches!(liquidity, L::Liquid | L::Deep)
        {
            return Direction::Long;
        }
        if composite < -self.neutral_band
            && matches!(energy, E::Elastic | E::Brittle)
            && matches!(liquidity, L::Liquid | L::Thin)
        {
            return Direction::Short;
        }
        Direction::Neutral
    }
}

impl Default for DirectionClassifier {
    fn default() -> Self {
        Self::new(DirectionConfig::default())
    }
}
