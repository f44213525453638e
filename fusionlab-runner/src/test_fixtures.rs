//! Shared builders for unit tests.

use chrono::{Duration, TimeZone, Utc};

use fusionlab_core::domain::{
    Bar, EnergyRegime, EnergyState, LiquidityRegime, LiquidityState, SentimentRegime,
    SentimentState,
};

use crate::input::EngineStreams;

/// Daily bars with open = high = low = close.
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    let t0 = Utc.with_ymd_and_hms(2024, 1, 2, 21, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar::new(t0 + Duration::days(i as i64), c, c, c, c, 1e6))
        .collect()
}

pub fn bullish_energy() -> EnergyState {
    EnergyState {
        asymmetry: 200.0,
        elasticity_asymmetry: -5.0,
        movement_energy: 10.0,
        elasticity: 2.0,
        regime: EnergyRegime::Elastic,
        stability: 1.0,
    }
}

pub fn liquid() -> LiquidityState {
    LiquidityState {
        depth_imbalance: 0.6,
        impact_cost: 5.0,
        slippage_bps: 2.0,
        regime: LiquidityRegime::Liquid,
        stability: 1.0,
    }
}

pub fn bullish_sentiment() -> SentimentState {
    SentimentState {
        contrarian: 0.5,
        momentum: 0.2,
        conviction: 0.8,
        regime: SentimentRegime::Bullish,
        stability: 1.0,
    }
}

/// Composite ≈ 0.62 in elastic/liquid regimes: LONG on every bar.
pub fn long_streams(n: usize) -> EngineStreams {
    EngineStreams::new(vec![bullish_energy(); n], vec![liquid(); n], vec![bullish_sentiment(); n])
}

/// All primary metrics zero: NEUTRAL on every bar.
pub fn neutral_streams(n: usize) -> EngineStreams {
    let energy = EnergyState {
        asymmetry: 0.0,
        elasticity_asymmetry: 0.0,
        ..bullish_energy()
    };
    let liquidity = LiquidityState {
        depth_imbalance: 0.0,
        ..liquid()
    };
    let sentiment = SentimentState {
        contrarian: 0.0,
        momentum: 0.0,
        regime: SentimentRegime::Neutral,
        ..bullish_sentiment()
    };
    EngineStreams::new(vec![energy; n], vec![liquidity; n], vec![sentiment; n])
}
