//! Signal extraction: one bounded scalar per engine state.
//!
//! Each extractor combines the engine's directional and secondary metrics
//! through `tanh` (or a bounded factor), then damps by the stability score.
//! Output is clamped to [-1, 1]. Non-finite inputs and stability outside
//! [0, 1] are rejected rather than clamped.

use serde::{Deserialize, Serialize};

use crate::domain::{EnergyState, EngineState, LiquidityState, SentimentState};
use crate::error::{ensure_finite, Component, CoreError};

const COMPONENT: Component = Component::SignalExtractor;

fn check_stability(stability: f64) -> Result<f64, CoreError> {
    ensure_finite(COMPONENT, "stability", stability)?;
    if !(0.0..=1.0).contains(&stability) {
        return Err(CoreError::InvalidInput {
            component: COMPONENT,
            reason: format!("stability must be in [0, 1], got {stability}"),
        });
    }
    Ok(stability)
}

fn bounded(value: f64) -> Result<f64, CoreError> {
    ensure_finite(COMPONENT, "signal", value).map(|v| v.clamp(-1.0, 1.0))
}

/// `stability * (0.7 * tanh(asymmetry / 100) - 0.3 * tanh(elasticity_asymmetry / 10))`
pub fn energy_signal(state: &EnergyState) -> Result<f64, CoreError> {
    let stability = check_stability(state.stability)?;
    let asymmetry = ensure_finite(COMPONENT, "asymmetry", state.asymmetry)?;
    let elasticity_asymmetry =
        ensure_finite(COMPONENT, "elasticity_asymmetry", state.elasticity_asymmetry)?;

    let raw = 0.7 * (asymmetry / 100.0).tanh() - 0.3 * (elasticity_asymmetry / 10.0).tanh();
    bounded(stability * raw)
}

/// `stability * depth_imbalance * (1 - min(impact_cost / 100, 1))`
pub fn liquidity_signal(state: &LiquidityState) -> Result<f64, CoreError> {
    let stability = check_stability(state.stability)?;
    let imbalance = ensure_finite(COMPONENT, "depth_imbalance", state.depth_imbalance)?;
    let impact = ensure_finite(COMPONENT, "impact_cost", state.impact_cost)?;

    let impact_penalty = (impact / 100.0).clamp(0.0, 1.0);
    bounded(stability * imbalance * (1.0 - impact_penalty))
}

/// `stability * (0.7 * contrarian + 0.3 * tanh(momentum / 0.5)) * (1 + conviction) / 2`
pub fn sentiment_signal(state: &SentimentState) -> Result<f64, CoreError> {
    let stability = check_stability(state.stability)?;
    let contrarian = ensure_finite(COMPONENT, "contrarian", state.contrarian)?;
    let momentum = ensure_finite(COMPONENT, "momentum", state.momentum)?;
    let conviction = ensure_finite(COMPONENT, "conviction", state.conviction)?;

    let raw = 0.7 * contrarian + 0.3 * (momentum / 0.5).tanh();
    bounded(stability * raw * (1.0 + conviction) / 2.0)
}

/// Extract the signal of any engine state.
pub fn extract_signal(state: &EngineState) -> Result<f64, CoreError> {
    match state {
        EngineState::Energy(s) => energy_signal(s),
        EngineState::Liquidity(s) => liquidity_signal(s),
        EngineState::Sentiment(s) => sentiment_signal(s),
    }
}

/// The three per-engine signals of one decision point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSignals {
    pub energy: f64,
    pub liquidity: f64,
    pub sentiment: f64,
}

impl ExtractedSignals {
    pub fn extract(
        energy: &EnergyState,
        liquidity: &LiquidityState,
        sentiment: &SentimentState,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            energy: energy_signal(energy)?,
            liquidity: liquidity_signal(liquidity)?,
            sentiment: sentiment_signal(sentiment)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EnergyRegime, LiquidityRegime, SentimentRegime};

    fn energy(asymmetry: f64, elasticity_asymmetry: f64, stability: f64) -> EnergyState {
        EnergyState {
            asymmetry,
            elasticity_asymmetry,
            movement_energy: 10.0,
            elasticity: 1.0,
            regime: EnergyRegime::Elastic,
            stability,
        }
    }

    fn liquidity(depth_imbalance: f64, impact_cost: f64) -> LiquidityState {
        LiquidityState {
            depth_imbalance,
            impact_cost,
            slippage_bps: 2.0,
            regime: LiquidityRegime::Liquid,
            stability: 1.0,
        }
    }

    fn sentiment(contrarian: f64, momentum: f64, conviction: f64) -> SentimentState {
        SentimentState {
            contrarian,
            momentum,
            conviction,
            regime: SentimentRegime::Neutral,
            stability: 1.0,
        }
    }

    #[test]
    fn energy_formula() {
        let s = energy_signal(&energy(100.0, 10.0, 0.5)).unwrap();
        let expected = 0.5 * (0.7 * 1.0_f64.tanh() - 0.3 * 1.0_f64.tanh());
        assert!((s - expected).abs() < 1e-12);
    }

    #[test]
    fn energy_zero_stability_is_zero() {
        assert_eq!(energy_signal(&energy(500.0, -50.0, 0.0)).unwrap(), 0.0);
    }

    #[test]
    fn liquidity_impact_cost_caps_at_full_penalty() {
        assert_eq!(liquidity_signal(&liquidity(0.8, 250.0)).unwrap(), 0.0);
        let s = liquidity_signal(&liquidity(0.8, 50.0)).unwrap();
        assert!((s - 0.4).abs() < 1e-12);
    }

    #[test]
    fn sentiment_conviction_scales() {
        let low = sentiment_signal(&sentiment(0.5, 0.0, 0.0)).unwrap();
        let high = sentiment_signal(&sentiment(0.5, 0.0, 1.0)).unwrap();
        assert!((low - 0.175).abs() < 1e-12);
        assert!((high - 0.35).abs() < 1e-12);
    }

    #[test]
    fn extreme_inputs_are_clamped() {
        let s = liquidity_signal(&liquidity(5.0, 0.0)).unwrap();
        assert_eq!(s, 1.0);
        let s = sentiment_signal(&sentiment(-3.0, -10.0, 1.0)).unwrap();
        assert_eq!(s, -1.0);
    }

    #[test]
    fn non_finite_metric_is_an_error() {
        let err = energy_signal(&energy(f64::NAN, 0.0, 1.0)).unwrap_err();
        assert_eq!(err.component(), Component::SignalExtractor);
    }

    #[test]
    fn stability_out_of_range_is_an_error() {
        assert!(energy_signal(&energy(10.0, 0.0, 1.5)).is_err());
        assert!(energy_signal(&energy(10.0, 0.0, -0.1)).is_err());
    }

    #[test]
    fn dispatch_matches_direct_call() {
        let state = sentiment(0.3, 0.2, 0.5);
        assert_eq!(
            extract_signal(&EngineState::Sentiment(state.clone())).unwrap(),
            sentiment_signal(&state).unwrap()
        );
    }
}
