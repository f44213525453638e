//! Weighted fusion of the three engine signals.

use crate::config::FusionWeights;
use crate::domain::SignalSet;
use crate::error::{Component, CoreError};

use super::extract::ExtractedSignals;

/// Computes the composite signal with normalized (sum-to-one) weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalFuser {
    weights: FusionWeights,
}

impl SignalFuser {
    /// Normalizes `weights`. Fails on negative, non-finite or all-zero weights.
    pub fn new(weights: FusionWeights) -> Result<Self, CoreError> {
        let parts = [weights.energy, weights.liquidity, weights.sentiment];
        if parts.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(CoreError::InvalidWeights {
                component: Component::SignalFuser,
                reason: format!("weights must be finite and >= 0, got {parts:?}"),
            });
        }
        let total: f64 = parts.iter().sum();
        if total <= 0.0 {
            return Err(CoreError::InvalidWeights {
                component: Component::SignalFuser,
                reason: "weights sum to zero".into(),
            });
        }
        Ok(Self {
            weights: FusionWeights {
                energy: weights.energy / total,
                liquidity: weights.liquidity / total,
                sentiment: weights.sentiment / total,
            },
        })
    }

    /// Normalized weights.
    pub fn weights(&self) -> FusionWeights {
        self.weights
    }

    pub fn composite(&self, signals: &ExtractedSignals) -> f64 {
        let w = self.weights;
        (w.energy * signals.energy + w.liquidity * signals.liquidity + w.sentiment * signals.sentiment)
            .clamp(-1.0, 1.0)
    }

    pub fn fuse(&self, signals: &ExtractedSignals) -> SignalSet {
        SignalSet {
            energy: signals.energy,
            liquidity: signals.liquidity,
            sentiment: signals.sentiment,
            composite: self.composite(signals),
        }
    }
}

impl Default for SignalFuser {
    fn default() -> Self {
        Self {
            weights: FusionWeights::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(e: f64, l: f64, s: f64) -> ExtractedSignals {
        ExtractedSignals {
            energy: e,
            liquidity: l,
            sentiment: s,
        }
    }

    #[test]
    fn default_weights() {
        let fuser = SignalFuser::default();
        let c = fuser.composite(&signals(1.0, 0.5, -0.5));
        assert!((c - (0.4 + 0.15 - 0.15)).abs() < 1e-12);
    }

    #[test]
    fn weights_are_normalized() {
        let fuser = SignalFuser::new(FusionWeights {
            energy: 2.0,
            liquidity: 1.0,
            sentiment: 1.0,
        })
        .unwrap();
        let w = fuser.weights();
        assert!((w.energy - 0.5).abs() < 1e-12);
        assert!((w.energy + w.liquidity + w.sentiment - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_negative_weight() {
        let err = SignalFuser::new(FusionWeights {
            energy: -0.1,
            liquidity: 0.5,
            sentiment: 0.6,
        })
        .unwrap_err();
        assert_eq!(err.component(), Component::SignalFuser);
    }

    #[test]
    fn rejects_zero_sum() {
        assert!(SignalFuser::new(FusionWeights {
            energy: 0.0,
            liquidity: 0.0,
            sentiment: 0.0,
        })
        .is_err());
    }

    #[test]
    fn composite_stays_bounded() {
        let fuser = SignalFuser::default();
        assert_eq!(fuser.composite(&signals(1.0, 1.0, 1.0)), 1.0);
        assert_eq!(fuser.composite(&signals(-1.0, -1.0, -1.0)), -1.0);
    }
}
