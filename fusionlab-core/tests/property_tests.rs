//! Property tests for decision invariants.
//!
//! Uses proptest to verify:
//! 1. Signal bounds: every extracted signal and the composite lie in [-1, 1]
//! 2. Sizing monotonicity: more Kelly fraction or target volatility never shrinks size
//! 3. Conservative combination: final size is the minimum and respects the notional cap
//! 4. Regime gating: plastic energy or frozen liquidity always yields an invalid AVOID
//! 5. Level ordering: LONG/SHORT ideas carry correctly ordered stop and target
//! 6. Monte Carlo reproducibility: same seed, same summary

use proptest::prelude::*;

use fusionlab_core::domain::{
    Direction, EnergyRegime, EnergyState, LiquidityRegime, LiquidityState, SentimentRegime,
    SentimentState,
};
use fusionlab_core::sizers::combine_sizes;
use fusionlab_core::{
    ComposerConfig, DecisionInput, ExtractedSignals, FusionWeights, MonteCarloConfig,
    MonteCarloSimulator, PolicyComposer, PositionSizer, RiskParameters, SignalFuser, SizingConfig,
    SizingInputs, TradeSetup,
};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_energy_regime() -> impl Strategy<Value = EnergyRegime> {
    prop_oneof![
        Just(EnergyRegime::Elastic),
        Just(EnergyRegime::SuperElastic),
        Just(EnergyRegime::Brittle),
        Just(EnergyRegime::Plastic),
    ]
}

fn arb_liquidity_regime() -> impl Strategy<Value = LiquidityRegime> {
    prop_oneof![
        Just(LiquidityRegime::Deep),
        Just(LiquidityRegime::Liquid),
        Just(LiquidityRegime::Thin),
        Just(LiquidityRegime::Frozen),
    ]
}

fn arb_sentiment_regime() -> impl Strategy<Value = SentimentRegime> {
    prop_oneof![
        Just(SentimentRegime::Bullish),
        Just(SentimentRegime::Bearish),
        Just(SentimentRegime::Neutral),
        Just(SentimentRegime::Euphoric),
        Just(SentimentRegime::Panic),
    ]
}

fn arb_energy() -> impl Strategy<Value = EnergyState> {
    (
        -1_000.0..1_000.0_f64,
        -100.0..100.0_f64,
        0.0..500.0_f64,
        0.0..5.0_f64,
        arb_energy_regime(),
        0.0..=1.0_f64,
    )
        .prop_map(
            |(asymmetry, elasticity_asymmetry, movement_energy, elasticity, regime, stability)| {
                EnergyState {
                    asymmetry,
                    elasticity_asymmetry,
                    movement_energy,
                    elasticity,
                    regime,
                    stability,
                }
            },
        )
}

fn arb_liquidity() -> impl Strategy<Value = LiquidityState> {
    (
        -1.0..=1.0_f64,
        0.0..300.0_f64,
        0.0..50.0_f64,
        arb_liquidity_regime(),
        0.0..=1.0_f64,
    )
        .prop_map(|(depth_imbalance, impact_cost, slippage_bps, regime, stability)| {
            LiquidityState {
                depth_imbalance,
                impact_cost,
                slippage_bps,
                regime,
                stability,
            }
        })
}

fn arb_sentiment() -> impl Strategy<Value = SentimentState> {
    (
        -1.0..=1.0_f64,
        -5.0..5.0_f64,
        0.0..=1.0_f64,
        arb_sentiment_regime(),
        0.0..=1.0_f64,
    )
        .prop_map(|(contrarian, momentum, conviction, regime, stability)| SentimentState {
            contrarian,
            momentum,
            conviction,
            regime,
            stability,
        })
}

fn arb_weights() -> impl Strategy<Value = FusionWeights> {
    (0.01..1.0_f64, 0.0..1.0_f64, 0.0..1.0_f64).prop_map(|(energy, liquidity, sentiment)| {
        FusionWeights {
            energy,
            liquidity,
            sentiment,
        }
    })
}

fn arb_history() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-0.1..0.15_f64, 20..60)
}

fn composer() -> PolicyComposer {
    let config = ComposerConfig {
        monte_carlo: MonteCarloConfig {
            n_paths: 50,
            ..MonteCarloConfig::default()
        },
        ..ComposerConfig::default()
    };
    PolicyComposer::new(RiskParameters::default(), config).unwrap()
}

fn sizing_inputs(history: &[f64]) -> SizingInputs<'_> {
    SizingInputs {
        account_value: 100_000.0,
        price: 80.0,
        volatility: 0.25,
        movement_energy: 20.0,
        elasticity: 1.5,
        historical_returns: Some(history),
    }
}

// ── 1. Signal bounds ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn signals_and_composite_are_bounded(
        e in arb_energy(),
        l in arb_liquidity(),
        s in arb_sentiment(),
        weights in arb_weights(),
    ) {
        let signals = ExtractedSignals::extract(&e, &l, &s).unwrap();
        for v in [signals.energy, signals.liquidity, signals.sentiment] {
            prop_assert!((-1.0..=1.0).contains(&v), "signal {} out of bounds", v);
        }
        let composite = SignalFuser::new(weights).unwrap().composite(&signals);
        prop_assert!((-1.0..=1.0).contains(&composite), "composite {} out of bounds", composite);
    }
}

// ── 2. Sizing monotonicity ───────────────────────────────────────────

proptest! {
    #[test]
    fn kelly_size_grows_with_fraction(
        history in arb_history(),
        low in 0.05..0.5_f64,
        bump in 0.0..0.5_f64,
    ) {
        let size_with = |fraction: f64| {
            let risk = RiskParameters { kelly_fraction: fraction, ..RiskParameters::default() };
            PositionSizer::new(risk, SizingConfig::default())
                .size(&sizing_inputs(&history))
                .unwrap()
                .kelly
        };
        prop_assert!(size_with((low + bump).min(1.0)) >= size_with(low));
    }

    #[test]
    fn vol_target_size_grows_with_target(
        low in 0.01..0.5_f64,
        bump in 0.0..0.5_f64,
    ) {
        let size_with = |target: f64| {
            let risk = RiskParameters { target_volatility: target, ..RiskParameters::default() };
            PositionSizer::new(risk, SizingConfig::default())
                .size(&sizing_inputs(&[]))
                .unwrap()
                .volatility_target
        };
        prop_assert!(size_with(low + bump) >= size_with(low));
    }
}

// ── 3. Conservative combination ──────────────────────────────────────

proptest! {
    #[test]
    fn final_size_is_the_minimum(
        k in 0.0..1e4_f64,
        v in 0.0..1e4_f64,
        e in 0.0..1e4_f64,
        f in 0.0..1e4_f64,
    ) {
        let (size, _) = combine_sizes(k, v, e, f);
        prop_assert_eq!(size, k.min(v).min(e).min(f));
    }

    #[test]
    fn composed_size_respects_caps(
        e in arb_energy(),
        l in arb_liquidity(),
        s in arb_sentiment(),
        price in 5.0..500.0_f64,
        account in 10_000.0..2_000_000.0_f64,
        vol in 0.05..1.0_f64,
        history in prop::option::of(arb_history()),
    ) {
        let composer = composer();
        let mut input = DecisionInput::new("SPY", price, &e, &l, &s, account, vol);
        if let Some(h) = &history {
            input = input.with_history(h);
        }
        let idea = composer.compose(&input).unwrap();
        let b = &idea.sizing;
        let min = b.kelly.min(b.volatility_target).min(b.energy_aware).min(b.fixed_cap);

        prop_assert!(idea.position_size >= 0.0);
        prop_assert!((b.final_size - min).abs() < 1e-9);
        if idea.direction.is_tradeable() {
            prop_assert!((idea.position_size - min).abs() < 1e-9);
        } else {
            prop_assert_eq!(idea.position_size, 0.0);
        }
        let cap = composer.risk().max_position_size;
        prop_assert!(idea.position_value <= cap * (1.0 + 1e-9));
    }
}

// ── 4. Regime gating ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn gated_regimes_always_avoid(
        mut e in arb_energy(),
        mut l in arb_liquidity(),
        s in arb_sentiment(),
        gate_energy in any::<bool>(),
    ) {
        if gate_energy {
            e.regime = EnergyRegime::Plastic;
        } else {
            l.regime = LiquidityRegime::Frozen;
        }
        let idea = composer()
            .compose(&DecisionInput::new("SPY", 100.0, &e, &l, &s, 100_000.0, 0.2))
            .unwrap();
        prop_assert_eq!(idea.direction, Direction::Avoid);
        prop_assert!(!idea.is_valid);
        prop_assert!(!idea.validation_errors().is_empty());
    }
}

// ── 5. Level ordering ────────────────────────────────────────────────

proptest! {
    #[test]
    fn tradeable_ideas_have_ordered_levels(
        e in arb_energy(),
        l in arb_liquidity(),
        s in arb_sentiment(),
        price in 1.0..1_000.0_f64,
    ) {
        let idea = composer()
            .compose(&DecisionInput::new("SPY", price, &e, &l, &s, 100_000.0, 0.2))
            .unwrap();
        match idea.direction {
            Direction::Long => {
                prop_assert!(idea.stop_loss < idea.entry_price);
                prop_assert!(idea.entry_price < idea.take_profit);
            }
            Direction::Short => {
                prop_assert!(idea.take_profit < idea.entry_price);
                prop_assert!(idea.entry_price < idea.stop_loss);
            }
            Direction::Neutral | Direction::Avoid => {
                prop_assert!(idea.monte_carlo.is_none());
            }
        }
    }
}

// ── 6. Monte Carlo reproducibility ───────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn monte_carlo_is_reproducible(
        seed in any::<u64>(),
        vol in 0.0..1.0_f64,
        long in any::<bool>(),
    ) {
        let direction = if long { Direction::Long } else { Direction::Short };
        let (stop, target) = if long { (98.0, 106.0) } else { (102.0, 94.0) };
        let setup = TradeSetup {
            direction,
            entry_price: 100.0,
            stop_loss: stop,
            take_profit: target,
            position_size: 10.0,
            volatility: vol,
        };
        let sim = MonteCarloSimulator::new(MonteCarloConfig {
            n_paths: 300,
            parallel_threshold: 64,
            ..MonteCarloConfig::default()
        });
        let a = sim.simulate_seeded(&setup, seed).unwrap();
        let b = sim.simulate_seeded(&setup, seed).unwrap();
        prop_assert_eq!(a, b);
        prop_assert!(a.cvar <= a.var + 1e-9);
    }
}
