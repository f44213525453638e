//! Historical replay of the policy composer.
//!
//! Per symbol the simulator is a two-state machine, Flat and Open, stepped
//! once per bar in chronological order:
//!
//! - **Flat**: compose a trade idea at the bar's close. A valid LONG or
//!   SHORT idea opens a position at the close plus entry costs.
//! - **Open**: exit on the close when it crosses the stop or target, when
//!   the optional time stop expires, or on the final bar.
//!
//! A position closed on a bar is never replaced on that same bar, and no
//! position is opened on the final bar. Positions are never pyramided.
//! Engine states are extracted on every bar in either state.
//!
//! Three modes share this bookkeeping:
//! - [`ExecutionMode::EventDriven`] runs the full composer every flat bar.
//! - [`ExecutionMode::Hybrid`] extracts signals for the whole series in
//!   parallel first, then runs the same state machine.
//! - [`ExecutionMode::Vectorized`] replaces the state machine with array
//!   arithmetic (see [`crate::vectorized`]).

use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use fusionlab_core::domain::{Bar, ExitReason};
use fusionlab_core::rng::RngHierarchy;
use fusionlab_core::{
    ComposerConfig, CoreError, DecisionInput, ExecutionCostEstimator, ExtractedSignals,
    PolicyComposer, RiskParameters,
};

use crate::config::{BacktestConfig, SimulationConfig};
use crate::context::SimulationContext;
use crate::error::SimulationError;
use crate::fills::ExitFill;
use crate::input::{check_all_bars, check_shape, EngineStreams};
use crate::results::BacktestResults;
use crate::vectorized;
use crate::volatility::realized_volatility;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    #[default]
    EventDriven,
    Vectorized,
    Hybrid,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::EventDriven => "event_driven",
            Self::Vectorized => "vectorized",
            Self::Hybrid => "hybrid",
        })
    }
}

/// One symbol's inputs for a multi-symbol replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolSeries {
    pub symbol: String,
    pub bars: Vec<Bar>,
    pub streams: EngineStreams,
}

#[derive(Debug, Clone, Default)]
pub struct BacktestSimulator {
    composer: ComposerConfig,
    simulation: SimulationConfig,
}

impl BacktestSimulator {
    pub fn new(composer: ComposerConfig, simulation: SimulationConfig) -> Self {
        Self {
            composer,
            simulation,
        }
    }

    pub fn from_config(config: &BacktestConfig) -> Self {
        Self::new(config.composer, config.simulation)
    }

    pub fn composer_config(&self) -> &ComposerConfig {
        &self.composer
    }

    pub fn simulation_config(&self) -> &SimulationConfig {
        &self.simulation
    }

    /// Replay one symbol.
    ///
    /// Configuration, shape and bar problems fail before the first bar.
    /// Engine-state faults abort the replay with the offending bar's index and
    /// timestamp. Every mode reads the engine states of every bar, so all
    /// three modes reject the same inputs.
    pub fn run(
        &self,
        symbol: &str,
        bars: &[Bar],
        streams: &EngineStreams,
        risk: &RiskParameters,
        mode: ExecutionMode,
    ) -> Result<BacktestResults, SimulationError> {
        let config = BacktestConfig {
            risk: risk.clone(),
            composer: self.composer,
            simulation: self.simulation,
        };
        config.validate()?;
        let fingerprint = config.fingerprint()?;
        check_shape(bars, streams)?;
        check_all_bars(bars)?;
        let composer = PolicyComposer::new(config.risk.clone(), self.composer)
            .map_err(SimulationError::Setup)?;

        info!(symbol, %mode, bars = bars.len(), "starting replay");

        let replayed = match mode {
            ExecutionMode::EventDriven => self.replay_events(symbol, bars, streams, &composer, None),
            ExecutionMode::Hybrid => {
                vectorized::extract_series(bars, streams, self.simulation.parallel_chunk).and_then(
                    |signals| self.replay_events(symbol, bars, streams, &composer, Some(&signals)),
                )
            }
            ExecutionMode::Vectorized => {
                vectorized::replay(symbol, bars, streams, &composer, &self.simulation)
            }
        };
        let ctx = match replayed {
            Ok(ctx) => ctx,
            Err(e) => {
                warn!(symbol, %mode, index = ?e.index(), error = %e, "replay aborted");
                return Err(e);
            }
        };

        let results = BacktestResults::from_context(ctx, mode, fingerprint, bars.len());
        info!(
            symbol,
            %mode,
            trades = results.total_trades,
            final_capital = results.final_capital,
            "replay finished"
        );
        Ok(results)
    }

    /// Replay many symbols in parallel. Symbols share nothing; results come
    /// back in input order.
    pub fn run_universe(
        &self,
        universe: &[SymbolSeries],
        risk: &RiskParameters,
        mode: ExecutionMode,
    ) -> Vec<Result<BacktestResults, SimulationError>> {
        universe
            .par_iter()
            .map(|series| self.run(&series.symbol, &series.bars, &series.streams, risk, mode))
            .collect()
    }

    /// Event-driven state machine. With `signals` supplied, extraction is
    /// skipped and the precomputed values are used instead. Signals are
    /// extracted on every bar, open or flat, so a corrupt state is a fault
    /// wherever it sits.
    fn replay_events(
        &self,
        symbol: &str,
        bars: &[Bar],
        streams: &EngineStreams,
        composer: &PolicyComposer,
        signals: Option<&[ExtractedSignals]>,
    ) -> Result<SimulationContext, SimulationError> {
        let sim = &self.simulation;
        let last = bars.len().saturating_sub(1);
        let volatility = realized_volatility(
            bars,
            sim.volatility_lookback,
            sim.volatility_floor,
            sim.default_volatility,
        );
        let seeds = RngHierarchy::new(sim.master_seed);
        let estimator = ExecutionCostEstimator::new();
        let mut ctx = SimulationContext::new(symbol, sim.initial_capital);

        for (i, bar) in bars.iter().enumerate() {
            let decision_error = |source: CoreError| SimulationError::Decision {
                index: i,
                timestamp: bar.timestamp,
                source,
            };
            let bar_signals = match signals {
                Some(precomputed) => precomputed[i],
                None => ExtractedSignals::extract(
                    &streams.energy[i],
                    &streams.liquidity[i],
                    &streams.sentiment[i],
                )
                .map_err(decision_error)?,
            };

            if let Some(pos) = ctx.open_position.as_mut() {
                pos.track_excursion(bar);
                let held = i - pos.entry_index;
                let reason = pos
                    .barrier_hit(bar.close)
                    .or_else(|| {
                        sim.max_holding_bars
                            .filter(|&max| held >= max)
                            .map(|_| ExitReason::MaxHolding)
                    })
                    .or_else(|| (i == last).then_some(ExitReason::EndOfData));

                if let Some(reason) = reason {
                    let exit = ExitFill::priced(
                        &estimator,
                        &streams.liquidity[i],
                        pos.side,
                        bar.close,
                        pos.quantity,
                        sim.commission_bps,
                    )
                    .map_err(decision_error)?;
                    ctx.close(i, bar.timestamp, exit, reason);
                }
            } else if i < last && ctx.current_capital > 0.0 {
                let input = DecisionInput::new(
                    symbol,
                    bar.close,
                    &streams.energy[i],
                    &streams.liquidity[i],
                    &streams.sentiment[i],
                    ctx.current_capital,
                    volatility[i],
                )
                .with_history(&ctx.closed_returns)
                .with_seed(seeds.decision_seed(symbol, i));

                let idea = composer
                    .compose_with_signals(&input, bar_signals)
                    .map_err(decision_error)?;

                ctx.record_idea(&idea);
                ctx.open_from_idea(&idea, bar, i, sim.commission_bps);
            }

            ctx.mark(bar);
        }
        Ok(ctx)
    }
}
