//! Array-at-a-time replay.
//!
//! Composite signals for the whole series are computed in parallel, a
//! position array in {-1, 0, 1} is derived from the direction rules, and
//! P&L comes from shifted array multiplication:
//! ```text
//! pnl[t]    = held[t-1] * (close[t] - close[t-1])
//! equity[t] = initial + Σ_{s<=t} (pnl[s] - cost[s])
//! ```
//! Each run of equal non-zero positions becomes one trade sized at a fixed
//! fraction of capital. No stops, no validation: this is an approximation.
//! Trades still record the risk parameters' stop and target levels around
//! the entry close, so every logged trade keeps stop and target on either
//! side of its entry.

use rayon::prelude::*;

use fusionlab_core::composer::trade_levels;
use fusionlab_core::domain::{Bar, Direction, ExitReason, PositionSide};
use fusionlab_core::{CoreError, ExecutionCostEstimator, ExtractedSignals, PolicyComposer};

use crate::config::SimulationConfig;
use crate::context::{EquityPoint, SimulationContext};
use crate::error::SimulationError;
use crate::fills::{EntryFill, ExitFill, OpenPosition};
use crate::input::EngineStreams;

/// Extract all three signals for every bar, `chunk` bars per parallel task.
///
/// Output order matches bar order; the first failing bar (lowest index) is
/// reported.
pub fn extract_series(
    bars: &[Bar],
    streams: &EngineStreams,
    chunk: usize,
) -> Result<Vec<ExtractedSignals>, SimulationError> {
    let extracted: Vec<Result<ExtractedSignals, CoreError>> = (0..bars.len())
        .into_par_iter()
        .with_min_len(chunk.max(1))
        .map(|i| {
            ExtractedSignals::extract(&streams.energy[i], &streams.liquidity[i], &streams.sentiment[i])
        })
        .collect();

    extracted
        .into_iter()
        .enumerate()
        .map(|(index, signals)| {
            signals.map_err(|source| SimulationError::Decision {
                index,
                timestamp: bars[index].timestamp,
                source,
            })
        })
        .collect()
}

/// Target position per bar: +1 long, -1 short, 0 flat.
pub fn position_array(
    composer: &PolicyComposer,
    signals: &[ExtractedSignals],
    streams: &EngineStreams,
    chunk: usize,
) -> Vec<f64> {
    signals
        .par_iter()
        .with_min_len(chunk.max(1))
        .enumerate()
        .map(|(i, s)| {
            let composite = composer.fuser().composite(s);
            composer
                .classifier()
                .classify(composite, streams.energy[i].regime, streams.liquidity[i].regime)
                .sign()
        })
        .collect()
}

pub(crate) fn replay(
    symbol: &str,
    bars: &[Bar],
    streams: &EngineStreams,
    composer: &PolicyComposer,
    sim: &SimulationConfig,
) -> Result<SimulationContext, SimulationError> {
    let n = bars.len();
    let last = n.saturating_sub(1);
    let signals = extract_series(bars, streams, sim.parallel_chunk)?;
    let positions = position_array(composer, &signals, streams, sim.parallel_chunk);
    let estimator = ExecutionCostEstimator::new();
    let decision_error = |index: usize| {
        move |source: CoreError| SimulationError::Decision {
            index,
            timestamp: bars[index].timestamp,
            source,
        }
    };

    let mut ctx = SimulationContext::new(symbol, sim.initial_capital);
    // signed quantity held after the close of bar t
    let mut held = vec![0.0; n];
    let mut costs = vec![0.0; n];

    for t in 0..n {
        let bar = &bars[t];
        let target = if t == last { 0.0 } else { positions[t] };

        if let Some(pos) = ctx.open_position.as_mut() {
            pos.track_excursion(bar);
        }
        let current = ctx.open_position.as_ref().map(|p| (p.side, p.quantity));
        if let Some((side, quantity)) = current {
            if target != side.sign() {
                let reason = if t == last && positions[t] == side.sign() {
                    ExitReason::EndOfData
                } else {
                    ExitReason::SignalReversal
                };
                let exit = ExitFill::priced(
                    &estimator,
                    &streams.liquidity[t],
                    side,
                    bar.close,
                    quantity,
                    sim.commission_bps,
                )
                .map_err(decision_error(t))?;
                costs[t] += exit.cost();
                ctx.close(t, bar.timestamp, exit, reason);
            }
        }

        if ctx.is_flat() && target != 0.0 && ctx.current_capital > 0.0 {
            let (side, direction) = if target > 0.0 {
                (PositionSide::Long, Direction::Long)
            } else {
                (PositionSide::Short, Direction::Short)
            };
            // recorded for the trade log; the array replay never enforces them
            let (stop_loss, take_profit) = trade_levels(
                direction,
                bar.close,
                composer.risk().stop_loss_pct,
                composer.risk().take_profit_pct,
            );
            let quantity = ctx.current_capital * sim.vectorized_position_pct / bar.close;
            let cost = estimator
                .estimate(&streams.liquidity[t], quantity * bar.close)
                .map_err(decision_error(t))?;
            let entry = EntryFill::new(side, bar.close, quantity, &cost, sim.commission_bps);
            costs[t] += entry.cost();
            let fused = composer.fuser().fuse(&signals[t]);
            ctx.open(OpenPosition::new(
                side,
                t,
                bar.timestamp,
                entry,
                stop_loss,
                take_profit,
                quantity,
                fused,
            ));
        }

        held[t] = ctx
            .open_position
            .as_ref()
            .map_or(0.0, |p| p.side.sign() * p.quantity);
    }

    let pnl: Vec<f64> = (0..n)
        .into_par_iter()
        .map(|t| if t == 0 { 0.0 } else { held[t - 1] * (bars[t].close - bars[t - 1].close) })
        .collect();

    let mut equity = sim.initial_capital;
    ctx.equity_curve = bars
        .iter()
        .zip(pnl.iter().zip(&costs))
        .map(|(bar, (p, c))| {
            equity += p - c;
            EquityPoint {
                timestamp: bar.timestamp,
                equity,
            }
        })
        .collect();
    ctx.bars_in_market = held.iter().filter(|q| **q != 0.0).count();
    Ok(ctx)
}
