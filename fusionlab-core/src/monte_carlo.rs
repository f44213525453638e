//! Monte Carlo risk simulation for a proposed trade.
//!
//! Simulates independent zero-drift geometric price paths from the entry
//! price, stepping at `1 / steps_per_year` for `horizon_steps` steps:
//! ```text
//! S_{t+1} = S_t * exp(-0.5 σ² dt + σ √dt Z),   Z ~ N(0, 1)
//! ```
//! A path that crosses the stop or target exits at that level; otherwise it
//! is marked at its terminal price. Each path draws from its own seeded RNG
//! (see [`crate::rng::path_rng`]), so summaries are identical whether the
//! paths ran on one thread or many.

use rand::Rng;
use rand_distr::StandardNormal;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::MonteCarloConfig;
use crate::domain::Direction;
use crate::error::{ensure_finite, ensure_positive, Component, CoreError};
use crate::rng::path_rng;

/// Profit factor reported when there are profits but no losses.
pub const PROFIT_FACTOR_CAP: f64 = 100.0;

/// The trade being stress-tested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeSetup {
    pub direction: Direction,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub position_size: f64,
    /// Annualized volatility. Zero is allowed and yields flat paths.
    pub volatility: f64,
}

/// How a single path ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathExit {
    StopLoss,
    TakeProfit,
    Horizon,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathOutcome {
    pub pnl: f64,
    pub exit: PathExit,
    pub steps: usize,
}

/// Distribution summary over all simulated paths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloSummary {
    pub n_paths: usize,
    pub seed: u64,
    /// Fraction of paths with strictly positive P&L.
    pub win_rate: f64,
    pub mean_pnl: f64,
    pub median_pnl: f64,
    pub std_pnl: f64,
    /// `mean / std` over the simulated horizon, not annualized.
    pub sharpe: f64,
    pub profit_factor: f64,
    /// P&L at the configured lower percentile (negative = loss).
    pub var: f64,
    /// Mean P&L of the paths at or below `var`.
    pub cvar: f64,
    pub stop_hits: usize,
    pub target_hits: usize,
}

/// Linear-interpolated percentile of already sorted data (`p` in 0..=100).
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return sorted[0];
    }
    let rank = (p / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = rank - lo as f64;
    sorted[lo] * (1.0 - frac) + sorted[hi] * frac
}

#[derive(Debug, Clone)]
pub struct MonteCarloSimulator {
    config: MonteCarloConfig,
}

impl MonteCarloSimulator {
    pub fn new(config: MonteCarloConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// Simulate with the configured seed.
    pub fn simulate(&self, setup: &TradeSetup) -> Result<MonteCarloSummary, CoreError> {
        self.simulate_seeded(setup, self.config.seed)
    }

    /// Simulate with an explicit seed. Identical seed and setup give
    /// identical summaries.
    pub fn simulate_seeded(
        &self,
        setup: &TradeSetup,
        seed: u64,
    ) -> Result<MonteCarloSummary, CoreError> {
        let outcomes = self.simulate_paths(setup, seed)?;
        Ok(self.summarize(&outcomes, seed))
    }

    /// Per-path outcomes in path order.
    pub fn simulate_paths(
        &self,
        setup: &TradeSetup,
        seed: u64,
    ) -> Result<Vec<PathOutcome>, CoreError> {
        check_config(&self.config)?;
        check_setup(setup)?;

        let dt = 1.0 / self.config.steps_per_year;
        let drift = -0.5 * setup.volatility * setup.volatility * dt;
        let diffusion = setup.volatility * dt.sqrt();
        let n = self.config.n_paths;
        let run = |i: usize| self.run_path(setup, drift, diffusion, seed, i);

        let outcomes = if n >= self.config.parallel_threshold {
            (0..n).into_par_iter().map(run).collect()
        } else {
            (0..n).map(run).collect()
        };
        Ok(outcomes)
    }

    fn run_path(
        &self,
        setup: &TradeSetup,
        drift: f64,
        diffusion: f64,
        seed: u64,
        path: usize,
    ) -> PathOutcome {
        let sign = setup.direction.sign();
        let mut rng = path_rng(seed, path);
        let mut price = setup.entry_price;

        for step in 1..=self.config.horizon_steps {
            let z: f64 = rng.sample(StandardNormal);
            price *= (drift + diffusion * z).exp();

            let (stop_hit, target_hit) = if sign >= 0.0 {
                (price <= setup.stop_loss, price >= setup.take_profit)
            } else {
                (price >= setup.stop_loss, price <= setup.take_profit)
            };
            if stop_hit {
                return PathOutcome {
                    pnl: (setup.stop_loss - setup.entry_price) * sign * setup.position_size,
                    exit: PathExit::StopLoss,
                    steps: step,
                };
            }
            if target_hit {
                return PathOutcome {
                    pnl: (setup.take_profit - setup.entry_price) * sign * setup.position_size,
                    exit: PathExit::TakeProfit,
                    steps: step,
                };
            }
        }

        PathOutcome {
            pnl: (price - setup.entry_price) * sign * setup.position_size,
            exit: PathExit::Horizon,
            steps: self.config.horizon_steps,
        }
    }

    fn summarize(&self, outcomes: &[PathOutcome], seed: u64) -> MonteCarloSummary {
        let n = outcomes.len();
        let mut pnls: Vec<f64> = outcomes.iter().map(|o| o.pnl).collect();

        let wins = pnls.iter().filter(|&&p| p > 0.0).count();
        let mean = pnls.iter().sum::<f64>() / n as f64;
        let std = if n > 1 {
            let var = pnls.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            var.sqrt()
        } else {
            0.0
        };
        let sharpe = if std > 1e-12 { mean / std } else { 0.0 };

        let gross_profit: f64 = pnls.iter().filter(|&&p| p > 0.0).sum();
        let gross_loss: f64 = pnls.iter().filter(|&&p| p < 0.0).map(|p| p.abs()).sum();
        let profit_factor = if gross_loss > 0.0 {
            (gross_profit / gross_loss).min(PROFIT_FACTOR_CAP)
        } else if gross_profit > 0.0 {
            PROFIT_FACTOR_CAP
        } else {
            0.0
        };

        pnls.sort_by(|a, b| a.total_cmp(b));
        let median = percentile_sorted(&pnls, 50.0);
        let var = percentile_sorted(&pnls, self.config.var_percentile);
        let tail: Vec<f64> = pnls.iter().copied().filter(|&p| p <= var).collect();
        let cvar = if tail.is_empty() {
            var
        } else {
            tail.iter().sum::<f64>() / tail.len() as f64
        };

        MonteCarloSummary {
            n_paths: n,
            seed,
            win_rate: wins as f64 / n as f64,
            mean_pnl: mean,
            median_pnl: median,
            std_pnl: std,
            sharpe,
            profit_factor,
            var,
            cvar,
            stop_hits: outcomes.iter().filter(|o| o.exit == PathExit::StopLoss).count(),
            target_hits: outcomes.iter().filter(|o| o.exit == PathExit::TakeProfit).count(),
        }
    }
}

fn check_config(config: &MonteCarloConfig) -> Result<(), CoreError> {
    let reason = if config.n_paths == 0 {
        "n_paths must be > 0".to_string()
    } else if !(config.steps_per_year.is_finite() && config.steps_per_year > 0.0) {
        format!("steps_per_year must be positive, got {}", config.steps_per_year)
    } else {
        return Ok(());
    };
    Err(CoreError::InvalidConfig {
        component: Component::MonteCarloRiskSimulator,
        reason,
    })
}

fn check_setup(setup: &TradeSetup) -> Result<(), CoreError> {
    let c = Component::MonteCarloRiskSimulator;
    if !setup.direction.is_tradeable() {
        return Err(CoreError::InvalidInput {
            component: c,
            reason: format!("cannot simulate a {} trade", setup.direction),
        });
    }
    ensure_positive(c, "entry_price", setup.entry_price)?;
    ensure_finite(c, "stop_loss", setup.stop_loss)?;
    ensure_finite(c, "take_profit", setup.take_profit)?;
    ensure_finite(c, "position_size", setup.position_size)?;
    if !setup.volatility.is_finite() || setup.volatility < 0.0 {
        return Err(CoreError::InvalidVolatility {
            component: c,
            value: setup.volatility,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_setup(volatility: f64) -> TradeSetup {
        TradeSetup {
            direction: Direction::Long,
            entry_price: 100.0,
            stop_loss: 98.0,
            take_profit: 106.0,
            position_size: 10.0,
            volatility,
        }
    }

    fn config(n_paths: usize) -> MonteCarloConfig {
        MonteCarloConfig {
            n_paths,
            ..MonteCarloConfig::default()
        }
    }

    #[test]
    fn zero_volatility_paths_stay_flat() {
        let sim = MonteCarloSimulator::new(config(200));
        let summary = sim.simulate(&long_setup(0.0)).unwrap();
        assert_eq!(summary.win_rate, 0.0);
        assert_eq!(summary.var, 0.0);
        assert_eq!(summary.cvar, 0.0);
        assert_eq!(summary.mean_pnl, 0.0);
        assert_eq!(summary.stop_hits + summary.target_hits, 0);
        assert_eq!(summary.profit_factor, 0.0);
    }

    #[test]
    fn zero_paths_is_a_config_fault() {
        let err = MonteCarloSimulator::new(config(0))
            .simulate(&long_setup(0.3))
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidConfig { component: Component::MonteCarloRiskSimulator, .. }
        ));
    }

    #[test]
    fn zero_steps_per_year_is_a_config_fault() {
        let sim = MonteCarloSimulator::new(MonteCarloConfig {
            steps_per_year: 0.0,
            ..config(10)
        });
        assert!(matches!(
            sim.simulate_paths(&long_setup(0.3), 1),
            Err(CoreError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn same_seed_same_summary() {
        let sim = MonteCarloSimulator::new(config(500));
        let a = sim.simulate_seeded(&long_setup(0.3), 7).unwrap();
        let b = sim.simulate_seeded(&long_setup(0.3), 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seed_different_summary() {
        let sim = MonteCarloSimulator::new(config(500));
        let a = sim.simulate_seeded(&long_setup(0.3), 7).unwrap();
        let b = sim.simulate_seeded(&long_setup(0.3), 8).unwrap();
        assert_ne!(a.mean_pnl, b.mean_pnl);
    }

    #[test]
    fn parallel_matches_sequential() {
        let sequential = MonteCarloSimulator::new(MonteCarloConfig {
            n_paths: 400,
            parallel_threshold: usize::MAX,
            ..MonteCarloConfig::default()
        });
        let parallel = MonteCarloSimulator::new(MonteCarloConfig {
            n_paths: 400,
            parallel_threshold: 1,
            ..MonteCarloConfig::default()
        });
        assert_eq!(
            sequential.simulate(&long_setup(0.4)).unwrap(),
            parallel.simulate(&long_setup(0.4)).unwrap()
        );
    }

    #[test]
    fn barrier_exits_are_at_barrier_levels() {
        let sim = MonteCarloSimulator::new(config(300));
        let outcomes = sim.simulate_paths(&long_setup(0.8), 3).unwrap();
        for o in &outcomes {
            match o.exit {
                PathExit::StopLoss => assert!((o.pnl + 20.0).abs() < 1e-9),
                PathExit::TakeProfit => assert!((o.pnl - 60.0).abs() < 1e-9),
                PathExit::Horizon => assert!(o.pnl > -20.0 && o.pnl < 60.0),
            }
        }
    }

    #[test]
    fn short_barriers_are_mirrored() {
        let sim = MonteCarloSimulator::new(config(300));
        let setup = TradeSetup {
            direction: Direction::Short,
            entry_price: 100.0,
            stop_loss: 102.0,
            take_profit: 94.0,
            position_size: 10.0,
            volatility: 0.8,
        };
        for o in sim.simulate_paths(&setup, 3).unwrap() {
            match o.exit {
                PathExit::StopLoss => assert!((o.pnl + 20.0).abs() < 1e-9),
                PathExit::TakeProfit => assert!((o.pnl - 60.0).abs() < 1e-9),
                PathExit::Horizon => {}
            }
        }
    }

    #[test]
    fn cvar_not_above_var() {
        let sim = MonteCarloSimulator::new(config(1000));
        let s = sim.simulate(&long_setup(0.5)).unwrap();
        assert!(s.cvar <= s.var + 1e-12);
        assert!(s.var <= s.median_pnl);
    }

    #[test]
    fn negative_volatility_is_an_error() {
        let sim = MonteCarloSimulator::new(config(10));
        let err = sim.simulate(&long_setup(-0.1)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidVolatility {
                component: Component::MonteCarloRiskSimulator,
                ..
            }
        ));
        assert!(sim.simulate(&long_setup(f64::NAN)).is_err());
    }

    #[test]
    fn neutral_direction_is_rejected() {
        let sim = MonteCarloSimulator::new(config(10));
        let mut setup = long_setup(0.2);
        setup.direction = Direction::Neutral;
        assert!(sim.simulate(&setup).is_err());
    }

    #[test]
    fn percentile_interpolates() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile_sorted(&data, 50.0), 3.0);
        assert!((percentile_sorted(&data, 25.0) - 2.0).abs() < 1e-12);
        assert!((percentile_sorted(&data, 10.0) - 1.4).abs() < 1e-12);
        assert_eq!(percentile_sorted(&[], 50.0), 0.0);
    }
}
