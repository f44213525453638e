//! FusionLab Runner: historical replay of the policy composer and
//! performance analysis of the result.
//!
//! This crate builds on `fusionlab-core` to provide:
//! - Backtest configuration (risk + composer + simulation) with a fingerprint
//! - The backtest simulator in event-driven, hybrid and vectorized modes
//! - Explicit per-symbol simulation state and parallel multi-symbol replay
//! - Performance metrics, tail statistics and per-signal P&L attribution

pub mod analyzer;
pub mod attribution;
pub mod config;
pub mod context;
pub mod error;
pub mod fills;
pub mod input;
pub mod metrics;
pub mod results;
pub mod simulator;
pub mod tail_metrics;
pub mod vectorized;
pub mod volatility;

#[cfg(test)]
mod test_fixtures;

pub use analyzer::{PerformanceAnalyzer, PerformanceReport};
pub use attribution::{PnlAttribution, SourceAttribution};
pub use config::{BacktestConfig, SimulationConfig};
pub use context::{EquityPoint, SimulationContext};
pub use error::SimulationError;
pub use input::EngineStreams;
pub use metrics::PerformanceMetrics;
pub use results::{BacktestResults, SCHEMA_VERSION};
pub use simulator::{BacktestSimulator, ExecutionMode, SymbolSeries};
pub use tail_metrics::TailMetrics;

pub use fusionlab_core::config::ConfigError;
