//! Serializable backtest configuration.
//!
//! A `BacktestConfig` captures everything needed to reproduce a replay:
//! - Risk limits (`RiskParameters`)
//! - Composer settings (fusion weights, direction band, sizing, Monte Carlo)
//! - Simulation settings (capital, volatility estimate, costs, seeds)

use serde::{Deserialize, Serialize};
use std::path::Path;

use fusionlab_core::config::{load_toml_file, ConfigError};
use fusionlab_core::{ComposerConfig, RiskParameters};

/// Replay settings that are not part of the decision policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub initial_capital: f64,
    /// Bars of log returns used for the realized volatility estimate.
    pub volatility_lookback: usize,
    /// Lower bound on the annualized volatility fed to the composer.
    pub volatility_floor: f64,
    /// Annualized volatility used until `volatility_lookback` returns exist.
    pub default_volatility: f64,
    /// Commission per leg, in bps of notional.
    pub commission_bps: f64,
    /// Close positions after this many bars. `None` disables the time stop.
    pub max_holding_bars: Option<usize>,
    /// Fraction of capital committed per position in vectorized mode.
    pub vectorized_position_pct: f64,
    /// Master seed for per-decision Monte Carlo seeds.
    pub master_seed: u64,
    /// Bars per parallel chunk when precomputing signals.
    pub parallel_chunk: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_capital: 100_000.0,
            volatility_lookback: 20,
            volatility_floor: 0.05,
            default_volatility: 0.20,
            commission_bps: 0.0,
            max_holding_bars: None,
            vectorized_position_pct: 0.25,
            master_seed: 42,
            parallel_chunk: 1024,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(invalid("simulation.initial_capital", "must be positive"));
        }
        if self.volatility_lookback < 2 {
            return Err(invalid("simulation.volatility_lookback", "must be >= 2"));
        }
        if !(self.volatility_floor.is_finite() && self.volatility_floor > 0.0) {
            return Err(invalid("simulation.volatility_floor", "must be positive"));
        }
        if !(self.default_volatility.is_finite() && self.default_volatility > 0.0) {
            return Err(invalid("simulation.default_volatility", "must be positive"));
        }
        if !(self.commission_bps.is_finite() && self.commission_bps >= 0.0) {
            return Err(invalid("simulation.commission_bps", "must be >= 0"));
        }
        if self.max_holding_bars == Some(0) {
            return Err(invalid("simulation.max_holding_bars", "must be >= 1 when set"));
        }
        let pct = self.vectorized_position_pct;
        if !(pct.is_finite() && pct > 0.0 && pct <= 1.0) {
            return Err(invalid(
                "simulation.vectorized_position_pct",
                format!("must be in (0, 1], got {pct}"),
            ));
        }
        if self.parallel_chunk == 0 {
            return Err(invalid("simulation.parallel_chunk", "must be > 0"));
        }
        Ok(())
    }
}

/// Complete configuration for one replay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub risk: RiskParameters,
    pub composer: ComposerConfig,
    pub simulation: SimulationConfig,
}

impl BacktestConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = load_toml_file(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.risk.validate()?;
        self.composer.validate()?;
        self.simulation.validate()
    }

    /// Deterministic BLAKE3 hash of the canonical JSON form.
    ///
    /// Two replays with identical configs share a fingerprint.
    pub fn fingerprint(&self) -> Result<String, ConfigError> {
        let mut hasher = blake3::Hasher::new();
        serde_json::to_writer(&mut hasher, self)
            .map_err(|e| ConfigError::Fingerprint(e.to_string()))?;
        Ok(hasher.finalize().to_hex().to_string())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        BacktestConfig::default().validate().unwrap();
    }

    #[test]
    fn sectioned_toml_overrides_defaults() {
        let toml = r#"
[risk]
stop_loss_pct = 0.03

[composer.weights]
energy = 0.5
liquidity = 0.25
sentiment = 0.25

[composer.monte_carlo]
n_paths = 200

[simulation]
initial_capital = 50000.0
max_holding_bars = 10
"#;
        let config = BacktestConfig::from_toml(toml).unwrap();
        assert_eq!(config.risk.stop_loss_pct, 0.03);
        assert_eq!(config.risk.take_profit_pct, 0.06);
        assert_eq!(config.composer.weights.energy, 0.5);
        assert_eq!(config.composer.monte_carlo.n_paths, 200);
        assert_eq!(config.composer.monte_carlo.horizon_steps, 20);
        assert_eq!(config.simulation.initial_capital, 50_000.0);
        assert_eq!(config.simulation.max_holding_bars, Some(10));
    }

    #[test]
    fn invalid_simulation_value_is_rejected() {
        let err = BacktestConfig::from_toml("[simulation]\ninitial_capital = -1.0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "simulation.initial_capital",
                ..
            }
        ));
    }

    #[test]
    fn invalid_risk_value_is_rejected() {
        assert!(BacktestConfig::from_toml("[risk]\nmax_position_pct = 2.0\n").is_err());
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let a = BacktestConfig::default();
        let b = BacktestConfig::default();
        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        assert_eq!(a.fingerprint().unwrap().len(), 64);
    }

    #[test]
    fn fingerprint_hashes_the_canonical_json() {
        let config = BacktestConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(
            config.fingerprint().unwrap(),
            blake3::hash(json.as_bytes()).to_hex().to_string()
        );
    }

    #[test]
    fn fingerprint_changes_with_config() {
        let a = BacktestConfig::default();
        let mut b = a.clone();
        b.simulation.master_seed = 7;
        assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[simulation]").unwrap();
        writeln!(file, "commission_bps = 1.5").unwrap();
        let config = BacktestConfig::from_file(file.path()).unwrap();
        assert_eq!(config.simulation.commission_bps, 1.5);
    }
}
