//! Serializable configuration for the fusion core.
//!
//! Every struct has documented defaults and `#[serde(default)]`, so a TOML
//! file only needs to list the values it overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("failed to serialize config for fingerprinting: {0}")]
    Fingerprint(String),
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be a positive number, got {value}")))
    }
}

fn check_fraction(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be in (0, 1], got {value}")))
    }
}

/// Read a TOML file into any deserializable config type.
pub fn load_toml_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

// ─── Risk parameters ─────────────────────────────────────────────────

/// Position/portfolio caps and risk tolerances. Loaded once per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskParameters {
    /// Hard ceiling on position notional (currency).
    pub max_position_size: f64,
    /// Maximum position notional as a fraction of account value.
    pub max_position_pct: f64,
    /// Maximum total exposure (existing + new) as a fraction of account value.
    pub max_portfolio_exposure_pct: f64,
    /// Annualized volatility target for vol-targeted sizing.
    pub target_volatility: f64,
    /// Multiplier applied to the full Kelly fraction.
    pub kelly_fraction: f64,
    /// Maximum tolerated movement energy.
    pub max_movement_energy: f64,
    /// Maximum tolerated slippage + impact, in bps.
    pub max_cost_bps: f64,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
    /// Minimum per-trade Kelly edge before a warning is raised.
    pub min_edge: f64,
}

impl Default for RiskParameters {
    fn default() -> Self {
        Self {
            max_position_size: 100_000.0,
            max_position_pct: 0.25,
            max_portfolio_exposure_pct: 1.0,
            target_volatility: 0.15,
            kelly_fraction: 0.25,
            max_movement_energy: 100.0,
            max_cost_bps: 50.0,
            stop_loss_pct: 0.02,
            take_profit_pct: 0.06,
            min_edge: 0.0,
        }
    }
}

impl RiskParameters {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let params: Self = toml::from_str(content)?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let params: Self = load_toml_file(path)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("max_position_size", self.max_position_size)?;
        check_fraction("max_position_pct", self.max_position_pct)?;
        check_positive("max_portfolio_exposure_pct", self.max_portfolio_exposure_pct)?;
        check_positive("target_volatility", self.target_volatility)?;
        check_fraction("kelly_fraction", self.kelly_fraction)?;
        check_positive("max_movement_energy", self.max_movement_energy)?;
        check_positive("max_cost_bps", self.max_cost_bps)?;
        check_positive("stop_loss_pct", self.stop_loss_pct)?;
        if self.stop_loss_pct >= 1.0 {
            return Err(invalid("stop_loss_pct", "must be < 1.0"));
        }
        check_positive("take_profit_pct", self.take_profit_pct)?;
        if !self.min_edge.is_finite() {
            return Err(invalid("min_edge", "must be finite"));
        }
        Ok(())
    }
}

// ─── Composer sub-configs ────────────────────────────────────────────

/// Weights for the composite signal. Normalized to sum to one on use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionWeights {
    pub energy: f64,
    pub liquidity: f64,
    pub sentiment: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            energy: 0.4,
            liquidity: 0.3,
            sentiment: 0.3,
        }
    }
}

/// Thresholds for the direction rule table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionConfig {
    /// `|composite|` below this is NEUTRAL.
    pub neutral_band: f64,
}

impl Default for DirectionConfig {
    fn default() -> Self {
        Self { neutral_band: 0.2 }
    }
}

/// Sizing knobs that are not risk limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingConfig {
    /// Below this many historical returns Kelly falls back to vol targeting.
    pub kelly_min_samples: usize,
    /// Most recent returns considered by Kelly.
    pub kelly_lookback: usize,
    /// Elasticity at or above which energy-aware sizing is not dampened.
    pub min_elasticity: f64,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            kelly_min_samples: 20,
            kelly_lookback: 100,
            min_elasticity: 1.0,
        }
    }
}

/// Monte Carlo risk simulation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    pub enabled: bool,
    pub n_paths: usize,
    /// Steps per path (daily steps).
    pub horizon_steps: usize,
    /// Steps per year used to scale annualized volatility.
    pub steps_per_year: f64,
    /// Lower-tail percentile used for VaR (5.0 = 5th percentile).
    pub var_percentile: f64,
    pub seed: u64,
    /// Paths fan out over the thread pool at or above this count.
    pub parallel_threshold: usize,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            n_paths: 1000,
            horizon_steps: 20,
            steps_per_year: 252.0,
            var_percentile: 5.0,
            seed: 42,
            parallel_threshold: 256,
        }
    }
}

/// Everything the policy composer needs besides risk parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    pub weights: FusionWeights,
    pub direction: DirectionConfig,
    pub sizing: SizingConfig,
    pub monte_carlo: MonteCarloConfig,
}

impl ComposerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = self.weights;
        for (field, value) in [
            ("weights.energy", w.energy),
            ("weights.liquidity", w.liquidity),
            ("weights.sentiment", w.sentiment),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, format!("must be finite and >= 0, got {value}")));
            }
        }
        if w.energy + w.liquidity + w.sentiment <= 0.0 {
            return Err(invalid("weights", "at least one weight must be positive"));
        }
        let band = self.direction.neutral_band;
        if !band.is_finite() || !(0.0..1.0).contains(&band) {
            return Err(invalid("direction.neutral_band", format!("must be in [0, 1), got {band}")));
        }
        if self.sizing.kelly_min_samples < 2 {
            return Err(invalid("sizing.kelly_min_samples", "must be >= 2"));
        }
        if self.sizing.kelly_lookback < self.sizing.kelly_min_samples {
            return Err(invalid(
                "sizing.kelly_lookback",
                "must be >= sizing.kelly_min_samples",
            ));
        }
        check_positive("sizing.min_elasticity", self.sizing.min_elasticity)?;
        let mc = self.monte_carlo;
        if mc.n_paths == 0 {
            return Err(invalid("monte_carlo.n_paths", "must be > 0"));
        }
        if mc.horizon_steps == 0 {
            return Err(invalid("monte_carlo.horizon_steps", "must be > 0"));
        }
        check_positive("monte_carlo.steps_per_year", mc.steps_per_year)?;
        if !(mc.var_percentile > 0.0 && mc.var_percentile < 50.0) {
            return Err(invalid(
                "monte_carlo.var_percentile",
                format!("must be in (0, 50), got {}", mc.var_percentile),
            ));
        }
        Ok(())
    }
}
