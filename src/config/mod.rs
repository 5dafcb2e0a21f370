//! Engine configuration.
//!
//! Defaults reproduce the reference calibration of every calculator. A JSON
//! file named by `CHAINSIGHT_CONFIG` may replace any section, and individual
//! `CHAINSIGHT_*` environment variables override single values on top.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub const CONFIG_PATH_VAR: &str = "CHAINSIGHT_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Deployment environment, read from `ENVIRONMENT` (defaults to `sandbox`).
pub fn get_environment() -> String {
    std::env::var("ENVIRONMENT")
        .unwrap_or_else(|_| "sandbox".to_string())
        .to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiParams {
    pub period: usize,
    pub overbought: f64,
    pub oversold: f64,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self {
            period: 14,
            overbought: 70.0,
            oversold: 30.0,
        }
    }
}

/// GARCH(1,1) calibration. These are placeholder values rather than
/// maximum-likelihood estimates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GarchParams {
    pub p: usize,
    pub q: usize,
    pub omega: f64,
    pub alpha: f64,
    pub beta: f64,
    /// Substituted when `alpha + beta >= 1`.
    pub fallback_alpha: f64,
    pub fallback_beta: f64,
    pub min_observations: usize,
    pub periods_per_year: f64,
}

impl Default for GarchParams {
    fn default() -> Self {
        Self {
            p: 1,
            q: 1,
            omega: 1e-5,
            alpha: 0.1,
            beta: 0.85,
            fallback_alpha: 0.05,
            fallback_beta: 0.9,
            min_observations: 100,
            periods_per_year: 252.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArimaParams {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub min_observations: usize,
    /// Expected return beyond which a buy/sell is emitted.
    pub signal_band: f64,
}

impl Default for ArimaParams {
    fn default() -> Self {
        Self {
            p: 2,
            d: 1,
            q: 2,
            min_observations: 50,
            signal_band: 0.02,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogRegressionParams {
    pub degree: usize,
    pub band_sigmas: f64,
    pub min_points: usize,
}

impl Default for LogRegressionParams {
    fn default() -> Self {
        Self {
            degree: 2,
            band_sigmas: 2.0,
            min_points: 10,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphParams {
    /// Upper bound on the neighbor set examined per node when clustering.
    pub max_neighbors: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RlParams {
    pub state_size: usize,
    pub epsilon: f64,
    pub epsilon_min: f64,
    pub epsilon_decay: f64,
    pub learning_rate: f64,
    pub discount: f64,
    pub memory_capacity: usize,
    /// Bins per state dimension.
    pub bins_per_dim: usize,
    pub state_low: f64,
    pub state_high: f64,
    /// Q-table rows; defaults to `bins_per_dim ^ state_size` capped at `MAX_TABLE_ROWS`.
    pub table_rows: Option<usize>,
    pub seed: Option<u64>,
}

impl Default for RlParams {
    fn default() -> Self {
        Self {
            state_size: 10,
            epsilon: 1.0,
            epsilon_min: 0.01,
            epsilon_decay: 0.995,
            learning_rate: 0.001,
            discount: 0.95,
            memory_capacity: 10_000,
            bins_per_dim: 3,
            state_low: -1.0,
            state_high: 1.0,
            table_rows: None,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentBackendKind {
    Lexicon,
    Disabled,
}

impl FromStr for SentimentBackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lexicon" => Ok(SentimentBackendKind::Lexicon),
            "disabled" | "none" | "off" => Ok(SentimentBackendKind::Disabled),
            other => Err(ConfigError::InvalidValue {
                key: "CHAINSIGHT_SENTIMENT_BACKEND".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    pub backend: SentimentBackendKind,
    /// Optional JSON lexicon replacing the built-in word lists.
    pub lexicon_path: Option<PathBuf>,
    pub buy_threshold: f64,
    pub sell_threshold: f64,
    /// Seed for the degraded-mode sampler.
    pub seed: Option<u64>,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            backend: SentimentBackendKind::Lexicon,
            lexicon_path: None,
            buy_threshold: 0.3,
            sell_threshold: -0.3,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub rsi: RsiParams,
    pub garch: GarchParams,
    pub arima: ArimaParams,
    pub log_regression: LogRegressionParams,
    pub graph: GraphParams,
    pub rl: RlParams,
    pub sentiment: SentimentConfig,
}

impl EngineConfig {
    /// Load `.env`, the optional JSON file and environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Apply `CHAINSIGHT_*` overrides resolved through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("CHAINSIGHT_RSI_PERIOD") {
            self.rsi.period = parse_value("CHAINSIGHT_RSI_PERIOD", &v)?;
        }
        if let Some(v) = lookup("CHAINSIGHT_GARCH_OMEGA") {
            self.garch.omega = parse_value("CHAINSIGHT_GARCH_OMEGA", &v)?;
        }
        if let Some(v) = lookup("CHAINSIGHT_GARCH_ALPHA") {
            self.garch.alpha = parse_value("CHAINSIGHT_GARCH_ALPHA", &v)?;
        }
        if let Some(v) = lookup("CHAINSIGHT_GARCH_BETA") {
            self.garch.beta = parse_value("CHAINSIGHT_GARCH_BETA", &v)?;
        }
        if let Some(v) = lookup("CHAINSIGHT_GRAPH_MAX_NEIGHBORS") {
            self.graph.max_neighbors = Some(parse_value("CHAINSIGHT_GRAPH_MAX_NEIGHBORS", &v)?);
        }
        if let Some(v) = lookup("CHAINSIGHT_RL_SEED") {
            self.rl.seed = Some(parse_value("CHAINSIGHT_RL_SEED", &v)?);
        }
        if let Some(v) = lookup("CHAINSIGHT_SENTIMENT_BACKEND") {
            self.sentiment.backend = v.parse()?;
        }
        if let Some(v) = lookup("CHAINSIGHT_SENTIMENT_LEXICON") {
            self.sentiment.lexicon_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("CHAINSIGHT_SENTIMENT_SEED") {
            self.sentiment.seed = Some(parse_value("CHAINSIGHT_SENTIMENT_SEED", &v)?);
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
