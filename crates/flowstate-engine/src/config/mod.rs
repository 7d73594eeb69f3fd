//! Engine configuration types.
//!
//! [`EngineConfig`] aggregates the settings of every engine subsystem. All
//! sections implement `Default` with the engine's fixed constants and a
//! `validate()` method; sections are `#[serde(default)]` so partial TOML files
//! and environment overrides only need to name what they change.

mod adaptation;
mod flow;
mod thresholds;


pub use self::adaptation::{AdaptationConfig, HistoryConfig, PatternConfig, HISTORY_WINDOW};
pub use self::flow::{FlowBands, FlowConfig, PreservationConfig};
pub use self::thresholds::{
    ThresholdSeed, ThresholdsConfig, FLOW_PROTECTION, PATTERN_COHERENCE, TYPE_SAFETY,
};

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{EngineError, EngineResult};

/// Environment variable selecting the environment-specific config file.
pub const ENV_SELECTOR: &str = "FLOWSTATE_ENV";

/// Prefix of environment variable overrides (`FLOWSTATE__FLOW__METRIC_STEP=0.1`).
pub const ENV_PREFIX: &str = "FLOWSTATE";

/// Logging settings consumed by binaries that install a subscriber.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `"info"` or `"flowstate_engine=debug"`.
    pub level: String,
    /// Include file/line in log output.
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            include_location: false,
        }
    }
}

/// Top-level engine configuration.
///
/// # Example
///
/// ```
/// use flowstate_engine::config::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert!(config.validate().is_ok());
/// assert_eq!(config.history.window, 100);
/// assert_eq!(config.preservation.max_backups, 12);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Threshold category seeds.
    pub thresholds: ThresholdsConfig,

    /// History ledger window.
    pub history: HistoryConfig,

    /// Threshold adaptation cycle.
    pub adaptation: AdaptationConfig,

    /// Pattern weight evolution.
    pub patterns: PatternConfig,

    /// Flow-state machine.
    pub flow: FlowConfig,

    /// State preservation ledger.
    pub preservation: PreservationConfig,

    /// Logging.
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Load configuration from files and environment.
    ///
    /// Sources, later ones overriding earlier ones:
    /// 1. `config/default.toml`
    /// 2. `config/{FLOWSTATE_ENV}.toml` (defaults to `development`)
    /// 3. Environment variables with the `FLOWSTATE__` prefix
    pub fn load() -> EngineResult<Self> {
        let env = std::env::var(ENV_SELECTOR).unwrap_or_else(|_| "development".to_string());

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: EngineConfig = builder.build()?.try_deserialize()?;
        config.validate_checked()?;
        Ok(config)
    }

    /// Load configuration from a single TOML file.
    pub fn from_file(path: &Path) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> EngineResult<Self> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| EngineError::ConfigError(format!("Failed to parse config: {}", e)))?;
        config.validate_checked()?;
        Ok(config)
    }

    /// Validate every section, returning the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        self.thresholds.validate()?;
        self.history.validate()?;
        self.adaptation.validate()?;
        self.patterns.validate()?;
        self.flow.validate()?;
        self.preservation.validate()?;
        Ok(())
    }

    /// [`validate`](Self::validate) mapped into an [`EngineError`].
    pub fn validate_checked(&self) -> EngineResult<()> {
        self.validate().map_err(EngineError::ConfigError)
    }
}
