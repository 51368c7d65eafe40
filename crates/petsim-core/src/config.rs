//! Configuration loading and typed config structures for the pet simulation.
//!
//! The configuration lives in `petsim-config.yaml`. Every section and field
//! is optional; a missing file or an empty document yields the defaults,
//! which reproduce the classic game: decay every 3 seconds, quests tick
//! every second, stats start at 50, quests last 20 seconds and pay 20
//! points.

use std::path::Path;
use std::time::Duration;

use petsim_pets::{
    CatalogError, ItemCatalog, ItemDefinition, PetConfig, QuestConfig, STAT_MAX,
};
use serde::Deserialize;

/// Environment variable overriding `engine.decay_interval_ms`.
pub const DECAY_INTERVAL_ENV: &str = "PETSIM_DECAY_INTERVAL_MS";

/// Environment variable overriding `engine.quest_interval_ms`.
pub const QUEST_INTERVAL_ENV: &str = "PETSIM_QUEST_INTERVAL_MS";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value is out of its allowed range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Timer intervals for the background processes.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Pet stat parameters.
    #[serde(default)]
    pub pets: PetConfig,

    /// Quest parameters.
    #[serde(default)]
    pub quests: QuestConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Custom item catalog. `None` uses the built-in items.
    #[serde(default)]
    pub catalog: Option<Vec<ItemDefinition>>,
}

impl SimulationConfig {
    /// Load configuration from a YAML file, then apply environment
    /// overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string. No overrides are applied.
    ///
    /// An empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply [`DECAY_INTERVAL_ENV`] and [`QUEST_INTERVAL_ENV`] from the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set but is not an
    /// unsigned integer.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply interval overrides using `lookup` in place of the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a value is not an unsigned
    /// integer.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(DECAY_INTERVAL_ENV) {
            self.engine.decay_interval_ms = parse_millis(DECAY_INTERVAL_ENV, &raw)?;
        }
        if let Some(raw) = lookup(QUEST_INTERVAL_ENV) {
            self.engine.quest_interval_ms = parse_millis(QUEST_INTERVAL_ENV, &raw)?;
        }
        Ok(())
    }

    /// Check every value is in range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.decay_interval_ms == 0 {
            return Err(invalid("engine.decay_interval_ms must be at least 1"));
        }
        if self.engine.quest_interval_ms == 0 {
            return Err(invalid("engine.quest_interval_ms must be at least 1"));
        }
        if self.pets.initial_stat == 0 || self.pets.initial_stat > STAT_MAX {
            return Err(invalid("pets.initial_stat must be between 1 and 100"));
        }
        if self.pets.decay_per_tick == 0 {
            return Err(invalid("pets.decay_per_tick must be at least 1"));
        }
        if self.quests.target_seconds == 0 {
            return Err(invalid("quests.target_seconds must be at least 1"));
        }
        Ok(())
    }

    /// Build the item catalog: the configured one if present, otherwise
    /// the built-in items.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the configured items are invalid.
    pub fn build_catalog(&self) -> Result<ItemCatalog, CatalogError> {
        self.catalog
            .as_ref()
            .map_or_else(|| Ok(ItemCatalog::builtin()), |defs| {
                ItemCatalog::from_definitions(defs.clone())
            })
    }
}

/// Timer intervals for the background processes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Milliseconds between decay ticks of one pet (default: 3000).
    #[serde(default = "default_decay_interval_ms")]
    pub decay_interval_ms: u64,

    /// Milliseconds between quest ticks (default: 1000).
    #[serde(default = "default_quest_interval_ms")]
    pub quest_interval_ms: u64,
}

impl EngineConfig {
    /// Decay interval as a [`Duration`].
    pub const fn decay_interval(&self) -> Duration {
        Duration::from_millis(self.decay_interval_ms)
    }

    /// Quest interval as a [`Duration`].
    pub const fn quest_interval(&self) -> Duration {
        Duration::from_millis(self.quest_interval_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            decay_interval_ms: default_decay_interval_ms(),
            quest_interval_ms: default_quest_interval_ms(),
        }
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable single-line output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error). `RUST_LOG`
    /// takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn parse_millis(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
        reason: format!("{key}={raw:?} is not a millisecond count: {e}"),
    })
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_owned(),
    }
}

const fn default_decay_interval_ms() -> u64 {
    3000
}

const fn default_quest_interval_ms() -> u64 {
    1000
}

fn default_log_level() -> String {
    String::from("info")
}
