//! Configuration loading and typed config structures for the Quarry agent.
//!
//! The canonical configuration lives in `quarry-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads the file and applies
//! environment overrides. Every field has a default, so an empty file is a
//! valid configuration.

use std::path::{Path, PathBuf};

use quarry_planner::PlannerConfig;
use serde::Deserialize;

use crate::command::Command;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "QUARRY_CONFIG";

/// Environment variable overriding `agent.memory_path`.
pub const MEMORY_ENV: &str = "QUARRY_MEMORY";

/// Config file used when [`CONFIG_ENV`] is not set.
pub const DEFAULT_CONFIG_PATH: &str = "quarry-config.yaml";

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
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level agent configuration.
///
/// Mirrors the structure of `quarry-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QuarryConfig {
    /// Tick loop and persistence settings.
    #[serde(default)]
    pub agent: AgentSettings,

    /// Cost estimator limits and weights.
    #[serde(default)]
    pub planner: PlannerConfig,

    /// Threat, hunger, night and idle triggers.
    #[serde(default)]
    pub triggers: TriggerConfig,

    /// Log filter and output format.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Commands queued when the agent starts.
    #[serde(default)]
    pub startup_commands: Vec<Command>,
}

impl QuarryConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Path of the config file: [`CONFIG_ENV`] if set, else
    /// [`DEFAULT_CONFIG_PATH`].
    pub fn path_from_env() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides looked up through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup(MEMORY_ENV).filter(|p| !p.is_empty()) {
            self.agent.memory_path = PathBuf::from(path);
        }
    }
}

/// Tick loop and persistence settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgentSettings {
    /// Milliseconds between ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Stop after this many ticks (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,

    /// Where agent memory is loaded from and saved to.
    #[serde(default = "default_memory_path")]
    pub memory_path: PathBuf,

    /// Seed for the agent's random choices and the demo world.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Stop the run once the agent is idle with no work queued.
    #[serde(default)]
    pub stop_when_idle: bool,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: 0,
            memory_path: default_memory_path(),
            seed: default_seed(),
            stop_when_idle: false,
        }
    }
}

const fn default_tick_interval_ms() -> u64 {
    50
}

fn default_memory_path() -> PathBuf {
    PathBuf::from("data/quarry-memory.json")
}

const fn default_seed() -> u64 {
    42
}

/// Trigger thresholds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TriggerConfig {
    /// Hostiles closer than this are threats.
    #[serde(default = "default_threat_radius")]
    pub threat_radius: f64,

    /// How far to run from a threat.
    #[serde(default = "default_flee_distance")]
    pub flee_distance: f64,

    /// Below this health the agent flees instead of fighting.
    #[serde(default = "default_flee_health")]
    pub flee_health: f32,

    /// Below this food level the agent eats.
    #[serde(default = "default_hunger_threshold")]
    pub hunger_threshold: u32,

    /// Go to bed at night when a bed is known.
    #[serde(default = "default_sleep_at_night")]
    pub sleep_at_night: bool,

    /// Seconds without work before idle chores start.
    #[serde(default = "default_idle_chores_after_secs")]
    pub idle_chores_after_secs: u64,

    /// Radius of idle wandering and drop collection.
    #[serde(default = "default_wander_radius")]
    pub wander_radius: f64,

    /// Minimum seconds between two firings of the same trigger.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            threat_radius: default_threat_radius(),
            flee_distance: default_flee_distance(),
            flee_health: default_flee_health(),
            hunger_threshold: default_hunger_threshold(),
            sleep_at_night: default_sleep_at_night(),
            idle_chores_after_secs: default_idle_chores_after_secs(),
            wander_radius: default_wander_radius(),
            cooldown_secs: default_cooldown_secs(),
        }
    }
}

const fn default_threat_radius() -> f64 {
    8.0
}

const fn default_flee_distance() -> f64 {
    16.0
}

const fn default_flee_health() -> f32 {
    8.0
}

const fn default_hunger_threshold() -> u32 {
    14
}

const fn default_sleep_at_night() -> bool {
    true
}

const fn default_idle_chores_after_secs() -> u64 {
    10
}

const fn default_wander_radius() -> f64 {
    8.0
}

const fn default_cooldown_secs() -> u64 {
    5
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is not set.
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

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_uses_defaults() {
        let config = QuarryConfig::parse("").unwrap();
        assert_eq!(config.agent.tick_interval_ms, 50);
        assert_eq!(config.planner.max_depth, 20);
        assert_eq!(config.planner.max_iterations, 32);
        assert_eq!(config.triggers.hunger_threshold, 14);
        assert!(config.startup_commands.is_empty());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let yaml = r"
agent:
  max_ticks: 200
  seed: 7
triggers:
  sleep_at_night: false
logging:
  format: json
";
        let config = QuarryConfig::parse(yaml).unwrap();
        assert_eq!(config.agent.max_ticks, 200);
        assert_eq!(config.agent.seed, 7);
        assert_eq!(config.agent.tick_interval_ms, 50);
        assert!(!config.triggers.sleep_at_night);
        assert_eq!(config.triggers.hunger_threshold, 14);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn startup_commands_are_typed() {
        let yaml = r"
startup_commands:
  - command: gather
    item: oak_log
    count: 4
  - command: status
";
        let config = QuarryConfig::parse(yaml).unwrap();
        assert_eq!(
            config.startup_commands,
            vec![
                Command::Gather {
                    item: String::from("oak_log"),
                    count: 4,
                    force: false,
                },
                Command::Status,
            ]
        );
    }

    #[test]
    fn memory_path_override() {
        let mut config = QuarryConfig::default();
        config.apply_overrides(|key| (key == MEMORY_ENV).then(|| String::from("/tmp/m.json")));
        assert_eq!(config.agent.memory_path, PathBuf::from("/tmp/m.json"));

        config.apply_overrides(|_| Some(String::new()));
        assert_eq!(config.agent.memory_path, PathBuf::from("/tmp/m.json"));
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result = QuarryConfig::parse("agent: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn from_file_reads_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quarry-config.yaml");
        std::fs::write(&path, "agent:\n  tick_interval_ms: 5\n").unwrap();
        let config = QuarryConfig::from_file(&path).unwrap();
        assert_eq!(config.agent.tick_interval_ms, 5);

        let missing = QuarryConfig::from_file(&dir.path().join("nope.yaml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn shipped_config_parses() {
        let config = QuarryConfig::parse(include_str!("../../../quarry-config.yaml")).unwrap();
        assert_eq!(config.agent.seed, 42);
        assert_eq!(config.triggers.cooldown_secs, 5);
        assert_eq!(config.startup_commands.len(), 5);
        assert_eq!(config.startup_commands.last(), Some(&Command::Status));
    }
}
