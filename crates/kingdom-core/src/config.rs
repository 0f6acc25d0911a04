//! Configuration loading and typed config structures for the engine.
//!
//! The canonical configuration lives in `kingdom-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file.
//!
//! Static game content (resources, buildings, actions) is not part of this
//! file; it is JSON loaded from [`ContentConfig::path`].

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use kingdom_effects::RulesConfig;
use kingdom_types::{BuildingId, EffectDef, PhaseId, PlayerId, ResourceId, StepId};
use serde::Deserialize;

/// Environment variable overriding [`ContentConfig::path`].
pub const CONTENT_PATH_ENV: &str = "KINGDOM_CONTENT";

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

    /// The configuration parsed but describes an unplayable game.
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

/// Top-level engine configuration.
///
/// Mirrors the structure of `kingdom-config.yaml`. Every section is
/// optional; the defaults describe a two-player game with the classic
/// growth / upkeep / main phase cycle.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineConfig {
    /// Rule parameters consulted by effect handlers.
    #[serde(default)]
    pub rules: RulesConfig,

    /// Phase cycle of every player turn.
    #[serde(default = "default_phases")]
    pub phases: Vec<PhaseConfig>,

    /// Players in turn order.
    #[serde(default = "default_players")]
    pub players: Vec<PlayerConfig>,

    /// State every player starts with.
    #[serde(default)]
    pub start: StartConfig,

    /// Session bookkeeping.
    #[serde(default)]
    pub session: SessionConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Where static content is loaded from.
    #[serde(default)]
    pub content: ContentConfig,
}

impl EngineConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// The `KINGDOM_CONTENT` environment variable overrides
    /// `content.path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.content.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check the structural rules the turn clock depends on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.players.is_empty() {
            return Err(invalid("at least one player must be configured"));
        }
        if self.phases.is_empty() {
            return Err(invalid("at least one phase must be configured"));
        }

        let mut players = BTreeSet::new();
        for player in &self.players {
            if !players.insert(player.id.as_str()) {
                return Err(invalid(format!("duplicate player id `{}`", player.id)));
            }
        }

        let mut phases = BTreeSet::new();
        for phase in &self.phases {
            if !phases.insert(phase.id.as_str()) {
                return Err(invalid(format!("duplicate phase id `{}`", phase.id)));
            }
            if phase.steps.is_empty() {
                return Err(invalid(format!("phase `{}` has no steps", phase.id)));
            }
            let mut steps = BTreeSet::new();
            for step in &phase.steps {
                if !steps.insert(step.id.as_str()) {
                    return Err(invalid(format!(
                        "duplicate step id `{}` in phase `{}`",
                        step.id, phase.id
                    )));
                }
            }
        }

        if self.rules.base_land_slots > self.rules.max_slots_per_land {
            return Err(invalid("rules.base_land_slots exceeds rules.max_slots_per_land"));
        }
        Ok(())
    }

    /// Look up a configured phase.
    pub fn phase(&self, id: &str) -> Option<&PhaseConfig> {
        self.phases.iter().find(|phase| phase.id.as_str() == id)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rules: RulesConfig::default(),
            phases: default_phases(),
            players: default_players(),
            start: StartConfig::default(),
            session: SessionConfig::default(),
            logging: LoggingConfig::default(),
            content: ContentConfig::default(),
        }
    }
}

fn invalid(reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.into(),
    }
}

/// One phase of a player turn.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PhaseConfig {
    /// Phase id (`growth`, `upkeep`, `main`).
    pub id: PhaseId,

    /// Whether actions may be performed during this phase.
    #[serde(default)]
    pub action: bool,

    /// Steps in order. Each step runs its effects for the active player.
    #[serde(default = "default_steps")]
    pub steps: Vec<StepConfig>,
}

impl PhaseConfig {
    /// A phase with a single effect-free step of the same name.
    pub fn new(id: impl Into<PhaseId>) -> Self {
        let id = id.into();
        Self {
            steps: vec![StepConfig::new(id.as_str())],
            id,
            action: false,
        }
    }

    /// Mark the phase as an action phase.
    #[must_use]
    pub const fn with_actions(mut self) -> Self {
        self.action = true;
        self
    }

    /// Replace the steps.
    #[must_use]
    pub fn with_steps(mut self, steps: Vec<StepConfig>) -> Self {
        self.steps = steps;
        self
    }
}

/// One step of a phase.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StepConfig {
    /// Step id, unique within its phase.
    pub id: StepId,

    /// Effects applied to the active player when the step runs.
    #[serde(default)]
    pub effects: Vec<EffectDef>,
}

impl StepConfig {
    /// A step without effects.
    pub fn new(id: impl Into<StepId>) -> Self {
        Self {
            id: id.into(),
            effects: Vec::new(),
        }
    }

    /// Replace the effects.
    #[must_use]
    pub fn with_effects(mut self, effects: Vec<EffectDef>) -> Self {
        self.effects = effects;
        self
    }
}

/// A seat at the table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlayerConfig {
    /// Player id, unique within the session.
    pub id: PlayerId,

    /// Display name.
    pub name: String,
}

/// Initial state applied to every player before the first turn.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StartConfig {
    /// Starting resource amounts. Must lie within the resource bounds.
    #[serde(default)]
    pub resources: BTreeMap<ResourceId, f64>,

    /// Number of lands each player starts with.
    #[serde(default)]
    pub lands: u32,

    /// Buildings each player starts with (their passives are granted).
    #[serde(default)]
    pub buildings: Vec<BuildingId>,

    /// Extra effects applied after resources, lands and buildings.
    #[serde(default)]
    pub effects: Vec<EffectDef>,
}

/// Session bookkeeping parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// How many resource changes the recent-gain feed retains.
    #[serde(default = "default_recent_gain_limit")]
    pub recent_gain_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            recent_gain_limit: default_recent_gain_limit(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Location of the static content document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentConfig {
    /// Path of the content JSON, relative to the working directory.
    #[serde(default = "default_content_path")]
    pub path: PathBuf,
}

impl ContentConfig {
    /// Override the content path with `KINGDOM_CONTENT` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Some(val) = std::env::var(CONTENT_PATH_ENV).ok().filter(|val| !val.is_empty()) {
            self.path = PathBuf::from(val);
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            path: default_content_path(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_phases() -> Vec<PhaseConfig> {
    vec![
        PhaseConfig::new("growth"),
        PhaseConfig::new("upkeep"),
        PhaseConfig::new("main").with_actions(),
    ]
}

fn default_steps() -> Vec<StepConfig> {
    vec![StepConfig::new("start")]
}

fn default_players() -> Vec<PlayerConfig> {
    vec![
        PlayerConfig {
            id: PlayerId::new("A"),
            name: "Player A".to_owned(),
        },
        PlayerConfig {
            id: PlayerId::new("B"),
            name: "Player B".to_owned(),
        },
    ]
}

const fn default_recent_gain_limit() -> usize {
    50
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_content_path() -> PathBuf {
    PathBuf::from("content/kingdom.json")
}
