/// CLI configuration
use crate::error::{CliError, Result};
use preludio_playback::PlayerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = "preludio.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CliConfig {
    /// Directory the player snapshot is written to
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,

    #[serde(default)]
    pub player: PlayerConfig,

    #[serde(default)]
    pub simulation: SimulationSettings,
}

/// Behavior of the simulated embed
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationSettings {
    /// Clock step of `wait`
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Delay until the embed reports ready
    #[serde(default = "default_bootstrap_ms")]
    pub bootstrap_ms: u64,

    /// Length of videos missing from `media`; unset makes them fail to load
    #[serde(default = "default_duration_secs")]
    pub default_duration_secs: Option<f64>,

    /// Known videos and their length
    #[serde(default)]
    pub media: Vec<MediaEntry>,
}

/// A video known to the simulated embed
///
/// Kept as a list since table keys would lose their case.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MediaEntry {
    pub id: String,
    pub duration_secs: f64,
}

impl SimulationSettings {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn bootstrap(&self) -> Duration {
        Duration::from_millis(self.bootstrap_ms)
    }
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `preludio.toml` in the
    /// working directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (PRELUDIO_PLAYER__SKIP_SECONDS=5)
        settings = settings.add_source(
            config::Environment::with_prefix("PRELUDIO")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.player.storage_key.trim().is_empty() {
            return Err(CliError::Config("player.storage_key is empty".to_string()));
        }
        if self.player.default_volume > 100 {
            return Err(CliError::Config(format!(
                "player.default_volume must be 0-100 (got {})",
                self.player.default_volume
            )));
        }
        if let Some(entry) = self
            .simulation
            .media
            .iter()
            .find(|m| !m.duration_secs.is_finite() || m.duration_secs <= 0.0)
        {
            return Err(CliError::Config(format!(
                "simulation media {} must have a positive length (got {})",
                entry.id, entry.duration_secs
            )));
        }

        Ok(())
    }
}

// Default values
fn default_state_dir() -> PathBuf {
    PathBuf::from("./data/state")
}

fn default_tick_ms() -> u64 {
    100
}

fn default_bootstrap_ms() -> u64 {
    300
}

fn default_duration_secs() -> Option<f64> {
    Some(600.0)
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            bootstrap_ms: default_bootstrap_ms(),
            default_duration_secs: default_duration_secs(),
            media: Vec::new(),
        }
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            player: PlayerConfig::default(),
            simulation: SimulationSettings::default(),
        }
    }
}
