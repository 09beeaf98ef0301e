use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::player::types::LogLevel;
use crate::player::PlayerProps;

/// Crate-level configuration: which backend to instantiate and the default
/// property values a new player starts from.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub playback: PlaybackConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    #[serde(default = "default_backend")]
    pub backend: String,

    #[serde(default)]
    pub autoplay: bool,

    #[serde(default = "default_true")]
    pub live_low_latency: bool,

    #[serde(default = "default_progress_interval")]
    pub progress_interval: f64,

    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_backend() -> String {
    "shim".to_string()
}

fn default_true() -> bool {
    true
}

fn default_progress_interval() -> f64 {
    1.0
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            autoplay: false,
            live_low_latency: default_true(),
            progress_interval: default_progress_interval(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            debug!("Loading config from {:?}", config_path);
            let contents =
                fs::read_to_string(config_path).context("Failed to read config file")?;
            let config: Config =
                toml::from_str(&contents).context("Failed to parse config file")?;
            info!("Config loaded successfully");
            Ok(config)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, contents).context("Failed to write config file")?;

        debug!("Config saved to {:?}", config_path);
        Ok(())
    }

    /// The property set a new player starts from.
    pub fn initial_props(&self) -> PlayerProps {
        PlayerProps {
            autoplay: self.playback.autoplay,
            live_low_latency: self.playback.live_low_latency,
            progress_interval: self.playback.progress_interval,
            log_level: self.playback.log_level,
            ..PlayerProps::default()
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to get config directory")?;
        Ok(config_dir.join("ivs-player").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn round_trips_through_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.playback.autoplay = true;
        config.playback.progress_interval = 0.5;
        config.playback.log_level = LogLevel::Debug;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.playback.backend, "shim");
        assert!(loaded.playback.autoplay);
        assert_eq!(loaded.playback.progress_interval, 0.5);
        assert_eq!(loaded.playback.log_level, LogLevel::Debug);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.playback.backend, "shim");
        assert!(config.playback.live_low_latency);
    }

    #[test]
    fn initial_props_reflect_playback_defaults() {
        let mut config = Config::default();
        config.playback.autoplay = true;
        config.playback.progress_interval = 2.0;

        let props = config.initial_props();
        assert!(props.autoplay);
        assert_eq!(props.progress_interval, 2.0);
        assert!(props.stream_url.is_none());
    }
}
