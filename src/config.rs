use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::engine::DEFAULT_TICK_INTERVAL;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    pub data_dir: PathBuf,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_color")]
    pub color: bool,
}

fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL.as_millis() as u64
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_color() -> bool {
    true
}

impl Config {
    /// Loads `config.json` from `data_dir` (or the platform config dir),
    /// writing defaults when the file does not exist yet.
    pub fn new(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.unwrap_or_else(Self::default_data_dir);

        std::fs::create_dir_all(&data_dir).context("Failed to create data directory")?;

        let config_path = Self::path_in(&data_dir);

        if config_path.exists() {
            let config_str =
                std::fs::read_to_string(&config_path).context("Failed to read config.json")?;

            if config_str.trim().is_empty() {
                warn!("Config file is empty, using defaults");
            } else {
                match serde_json::from_str::<Config>(&config_str) {
                    Ok(mut config) => {
                        config.data_dir = data_dir;
                        config.validate()?;
                        return Ok(config);
                    }
                    Err(e) => {
                        warn!("Failed to parse existing config.json: {}, using defaults", e);
                    }
                }
            }

            return Ok(Self::default_config(data_dir));
        }

        let config = Self::default_config(data_dir);
        config.save()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let json_str =
            serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(self.config_file(), json_str).context("Failed to write config.json")?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            anyhow::bail!("tick_interval_ms must be greater than zero");
        }
        Ok(())
    }

    pub fn default_config(data_dir: PathBuf) -> Self {
        Config {
            data_dir,
            tick_interval_ms: default_tick_interval_ms(),
            seed: None,
            log_level: default_log_level(),
            color: default_color(),
        }
    }

    pub fn default_data_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chemtwin")
    }

    pub fn config_file(&self) -> PathBuf {
        Self::path_in(&self.data_dir)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    fn path_in(data_dir: &Path) -> PathBuf {
        data_dir.join("config.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("chemtwin-test-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = scratch_dir();
        let config = Config::new(Some(dir.clone())).unwrap();

        assert_eq!(config.tick_interval_ms, 2000);
        assert_eq!(config.tick_interval(), Duration::from_millis(2000));
        assert_eq!(config.seed, None);
        assert!(config.color);
        assert!(config.config_file().exists());

        let reloaded = Config::new(Some(dir.clone())).unwrap();
        assert_eq!(reloaded, config);

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.json"), r#"{ "seed": 42, "color": false }"#).unwrap();

        let config = Config::new(Some(dir.clone())).unwrap();
        assert_eq!(config.seed, Some(42));
        assert!(!config.color);
        assert_eq!(config.tick_interval_ms, 2000);
        assert_eq!(config.log_level, "info");

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_broken_file_falls_back_to_defaults() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.json"), "{ not json").unwrap();

        let config = Config::new(Some(dir.clone())).unwrap();
        assert_eq!(config, Config::default_config(dir.clone()));

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_zero_interval_rejected() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.json"), r#"{ "tick_interval_ms": 0 }"#).unwrap();

        assert!(Config::new(Some(dir.clone())).is_err());

        std::fs::remove_dir_all(dir).ok();
    }
}
