//! Configuration loading and management
//!
//! Handles parsing of `config.toml`, resolved from an explicit path or
//! the platform config directory. Every field has a default so a missing
//! file is a valid configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::repository::IntegrityMode;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory override; platform data dir when unset
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Language code for human output
    #[serde(default = "default_language")]
    pub language: String,

    /// Backup configuration
    #[serde(default)]
    pub backup: BackupConfig,

    /// Startup integrity sweep configuration
    #[serde(default)]
    pub integrity: IntegrityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            language: default_language(),
            backup: BackupConfig::default(),
            integrity: IntegrityConfig::default(),
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

/// Backup-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Whether the backup slot is refreshed after mutating commands
    #[serde(default = "default_backup_enabled")]
    pub enabled: bool,

    /// Backup interval / maximum slot age, in minutes
    #[serde(default = "default_backup_interval")]
    pub interval_minutes: u64,
}

fn default_backup_enabled() -> bool {
    true
}

fn default_backup_interval() -> u64 {
    5
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: default_backup_enabled(),
            interval_minutes: default_backup_interval(),
        }
    }
}

impl BackupConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.saturating_mul(60))
    }
}

/// Integrity sweep configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntegrityConfig {
    /// `repair` fixes orphaned tasks, `warn` only reports them, `off`
    /// skips the sweep entirely
    #[serde(default)]
    pub mode: IntegrityMode,
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist and parse. Without one, the platform
    /// config location is tried and a missing file yields the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::InvalidConfig(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                path.to_path_buf()
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Config::default()),
            },
        };

        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Platform config file location (`<config dir>/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "tasktogo").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Resolve the data directory: CLI override, then config, then the
    /// platform data directory.
    pub fn resolve_data_dir(&self, cli_override: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = cli_override {
            return Ok(dir);
        }
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        ProjectDirs::from("", "", "tasktogo")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or(Error::NoDataDir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.language, "en");
        assert!(config.backup.enabled);
        assert_eq!(config.backup.interval_minutes, 5);
        assert_eq!(config.backup.interval(), Duration::from_secs(300));
        assert_eq!(config.integrity.mode, IntegrityMode::Repair);
    }

    #[test]
    fn parses_partial_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
language = "it"

[integrity]
mode = "warn"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.language, "it");
        assert_eq!(config.integrity.mode, IntegrityMode::Warn);
        // Unspecified sections keep their defaults
        assert!(config.backup.enabled);
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let err = Config::load(Some(Path::new("/no/such/config.toml"))).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn cli_override_wins_data_dir() {
        let config = Config {
            data_dir: Some(PathBuf::from("/from/config")),
            ..Config::default()
        };
        let resolved = config
            .resolve_data_dir(Some(PathBuf::from("/from/cli")))
            .unwrap();
        assert_eq!(resolved, PathBuf::from("/from/cli"));

        let resolved = config.resolve_data_dir(None).unwrap();
        assert_eq!(resolved, PathBuf::from("/from/config"));
    }
}
