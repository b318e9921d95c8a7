// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Configuration utilities

use crate::cron::{self, PropertySource, ValidationError};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub trait ConfigFile: Sized + Default + for<'de> Deserialize<'de> + Serialize {
    fn config_path() -> PathBuf;

    fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create config dir: {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialize config")?;

        std::fs::write(path, content)
            .with_context(|| format!("failed to write config: {}", path.display()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub csv: CsvConfig,
    pub colors: ColorConfig,
    /// Job name to cron expression
    pub schedules: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    pub delimiter: char,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub enabled: bool,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self { delimiter: crate::csv::DEFAULT_DELIMITER }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl ConfigFile for Config {
    fn config_path() -> PathBuf {
        get_config_dir().join("svckit.json")
    }
}

impl Config {
    /// Validate every schedule as a cron expression
    pub fn validate(&self) -> Result<(), ValidationError> {
        for name in self.schedules.keys() {
            cron::validate(self, &format!("schedules.{}", name), "")?;
        }
        Ok(())
    }
}

impl PropertySource for Config {
    fn get_string(&self, name: &str) -> String {
        match serde_json::to_value(self) {
            Ok(value) => value.get_string(name),
            Err(_) => String::new(),
        }
    }
}

/// Get system configuration directory
pub fn get_config_dir() -> PathBuf {
    PathBuf::from("/etc/svckit")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.csv.delimiter, ';');
        assert!(config.colors.enabled);
        assert!(config.schedules.is_empty());
        assert_eq!(Config::config_path(), PathBuf::from("/etc/svckit/svckit.json"));
    }

    #[test]
    fn test_load_missing_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("none.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/svckit.json");

        let mut config = Config::default();
        config.csv.delimiter = ',';
        config.schedules.insert("backup".into(), "0 3 * * *".into());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("svckit.json");
        std::fs::write(&path, r#"{"colors":{"enabled":false}}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(!config.colors.enabled);
        assert_eq!(config.csv.delimiter, ';');
    }

    #[test]
    fn test_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("svckit.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().starts_with("failed to parse config"));
    }

    #[test]
    fn test_validate_schedules() {
        let mut config = Config::default();
        config.schedules.insert("backup".into(), "0 3 * * *".into());
        config.schedules.insert("idle".into(), String::new());
        assert_eq!(config.validate(), Ok(()));

        config.schedules.insert("broken".into(), "* * *".into());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("schedules.broken"));
        assert_eq!(config.get_string("schedules.backup"), "0 3 * * *");
    }
}
