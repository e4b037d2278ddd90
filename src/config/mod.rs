//! Engine configuration persisted next to the ledger data.

use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::errors::Result;
use crate::storage::json_backend::write_atomic;
use crate::utils::{app_data_dir, ensure_dir};

const CONFIG_FILE: &str = "config.json";

/// User-level engine settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Display label for amounts; the engine itself is currency-agnostic.
    pub base_currency: String,
    /// How many backup snapshots to keep per ledger.
    pub backup_retention: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_opened_ledger: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_currency: "USD".into(),
            backup_retention: 5,
            data_dir: None,
            last_opened_ledger: None,
        }
    }
}

/// Loads and saves the engine configuration with atomic writes.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        Ok(Self {
            path: base.join(CONFIG_FILE),
        })
    }

    /// Loads the stored configuration, falling back to defaults when none
    /// has been written yet.
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let temp = TempDir::new().expect("temp dir");
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        assert_eq!(manager.load().unwrap(), Config::default());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let temp = TempDir::new().expect("temp dir");
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let config = Config {
            base_currency: "EUR".into(),
            backup_retention: 2,
            data_dir: None,
            last_opened_ledger: Some("household".into()),
        };
        manager.save(&config).expect("save config");
        assert_eq!(manager.load().unwrap(), config);
    }
}
