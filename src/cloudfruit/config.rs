use crate::error::{CloudError, Result};
use crate::query::DEFAULT_RESULTS_LIMIT;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";

pub const KEYS: [&str; 3] = ["results-limit", "notifications-granted", "sample-image"];

/// Configuration for cloudfruit, stored in `<container>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Page size of the fruit query
    #[serde(default = "default_results_limit")]
    pub results_limit: usize,

    /// Answer the local notification prompt gives
    #[serde(default = "default_notifications_granted")]
    pub notifications_granted: bool,

    /// Image uploaded with new fruits instead of the bundled one
    #[serde(default)]
    pub sample_image: Option<PathBuf>,
}

fn default_results_limit() -> usize {
    DEFAULT_RESULTS_LIMIT
}

fn default_notifications_granted() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            results_limit: default_results_limit(),
            notifications_granted: default_notifications_granted(),
            sample_image: None,
        }
    }
}

impl AppConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(CloudError::Io)?;
        let config: AppConfig =
            serde_json::from_str(&content).map_err(CloudError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(CloudError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(CloudError::Serialization)?;
        fs::write(config_path, content).map_err(CloudError::Io)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "results-limit" => Some(self.results_limit.to_string()),
            "notifications-granted" => Some(self.notifications_granted.to_string()),
            "sample-image" => Some(
                self.sample_image
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(bundled)".to_string()),
            ),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        match key {
            "results-limit" => {
                let limit: usize = value
                    .parse()
                    .map_err(|_| format!("Invalid results-limit: {}", value))?;
                if limit == 0 {
                    return Err("results-limit must be at least 1".to_string());
                }
                self.results_limit = limit;
            }
            "notifications-granted" => {
                self.notifications_granted = value
                    .parse()
                    .map_err(|_| format!("Invalid notifications-granted: {}", value))?;
            }
            "sample-image" => {
                self.sample_image = match value {
                    "" | "bundled" => None,
                    // Stored absolute so any working directory resolves it.
                    path => Some(
                        std::path::absolute(path)
                            .map_err(|e| format!("Invalid sample-image {}: {}", path, e))?,
                    ),
                };
            }
            other => return Err(format!("Unknown config key: {}", other)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.results_limit, 100);
        assert!(config.notifications_granted);
        assert!(config.sample_image.is_none());
    }

    #[test]
    fn test_load_missing_config() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig::load(temp.path()).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();

        let mut config = AppConfig::default();
        config.set("results-limit", "5").unwrap();
        config.save(temp.path()).unwrap();

        let loaded = AppConfig::load(temp.path()).unwrap();
        assert_eq!(loaded.results_limit, 5);
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = AppConfig::default();
        assert!(config.set("results-limit", "0").is_err());
        assert!(config.set("results-limit", "many").is_err());
        assert!(config.set("notifications-granted", "maybe").is_err());
        assert!(config.set("color", "red").is_err());
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_sample_image_can_be_reset() {
        let mut config = AppConfig::default();
        config.set("sample-image", "/tmp/kiwi.png").unwrap();
        assert_eq!(config.get("sample-image").unwrap(), "/tmp/kiwi.png");
        config.set("sample-image", "bundled").unwrap();
        assert_eq!(config.get("sample-image").unwrap(), "(bundled)");
    }

    #[test]
    fn test_relative_sample_image_is_made_absolute() {
        let mut config = AppConfig::default();
        config.set("sample-image", "kiwi.png").unwrap();

        let stored = config.sample_image.unwrap();
        assert!(stored.is_absolute());
        assert_eq!(stored, std::env::current_dir().unwrap().join("kiwi.png"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let parsed: AppConfig = serde_json::from_str(r#"{"results_limit": 3}"#).unwrap();
        assert_eq!(parsed.results_limit, 3);
        assert!(parsed.notifications_granted);
    }
}
