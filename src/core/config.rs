use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

use log::{info, warn};

/// Application settings for the alert subsystem.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Maximum number of entries kept in the notification log (None = unbounded)
    #[serde(default = "default_capacity")]
    pub notification_capacity: Option<usize>,
    /// How long a toast stays on screen
    #[serde(default = "default_toast_duration")]
    pub toast_duration_ms: u64,
}

fn default_capacity() -> Option<usize> {
    Some(1000)
}

fn default_toast_duration() -> u64 {
    4000
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notification_capacity: default_capacity(),
            toast_duration_ms: default_toast_duration(),
        }
    }
}

pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(app_config_dir: PathBuf) -> Self {
        Self {
            config_path: app_config_dir.join("settings.json"),
        }
    }

    /// Load settings, falling back to defaults when the file is missing or unreadable.
    pub fn load(&self) -> Settings {
        if self.config_path.exists() {
            match fs::read_to_string(&self.config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(settings) => {
                        info!("Loaded settings from {:?}", self.config_path);
                        return settings;
                    }
                    Err(e) => warn!("Ignoring malformed {:?}: {}", self.config_path, e),
                },
                Err(e) => warn!("Could not read {:?}: {}", self.config_path, e),
            }
        }
        Settings::default()
    }

    pub fn save(&self, settings: &Settings) -> io::Result<()> {
        // Ensure directory exists
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.config_path, content)?;
        info!("Saved settings to {:?}", self.config_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().to_path_buf());

        let default = manager.load();
        assert_eq!(default, Settings::default());
        assert_eq!(default.notification_capacity, Some(1000));

        let new_settings = Settings {
            notification_capacity: None,
            toast_duration_ms: 2500,
        };

        manager.save(&new_settings).unwrap();
        let loaded = manager.load();

        assert_eq!(loaded.notification_capacity, None);
        assert_eq!(loaded.toast_duration_ms, 2500);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("settings.json"), r#"{"toast_duration_ms": 100}"#).unwrap();

        let loaded = ConfigManager::new(dir.path().to_path_buf()).load();
        assert_eq!(loaded.toast_duration_ms, 100);
        assert_eq!(loaded.notification_capacity, Some(1000));
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("settings.json"), "{not json").unwrap();

        let loaded = ConfigManager::new(dir.path().to_path_buf()).load();
        assert_eq!(loaded, Settings::default());
    }

    #[test]
    fn test_save_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("app").join("config");
        let manager = ConfigManager::new(nested.clone());

        manager.save(&Settings::default()).unwrap();
        assert!(nested.join("settings.json").exists());
    }
}
