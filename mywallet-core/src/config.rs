//! Configuration management
//!
//! Compatible with the Desktop App settings.json format:
//! ```json
//! {
//!   "app": { "sessionTtlMinutes": 43200 }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Default session lifetime: 30 days
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 43200;

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default)]
    session_ttl_minutes: Option<i64>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// MyWallet configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub session_ttl_minutes: i64,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_ttl_minutes: DEFAULT_SESSION_TTL_MINUTES,
            _raw_settings: SettingsFile::default(),
        }
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// The session TTL can be set via:
    /// 1. Settings file ("app.sessionTtlMinutes")
    /// 2. Environment variable MYWALLET_SESSION_TTL_MINUTES (for CI/testing)
    pub fn load(data_dir: &Path) -> Result<Self> {
        let settings_path = data_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        // Env var override wins; non-positive values fall back to the default
        let session_ttl_minutes = std::env::var("MYWALLET_SESSION_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .or(raw.app.session_ttl_minutes)
            .filter(|ttl| *ttl > 0)
            .unwrap_or(DEFAULT_SESSION_TTL_MINUTES);

        Ok(Self {
            session_ttl_minutes,
            _raw_settings: raw,
        })
    }

    /// Save config to the data directory
    /// Preserves other settings that this crate doesn't manage
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let settings_path = data_dir.join("settings.json");

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        settings.app.session_ttl_minutes = Some(self.session_ttl_minutes);

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_settings_file_uses_default_ttl() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.session_ttl_minutes, DEFAULT_SESSION_TTL_MINUTES);
    }

    #[test]
    fn test_settings_file_ttl_is_honored() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"app": {"sessionTtlMinutes": 60}}"#,
        )
        .unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.session_ttl_minutes, 60);
    }

    #[test]
    fn test_malformed_settings_fall_back_to_default() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("settings.json"), "{not json").unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.session_ttl_minutes, DEFAULT_SESSION_TTL_MINUTES);
    }

    #[test]
    fn test_save_round_trip_preserves_unmanaged_fields() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"app": {"theme": "dark"}}"#,
        )
        .unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        config.session_ttl_minutes = 120;
        config.save(dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join("settings.json")).unwrap();
        assert!(content.contains("\"sessionTtlMinutes\": 120"));
        assert!(content.contains("\"theme\": \"dark\""));
    }
}
