use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::controller::ControllerSettings;

/// Environment variable that overrides `api_key` from the config file.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

pub const DEFAULT_CITY: &str = "Istanbul";
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// default_city = "Istanbul"
/// success_delay_ms = 1500
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenWeather `appid`. Not validated: a missing key surfaces as the
    /// provider's auth error on the first lookup.
    pub api_key: Option<String>,

    /// City looked up on startup.
    pub default_city: String,

    pub base_url: String,
    pub timeout_secs: u64,

    /// Pause between a successful response and showing it. `0` disables it.
    pub success_delay_ms: u64,

    /// How long an error banner stays up.
    pub error_dismiss_ms: u64,

    /// How long the empty-input cue stays up.
    pub shake_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            default_city: DEFAULT_CITY.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            success_delay_ms: 1500,
            error_dismiss_ms: 2000,
            shake_ms: 500,
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet,
    /// then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;
        cfg.apply_env(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "citywx", "citywx")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay values from the environment. Empty variables are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
    }

    /// API key as sent on the wire; empty when unset.
    pub fn api_key_or_empty(&self) -> &str {
        self.api_key.as_deref().unwrap_or_default()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            default_city: self.default_city.clone(),
            success_delay: Duration::from_millis(self.success_delay_ms),
            error_dismiss: Duration::from_millis(self.error_dismiss_ms),
            shake: Duration::from_millis(self.shake_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("nope.toml")).unwrap();

        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.default_city, "Istanbul");
        assert_eq!(cfg.api_key, None);
    }

    #[test]
    fn save_then_load_roundtrip_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let cfg = Config {
            api_key: Some("KEY".into()),
            default_city: "Tokyo".into(),
            success_delay_ms: 0,
            ..Config::default()
        };
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_city = \"Oslo\"\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.default_city, "Oslo");
        assert_eq!(cfg.error_dismiss_ms, 2000);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_city = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn env_overrides_api_key() {
        let mut cfg = Config {
            api_key: Some("FROM_FILE".into()),
            ..Config::default()
        };

        cfg.apply_env(|name| (name == API_KEY_ENV).then(|| "FROM_ENV".to_string()));
        assert_eq!(cfg.api_key.as_deref(), Some("FROM_ENV"));

        cfg.apply_env(|_| Some("   ".to_string()));
        assert_eq!(cfg.api_key.as_deref(), Some("FROM_ENV"));
    }

    #[test]
    fn missing_api_key_is_sent_empty() {
        let cfg = Config::default();
        assert_eq!(cfg.api_key_or_empty(), "");
    }

    #[test]
    fn controller_settings_use_configured_delays() {
        let cfg = Config {
            success_delay_ms: 0,
            error_dismiss_ms: 750,
            ..Config::default()
        };
        let settings = cfg.controller_settings();

        assert_eq!(settings.success_delay, Duration::ZERO);
        assert_eq!(settings.error_dismiss, Duration::from_millis(750));
        assert_eq!(settings.shake, Duration::from_millis(500));
        assert_eq!(settings.default_city, "Istanbul");
    }
}
