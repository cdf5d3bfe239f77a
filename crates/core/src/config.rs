use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use super::error::{ConfigResult, ExtractSnafu};
use super::reveal::DEFAULT_REVEAL_INTERVAL;

pub const APP_DIRECTORY_NAME: &str = "chatbot";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const STORAGE_FILE_NAME: &str = "local-storage.json";
pub const ENV_PREFIX: &str = "CHATBOT_";

/// Backend address baked in at build time, if any.
pub const DEFAULT_BACKEND_URL: &str = match option_env!("CHATBOT_BACKEND_URL") {
    Some(url) => url,
    None => "http://127.0.0.1:8000",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Dark,
    Light,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    #[serde(default = "default_reveal_interval_ms")]
    pub reveal_interval_ms: u64,
    /// Overrides the local storage file location.
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
    #[serde(default)]
    pub theme: ThemePreference,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            reveal_interval_ms: default_reveal_interval_ms(),
            storage_path: None,
            theme: ThemePreference::default(),
        }
    }
}

impl AppConfig {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(APP_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".chatbot"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(SETTINGS_FILE_NAME)
    }

    pub fn default_storage_path() -> PathBuf {
        dirs::data_local_dir()
            .map(|path| path.join(APP_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".chatbot"))
            .join(STORAGE_FILE_NAME)
    }

    /// Layers defaults, the JSON file at `path` (if present) and `CHATBOT_*`
    /// environment variables, later sources winning.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let config = Figment::from(Serialized::defaults(Self::default()))
            .merge(Json::file(path))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract::<Self>()
            .context(ExtractSnafu {
                stage: "extract-app-config",
                path: path.to_path_buf(),
            })?;

        Ok(config.normalized())
    }

    /// Loads from the default location, falling back to defaults on error.
    pub fn load() -> Self {
        let path = Self::default_config_path();
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(error) => {
                tracing::warn!("failed to load settings: {}. using defaults", error);
                Self::default()
            }
        }
    }

    pub fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.reveal_interval_ms)
    }

    pub fn storage_path(&self) -> PathBuf {
        self.storage_path
            .clone()
            .unwrap_or_else(Self::default_storage_path)
    }

    fn normalized(mut self) -> Self {
        self.backend_url = self.backend_url.trim().to_string();
        if self.backend_url.is_empty() {
            self.backend_url = default_backend_url();
        }
        // A zero interval would spin the reveal loop.
        if self.reveal_interval_ms == 0 {
            self.reveal_interval_ms = default_reveal_interval_ms();
        }
        self
    }
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_reveal_interval_ms() -> u64 {
    DEFAULT_REVEAL_INTERVAL.as_millis() as u64
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|_jail| {
            let config = AppConfig::load_from(Path::new("absent.json"))
                .map_err(|error| error.to_string())?;

            assert_eq!(config, AppConfig::default());
            assert_eq!(config.reveal_interval(), Duration::from_millis(10));
            assert_eq!(config.theme, ThemePreference::Dark);
            Ok(())
        });
    }

    #[test]
    fn file_values_are_overridden_by_environment() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "settings.json",
                r#"{
                    "backend_url": "http://file.example:9000",
                    "reveal_interval_ms": 25,
                    "theme": "light",
                    "storage_path": "store.json"
                }"#,
            )?;
            jail.set_env("CHATBOT_BACKEND_URL", "http://env.example:7000");

            let config = AppConfig::load_from(Path::new("settings.json"))
                .map_err(|error| error.to_string())?;

            assert_eq!(config.backend_url, "http://env.example:7000");
            assert_eq!(config.reveal_interval_ms, 25);
            assert_eq!(config.theme, ThemePreference::Light);
            assert_eq!(config.storage_path(), PathBuf::from("store.json"));
            Ok(())
        });
    }

    #[test]
    fn blank_url_and_zero_interval_fall_back_to_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "settings.json",
                r#"{ "backend_url": "   ", "reveal_interval_ms": 0 }"#,
            )?;

            let config = AppConfig::load_from(Path::new("settings.json"))
                .map_err(|error| error.to_string())?;

            assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
            assert_eq!(config.reveal_interval(), DEFAULT_REVEAL_INTERVAL);
            Ok(())
        });
    }

    #[test]
    fn malformed_file_is_an_error() {
        Jail::expect_with(|jail| {
            jail.create_file("settings.json", r#"{ "reveal_interval_ms": "soon" }"#)?;

            let error = AppConfig::load_from(Path::new("settings.json"));
            assert!(matches!(error, Err(ConfigError::Extract { .. })));
            Ok(())
        });
    }
}
