use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use relwatch_core::{DEFAULT_API_BASE, PollerOptions, Schedule};

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub owner: Option<String>,

    #[serde(default)]
    pub repo: Option<String>,

    #[serde(default = "default_app_name")]
    pub app_name: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_initial_delay")]
    pub initial_delay_secs: u64,

    #[serde(default = "default_check_interval")]
    pub check_interval_hours: u64,

    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    #[serde(default)]
    pub debug_logging: bool,

    #[serde(default = "default_max_log_size_bytes")]
    pub max_log_size_bytes: u64,
}

fn default_app_name() -> String {
    "Relwatch".to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_initial_delay() -> u64 {
    2
}

fn default_check_interval() -> u64 {
    24
}

fn default_http_timeout() -> u64 {
    10
}

fn default_max_log_size_bytes() -> u64 {
    5 * 1024 * 1024
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            owner: None,
            repo: None,
            app_name: default_app_name(),
            api_base: default_api_base(),
            initial_delay_secs: default_initial_delay(),
            check_interval_hours: default_check_interval(),
            http_timeout_secs: default_http_timeout(),
            debug_logging: false,
            max_log_size_bytes: default_max_log_size_bytes(),
        }
    }
}

impl AppSettings {
    /// Read settings from `path`, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|error| {
                log::warn!("Ignoring malformed settings file {}: {error}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| AppError::SettingsIo {
                path: path.to_path_buf(),
                source,
            })?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| AppError::SettingsIo {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn schedule(&self) -> Schedule {
        Schedule::new(
            Duration::from_secs(self.initial_delay_secs),
            Duration::from_secs(self.check_interval_hours.saturating_mul(60 * 60)),
        )
    }

    pub fn poller_options(&self) -> PollerOptions {
        PollerOptions {
            app_name: self.app_name.clone(),
            api_base: self.api_base.clone(),
            http_timeout: Duration::from_secs(self.http_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::AppSettings;

    #[test]
    fn app_settings_defaults_match_expected_timings() {
        let settings = AppSettings::default();

        assert_eq!(settings.app_name, "Relwatch");
        assert_eq!(settings.api_base, "https://api.github.com");
        assert_eq!(settings.initial_delay_secs, 2);
        assert_eq!(settings.check_interval_hours, 24);
        assert_eq!(settings.http_timeout_secs, 10);
        assert_eq!(settings.max_log_size_bytes, 5 * 1024 * 1024);
        assert!(!settings.debug_logging);
    }

    #[test]
    fn partial_settings_fill_in_defaults() {
        let value = json!({ "owner": "acme", "repo": "widget", "check_interval_hours": 6 });

        let settings: AppSettings =
            serde_json::from_value(value).expect("settings JSON should deserialize");

        assert_eq!(settings.owner.as_deref(), Some("acme"));
        assert_eq!(settings.repo.as_deref(), Some("widget"));
        assert_eq!(settings.schedule().interval, Duration::from_secs(6 * 60 * 60));
        assert_eq!(settings.schedule().initial_delay, Duration::from_secs(2));
    }

    #[test]
    fn poller_options_follow_settings() {
        let settings = AppSettings {
            app_name: "Widget".to_string(),
            api_base: "http://localhost:9000".to_string(),
            http_timeout_secs: 3,
            ..AppSettings::default()
        };

        let options = settings.poller_options();

        assert_eq!(options.app_name, "Widget");
        assert_eq!(options.api_base, "http://localhost:9000");
        assert_eq!(options.http_timeout, Duration::from_secs(3));
    }

    #[test]
    fn save_then_load_preserves_values() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let path = temp_dir.path().join("nested").join("settings.json");
        let settings = AppSettings {
            owner: Some("acme".to_string()),
            repo: Some("widget".to_string()),
            debug_logging: true,
            ..AppSettings::default()
        };

        settings.save_to(&path).expect("settings should save");

        assert_eq!(AppSettings::load_from(&path), settings);
    }

    #[test]
    fn missing_or_malformed_file_loads_defaults() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let missing = temp_dir.path().join("absent.json");
        let malformed = temp_dir.path().join("broken.json");
        std::fs::write(&malformed, "{ not json").expect("fixture should be written");

        assert_eq!(AppSettings::load_from(&missing), AppSettings::default());
        assert_eq!(AppSettings::load_from(&malformed), AppSettings::default());
    }
}
