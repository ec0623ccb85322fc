// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Application configuration management.
//!
//! This module handles persistent configuration storage using TOML format.
//! The file is created with defaults on first run. The API key can also be
//! supplied through the `OPENWEATHERMAP_API_KEY` environment variable, which
//! takes precedence over the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use world_sync::{EnvironmentKind, LocationQuery, SyncConfiguration};

const APP_NAME: &str = "realtime-sync";
const CONFIG_NAME: &str = "config";

/// Environment variable that overrides `APIKey`
pub const API_KEY_ENV_VAR: &str = "OPENWEATHERMAP_API_KEY";

/// A world managed by this process
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct WorldConfig {
    pub name: String,

    /// `normal`, `nether` or `the_end`; only normal worlds are synced
    #[serde(default)]
    pub kind: EnvironmentKind,
}

impl WorldConfig {
    pub fn new(name: &str, kind: EnvironmentKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }
}

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct AppConfig {
    /// Verbose logging, including error details
    #[serde(default)]
    pub debug: bool,

    /// Sync world time with `Timezone`
    #[serde(default = "default_true")]
    pub sync_time: bool,

    /// Sync world weather with the conditions at `ZipCode`/`CountryCode`
    #[serde(default)]
    pub sync_weather: bool,

    /// IANA timezone identifier
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// OpenWeatherMap API key (env var takes precedence)
    #[serde(rename = "APIKey", default)]
    pub api_key: String,

    #[serde(default)]
    pub zip_code: String,

    /// ISO 3166 two-letter country code
    #[serde(default = "default_country_code")]
    pub country_code: String,

    /// Worlds to manage
    #[serde(default = "default_worlds")]
    pub worlds: Vec<WorldConfig>,
}

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_timezone() -> String {
    "Etc/UTC".to_string()
}

fn default_country_code() -> String {
    "US".to_string()
}

fn default_worlds() -> Vec<WorldConfig> {
    vec![
        WorldConfig::new("world", EnvironmentKind::Normal),
        WorldConfig::new("world_nether", EnvironmentKind::Nether),
        WorldConfig::new("world_the_end", EnvironmentKind::TheEnd),
    ]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            debug: false,
            sync_time: true,
            sync_weather: false,
            timezone: default_timezone(),
            api_key: String::new(),
            zip_code: String::new(),
            country_code: default_country_code(),
            worlds: default_worlds(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the platform config directory
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load(APP_NAME, CONFIG_NAME)
    }

    /// Load configuration from an explicit path, creating it if missing
    pub fn load_from(path: &Path) -> Result<Self, confy::ConfyError> {
        confy::load_path(path)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    /// Settings for the sync engine, with the API key override applied
    pub fn sync_configuration(&self) -> SyncConfiguration {
        let env_key = std::env::var(API_KEY_ENV_VAR).ok();
        self.sync_configuration_with_key(env_key.as_deref())
    }

    fn sync_configuration_with_key(&self, env_key: Option<&str>) -> SyncConfiguration {
        SyncConfiguration {
            timezone_id: self.timezone.clone(),
            api_key: resolve_api_key(env_key, &self.api_key),
            location: LocationQuery::new(self.zip_code.clone(), self.country_code.clone()),
            time_enabled: self.sync_time,
            weather_enabled: self.sync_weather,
            debug: self.debug,
        }
    }
}

/// Pick the API key: a non-empty environment value wins over the file.
fn resolve_api_key(env_key: Option<&str>, config_key: &str) -> String {
    env_key
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .unwrap_or(config_key.trim())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("SyncTime = true"));
        assert!(written.contains("APIKey"));
        assert!(written.contains("[[Worlds]]"));
    }

    #[test]
    fn test_reads_original_key_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
Debug = true
SyncTime = false
SyncWeather = true
Timezone = "America/Chicago"
APIKey = "abc123"
ZipCode = "60601"
CountryCode = "US"

[[Worlds]]
Name = "survival"

[[Worlds]]
Name = "survival_nether"
Kind = "nether"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert!(config.debug);
        assert!(!config.sync_time);
        assert!(config.sync_weather);
        assert_eq!(config.timezone, "America/Chicago");
        assert_eq!(config.api_key, "abc123");
        assert_eq!(
            config.worlds,
            vec![
                WorldConfig::new("survival", EnvironmentKind::Normal),
                WorldConfig::new("survival_nether", EnvironmentKind::Nether),
            ]
        );

        let sync = config.sync_configuration_with_key(None);
        assert_eq!(sync.timezone_id, "America/Chicago");
        assert_eq!(sync.location, LocationQuery::new("60601", "US"));
        assert!(!sync.time_enabled);
        assert!(sync.weather_enabled);
        assert!(sync.debug);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "SyncWeather = true\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert!(config.sync_time);
        assert!(config.sync_weather);
        assert_eq!(config.country_code, "US");
        assert_eq!(config.worlds.len(), 3);
    }

    #[test]
    fn test_env_api_key_takes_precedence() {
        assert_eq!(resolve_api_key(Some("from-env"), "from-file"), "from-env");
        assert_eq!(resolve_api_key(Some("  "), "from-file"), "from-file");
        assert_eq!(resolve_api_key(None, " from-file "), "from-file");

        let config = AppConfig {
            api_key: "from-file".to_string(),
            ..Default::default()
        };
        assert_eq!(config.sync_configuration_with_key(Some("from-env")).api_key, "from-env");
    }
}
