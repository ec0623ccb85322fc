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

//! Settings handed to the engine.
//!
//! Loading and persisting these is the host application's job; the engine
//! only ever reads them.

/// Zip code and ISO 3166 two-letter country code of the synced location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationQuery {
    pub zip: String,
    pub country_code: String,
}

impl LocationQuery {
    pub fn new(zip: impl Into<String>, country_code: impl Into<String>) -> Self {
        Self {
            zip: zip.into(),
            country_code: country_code.into(),
        }
    }

    /// The `zip,country` form OpenWeatherMap expects.
    #[must_use]
    pub fn as_query(&self) -> String {
        format!("{},{}", self.zip.trim(), self.country_code.trim())
    }
}

impl Default for LocationQuery {
    fn default() -> Self {
        Self::new("", "US")
    }
}

/// Engine configuration. Immutable once the engine has started.
#[derive(Clone, PartialEq, Eq)]
pub struct SyncConfiguration {
    /// IANA timezone identifier, e.g. `America/Chicago`
    pub timezone_id: String,

    /// OpenWeatherMap API key
    pub api_key: String,

    pub location: LocationQuery,

    /// Run the time sync feature
    pub time_enabled: bool,

    /// Run the weather sync feature
    pub weather_enabled: bool,

    /// Emit the verbose log stream and include error details in failures
    pub debug: bool,
}

impl Default for SyncConfiguration {
    fn default() -> Self {
        Self {
            timezone_id: "Etc/UTC".to_string(),
            api_key: String::new(),
            location: LocationQuery::default(),
            time_enabled: true,
            weather_enabled: false,
            debug: false,
        }
    }
}

// Keeps the API key out of logs.
impl std::fmt::Debug for SyncConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfiguration")
            .field("timezone_id", &self.timezone_id)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("location", &self.location)
            .field("time_enabled", &self.time_enabled)
            .field("weather_enabled", &self.weather_enabled)
            .field("debug", &self.debug)
            .finish()
    }
}
