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

//! Weather layer.
//!
//! The engine talks to a [`WeatherProvider`]: one validation lookup at
//! startup, then repeated current-conditions fetches. [`OpenWeatherMapClient`]
//! is the production provider.

mod condition;
pub mod openweathermap;

pub use condition::{classify, classify_all, WeatherCategory, WeatherFlags};
pub use openweathermap::OpenWeatherMapClient;

use async_trait::async_trait;

use crate::config::LocationQuery;
use crate::error::{FetchError, ValidationError};

/// Latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// A location that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub query: LocationQuery,

    /// Present when the lookup returned coordinates
    pub coordinates: Option<Coordinates>,

    /// Place name reported by the lookup
    pub name: Option<String>,
}

impl ResolvedLocation {
    /// A location known only by its query.
    #[must_use]
    pub fn unresolved(query: LocationQuery) -> Self {
        Self {
            query,
            coordinates: None,
            name: None,
        }
    }
}

/// Raw condition codes from one current-conditions fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WeatherReading {
    pub codes: Vec<u32>,
}

impl WeatherReading {
    pub fn new(codes: impl Into<Vec<u32>>) -> Self {
        Self {
            codes: codes.into(),
        }
    }

    /// The reading used when a fetch fails: a single code 0.
    #[must_use]
    pub fn no_data() -> Self {
        Self {
            codes: vec![WeatherCategory::NO_DATA.digit()],
        }
    }

    #[must_use]
    pub fn flags(&self) -> WeatherFlags {
        classify_all(self.codes.iter().copied())
    }
}

/// Remote source of current weather conditions.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Confirm the API key and location resolve. Called once per process.
    async fn validate(
        &self,
        api_key: &str,
        location: &LocationQuery,
    ) -> Result<ResolvedLocation, ValidationError>;

    /// Fetch the current condition codes for a validated location.
    async fn fetch_current(
        &self,
        api_key: &str,
        location: &ResolvedLocation,
    ) -> Result<WeatherReading, FetchError>;
}
