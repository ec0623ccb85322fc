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

//! OpenWeatherMap client.
//!
//! Validation uses the zip geocoding endpoint, which answers 401 for a bad
//! key and 404 for an unknown zip/country pair. Current conditions come from
//! the 2.5 weather endpoint, keyed by the coordinates the lookup returned.

use async_trait::async_trait;
use log::debug;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::LocationQuery;
use crate::error::{FetchError, ValidationError};
use crate::weather::{Coordinates, ResolvedLocation, WeatherProvider, WeatherReading};

/// Production API root
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

const GEOCODE_PATH: &str = "/geo/1.0/zip";
const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";

/// Body of a zip geocoding lookup
#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    name: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Body of a current weather request; only the condition ids are used
#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    weather: Vec<ConditionEntry>,
}

#[derive(Debug, Deserialize)]
struct ConditionEntry {
    id: u32,
}

/// Classify the status of a validation lookup.
pub fn classify_status(status: StatusCode) -> Result<(), ValidationError> {
    match status.as_u16() {
        200..=399 => Ok(()),
        401 => Err(ValidationError::InvalidApiKey),
        404 => Err(ValidationError::InvalidLocation),
        code @ 400..=499 => Err(ValidationError::ConfigurationError(code)),
        _ => Err(ValidationError::ServiceUnavailable {
            detail: format!("HTTP {status}"),
        }),
    }
}

/// Parse the condition codes out of a current weather body.
pub fn parse_current_weather(body: &str) -> Result<WeatherReading, FetchError> {
    let response: CurrentWeatherResponse =
        serde_json::from_str(body).map_err(|err| FetchError::Malformed(err.to_string()))?;

    Ok(WeatherReading::new(
        response
            .weather
            .into_iter()
            .map(|entry| entry.id)
            .collect::<Vec<_>>(),
    ))
}

/// HTTP client for the OpenWeatherMap API
#[derive(Debug, Clone)]
pub struct OpenWeatherMapClient {
    http: reqwest::Client,
    base_url: String,
}

impl OpenWeatherMapClient {
    /// Create a client for the production API
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client for another API root (mirrors, test servers)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for OpenWeatherMapClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherMapClient {
    async fn validate(
        &self,
        api_key: &str,
        location: &LocationQuery,
    ) -> Result<ResolvedLocation, ValidationError> {
        let response = self
            .http
            .get(format!("{}{GEOCODE_PATH}", self.base_url))
            .query(&[("zip", location.as_query().as_str()), ("appid", api_key)])
            .send()
            .await
            .map_err(|err| ValidationError::ServiceUnavailable {
                detail: err.to_string(),
            })?;

        classify_status(response.status())?;

        // A successful status is enough; coordinates are a bonus.
        match response.json::<GeocodeResponse>().await {
            Ok(GeocodeResponse {
                name,
                lat: Some(lat),
                lon: Some(lon),
            }) => Ok(ResolvedLocation {
                query: location.clone(),
                coordinates: Some(Coordinates { lat, lon }),
                name,
            }),
            Ok(GeocodeResponse { name, .. }) => Ok(ResolvedLocation {
                name,
                ..ResolvedLocation::unresolved(location.clone())
            }),
            Err(err) => {
                debug!("Geocoding body unreadable, falling back to zip queries: {err}");
                Ok(ResolvedLocation::unresolved(location.clone()))
            }
        }
    }

    async fn fetch_current(
        &self,
        api_key: &str,
        location: &ResolvedLocation,
    ) -> Result<WeatherReading, FetchError> {
        let request = self.http.get(format!("{}{CURRENT_WEATHER_PATH}", self.base_url));
        let request = match location.coordinates {
            Some(Coordinates { lat, lon }) => request.query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("appid", api_key.to_string()),
            ]),
            None => request.query(&[
                ("zip", location.query.as_query()),
                ("appid", api_key.to_string()),
            ]),
        };

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_current_weather(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(classify_status(StatusCode::OK).is_ok());
        assert!(classify_status(StatusCode::NO_CONTENT).is_ok());
        assert!(classify_status(StatusCode::MOVED_PERMANENTLY).is_ok());
        assert_eq!(
            classify_status(StatusCode::UNAUTHORIZED),
            Err(ValidationError::InvalidApiKey)
        );
        assert_eq!(
            classify_status(StatusCode::NOT_FOUND),
            Err(ValidationError::InvalidLocation)
        );
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS),
            Err(ValidationError::ConfigurationError(429))
        );
        assert_eq!(
            classify_status(StatusCode::BAD_REQUEST),
            Err(ValidationError::ConfigurationError(400))
        );
        assert!(matches!(
            classify_status(StatusCode::BAD_GATEWAY),
            Err(ValidationError::ServiceUnavailable { .. })
        ));
    }

    #[test]
    fn test_parse_current_weather() {
        let body = r#"{
            "coord": {"lon": -118.41, "lat": 34.09},
            "weather": [
                {"id": 211, "main": "Thunderstorm", "description": "thunderstorm", "icon": "11d"},
                {"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}
            ],
            "name": "Beverly Hills"
        }"#;

        let reading = parse_current_weather(body).unwrap();
        assert_eq!(reading.codes, vec![211, 800]);
        assert!(reading.flags().thunder);
    }

    #[test]
    fn test_parse_current_weather_rejects_malformed_bodies() {
        for body in ["", "not json", r#"{"main": {}}"#, r#"{"weather": [{"id": "x"}]}"#] {
            assert!(
                matches!(parse_current_weather(body), Err(FetchError::Malformed(_))),
                "{body}"
            );
        }
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = OpenWeatherMapClient::with_base_url("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(OpenWeatherMapClient::new().base_url(), DEFAULT_BASE_URL);
    }
}
