//! OpenWeatherMap client contract tests.
//!
//! Run the client against a mock server and check the requests it sends,
//! how validation statuses are classified, and how current-conditions
//! bodies are read.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use world_sync::weather::Coordinates;
use world_sync::{
    FetchError, LocationQuery, OpenWeatherMapClient, ResolvedLocation, ValidationError,
    WeatherFlags, WeatherProvider,
};

fn beverly_hills() -> LocationQuery {
    LocationQuery::new("90210", "US")
}

async fn validate_with_status(status: u16) -> Result<ResolvedLocation, ValidationError> {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/zip"))
        .respond_with(ResponseTemplate::new(status))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OpenWeatherMapClient::with_base_url(mock_server.uri());
    client.validate("test-key", &beverly_hills()).await
}

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_validate_sends_zip_country_and_key() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/zip"))
        .and(query_param("zip", "90210,US"))
        .and(query_param("appid", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "zip": "90210",
            "name": "Beverly Hills",
            "lat": 34.0901,
            "lon": -118.4065,
            "country": "US"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OpenWeatherMapClient::with_base_url(mock_server.uri());
    let location = client.validate("test-key", &beverly_hills()).await.unwrap();

    assert_eq!(location.query, beverly_hills());
    assert_eq!(location.name.as_deref(), Some("Beverly Hills"));
    assert_eq!(
        location.coordinates,
        Some(Coordinates {
            lat: 34.0901,
            lon: -118.4065
        })
    );
}

#[tokio::test]
async fn test_validate_accepts_success_without_coordinates() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/zip"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let client = OpenWeatherMapClient::with_base_url(mock_server.uri());
    let location = client.validate("test-key", &beverly_hills()).await.unwrap();
    assert_eq!(location, ResolvedLocation::unresolved(beverly_hills()));
}

#[tokio::test]
async fn test_validate_unauthorized_is_invalid_api_key() {
    assert_eq!(validate_with_status(401).await, Err(ValidationError::InvalidApiKey));
}

#[tokio::test]
async fn test_validate_not_found_is_invalid_location() {
    assert_eq!(validate_with_status(404).await, Err(ValidationError::InvalidLocation));
}

#[tokio::test]
async fn test_validate_other_client_errors_are_configuration_errors() {
    assert_eq!(
        validate_with_status(400).await,
        Err(ValidationError::ConfigurationError(400))
    );
    assert_eq!(
        validate_with_status(429).await,
        Err(ValidationError::ConfigurationError(429))
    );
}

#[tokio::test]
async fn test_validate_server_errors_are_service_unavailable() {
    for status in [500, 502, 503] {
        let result = validate_with_status(status).await;
        assert!(
            matches!(result, Err(ValidationError::ServiceUnavailable { .. })),
            "status {status}: {result:?}"
        );
    }
}

#[tokio::test]
async fn test_validate_unreachable_service_is_service_unavailable() {
    // Nothing listens on port 9 on the loopback interface.
    let client = OpenWeatherMapClient::with_base_url("http://127.0.0.1:9");
    let result = client.validate("test-key", &beverly_hills()).await;
    assert!(matches!(result, Err(ValidationError::ServiceUnavailable { .. })));
}

// ────────────────────────────────────────────────────────────────────────────
// Current conditions
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_by_coordinates_or_combines_conditions() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "34.0901"))
        .and(query_param("lon", "-118.4065"))
        .and(query_param("appid", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "weather": [
                {"id": 211, "main": "Thunderstorm"},
                {"id": 800, "main": "Clear"}
            ],
            "name": "Beverly Hills"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OpenWeatherMapClient::with_base_url(mock_server.uri());
    let location = ResolvedLocation {
        query: beverly_hills(),
        coordinates: Some(Coordinates {
            lat: 34.0901,
            lon: -118.4065,
        }),
        name: None,
    };

    let reading = client.fetch_current("test-key", &location).await.unwrap();
    assert_eq!(reading.codes, vec![211, 800]);
    assert_eq!(reading.flags(), WeatherFlags::THUNDERSTORM);
}

#[tokio::test]
async fn test_fetch_falls_back_to_zip_query() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("zip", "90210,US"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "weather": [{"id": 501}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OpenWeatherMapClient::with_base_url(mock_server.uri());
    let reading = client
        .fetch_current("test-key", &ResolvedLocation::unresolved(beverly_hills()))
        .await
        .unwrap();
    assert_eq!(reading.flags(), WeatherFlags::RAIN);
}

#[tokio::test]
async fn test_fetch_error_status() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = OpenWeatherMapClient::with_base_url(mock_server.uri());
    let result = client
        .fetch_current("test-key", &ResolvedLocation::unresolved(beverly_hills()))
        .await;
    assert!(matches!(result, Err(FetchError::Status(503))));
}

#[tokio::test]
async fn test_fetch_malformed_body() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cod": 200})))
        .mount(&mock_server)
        .await;

    let client = OpenWeatherMapClient::with_base_url(mock_server.uri());
    let result = client
        .fetch_current("test-key", &ResolvedLocation::unresolved(beverly_hills()))
        .await;
    assert!(matches!(result, Err(FetchError::Malformed(_))));
}
