use super::types::{CurrentResponse, ForecastResponse};
use crate::config::Config;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("location not found: {0}")]
    NotFound(String),
    #[error("invalid API credential")]
    Auth,
    #[error("network failure: {0}")]
    Network(#[source] reqwest::Error),
    #[error("could not parse provider response")]
    Parse(#[source] reqwest::Error),
    #[error("provider returned HTTP {0}")]
    Api(StatusCode),
}

impl FetchError {
    /// Message shown on the status line. Parse failures stay generic so the
    /// raw payload never leaks into the UI.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::NotFound(location) => format!("City not found: {location}"),
            FetchError::Auth => "Invalid API key. Check your OpenWeatherMap credentials.".to_string(),
            FetchError::Network(_) => {
                "Network error: could not reach the weather service.".to_string()
            }
            FetchError::Parse(_) => "Could not parse the weather service response.".to_string(),
            FetchError::Api(status) => format!("Weather service error (HTTP {status})"),
        }
    }
}

pub struct OpenWeatherClient {
    client: Client,
    config: Config,
}

impl OpenWeatherClient {
    pub fn new(config: Config) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent("WeatherScope/1.0")
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(FetchError::Network)?;

        Ok(Self { client, config })
    }

    pub async fn get_current(&self, city: &str) -> Result<CurrentResponse, FetchError> {
        self.get_json(&self.config.openweather_current_path, city).await
    }

    pub async fn get_forecast(&self, city: &str) -> Result<ForecastResponse, FetchError> {
        self.get_json(&self.config.openweather_forecast_path, city).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, city: &str) -> Result<T, FetchError> {
        let url = format!("{}{}", self.config.openweather_base_url, path);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", city),
                ("units", "metric"),
                ("appid", self.config.openweather_api_key.as_str()),
            ])
            .send()
            .await
            .map_err(FetchError::Network)?;

        match response.status() {
            StatusCode::OK => response.json::<T>().await.map_err(FetchError::Parse),
            StatusCode::NOT_FOUND => Err(FetchError::NotFound(city.to_string())),
            StatusCode::UNAUTHORIZED => Err(FetchError::Auth),
            status => {
                tracing::warn!(%status, %url, "unexpected provider status");
                Err(FetchError::Api(status))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: &str) -> Config {
        Config {
            openweather_api_key: "test-key".to_string(),
            openweather_base_url: base_url.to_string(),
            openweather_current_path: "/data/2.5/weather".to_string(),
            openweather_forecast_path: "/data/2.5/forecast".to_string(),
            request_timeout_secs: 5,
            cache_ttl_secs: 300,
            prefs_path: "last_city.txt".to_string(),
        }
    }

    fn current_body() -> serde_json::Value {
        json!({
            "name": "London",
            "coord": { "lat": 51.5085, "lon": -0.1257 },
            "main": { "temp": 11.2, "feels_like": 10.4, "pressure": 1013.0, "humidity": 72.0 },
            "weather": [{ "id": 802, "main": "Clouds", "description": "scattered clouds", "icon": "03d" }],
            "wind": { "speed": 4.1, "deg": 240.0 },
            "sys": { "country": "GB", "sunrise": 1_699_942_000i64, "sunset": 1_699_975_000i64 },
            "timezone": 0
        })
    }

    #[tokio::test]
    async fn fetches_and_parses_current_conditions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("q", "London"))
            .and(query_param("appid", "test-key"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenWeatherClient::new(test_config(&server.uri())).unwrap();
        let current = client.get_current("London").await.unwrap();
        assert_eq!(current.name, "London");
        assert_eq!(current.main.temp, 11.2);
        assert_eq!(current.sys.country.as_deref(), Some("GB"));
    }

    #[tokio::test]
    async fn maps_404_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "cod": "404", "message": "city not found"
            })))
            .mount(&server)
            .await;

        let client = OpenWeatherClient::new(test_config(&server.uri())).unwrap();
        let err = client.get_current("Nowhereville").await.unwrap_err();
        assert!(matches!(err, FetchError::NotFound(ref city) if city == "Nowhereville"));
        assert!(err.user_message().contains("Nowhereville"));
    }

    #[tokio::test]
    async fn maps_401_to_auth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = OpenWeatherClient::new(test_config(&server.uri())).unwrap();
        assert!(matches!(
            client.get_current("London").await.unwrap_err(),
            FetchError::Auth
        ));
    }

    #[tokio::test]
    async fn maps_other_statuses_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = OpenWeatherClient::new(test_config(&server.uri())).unwrap();
        assert!(matches!(
            client.get_current("London").await.unwrap_err(),
            FetchError::Api(StatusCode::INTERNAL_SERVER_ERROR)
        ));
    }

    #[tokio::test]
    async fn missing_fields_surface_as_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "London"
            })))
            .mount(&server)
            .await;

        let client = OpenWeatherClient::new(test_config(&server.uri())).unwrap();
        let err = client.get_current("London").await.unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
        // Generic message only; no payload contents.
        assert_eq!(err.user_message(), "Could not parse the weather service response.");
    }

    #[tokio::test]
    async fn unreachable_host_surfaces_as_network_error() {
        let client = OpenWeatherClient::new(test_config("http://127.0.0.1:9")).unwrap();
        assert!(matches!(
            client.get_current("London").await.unwrap_err(),
            FetchError::Network(_)
        ));
    }
}
