//! Raw forecast fetch from the Open-Meteo forecast endpoint.
//!
//! Hourly/daily value columns are kept as raw JSON values here; the window
//! module coerces them permissively while building the normalized tables.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::types::Place;

const FORECAST_BASE: &str = "https://api.open-meteo.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Raw forecast payload as returned by the provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawForecast {
    /// Timezone echoed back by the provider; the fallback when the place
    /// itself carries none.
    pub timezone: Option<String>,
    pub hourly: Option<RawHourly>,
    pub daily: Option<RawDaily>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHourly {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Vec<Value>,
    #[serde(default)]
    pub precipitation: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDaily {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m_max: Vec<Value>,
    #[serde(default)]
    pub temperature_2m_min: Vec<Value>,
    #[serde(default)]
    pub precipitation_sum: Vec<Value>,
}

/// Open-Meteo forecast client.
#[derive(Debug, Clone)]
pub struct ForecastClient {
    client: Client,
    base_url: String,
}

impl Default for ForecastClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: FORECAST_BASE.to_string(),
        }
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.to_string(),
        }
    }

    /// Fetch the raw forecast for a place. `None` on any network failure.
    pub async fn fetch(&self, place: &Place) -> Option<RawForecast> {
        let url = format!(
            "{}/v1/forecast?latitude={}&longitude={}&timezone={}\
             &current=temperature_2m,precipitation,weather_code\
             &hourly=temperature_2m,precipitation\
             &daily=temperature_2m_max,temperature_2m_min,precipitation_sum",
            self.base_url,
            place.latitude,
            place.longitude,
            urlencoding::encode(&place.timezone),
        );

        let response = match self.client.get(&url).timeout(REQUEST_TIMEOUT).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Forecast request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Forecast returned status {}", response.status());
            return None;
        }

        match response.json().await {
            Ok(raw) => Some(raw),
            Err(e) => {
                tracing::debug!("Forecast parse error: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_decodes_sections() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("timezone", "America/Sao_Paulo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "timezone": "America/Sao_Paulo",
                "hourly": {
                    "time": ["2024-03-10T00:00", "2024-03-10T01:00"],
                    "temperature_2m": [21.3, null],
                    "precipitation": [0.0, 0.4]
                },
                "daily": {
                    "time": ["2024-03-10"],
                    "temperature_2m_max": [27.1],
                    "temperature_2m_min": [19.2],
                    "precipitation_sum": [2.5]
                }
            })))
            .mount(&mock_server)
            .await;

        let client = ForecastClient::with_base_url(&mock_server.uri());
        let place = Place::new("São Paulo", -23.5475, -46.6361, "America/Sao_Paulo");
        let raw = client.fetch(&place).await.unwrap();

        assert_eq!(raw.timezone.as_deref(), Some("America/Sao_Paulo"));
        assert_eq!(raw.hourly.unwrap().time.len(), 2);
        assert_eq!(raw.daily.unwrap().time.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_missing_sections_decode_as_none() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"timezone": "UTC"})),
            )
            .mount(&mock_server)
            .await;

        let client = ForecastClient::with_base_url(&mock_server.uri());
        let place = Place::new("Nowhere", 0.0, 0.0, "auto");
        let raw = client.fetch(&place).await.unwrap();

        assert!(raw.hourly.is_none());
        assert!(raw.daily.is_none());
    }

    #[tokio::test]
    async fn test_fetch_server_error_is_none() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&mock_server)
            .await;

        let client = ForecastClient::with_base_url(&mock_server.uri());
        let place = Place::new("Nowhere", 0.0, 0.0, "auto");
        assert!(client.fetch(&place).await.is_none());
    }
}
