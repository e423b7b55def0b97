//! High-level weather service wiring geocoding, fetching, and windowing.

use chrono::{DateTime, Utc};

use crate::forecast::ForecastClient;
use crate::geocode::GeocodeClient;
use crate::types::{ForecastTables, Place};
use crate::window;

/// One-stop weather access for the dashboard and the chat responders.
#[derive(Debug, Clone, Default)]
pub struct WeatherService {
    geocode: GeocodeClient,
    forecast: ForecastClient,
}

impl WeatherService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_urls(geocode_base: &str, forecast_base: &str) -> Self {
        Self {
            geocode: GeocodeClient::with_base_url(geocode_base),
            forecast: ForecastClient::with_base_url(forecast_base),
        }
    }

    /// See [`GeocodeClient::geocode`].
    pub async fn geocode(&self, query: &str) -> Option<Place> {
        self.geocode.geocode(query).await
    }

    /// Fetch and normalize the forecast for a place. `None` on network
    /// failure or when the provider omits the hourly or daily section.
    pub async fn forecast_tables(&self, place: &Place) -> Option<ForecastTables> {
        self.forecast_tables_at(place, Utc::now()).await
    }

    /// Same as [`forecast_tables`](Self::forecast_tables) with an explicit
    /// "now", so the today-local window is deterministic in tests.
    pub async fn forecast_tables_at(
        &self,
        place: &Place,
        now_utc: DateTime<Utc>,
    ) -> Option<ForecastTables> {
        let raw = self.forecast.fetch(place).await?;
        window::build_tables(&raw, place, now_utc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_forecast_tables_end_to_end() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "timezone": "America/Sao_Paulo",
                "hourly": {
                    "time": ["2024-03-10T12:00", "2024-03-10T13:00"],
                    "temperature_2m": [25.0, 26.0],
                    "precipitation": [0.0, 0.1]
                },
                "daily": {
                    "time": ["2024-03-10", "2024-03-11"],
                    "temperature_2m_max": [28.0, 29.0],
                    "temperature_2m_min": [18.0, 19.0],
                    "precipitation_sum": [0.0, 3.2]
                }
            })))
            .mount(&mock_server)
            .await;

        let service = WeatherService::with_base_urls("http://unused", &mock_server.uri());
        let place = Place::new("São Paulo", -23.5475, -46.6361, "America/Sao_Paulo");
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 15, 0, 0).unwrap();

        let tables = service.forecast_tables_at(&place, now).await.unwrap();
        assert_eq!(tables.hourly_today.len(), 2);
        assert_eq!(tables.daily.len(), 2);

        let summary = tables.today_summary();
        assert_eq!(summary.temp_min, Some(25.0));
        assert_eq!(summary.temp_max, Some(26.0));
        assert_eq!(summary.precipitation, Some(0.1));
    }

    #[tokio::test]
    async fn test_forecast_tables_missing_daily_is_none() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "timezone": "UTC",
                "hourly": {
                    "time": ["2024-03-10T12:00"],
                    "temperature_2m": [25.0],
                    "precipitation": [0.0]
                }
            })))
            .mount(&mock_server)
            .await;

        let service = WeatherService::with_base_urls("http://unused", &mock_server.uri());
        let place = Place::new("Nowhere", 0.0, 0.0, "auto");
        assert!(service.forecast_tables(&place).await.is_none());
    }
}
