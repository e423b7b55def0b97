//! Forward geocoding: convert a free-text place name to coordinates and a
//! timezone via the Open-Meteo search endpoint.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::types::Place;

const GEOCODE_BASE: &str = "https://geocoding-api.open-meteo.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    results: Option<Vec<GeocodeResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
    country_code: Option<String>,
    timezone: Option<String>,
}

impl GeocodeResult {
    fn matches_country(&self, hint: &str) -> bool {
        let code = self.country_code.as_deref().unwrap_or("").to_lowercase();
        let name = self.country.as_deref().unwrap_or("").to_lowercase();
        hint == code || hint == name
    }

    fn into_place(self) -> Place {
        Place {
            name: self.name,
            latitude: self.latitude,
            longitude: self.longitude,
            timezone: self.timezone.unwrap_or_else(|| "auto".to_string()),
        }
    }
}

/// Open-Meteo geocoding client.
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    client: Client,
    base_url: String,
}

impl Default for GeocodeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GeocodeClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: GEOCODE_BASE.to_string(),
        }
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.to_string(),
        }
    }

    /// Resolve a free-text query (`"<city>"` or `"<city>, <country>"`) to a
    /// place. With a country hint, results whose country code or full country
    /// name matches it (case-insensitive) are preferred; otherwise the
    /// provider's top result wins.
    ///
    /// Returns `None` on network failure, timeout, or an empty result set -
    /// never an error.
    pub async fn geocode(&self, query: &str) -> Option<Place> {
        let mut parts = query.splitn(2, ',');
        let city = parts.next().map(str::trim).unwrap_or("");
        if city.is_empty() {
            return None;
        }
        let country_hint = parts
            .next()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let url = format!(
            "{}/v1/search?name={}&count=10&language=pt&format=json",
            self.base_url,
            urlencoding::encode(city),
        );

        let response = match self.client.get(&url).timeout(REQUEST_TIMEOUT).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Geocode request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Geocode returned status {}", response.status());
            return None;
        }

        let body: GeocodeResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!("Geocode parse error: {}", e);
                return None;
            }
        };

        let mut results = body.results.unwrap_or_default();
        if results.is_empty() {
            return None;
        }

        if let Some(hint) = country_hint {
            if let Some(pos) = results.iter().position(|r| r.matches_country(&hint)) {
                return Some(results.swap_remove(pos).into_place());
            }
        }

        let place = results.remove(0).into_place();
        tracing::info!("Geocoded '{}' to {}", query, place.name);
        Some(place)
    }
}
