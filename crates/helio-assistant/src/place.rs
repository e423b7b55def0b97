//! Place resolution for chat messages.

use regex::Regex;

use helio_weather::{Place, PlaceRegistry, WeatherService};

/// Matches "previsão do tempo em São Paulo" / "tempo de Lisboa" and captures
/// the trailing place name.
#[allow(clippy::unwrap_used)] // the pattern is a compile-time constant
pub(crate) fn place_pattern() -> Regex {
    Regex::new(r"(?i)\b(tempo|previs[aã]o)\b.*?\b(?:em|de)\s+(.+)").unwrap()
}

/// Pull a city name out of the message text, if any.
pub(crate) fn extract_city(pattern: &Regex, message: &str) -> Option<String> {
    let captures = pattern.captures(message)?;
    let city = captures
        .get(2)
        .map(|m| m.as_str().trim().trim_matches(|c| c == ',' || c == ' '))
        .unwrap_or("");
    if city.is_empty() {
        None
    } else {
        Some(city.to_string())
    }
}

/// Resolve the place a weather question refers to: the city named in the
/// message when it geocodes, else the first registered place. `None` only
/// when the registry itself is empty.
pub(crate) async fn resolve_place(
    pattern: &Regex,
    message: &str,
    registry: &PlaceRegistry,
    weather: &WeatherService,
) -> Option<Place> {
    let Some(city) = extract_city(pattern, message) else {
        return registry.first().cloned();
    };

    match weather.geocode(&city).await {
        Some(place) => Some(place),
        None => {
            tracing::debug!("Geocoding '{}' failed, using default place", city);
            registry.first().cloned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_city() {
        let pattern = place_pattern();
        assert_eq!(
            extract_city(&pattern, "qual a previsão do tempo em São Paulo?").as_deref(),
            Some("São Paulo?")
        );
        assert_eq!(
            extract_city(&pattern, "como está o tempo de Lisboa").as_deref(),
            Some("Lisboa")
        );
        assert_eq!(extract_city(&pattern, "vai chover amanhã?"), None);
        assert_eq!(extract_city(&pattern, "me conte uma piada"), None);
    }

    #[tokio::test]
    async fn test_no_city_falls_back_to_first_registered() {
        let pattern = place_pattern();
        let registry = PlaceRegistry::seeded();
        let weather = WeatherService::with_base_urls("http://127.0.0.1:9", "http://127.0.0.1:9");

        let place = resolve_place(&pattern, "vai chover?", &registry, &weather)
            .await
            .unwrap();
        assert_eq!(place.name, "São Paulo");
    }

    #[tokio::test]
    async fn test_failed_geocode_falls_back_to_first_registered() {
        let pattern = place_pattern();
        let registry = PlaceRegistry::seeded();
        // Unroutable base URL: every geocode attempt fails fast.
        let weather = WeatherService::with_base_urls("http://127.0.0.1:9", "http://127.0.0.1:9");

        let place = resolve_place(&pattern, "previsão do tempo em Lisboa", &registry, &weather)
            .await
            .unwrap();
        assert_eq!(place.name, "São Paulo");
    }

    #[tokio::test]
    async fn test_empty_registry_yields_none() {
        let pattern = place_pattern();
        let registry = PlaceRegistry::new();
        let weather = WeatherService::with_base_urls("http://127.0.0.1:9", "http://127.0.0.1:9");

        assert!(resolve_place(&pattern, "oi", &registry, &weather)
            .await
            .is_none());
    }
}
