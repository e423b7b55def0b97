use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Named geographic point with coordinates and timezone, used as input to
/// forecast queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// IANA timezone name, or "auto" when not yet resolved.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "auto".to_string()
}

impl Place {
    pub fn new(
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        timezone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
            timezone: timezone.into(),
        }
    }
}

/// In-memory collection of registered places. The first entry is the
/// default place for chat questions that name no city.
///
/// Place names are unique case-insensitively; a `Place` is replaced or
/// removed, never edited in place.
#[derive(Debug, Clone, Default)]
pub struct PlaceRegistry {
    places: Vec<Place>,
}

impl PlaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in seed entry.
    pub fn seeded() -> Self {
        let mut registry = Self::new();
        registry.add(Place::new(
            "São Paulo",
            -23.5475,
            -46.6361,
            "America/Sao_Paulo",
        ));
        registry
    }

    /// Add a place. Returns false (and leaves the registry untouched) when a
    /// place with the same name is already registered, compared
    /// case-insensitively.
    pub fn add(&mut self, place: Place) -> bool {
        if self.contains_name(&place.name) {
            return false;
        }
        self.places.push(place);
        true
    }

    pub fn contains_name(&self, name: &str) -> bool {
        let needle = name.to_lowercase();
        self.places.iter().any(|p| p.name.to_lowercase() == needle)
    }

    pub fn remove(&mut self, index: usize) -> Option<Place> {
        if index < self.places.len() {
            Some(self.places.remove(index))
        } else {
            None
        }
    }

    pub fn first(&self) -> Option<&Place> {
        self.places.first()
    }

    pub fn get(&self, index: usize) -> Option<&Place> {
        self.places.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Place> {
        self.places.iter()
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}

/// One hourly forecast row, in the resolved local timezone.
#[derive(Debug, Clone)]
pub struct HourlySample {
    pub time: DateTime<Tz>,
    pub temperature: Option<f64>,
    pub precipitation: Option<f64>,
}

/// One daily forecast row, in the resolved local timezone.
#[derive(Debug, Clone)]
pub struct DailySample {
    pub date: DateTime<Tz>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub precipitation_sum: Option<f64>,
}

/// Min/max temperature and precipitation sum over the today-local hourly
/// window; the dashboard's three metric tiles.
#[derive(Debug, Clone, Default)]
pub struct TodaySummary {
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub precipitation: Option<f64>,
}

/// Normalized forecast tables: the today-local hourly window plus the full
/// returned daily range. Recomputed on every query, never cached.
#[derive(Debug, Clone)]
pub struct ForecastTables {
    pub hourly_today: Vec<HourlySample>,
    pub daily: Vec<DailySample>,
}

impl ForecastTables {
    pub fn today_summary(&self) -> TodaySummary {
        let temps: Vec<f64> = self
            .hourly_today
            .iter()
            .filter_map(|h| h.temperature)
            .collect();

        let temp_min = temps.iter().copied().reduce(f64::min);
        let temp_max = temps.iter().copied().reduce(f64::max);

        let rains: Vec<f64> = self
            .hourly_today
            .iter()
            .filter_map(|h| h.precipitation)
            .collect();
        let precipitation = if rains.is_empty() {
            None
        } else {
            Some(rains.iter().sum())
        };

        TodaySummary {
            temp_min,
            temp_max,
            precipitation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::Sao_Paulo;

    fn sample(hour: u32, temp: Option<f64>, rain: Option<f64>) -> HourlySample {
        HourlySample {
            time: Sao_Paulo.with_ymd_and_hms(2024, 3, 10, hour, 0, 0).unwrap(),
            temperature: temp,
            precipitation: rain,
        }
    }

    #[test]
    fn test_registry_seed() {
        let registry = PlaceRegistry::seeded();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.first().unwrap().name, "São Paulo");
        assert_eq!(registry.first().unwrap().timezone, "America/Sao_Paulo");
    }

    #[test]
    fn test_registry_rejects_duplicate_names_case_insensitive() {
        let mut registry = PlaceRegistry::seeded();
        assert!(!registry.add(Place::new("são paulo", 0.0, 0.0, "auto")));
        assert_eq!(registry.len(), 1);

        assert!(registry.add(Place::new("Paris", 48.85, 2.35, "Europe/Paris")));
        assert!(!registry.add(Place::new("PARIS", 48.85, 2.35, "auto")));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_registry_remove() {
        let mut registry = PlaceRegistry::seeded();
        assert!(registry.remove(5).is_none());
        let removed = registry.remove(0).unwrap();
        assert_eq!(removed.name, "São Paulo");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_today_summary_empty() {
        let tables = ForecastTables {
            hourly_today: vec![],
            daily: vec![],
        };
        let summary = tables.today_summary();
        assert!(summary.temp_min.is_none());
        assert!(summary.temp_max.is_none());
        assert!(summary.precipitation.is_none());
    }

    #[test]
    fn test_today_summary_skips_missing_values() {
        let tables = ForecastTables {
            hourly_today: vec![
                sample(0, Some(18.0), Some(0.0)),
                sample(1, None, Some(1.5)),
                sample(2, Some(24.5), None),
            ],
            daily: vec![],
        };
        let summary = tables.today_summary();
        assert_eq!(summary.temp_min, Some(18.0));
        assert_eq!(summary.temp_max, Some(24.5));
        assert_eq!(summary.precipitation, Some(1.5));
    }
}
