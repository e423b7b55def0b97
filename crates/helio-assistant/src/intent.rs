//! Regex-driven intent routing for chat messages.
//!
//! A prioritized list of (predicate, handler) pairs, evaluated in fixed
//! order; the first match wins and everything else goes to the language
//! model.

use chrono::{DateTime, Utc};
use regex::Regex;

use helio_weather::{Place, PlaceRegistry, WeatherService};

use crate::error::AssistantError;
use crate::llm::GeminiClient;
use crate::place::{place_pattern, resolve_place};
use crate::responders;

/// Keywords marking a message as weather talk.
const WEATHER_HINTS: &[&str] = &["tempo", "temperatura", "previs", "clima", "chuva"];

const NO_PLACES_MSG: &str = "Nenhum lugar cadastrado. Adicione um lugar primeiro.";

/// Why a weather branch could not produce tables.
enum LookupFailure {
    NoPlaces,
    Unavailable,
}

/// Chat message router.
#[derive(Debug, Clone)]
pub struct ChatRouter {
    weather: WeatherService,
    llm: Option<GeminiClient>,
    week_pattern: Regex,
    rain_pattern: Regex,
    weather_pattern: Regex,
    place_pattern: Regex,
}

#[allow(clippy::unwrap_used)] // the patterns are compile-time constants
impl ChatRouter {
    pub fn new(weather: WeatherService, llm: Option<GeminiClient>) -> Self {
        Self {
            weather,
            llm,
            week_pattern: Regex::new(r"(?i)\b(?:esta|essa|pr[oó]xima)?\s*semana\b").unwrap(),
            rain_pattern: Regex::new(r"(?i)\bvai chover\b|\bchoverá\b|\bchuverá\b").unwrap(),
            weather_pattern: Regex::new(r"(?i)\b(tempo|previs[aã]o|clima|temperatura)\b").unwrap(),
            place_pattern: place_pattern(),
        }
    }

    /// Route a message to the first matching responder, with the language
    /// model as the catch-all. Always answers with display-ready text.
    pub async fn route(&self, message: &str, registry: &PlaceRegistry) -> String {
        self.route_at(message, registry, Utc::now()).await
    }

    /// Same as [`route`](Self::route) with an explicit "now" for
    /// deterministic tests.
    pub async fn route_at(
        &self,
        message: &str,
        registry: &PlaceRegistry,
        now_utc: DateTime<Utc>,
    ) -> String {
        let text = message.to_lowercase();

        // 1) "semana" + weather keyword: forecast from tomorrow on
        if self.week_pattern.is_match(&text)
            && WEATHER_HINTS.iter().any(|hint| text.contains(hint))
        {
            return self.weekly(message, registry, now_utc).await;
        }

        // 2) rain questions
        if self.rain_pattern.is_match(&text) {
            return self.rain(message, registry, now_utc).await;
        }

        // 3) general weather/temperature asks (now + today)
        if self.weather_pattern.is_match(&text) {
            return self.current(message, registry, now_utc).await;
        }

        // 4) everything else: delegate to the model
        self.fallback(message).await
    }

    async fn lookup(
        &self,
        message: &str,
        registry: &PlaceRegistry,
        now_utc: DateTime<Utc>,
    ) -> Result<(Place, helio_weather::ForecastTables), LookupFailure> {
        let Some(place) =
            resolve_place(&self.place_pattern, message, registry, &self.weather).await
        else {
            return Err(LookupFailure::NoPlaces);
        };

        match self.weather.forecast_tables_at(&place, now_utc).await {
            Some(tables) => Ok((place, tables)),
            None => Err(LookupFailure::Unavailable),
        }
    }

    async fn weekly(
        &self,
        message: &str,
        registry: &PlaceRegistry,
        now_utc: DateTime<Utc>,
    ) -> String {
        match self.lookup(message, registry, now_utc).await {
            Ok((place, tables)) => responders::weekly_forecast(&tables, &place.name, now_utc),
            Err(LookupFailure::NoPlaces) => NO_PLACES_MSG.to_string(),
            Err(LookupFailure::Unavailable) => {
                "Não consegui obter a previsão da semana agora.".to_string()
            }
        }
    }

    async fn rain(
        &self,
        message: &str,
        registry: &PlaceRegistry,
        now_utc: DateTime<Utc>,
    ) -> String {
        match self.lookup(message, registry, now_utc).await {
            Ok((place, tables)) => {
                responders::rain_answer(message, &tables, &place.name, now_utc)
            }
            Err(LookupFailure::NoPlaces) => NO_PLACES_MSG.to_string(),
            Err(LookupFailure::Unavailable) => {
                "Não consegui verificar a chuva agora.".to_string()
            }
        }
    }

    async fn current(
        &self,
        message: &str,
        registry: &PlaceRegistry,
        now_utc: DateTime<Utc>,
    ) -> String {
        match self.lookup(message, registry, now_utc).await {
            Ok((place, tables)) => {
                responders::current_conditions(&tables, &place.name, now_utc)
            }
            Err(LookupFailure::NoPlaces) => NO_PLACES_MSG.to_string(),
            Err(LookupFailure::Unavailable) => {
                "Não consegui obter a previsão agora. Tente novamente em instantes.".to_string()
            }
        }
    }

    async fn fallback(&self, message: &str) -> String {
        let result = match &self.llm {
            Some(llm) => llm.generate(message).await,
            None => Err(AssistantError::MissingApiKey),
        };

        match result {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Model fallback failed: {}", e);
                format!(
                    "Desculpe, ocorreu um erro ao processar sua solicitação: {}",
                    e
                )
            }
        }
    }
}
