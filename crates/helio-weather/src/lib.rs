//! Weather service for Helio
//!
//! Geocoding and forecasts via the Open-Meteo API, normalized into small
//! timezone-aware tables for the dashboard and the chat responders.

pub mod forecast;
pub mod geocode;
pub mod service;
pub mod types;
pub mod window;

pub use geocode::GeocodeClient;
pub use service::WeatherService;
pub use types::*;
