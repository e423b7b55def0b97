use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Weather settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Solar portal settings
    #[serde(default)]
    pub solar: SolarConfig,

    /// Chat assistant settings
    #[serde(default)]
    pub assistant: AssistantConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Geocoding endpoint base URL
    #[serde(default = "default_geocode_url")]
    pub geocode_url: String,

    /// Forecast endpoint base URL
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,

    /// Name of the place seeded into the registry on startup
    pub default_place: String,

    /// Seed place latitude
    pub default_latitude: f64,

    /// Seed place longitude
    pub default_longitude: f64,

    /// Seed place IANA timezone
    pub default_timezone: String,
}

fn default_geocode_url() -> String {
    "https://geocoding-api.open-meteo.com".to_string()
}

fn default_forecast_url() -> String {
    "https://api.open-meteo.com".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            geocode_url: default_geocode_url(),
            forecast_url: default_forecast_url(),
            default_place: "São Paulo".to_string(),
            default_latitude: -23.5475,
            default_longitude: -46.6361,
            default_timezone: "America/Sao_Paulo".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolarConfig {
    /// Portal region code (selects the portal base URL, e.g. "eu", "us")
    pub region: String,

    /// Portal account (optional, can be entered per session)
    pub account: Option<String>,

    /// Portal password (optional, can be entered per session)
    pub password: Option<String>,
}

impl Default for SolarConfig {
    fn default() -> Self {
        Self {
            region: "eu".to_string(),
            account: None,
            password: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Generative language model name
    pub model: String,

    /// API key for the language model (optional, can be set via environment)
    pub api_key: Option<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            api_key: std::env::var("GEMINI_API_KEY").ok(), // Read from environment
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("helio");

        Self {
            config_dir,
            weather: WeatherConfig::default(),
            solar: SolarConfig::default(),
            assistant: AssistantConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;

        let mut config: Config =
            toml::from_str(&contents).context("Failed to parse config file")?;

        // Environment always wins for the model key so the file never has to hold it
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            config.assistant.api_key = Some(key);
        }

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        if !validation.warnings.is_empty() {
            for warning in &validation.warnings {
                tracing::warn!("Config warning: {}", warning);
            }
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.geocode_url, "weather.geocode_url", &mut result);
        self.validate_url(
            &self.weather.forecast_url,
            "weather.forecast_url",
            &mut result,
        );

        if self.weather.default_place.trim().is_empty() {
            result.add_error("weather.default_place", "Seed place name must not be empty");
        }
        if !(-90.0..=90.0).contains(&self.weather.default_latitude) {
            result.add_error(
                "weather.default_latitude",
                "Latitude must be between -90 and 90",
            );
        }
        if !(-180.0..=180.0).contains(&self.weather.default_longitude) {
            result.add_error(
                "weather.default_longitude",
                "Longitude must be between -180 and 180",
            );
        }

        if self.solar.region.trim().is_empty() {
            result.add_error("solar.region", "Portal region must not be empty");
        }
        if self.solar.account.is_none() {
            result.add_warning(
                "solar.account",
                "No portal account configured - it must be entered per session",
            );
        }

        if self.assistant.model.trim().is_empty() {
            result.add_error("assistant.model", "Model name must not be empty");
        }
        if self.assistant.api_key.is_none() {
            result.add_warning(
                "assistant",
                "GEMINI_API_KEY not set - chat falls back to canned answers only",
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        // Ensure config directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("helio");

        Ok(config_dir.join("config.toml"))
    }
}
