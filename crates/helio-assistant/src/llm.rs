//! Gemini generateContent REST client used as the chat fallback.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::error::AssistantError;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Assistant persona, sent as the system instruction on every call.
const SYSTEM_INSTRUCTION: &[&str] = &[
    "Você é um assistente virtual rápido e eficiente. Responda apenas com as informações solicitadas.",
    "Sua função é ajudar o usuário com informações sobre clima, previsão do tempo e geolocalização; não desvie destas diretrizes, caso contrário informe que não pode ajudar.",
    "Responda sempre na língua que o usuário utilizar.",
];

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Gemini REST client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: Option<&str>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: GEMINI_API_BASE.to_string(),
            api_key: api_key.to_string(),
            model: model.unwrap_or(DEFAULT_MODEL).to_string(),
        }
    }

    pub fn with_base_url(api_key: &str, model: Option<&str>, base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::new(api_key, model)
        }
    }

    /// Generate a reply for a free-text message. Returns the model's text
    /// verbatim.
    #[instrument(skip(self, message), level = "info")]
    pub async fn generate(&self, message: &str) -> Result<String, AssistantError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key,
        );

        let body = json!({
            "system_instruction": {
                "parts": [{"text": SYSTEM_INSTRUCTION.join("\n")}]
            },
            "contents": [
                {"role": "user", "parts": [{"text": message}]}
            ]
        });

        let response = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AssistantError::Api(format!("{}: {}", status, text)));
        }

        let decoded: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AssistantError::Api(format!("undecodable response: {}", e)))?;

        let text: String = decoded
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(AssistantError::EmptyResponse);
        }
        Ok(text)
    }
}
