//! Assistant-specific error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("No language-model API key configured")]
    MissingApiKey,

    #[error("Language-model API error: {0}")]
    Api(String),

    #[error("Empty model response")]
    EmptyResponse,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl AssistantError {
    /// User-friendly error message for shell display (pt-BR).
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingApiKey => {
                "Assistente sem chave de API configurada (GEMINI_API_KEY).".to_string()
            }
            Self::Api(_) | Self::EmptyResponse => {
                "O assistente não conseguiu responder agora. Tente novamente.".to_string()
            }
            Self::Network(_) => "Erro de rede ao falar com o assistente.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert!(AssistantError::MissingApiKey
            .user_message()
            .contains("GEMINI_API_KEY"));
        assert!(AssistantError::Api("x".into())
            .user_message()
            .contains("assistente"));
    }
}
