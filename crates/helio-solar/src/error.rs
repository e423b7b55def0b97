//! Solar-portal error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SolarError {
    /// The portal rejected the login or returned no usable session.
    #[error("Login failed: {0}")]
    LoginFailed(String),

    /// Login succeeded at the HTTP level but no token could be extracted
    /// from the response, in any known shape.
    #[error("Login response contained no token")]
    TokenMissing,

    #[error("Portal API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl SolarError {
    /// User-friendly error message for shell display (pt-BR).
    pub fn user_message(&self) -> String {
        match self {
            Self::LoginFailed(_) | Self::TokenMissing => {
                "Falha no login: verifique conta, senha e região.".to_string()
            }
            Self::Api(_) => {
                "O portal solar retornou uma resposta inesperada. Tente novamente.".to_string()
            }
            Self::Network(_) => {
                "Não foi possível contatar o portal solar. Verifique sua conexão.".to_string()
            }
        }
    }

    /// Whether this is a fatal credential/region problem rather than a
    /// transient one.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::LoginFailed(_) | Self::TokenMissing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_classification() {
        assert!(SolarError::LoginFailed("401".into()).is_auth());
        assert!(SolarError::TokenMissing.is_auth());
        assert!(!SolarError::Api("oops".into()).is_auth());
    }

    #[test]
    fn test_user_messages() {
        assert!(SolarError::TokenMissing.user_message().contains("login"));
        assert!(SolarError::Api("x".into()).user_message().contains("portal"));
    }
}
