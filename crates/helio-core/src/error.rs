//! Centralized error types for the Helio application.
//!
//! This module provides a typed error hierarchy that:
//! - Enables precise error handling throughout the codebase
//! - Provides user-friendly messages suitable for shell display
//! - Preserves full error context for debugging/logging
//!
//! User-facing messages are pt-BR, the product language; internal
//! `Display` output stays English.

use thiserror::Error;

/// Top-level application error type.
///
/// All errors in the Helio application should be convertible to this type.
/// Use `user_message()` to get a display-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Service-level errors (weather, portal, assistant) mapped from the feature crates.
    #[error("Service error: {0}")]
    Service(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the shell.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Io(_) => "Uma operação de arquivo falhou. Tente novamente.",
            AppError::Service(_) => "Algo deu errado. Tente novamente.",
            AppError::Other(_) => "Ocorreu um erro inesperado. Tente novamente.",
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Não foi possível conectar. Verifique sua conexão."
            }
            NetworkError::Timeout => "A solicitação expirou. Tente novamente.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "O serviço está com problemas. Tente novamente mais tarde."
            }
            NetworkError::ServerError { .. } => "A solicitação falhou. Tente novamente.",
            NetworkError::InvalidResponse(_) => {
                "Resposta inesperada do serviço. Tente novamente."
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Configuração não encontrada. Usando padrões.",
            ConfigError::Invalid(_) => "Configuração inválida. Revise suas definições.",
            ConfigError::ParseError(_) => "Arquivo de configuração malformado.",
            ConfigError::MissingSetting(_) => "Uma definição obrigatória está ausente.",
        }
    }
}
