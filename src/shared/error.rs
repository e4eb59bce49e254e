use thiserror::Error;
use serde::Serialize;

use crate::core::remote::TransportError;

/// Fallback shown when an error carries no message of its own.
pub const GENERIC_REQUEST_ERROR: &str = "Error en la solicitud";

#[derive(Error, Debug, Clone, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum AppError {
    #[error("I/O Error: {0}")]
    Io(String),

    #[error("Network Error: {0}")]
    Network(String),

    /// Classified HTTP/transport failure (timeout, 429, 5xx, unreachable, 4xx)
    #[error("Transport Error: {0}")]
    Transport(TransportError),

    /// Rejected before any network call (empty text, empty batch, bad language)
    #[error("Validation Error: {0}")]
    Validation(String),

    /// Backend answered 2xx but reported `success: false`
    #[error("Logical Error: {0}")]
    Logical(String),

    #[error("Storage Error: {0}")]
    Storage(String),

    #[error("Config Error: {0}")]
    Config(String),

    #[error("Unknown Error: {0}")]
    Unknown(String),
}

impl AppError {
    /// Message suitable for display, without the category prefix.
    pub fn user_message(&self) -> String {
        let msg = match self {
            AppError::Transport(err) => err.user_message.clone(),
            AppError::Io(msg)
            | AppError::Network(msg)
            | AppError::Validation(msg)
            | AppError::Logical(msg)
            | AppError::Storage(msg)
            | AppError::Config(msg)
            | AppError::Unknown(msg) => msg.clone(),
        };
        if msg.trim().is_empty() {
            GENERIC_REQUEST_ERROR.to_string()
        } else {
            msg
        }
    }
}

// Implement conversion from standard errors
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("Serialization error: {}", err))
    }
}

impl From<TransportError> for AppError {
    fn from(err: TransportError) -> Self {
        AppError::Transport(err)
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Unknown(err)
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        AppError::Unknown(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_strips_category_prefix() {
        let err = AppError::Validation("El texto no puede estar vacío".to_string());
        assert_eq!(err.to_string(), "Validation Error: El texto no puede estar vacío");
        assert_eq!(err.user_message(), "El texto no puede estar vacío");
    }

    #[test]
    fn empty_message_falls_back_to_generic() {
        let err = AppError::Unknown("  ".to_string());
        assert_eq!(err.user_message(), GENERIC_REQUEST_ERROR);
    }

    #[test]
    fn serializes_as_tagged_object() {
        let err = AppError::Logical("Translation failed".to_string());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "Logical");
        assert_eq!(json["message"], "Translation failed");
    }
}
