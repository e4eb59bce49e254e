//! Transport failure classification
//!
//! Every failed call maps to exactly one [`TransportErrorKind`], and every kind
//! maps to one fixed, user-displayable message. The original error text, HTTP
//! status and response body are kept on the error for diagnostics.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub const MSG_TIMEOUT: &str = "La solicitud tardó demasiado tiempo";
pub const MSG_RATE_LIMITED: &str = "Demasiadas solicitudes. Intenta de nuevo en un momento";
pub const MSG_SERVER_ERROR: &str = "Error del servidor. Intenta de nuevo más tarde";
pub const MSG_NETWORK_ERROR: &str = "Error de conexión. Verifica tu internet";
pub const MSG_UNKNOWN_CLIENT_ERROR: &str = "Error desconocido";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    Timeout,
    RateLimited,
    ServerError,
    NetworkError,
    ClientError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("{user_message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    /// Fixed message for the kind, or the server's own message for client errors
    pub user_message: String,
    /// Original error text
    pub detail: String,
    pub status: Option<u16>,
    pub body: Option<Value>,
}

impl TransportError {
    pub fn timeout(detail: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Timeout,
            user_message: MSG_TIMEOUT.to_string(),
            detail: detail.into(),
            status: None,
            body: None,
        }
    }

    pub fn network(detail: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::NetworkError,
            user_message: MSG_NETWORK_ERROR.to_string(),
            detail: detail.into(),
            status: None,
            body: None,
        }
    }

    /// Classify a non-2xx response.
    pub fn from_status(status: u16, body: Value) -> Self {
        let (kind, user_message) = match status {
            429 => (TransportErrorKind::RateLimited, MSG_RATE_LIMITED.to_string()),
            s if s >= 500 => (TransportErrorKind::ServerError, MSG_SERVER_ERROR.to_string()),
            _ => (
                TransportErrorKind::ClientError,
                server_message(&body).unwrap_or_else(|| MSG_UNKNOWN_CLIENT_ERROR.to_string()),
            ),
        };
        let body = (!body.is_null()).then_some(body);
        Self {
            kind,
            user_message,
            detail: format!("HTTP {}", status),
            status: Some(status),
            body,
        }
    }

    /// Classify an error raised by `reqwest` before a usable response was read.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::timeout(err.to_string());
        }
        match err.status() {
            Some(status) => {
                let mut classified = Self::from_status(status.as_u16(), Value::Null);
                classified.detail = err.to_string();
                classified
            }
            None => Self::network(err.to_string()),
        }
    }
}

/// `message` field of an error body, if present and non-blank.
pub fn server_message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|msg| !msg.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rate_limited_on_429() {
        let err = TransportError::from_status(429, json!({"message": "slow down"}));
        assert_eq!(err.kind, TransportErrorKind::RateLimited);
        assert_eq!(err.user_message, MSG_RATE_LIMITED);
        assert_eq!(err.body, Some(json!({"message": "slow down"})));
    }

    #[test]
    fn server_error_on_5xx() {
        for status in [500, 502, 503, 599] {
            let err = TransportError::from_status(status, Value::Null);
            assert_eq!(err.kind, TransportErrorKind::ServerError);
            assert_eq!(err.to_string(), MSG_SERVER_ERROR);
            assert_eq!(err.body, None);
        }
    }

    #[test]
    fn client_error_uses_server_message() {
        let err = TransportError::from_status(400, json!({"success": false, "message": "Texto inválido"}));
        assert_eq!(err.kind, TransportErrorKind::ClientError);
        assert_eq!(err.user_message, "Texto inválido");
        assert_eq!(err.status, Some(400));
    }

    #[test]
    fn client_error_without_message_is_unknown() {
        let err = TransportError::from_status(404, json!({"message": "  "}));
        assert_eq!(err.user_message, MSG_UNKNOWN_CLIENT_ERROR);
        let err = TransportError::from_status(403, Value::String("forbidden".into()));
        assert_eq!(err.user_message, MSG_UNKNOWN_CLIENT_ERROR);
    }

    #[test]
    fn timeout_and_network_messages() {
        assert_eq!(TransportError::timeout("deadline").user_message, MSG_TIMEOUT);
        let err = TransportError::network("connection refused");
        assert_eq!(err.kind, TransportErrorKind::NetworkError);
        assert_eq!(err.detail, "connection refused");
    }
}
