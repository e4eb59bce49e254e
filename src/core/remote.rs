//! Remote client
//!
//! Issues HTTP calls to the translation backend. Non-2xx answers and transport
//! failures come back as a classified [`TransportError`]; every call and its
//! outcome is logged through `tracing`.

pub mod classify;
#[cfg(test)]
pub(crate) mod testing;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::shared::error::{AppError, AppResult};
use crate::shared::settings::ClientSettings;

pub use classify::{TransportError, TransportErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => f.write_str("GET"),
            HttpMethod::Post => f.write_str("POST"),
        }
    }
}

/// A 2xx answer. Non-JSON bodies are kept as a string, empty bodies as null.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Value,
}

/// Uniform call contract the gateway depends on.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<RawResponse, TransportError>;
}

pub struct RemoteClient {
    http: Client,
    base_url: String,
}

impl RemoteClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("runa-translate/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_settings(settings: &ClientSettings) -> AppResult<Self> {
        Self::new(settings.api_base_url.clone(), settings.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[async_trait]
impl Transport for RemoteClient {
    async fn call(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<RawResponse, TransportError> {
        let url = self.url(path);
        tracing::debug!(%method, %url, "API request");

        let mut request = match method {
            HttpMethod::Get => self.http.get(&url),
            HttpMethod::Post => self.http.post(&url),
        };
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let err = TransportError::from_reqwest(&e);
                tracing::warn!(%method, %url, kind = ?err.kind, detail = %err.detail, "API request failed");
                return Err(err);
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(text) => parse_body(&text),
            Err(e) => {
                let err = TransportError::from_reqwest(&e);
                tracing::warn!(%method, %url, kind = ?err.kind, detail = %err.detail, "API response unreadable");
                return Err(err);
            }
        };

        if status.is_success() {
            tracing::debug!(%url, status = status.as_u16(), %body, "API response");
            Ok(RawResponse {
                status: status.as_u16(),
                body,
            })
        } else {
            let err = TransportError::from_status(status.as_u16(), body);
            tracing::warn!(
                %url,
                status = status.as_u16(),
                kind = ?err.kind,
                body = ?err.body,
                "API error response"
            );
            Err(err)
        }
    }
}
