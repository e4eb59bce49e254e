//! Translation gateway
//!
//! Wraps the backend endpoints in operations that always answer with an
//! [`Envelope`]. Transport failures, `success: false` bodies and undecodable
//! payloads all become `success: false` envelopes carrying a displayable message.

pub mod types;

use std::sync::Arc;

use serde_json::{json, Value};

use crate::core::remote::{HttpMethod, RemoteClient, Transport};
use crate::shared::error::{AppError, AppResult};
use crate::shared::settings::ClientSettings;
use crate::shared::types::{
    BatchTranslationRequest, Envelope, HealthReport, HealthShape, LanguageInfo, ModelInfo,
    TranslationRequest, TranslationResult,
};

use types::{
    decode_languages, decode_model_info, decode_result, decode_results, health_report_from,
    ApiPayload,
};

pub const MSG_INVALID_RESPONSE: &str = "Respuesta inválida del servidor";

const FALLBACK_TRANSLATE: &str = "Translation failed";
const FALLBACK_BATCH: &str = "Batch translation failed";
const FALLBACK_LANGUAGES: &str = "Failed to get languages";
const FALLBACK_MODEL_INFO: &str = "Failed to get model info";

pub struct TranslationGateway {
    transport: Arc<dyn Transport>,
}

impl TranslationGateway {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn from_settings(settings: &ClientSettings) -> AppResult<Self> {
        let client = RemoteClient::from_settings(settings)?;
        Ok(Self::new(Arc::new(client)))
    }

    pub async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Envelope<TranslationResult> {
        let request = TranslationRequest {
            text: text.trim().to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        };
        self.fetch(
            HttpMethod::Post,
            "/translate",
            Some(json!(request)),
            FALLBACK_TRANSLATE,
            decode_result,
        )
        .await
    }

    pub async fn batch_translate(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Envelope<Vec<TranslationResult>> {
        let request = BatchTranslationRequest {
            texts: texts.iter().map(|t| t.trim().to_string()).collect(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        };
        self.fetch(
            HttpMethod::Post,
            "/translate/batch",
            Some(json!(request)),
            FALLBACK_BATCH,
            decode_results,
        )
        .await
    }

    pub async fn supported_languages(&self) -> Envelope<Vec<LanguageInfo>> {
        self.fetch(HttpMethod::Get, "/languages", None, FALLBACK_LANGUAGES, decode_languages)
            .await
    }

    pub async fn model_info(&self) -> Envelope<ModelInfo> {
        self.fetch(HttpMethod::Get, "/model-info", None, FALLBACK_MODEL_INFO, decode_model_info)
            .await
    }

    /// The body's `success` flag is forwarded unchanged. A bare `{status: ...}`
    /// body without an envelope is accepted and tagged [`HealthShape::Bare`].
    pub async fn health_check(&self) -> Envelope<HealthReport> {
        let raw = match self.transport.call(HttpMethod::Get, "/health", None).await {
            Ok(raw) => raw,
            Err(err) => {
                let details = err.body.clone();
                return failed(AppError::from(err), details);
            }
        };

        let body = raw.body;
        match body.get("success").and_then(Value::as_bool) {
            Some(success) => {
                let report = body
                    .get("data")
                    .and_then(|data| health_report_from(data, HealthShape::Enveloped))
                    .or_else(|| health_report_from(&body, HealthShape::Enveloped));

                if success && report.is_none() {
                    tracing::warn!(%body, "health payload has no status");
                    return Envelope::fail(MSG_INVALID_RESPONSE).with_details(Some(body));
                }
                Envelope {
                    success,
                    data: report,
                    error: (!success).then(|| ApiPayload::from_body(&body).failure_message()).flatten(),
                    details: None,
                }
            }
            None => match health_report_from(&body, HealthShape::Bare) {
                Some(report) => {
                    tracing::warn!(status = %report.status, "health endpoint answered without an envelope");
                    Envelope::ok(report)
                }
                None => {
                    tracing::warn!(%body, "unrecognized health payload");
                    Envelope::fail(MSG_INVALID_RESPONSE).with_details(Some(body))
                }
            },
        }
    }

    async fn fetch<T>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
        fallback: &str,
        decode: fn(Value) -> AppResult<T>,
    ) -> Envelope<T> {
        let raw = match self.transport.call(method, path, body).await {
            Ok(raw) => raw,
            Err(err) => {
                let details = err.body.clone();
                return failed(AppError::from(err), details);
            }
        };

        let payload = ApiPayload::from_body(&raw.body);
        if payload.success != Some(true) {
            let message = payload
                .failure_message()
                .unwrap_or_else(|| fallback.to_string());
            tracing::warn!(%path, %message, "backend reported failure");
            return failed(AppError::Logical(message), Some(raw.body));
        }

        match decode(payload.data) {
            Ok(data) => Envelope::ok(data),
            Err(e) => {
                tracing::warn!(%path, error = %e, "could not decode response data");
                Envelope::fail(MSG_INVALID_RESPONSE).with_details(Some(raw.body))
            }
        }
    }
}

/// Failure envelope whose `error` is the display message of `err`.
fn failed<T>(err: AppError, details: Option<Value>) -> Envelope<T> {
    Envelope::fail(err.user_message()).with_details(details)
}

/// Whether a health envelope means the backend is usable.
///
/// Enveloped answers need `success` and an up status; bare answers need
/// `status == "UP"`.
pub fn assess_health(envelope: &Envelope<HealthReport>) -> bool {
    match &envelope.data {
        Some(report) => match report.shape {
            HealthShape::Enveloped => envelope.success && report.is_up(),
            HealthShape::Bare => report.status == "UP",
        },
        None => false,
    }
}
