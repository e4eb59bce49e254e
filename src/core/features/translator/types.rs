//! Wire-level payloads of the translation backend and their normalization
//! into the crate's data model.

use serde::Deserialize;
use serde_json::Value;

use crate::shared::error::{AppError, AppResult};
use crate::shared::types::{HealthReport, HealthShape, LanguageInfo, ModelInfo, TranslationResult};

/// Top-level body every endpoint answers with.
///
/// Each field is read on its own, so a mistyped `message` or `error` does not
/// hide a well-formed `success`/`data` pair.
#[derive(Debug, Default)]
pub(crate) struct ApiPayload {
    pub success: Option<bool>,
    pub data: Value,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl ApiPayload {
    /// Bodies that are not JSON objects decode as an empty payload.
    pub fn from_body(body: &Value) -> Self {
        let text = |field: &str| body.get(field).and_then(Value::as_str).map(str::to_string);
        Self {
            success: body.get("success").and_then(Value::as_bool),
            data: body.get("data").cloned().unwrap_or(Value::Null),
            message: text("message"),
            error: text("error"),
        }
    }

    /// Server-provided reason for a logical failure.
    pub fn failure_message(&self) -> Option<String> {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .map(str::trim)
            .filter(|msg| !msg.is_empty())
            .map(str::to_string)
    }
}

/// Backend result before normalization. Older backends name the text field
/// `translation` instead of `translatedText`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTranslationResult {
    translated_text: Option<String>,
    translation: Option<String>,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    method: String,
    processing_time: Option<f64>,
    token_count: Option<f64>,
}

impl WireTranslationResult {
    fn normalize(self) -> AppResult<TranslationResult> {
        let translated_text = self
            .translated_text
            .or(self.translation)
            .ok_or_else(|| AppError::Validation("missing translated text".to_string()))?;

        Ok(TranslationResult {
            translated_text,
            confidence: self.confidence.clamp(0.0, 1.0),
            method: self.method,
            processing_time: self.processing_time.map(|ms| ms.max(0.0).round() as u64),
            token_count: self.token_count.map(|n| n.max(0.0).round() as u64),
        })
    }
}

pub(crate) fn decode_result(data: Value) -> AppResult<TranslationResult> {
    let wire: WireTranslationResult = serde_json::from_value(data)?;
    wire.normalize()
}

pub(crate) fn decode_results(data: Value) -> AppResult<Vec<TranslationResult>> {
    let wire: Vec<WireTranslationResult> = serde_json::from_value(data)?;
    wire.into_iter().map(WireTranslationResult::normalize).collect()
}

/// Accepts either full language objects or bare codes.
pub(crate) fn decode_languages(data: Value) -> AppResult<Vec<LanguageInfo>> {
    let items = match data {
        Value::Array(items) => items,
        other => {
            return Err(AppError::Validation(format!(
                "expected a language list, got {}",
                other
            )))
        }
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::String(code) => Ok(LanguageInfo {
                code,
                name: String::new(),
                native_name: None,
            }),
            other => Ok(serde_json::from_value(other)?),
        })
        .collect()
}

pub(crate) fn decode_model_info(data: Value) -> AppResult<ModelInfo> {
    if !data.is_object() {
        return Err(AppError::Validation("model info is not an object".to_string()));
    }
    Ok(serde_json::from_value(data)?)
}

/// Build a report from an object carrying `status`, `uptime`, `environment`.
pub(crate) fn health_report_from(object: &Value, shape: HealthShape) -> Option<HealthReport> {
    let status = object.get("status")?.as_str()?.to_string();
    Some(HealthReport {
        status,
        uptime: object.get("uptime").and_then(Value::as_f64),
        environment: object
            .get("environment")
            .and_then(Value::as_str)
            .map(str::to_string),
        message: object
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        shape,
    })
}
