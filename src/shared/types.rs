use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::shared::languages::{QUECHUA, SPANISH};

// -- Requests sent to the backend --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRequest {
    pub text: String,
    pub source_language: String,
    pub target_language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchTranslationRequest {
    pub texts: Vec<String>,
    pub source_language: String,
    pub target_language: String,
}

// -- Results produced by the backend --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TranslationResult {
    pub translated_text: String,
    pub confidence: f64,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub processing_time: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub token_count: Option<u64>,
}

impl TranslationResult {
    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_score(self.confidence)
    }
}

/// Whatever the last translate call on a lifecycle produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TranslationOutput {
    Single(TranslationResult),
    Batch(Vec<TranslationResult>),
}

impl TranslationOutput {
    pub fn as_single(&self) -> Option<&TranslationResult> {
        match self {
            TranslationOutput::Single(result) => Some(result),
            TranslationOutput::Batch(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub const HIGH_THRESHOLD: f64 = 0.8;
    pub const MEDIUM_THRESHOLD: f64 = 0.5;

    pub fn from_score(score: f64) -> Self {
        if score >= Self::HIGH_THRESHOLD {
            ConfidenceLevel::High
        } else if score >= Self::MEDIUM_THRESHOLD {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    /// Badge text, e.g. "Alta confianza (92%)".
    pub fn label(score: f64) -> String {
        let percent = (score * 100.0).round() as i64;
        match Self::from_score(score) {
            ConfidenceLevel::High => format!("Alta confianza ({}%)", percent),
            ConfidenceLevel::Medium => format!("Confianza media ({}%)", percent),
            ConfidenceLevel::Low => format!("Baja confianza ({}%)", percent),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageInfo {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub has_real_model: bool,
    #[serde(default)]
    pub vocabulary_size: u64,
    #[serde(default)]
    pub version: String,
    /// Fields the backend adds that this client does not interpret
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Which payload layout a `/health` answer used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HealthShape {
    /// `{success, data: {status, uptime, environment}}`
    Enveloped,
    /// `{status: "UP", ...}` with no envelope
    Bare,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub shape: HealthShape,
}

impl HealthReport {
    /// `status` of "UP" or "healthy", or the legacy "Service is healthy" message.
    pub fn is_up(&self) -> bool {
        self.status.eq_ignore_ascii_case("up")
            || self.status.eq_ignore_ascii_case("healthy")
            || self.message.as_deref() == Some("Service is healthy")
    }
}

// -- Uniform gateway envelope --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            details: None,
        }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Option<serde_json::Value>) -> Self {
        self.details = details;
        self
    }
}

/// Ephemeral state of one asynchronous operation.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestState<T> {
    Idle,
    Loading,
    Success(T),
    Error(String),
}

// -- Persisted records --

/// Input for history and favorite inserts; ids and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TranslationRecord {
    pub original_text: String,
    pub translated_text: String,
    pub source_language: String,
    pub target_language: String,
    pub confidence: f64,
    pub method: String,
}

impl TranslationRecord {
    pub fn from_result(
        original_text: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
        result: &TranslationResult,
    ) -> Self {
        Self {
            original_text: original_text.into(),
            translated_text: result.translated_text.clone(),
            source_language: source_language.into(),
            target_language: target_language.into(),
            confidence: result.confidence,
            method: result.method.clone(),
        }
    }
}

impl From<&HistoryEntry> for TranslationRecord {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            original_text: entry.original_text.clone(),
            translated_text: entry.translated_text.clone(),
            source_language: entry.source_language.clone(),
            target_language: entry.target_language.clone(),
            confidence: entry.confidence,
            method: entry.method.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct HistoryEntry {
    pub id: String,
    pub original_text: String,
    pub translated_text: String,
    pub source_language: String,
    pub target_language: String,
    pub confidence: f64,
    pub method: String,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(record: TranslationRecord) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            original_text: record.original_text,
            translated_text: record.translated_text,
            source_language: record.source_language,
            target_language: record.target_language,
            confidence: record.confidence,
            method: record.method,
            timestamp: Utc::now(),
        }
    }

    pub fn matches(&self, lowercase_query: &str) -> bool {
        self.original_text.to_lowercase().contains(lowercase_query)
            || self.translated_text.to_lowercase().contains(lowercase_query)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FavoriteEntry {
    pub favorite_id: String,
    pub original_text: String,
    pub translated_text: String,
    pub source_language: String,
    pub target_language: String,
    pub confidence: f64,
    pub method: String,
}

impl FavoriteEntry {
    pub fn new(record: TranslationRecord) -> Self {
        Self {
            favorite_id: uuid::Uuid::new_v4().to_string(),
            original_text: record.original_text,
            translated_text: record.translated_text,
            source_language: record.source_language,
            target_language: record.target_language,
            confidence: record.confidence,
            method: record.method,
        }
    }

    /// Favorites are unique on `(original_text, source_language)`.
    pub fn same_key(&self, original_text: &str, source_language: &str) -> bool {
        self.original_text == original_text && self.source_language == source_language
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Preferences {
    pub default_source_language: String,
    pub default_target_language: String,
    pub save_history: bool,
    pub max_history_items: usize,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            default_source_language: QUECHUA.to_string(),
            default_target_language: SPANISH.to_string(),
            save_history: true,
            max_history_items: 100,
        }
    }
}

/// Partial update for [`Preferences`]; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PreferencesPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub default_source_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub default_target_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub save_history: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub max_history_items: Option<usize>,
}

impl Preferences {
    pub fn merge(&mut self, patch: PreferencesPatch) {
        if let Some(source) = patch.default_source_language {
            self.default_source_language = source;
        }
        if let Some(target) = patch.default_target_language {
            self.default_target_language = target;
        }
        if let Some(save) = patch.save_history {
            self.save_history = save;
        }
        if let Some(max) = patch.max_history_items {
            self.max_history_items = max;
        }
    }
}
