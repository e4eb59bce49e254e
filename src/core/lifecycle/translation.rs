//! User-initiated translation lifecycle
//!
//! Validates input, dispatches through the gateway and publishes
//! `{result, is_loading, error}`. Every invocation takes a sequence number;
//! only the most recent one may write its outcome or clear `is_loading`, so a
//! slow earlier call can never overwrite a newer result.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::core::features::translator::TranslationGateway;
use crate::shared::error::{AppError, GENERIC_REQUEST_ERROR};
use crate::shared::languages::{self, MAX_TEXT_LENGTH, MIN_TEXT_LENGTH};
use crate::shared::types::{Envelope, TranslationOutput, TranslationResult};

use super::lock_state;

pub const MSG_EMPTY_TEXT: &str = "El texto no puede estar vacío";
pub const MSG_EMPTY_BATCH: &str = "No hay textos para traducir";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationState {
    pub result: Option<TranslationOutput>,
    pub is_loading: bool,
    pub error: Option<String>,
}

pub struct TranslationLifecycle {
    gateway: Arc<TranslationGateway>,
    state: Mutex<TranslationState>,
    sequence: AtomicU64,
}

impl TranslationLifecycle {
    pub fn new(gateway: Arc<TranslationGateway>) -> Self {
        Self {
            gateway,
            state: Mutex::new(TranslationState::default()),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn gateway(&self) -> &Arc<TranslationGateway> {
        &self.gateway
    }

    pub fn snapshot(&self) -> TranslationState {
        lock_state(&self.state, "translation lifecycle").clone()
    }

    pub fn result(&self) -> Option<TranslationOutput> {
        self.snapshot().result
    }

    pub fn is_loading(&self) -> bool {
        self.snapshot().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.snapshot().error
    }

    /// Translate one text. Returns the result, or `None` with `error` set.
    ///
    /// A failure keeps whatever result was shown before.
    pub async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Option<TranslationResult> {
        let (source, target) = match validate_text(text)
            .and_then(|_| validate_languages(source_language, target_language))
        {
            Ok(pair) => pair,
            Err(err) => {
                self.reject(err);
                return None;
            }
        };

        let seq = self.dispatch();
        let envelope = self.gateway.translate(text, source, target).await;
        self.settle(seq, envelope, TranslationOutput::Single)
    }

    /// Translate several texts in one request. Shares state with [`Self::translate`].
    pub async fn batch_translate(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Option<Vec<TranslationResult>> {
        if texts.is_empty() {
            self.reject(AppError::Validation(MSG_EMPTY_BATCH.to_string()));
            return None;
        }
        let (source, target) = match validate_languages(source_language, target_language) {
            Ok(pair) => pair,
            Err(err) => {
                self.reject(err);
                return None;
            }
        };

        let seq = self.dispatch();
        let envelope = self.gateway.batch_translate(texts, source, target).await;
        self.settle(seq, envelope, TranslationOutput::Batch)
    }

    pub fn clear_error(&self) {
        lock_state(&self.state, "translation lifecycle").error = None;
    }

    pub fn clear_result(&self) {
        lock_state(&self.state, "translation lifecycle").result = None;
    }

    fn reject(&self, err: AppError) {
        tracing::debug!(error = %err, "translation rejected before dispatch");
        lock_state(&self.state, "translation lifecycle").error = Some(err.user_message());
    }

    fn dispatch(&self) -> u64 {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = lock_state(&self.state, "translation lifecycle");
        state.is_loading = true;
        state.error = None;
        seq
    }

    fn settle<T: Clone>(
        &self,
        seq: u64,
        envelope: Envelope<T>,
        wrap: fn(T) -> TranslationOutput,
    ) -> Option<T> {
        let latest = self.sequence.load(Ordering::SeqCst) == seq;
        let outcome = match (envelope.success, envelope.data) {
            (true, Some(data)) => Ok(data),
            (_, _) => Err(envelope
                .error
                .filter(|msg| !msg.trim().is_empty())
                .unwrap_or_else(|| GENERIC_REQUEST_ERROR.to_string())),
        };

        if !latest {
            tracing::debug!(seq, "dropping outcome of a superseded translation");
            return outcome.ok();
        }

        let mut state = lock_state(&self.state, "translation lifecycle");
        state.is_loading = false;
        match outcome {
            Ok(data) => {
                state.result = Some(wrap(data.clone()));
                Some(data)
            }
            Err(message) => {
                tracing::warn!(%message, "translation failed");
                state.error = Some(message);
                None
            }
        }
    }
}

fn validate_text(text: &str) -> Result<(), AppError> {
    let length = text.trim().chars().count();
    if length < MIN_TEXT_LENGTH {
        return Err(AppError::Validation(MSG_EMPTY_TEXT.to_string()));
    }
    if length > MAX_TEXT_LENGTH {
        return Err(AppError::Validation(format!(
            "El texto no puede superar los {} caracteres",
            MAX_TEXT_LENGTH
        )));
    }
    Ok(())
}

/// Canonical codes for the requested direction.
fn validate_languages(source: &str, target: &str) -> Result<(&'static str, &'static str), AppError> {
    Ok((languages::validate_code(source)?, languages::validate_code(target)?))
}
