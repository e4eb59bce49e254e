//! Translator session
//!
//! The translate-then-record flow behind the translator screen: current source
//! text and direction, history recording after each successful translation,
//! favoriting, and the health/model-info polls.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::features::translator::TranslationGateway;
use crate::core::lifecycle::{AsyncResource, TranslationLifecycle};
use crate::core::store::TranslationStore;
use crate::shared::error::AppResult;
use crate::shared::languages::{self, MAX_TEXT_LENGTH};
use crate::shared::settings::ClientSettings;
use crate::shared::types::{
    FavoriteEntry, HealthReport, HistoryEntry, ModelInfo, TranslationRecord, TranslationResult,
};

#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub source_text: String,
    pub source_language: String,
    pub target_language: String,
}

#[derive(Default)]
struct SessionState {
    source_text: String,
    source_language: String,
    target_language: String,
    /// Input that produced the result currently shown
    last_translation: Option<TranslationRecord>,
}

pub struct TranslatorSession {
    gateway: Arc<TranslationGateway>,
    lifecycle: TranslationLifecycle,
    store: Arc<TranslationStore>,
    state: Mutex<SessionState>,
}

impl TranslatorSession {
    /// Starts with the direction stored in the user's preferences.
    pub fn new(gateway: Arc<TranslationGateway>, store: Arc<TranslationStore>) -> Self {
        let prefs = store.preferences();
        Self {
            lifecycle: TranslationLifecycle::new(gateway.clone()),
            gateway,
            store,
            state: Mutex::new(SessionState {
                source_language: prefs.default_source_language,
                target_language: prefs.default_target_language,
                ..SessionState::default()
            }),
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> AppResult<Self> {
        let gateway = Arc::new(TranslationGateway::from_settings(settings)?);
        let store = Arc::new(TranslationStore::from_settings(settings)?);
        Ok(Self::new(gateway, store))
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("session mutex poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    pub fn lifecycle(&self) -> &TranslationLifecycle {
        &self.lifecycle
    }

    pub fn store(&self) -> &Arc<TranslationStore> {
        &self.store
    }

    pub fn view(&self) -> SessionView {
        let state = self.lock();
        SessionView {
            source_text: state.source_text.clone(),
            source_language: state.source_language.clone(),
            target_language: state.target_language.clone(),
        }
    }

    /// Replace the source text. Text longer than the limit is refused.
    pub fn set_source_text(&self, text: impl Into<String>) -> bool {
        let text = text.into();
        if text.chars().count() > MAX_TEXT_LENGTH {
            return false;
        }
        self.lock().source_text = text;
        true
    }

    pub fn set_languages(&self, source_language: &str, target_language: &str) -> AppResult<()> {
        let source = languages::validate_code(source_language)?;
        let target = languages::validate_code(target_language)?;
        let mut state = self.lock();
        state.source_language = source.to_string();
        state.target_language = target.to_string();
        Ok(())
    }

    /// Re-read the default direction from preferences.
    pub fn apply_preferences(&self) {
        let prefs = self.store.preferences();
        let mut state = self.lock();
        state.source_language = prefs.default_source_language;
        state.target_language = prefs.default_target_language;
    }

    /// Translate the current source text and record it in the history.
    pub async fn translate(&self) -> Option<TranslationResult> {
        let view = self.view();
        self.lifecycle.clear_error();
        let result = self
            .lifecycle
            .translate(&view.source_text, &view.source_language, &view.target_language)
            .await?;

        let record = TranslationRecord::from_result(
            view.source_text,
            view.source_language,
            view.target_language,
            &result,
        );
        self.store.add_to_history(record.clone());
        self.lock().last_translation = Some(record);
        Some(result)
    }

    pub async fn translate_text(&self, text: &str) -> Option<TranslationResult> {
        if !self.set_source_text(text) {
            // Over the limit: the lifecycle reports it without dispatching.
            let view = self.view();
            return self
                .lifecycle
                .translate(text, &view.source_language, &view.target_language)
                .await;
        }
        self.translate().await
    }

    /// Batch translation in the current direction. Batches are not recorded.
    pub async fn batch_translate(&self, texts: &[String]) -> Option<Vec<TranslationResult>> {
        let view = self.view();
        self.lifecycle
            .batch_translate(texts, &view.source_language, &view.target_language)
            .await
    }

    /// Favorite the translation currently shown.
    pub fn favorite_current(&self) -> Option<FavoriteEntry> {
        let current = self.lifecycle.result()?;
        let shown = current.as_single()?;
        let record = self.lock().last_translation.clone()?;
        if record.translated_text != shown.translated_text {
            return None;
        }
        self.store.add_to_favorites(record)
    }

    pub fn favorite_from_history(&self, id: &str) -> Option<FavoriteEntry> {
        let entry = self.store.find_history(id)?;
        self.store.add_to_favorites(TranslationRecord::from(&entry))
    }

    /// Swap the direction. A single result on screen becomes the new source
    /// text and is returned.
    pub fn swap_languages(&self) -> Option<String> {
        let shown = self
            .lifecycle
            .result()
            .and_then(|output| output.as_single().map(|r| r.translated_text.clone()));

        let mut state = self.lock();
        let SessionState {
            source_language,
            target_language,
            ..
        } = &mut *state;
        std::mem::swap(source_language, target_language);
        if let Some(text) = &shown {
            state.source_text = text.clone();
        }
        shown
    }

    pub fn select_from_history(&self, entry: &HistoryEntry) {
        let mut state = self.lock();
        state.source_text = entry.original_text.clone();
        state.source_language = entry.source_language.clone();
        state.target_language = entry.target_language.clone();
    }

    pub fn health_resource(&self) -> AsyncResource<HealthReport> {
        let gateway = self.gateway.clone();
        AsyncResource::new(move || {
            let gateway = gateway.clone();
            async move { Ok(gateway.health_check().await) }
        })
    }

    pub fn model_info_resource(&self) -> AsyncResource<ModelInfo> {
        let gateway = self.gateway.clone();
        AsyncResource::new(move || {
            let gateway = gateway.clone();
            async move { Ok(gateway.model_info().await) }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::features::translator::assess_health;
    use crate::core::remote::testing::ScriptedTransport;
    use crate::core::remote::TransportError;
    use crate::shared::types::{PreferencesPatch, RequestState};
    use serde_json::{json, Value};

    fn success(text: &str) -> Value {
        json!({
            "success": true,
            "data": {"translatedText": text, "confidence": 0.85, "method": "dictionary"}
        })
    }

    fn session(transport: ScriptedTransport) -> (TranslatorSession, Arc<ScriptedTransport>) {
        let transport = Arc::new(transport);
        let gateway = Arc::new(TranslationGateway::new(transport.clone()));
        let store = Arc::new(TranslationStore::in_memory());
        (TranslatorSession::new(gateway, store), transport)
    }

    #[tokio::test]
    async fn translation_is_recorded_in_history() {
        let (session, transport) = session(ScriptedTransport::new().respond(success("Hola")));

        let result = session.translate_text("Napaykullayki").await.unwrap();
        assert_eq!(result.translated_text, "Hola");

        let history = session.store().history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].original_text, "Napaykullayki");
        assert_eq!(history[0].translated_text, "Hola");
        assert_eq!(history[0].source_language, "qu");
        assert_eq!(history[0].target_language, "es");
        assert_eq!(transport.calls()[0].body.as_ref().unwrap()["sourceLanguage"], "qu");
    }

    #[tokio::test]
    async fn failed_translation_is_not_recorded() {
        let (session, _) = session(ScriptedTransport::new().fail(TransportError::from_status(500, Value::Null)));

        assert!(session.translate_text("Inti").await.is_none());
        assert!(session.store().history().is_empty());
        assert!(session.lifecycle().error().is_some());
    }

    #[tokio::test]
    async fn history_disabled_skips_recording() {
        let (session, _) = session(ScriptedTransport::new().respond(success("Sol")));
        session.store().update_preferences(PreferencesPatch {
            save_history: Some(false),
            ..Default::default()
        });

        assert!(session.translate_text("Inti").await.is_some());
        assert!(session.store().history().is_empty());
    }

    #[tokio::test]
    async fn defaults_follow_preferences() {
        let (session, _) = session(ScriptedTransport::new());
        assert_eq!(session.view().source_language, "qu");

        session.store().update_preferences(PreferencesPatch {
            default_source_language: Some("es".to_string()),
            default_target_language: Some("qu".to_string()),
            ..Default::default()
        });
        session.apply_preferences();

        let view = session.view();
        assert_eq!(view.source_language, "es");
        assert_eq!(view.target_language, "qu");
    }

    #[tokio::test]
    async fn swap_uses_translation_as_new_source() {
        let (session, _) = session(ScriptedTransport::new().respond(success("Hola")));

        assert_eq!(session.swap_languages(), None);
        assert_eq!(session.view().source_language, "es");
        session.swap_languages();

        session.translate_text("Napaykullayki").await;
        assert_eq!(session.swap_languages().as_deref(), Some("Hola"));

        let view = session.view();
        assert_eq!(view.source_text, "Hola");
        assert_eq!(view.source_language, "es");
        assert_eq!(view.target_language, "qu");
    }

    #[tokio::test]
    async fn favorites_current_result_once() {
        let (session, _) = session(ScriptedTransport::new().respond(success("Hola")));

        assert!(session.favorite_current().is_none());
        session.translate_text("Napaykullayki").await;

        let favorite = session.favorite_current().unwrap();
        assert_eq!(favorite.original_text, "Napaykullayki");
        assert_eq!(favorite.translated_text, "Hola");
        assert!(session.favorite_current().is_none());
        assert!(session.store().is_favorite("Napaykullayki", "qu"));
    }

    #[tokio::test]
    async fn favorites_from_history_and_selects_entry() {
        let (session, _) = session(ScriptedTransport::new().respond(success("Sol")));
        session.set_languages("qu", "es").unwrap();
        session.translate_text("Inti").await;

        let entry = session.store().history().remove(0);
        assert!(session.favorite_from_history(&entry.id).is_some());
        assert!(session.favorite_from_history("missing").is_none());

        session.set_source_text("otro");
        session.set_languages("es", "qu").unwrap();
        session.select_from_history(&entry);
        let view = session.view();
        assert_eq!(view.source_text, "Inti");
        assert_eq!(view.source_language, "qu");
    }

    #[tokio::test]
    async fn rejects_unsupported_direction_and_long_text() {
        let (session, _) = session(ScriptedTransport::new());
        assert!(session.set_languages("qu", "fr").is_err());
        assert_eq!(session.view().target_language, "es");

        assert!(!session.set_source_text("x".repeat(MAX_TEXT_LENGTH + 1)));
        assert!(session.set_source_text("x".repeat(MAX_TEXT_LENGTH)));
    }

    #[tokio::test]
    async fn health_and_model_info_resources() {
        let (session, _) = session(
            ScriptedTransport::new()
                .respond(json!({"status": "UP"}))
                .respond(json!({"success": true, "data": {
                    "modelName": "runa-nmt", "hasRealModel": true, "vocabularySize": 500, "version": "1.0"
                }})),
        );

        let health = session.health_resource();
        health.activate(Vec::<String>::new()).await;
        let report = health.snapshot().data.unwrap();
        assert_eq!(report.status, "UP");

        let model = session.model_info_resource();
        model.activate(Vec::<String>::new()).await;
        match model.state() {
            RequestState::Success(info) => assert_eq!(info.model_name, "runa-nmt"),
            other => panic!("unexpected state {:?}", other),
        }

        let envelope = crate::shared::types::Envelope::ok(report);
        assert!(assess_health(&envelope));
    }
}
