//! End-to-end translation flow against a mock backend with an on-disk store.

use std::sync::Arc;
use std::time::Duration;

use mockito::{Matcher, Server};
use serde_json::json;

use runa_translate_lib::core::remote::classify::MSG_SERVER_ERROR;
use runa_translate_lib::shared::types::{PreferencesPatch, RequestState};
use runa_translate_lib::{
    assess_health, RemoteClient, TranslationGateway, TranslationStore, TranslatorSession,
};

fn gateway_for(server: &Server) -> Arc<TranslationGateway> {
    let client = RemoteClient::new(format!("{}/api/v1", server.url()), Duration::from_secs(5)).unwrap();
    Arc::new(TranslationGateway::new(Arc::new(client)))
}

#[tokio::test]
async fn translate_record_favorite_and_reload() {
    let mut server = Server::new_async().await;
    let translate = server
        .mock("POST", "/api/v1/translate")
        .match_body(Matcher::PartialJson(json!({"text": "Napaykullayki", "sourceLanguage": "qu"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"success":true,"data":{"translation":"Hola","confidence":0.92,"method":"dictionary","processingTime":12}}"#,
        )
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("translations.redb");

    let (entry_id, favorite_id) = {
        let store = Arc::new(TranslationStore::open(&db_path));
        let session = TranslatorSession::new(gateway_for(&server), store.clone());

        let result = session.translate_text("  Napaykullayki ").await.unwrap();
        assert_eq!(result.translated_text, "Hola");
        assert_eq!(result.processing_time, Some(12));

        let favorite = session.favorite_current().unwrap();
        let history = store.history();
        assert_eq!(history.len(), 1);
        (history[0].id.clone(), favorite.favorite_id)
    };
    translate.assert_async().await;

    let store = TranslationStore::open(&db_path);
    let history = store.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, entry_id);
    assert_eq!(history[0].original_text, "  Napaykullayki ");
    assert_eq!(store.favorites()[0].favorite_id, favorite_id);
    assert_eq!(store.search_history("HOLA").len(), 1);
}

#[tokio::test]
async fn server_failure_keeps_previous_result_and_history() {
    let mut server = Server::new_async().await;
    let _ok = server
        .mock("POST", "/api/v1/translate")
        .match_body(Matcher::PartialJson(json!({"text": "Inti"})))
        .with_status(200)
        .with_body(r#"{"success":true,"data":{"translatedText":"Sol","confidence":0.9,"method":"dictionary"}}"#)
        .create_async()
        .await;
    let _down = server
        .mock("POST", "/api/v1/translate")
        .match_body(Matcher::PartialJson(json!({"text": "Killa"})))
        .with_status(503)
        .create_async()
        .await;

    let store = Arc::new(TranslationStore::in_memory());
    store.update_preferences(PreferencesPatch {
        max_history_items: Some(5),
        ..Default::default()
    });
    let session = TranslatorSession::new(gateway_for(&server), store.clone());

    assert!(session.translate_text("Inti").await.is_some());
    assert!(session.translate_text("Killa").await.is_none());

    let state = session.lifecycle().snapshot();
    assert_eq!(state.error.as_deref(), Some(MSG_SERVER_ERROR));
    assert!(!state.is_loading);
    assert_eq!(
        state.result.unwrap().as_single().unwrap().translated_text,
        "Sol"
    );
    assert_eq!(store.history().len(), 1);
}

#[tokio::test]
async fn health_poll_accepts_both_shapes() {
    let mut server = Server::new_async().await;
    let _health = server
        .mock("GET", "/api/v1/health")
        .with_status(200)
        .with_body(r#"{"status":"UP","uptime":42.0}"#)
        .create_async()
        .await;

    let session = TranslatorSession::new(gateway_for(&server), Arc::new(TranslationStore::in_memory()));
    let health = session.health_resource();
    health.activate(["startup"]).await;

    match health.state() {
        RequestState::Success(report) => {
            assert_eq!(report.status, "UP");
            assert_eq!(report.uptime, Some(42.0));
        }
        other => panic!("unexpected state {:?}", other),
    }

    let envelope = session.lifecycle().gateway().health_check().await;
    assert!(assess_health(&envelope));
}
