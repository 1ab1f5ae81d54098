//! Tests for the immediate-broadcast ordering mode.
//!
//! With `BROADCAST_AFTER_PERSIST=false` an edit fans out on receipt and
//! the persistence write runs concurrently. The ordering mode is part of
//! the process-wide configuration, so these tests live in their own
//! binary where it can be installed before any handler runs.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::ws::Message;
use padsync::config::{self, Config};
use padsync::db::memory::MemoryDocumentStore;
use padsync::db::store::{DocumentStore, StoreError};
use padsync::models::{DocRef, Document, DocumentChangeMessage, JoinDocumentMessage, Visibility};
use padsync::state::AppState;
use padsync::ws::msg_change_handler::handle_change_message;
use padsync::ws::msg_join_handler::handle_join_message;
use padsync::ws::registry::SessionRegistry;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;
use uuid::Uuid;

fn install_fire_and_forget_config() {
    config::init_config(Config {
        broadcast_after_persist: false,
        ..Config::default()
    });
}

fn document(id: i64, owner_id: Option<i64>) -> Document {
    Document {
        id,
        share_id: Uuid::new_v4(),
        title: format!("doc-{id}"),
        content: "original".to_string(),
        owner_id,
        visibility: Visibility::Public,
        expires_at: None,
    }
}

fn recv_json(rx: &mut UnboundedReceiver<Message>) -> Value {
    match rx.try_recv() {
        Ok(Message::Text(text)) => serde_json::from_str(&text).expect("frame should be JSON"),
        other => panic!("Expected a text frame, got: {other:?}"),
    }
}

/// Wait for the concurrent write path to deliver a frame.
async fn recv_json_eventually(rx: &mut UnboundedReceiver<Message>) -> Value {
    match timeout(Duration::from_secs(1), rx.recv()).await {
        Ok(Some(Message::Text(text))) => {
            serde_json::from_str(&text).expect("frame should be JSON")
        }
        other => panic!("Expected a text frame, got: {other:?}"),
    }
}

fn join(document_id: &str) -> JoinDocumentMessage {
    JoinDocumentMessage {
        document_id: document_id.to_string(),
    }
}

fn change(document_id: &str, content: &str) -> DocumentChangeMessage {
    DocumentChangeMessage {
        document_id: document_id.to_string(),
        content: content.to_string(),
    }
}

/// A store whose writes always fail. Reads succeed so the access check
/// passes and the failure is isolated to the persistence step.
struct FailingStore {
    document: Document,
}

#[async_trait]
impl DocumentStore for FailingStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn get(&self, _doc_ref: &DocRef) -> Result<Option<Document>, StoreError> {
        Ok(Some(self.document.clone()))
    }

    async fn apply_edit(&self, _doc_ref: &DocRef, _content: &str) -> Result<bool, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolClosed))
    }

    async fn sweep_expired(&self) -> Result<u64, StoreError> {
        Ok(0)
    }
}

// ---------------------------------------------------------------------------
// Scenario: the fan-out does not wait for the write
// ---------------------------------------------------------------------------

#[tokio::test]
async fn change_is_broadcast_before_the_write_lands() {
    install_fire_and_forget_config();

    let doc = document(42, Some(7));
    let share = doc.share_id.to_string();
    let store = Arc::new(MemoryDocumentStore::new());
    store.insert(doc).await;
    let app_state = AppState {
        store: store.clone(),
        registry: Arc::new(SessionRegistry::new()),
    };

    let mut rx_a = app_state.registry.add("conn-a".to_string(), Some(7)).await;
    let mut rx_b = app_state.registry.add("conn-b".to_string(), None).await;
    handle_join_message(&app_state, "conn-a", Some(7), &join(&share)).await;
    handle_join_message(&app_state, "conn-b", None, &join(&share)).await;

    handle_change_message(&app_state, "conn-a", Some(7), change(&share, "hello")).await;

    // The frame is already in B's channel when the handler returns, before
    // the concurrent write has necessarily finished.
    let frame = recv_json(&mut rx_b);
    assert_eq!(frame["type"], "document-change");
    assert_eq!(frame["content"], "hello");

    // The write still lands.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
    loop {
        let stored = store.get(&DocRef::Id(42)).await.unwrap().unwrap();
        if stored.content == "hello" {
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "write never reached the store"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    // No echo and no error for the originator on the happy path.
    assert!(rx_a.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// Scenario: a failed write does not suppress the broadcast
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_write_still_broadcasts_and_reports_to_the_originator() {
    install_fire_and_forget_config();

    let doc = document(42, Some(7));
    let share = doc.share_id.to_string();
    let app_state = AppState {
        store: Arc::new(FailingStore { document: doc }),
        registry: Arc::new(SessionRegistry::new()),
    };

    let mut rx_a = app_state.registry.add("conn-a".to_string(), Some(7)).await;
    let mut rx_b = app_state.registry.add("conn-b".to_string(), None).await;
    handle_join_message(&app_state, "conn-a", Some(7), &join(&share)).await;
    handle_join_message(&app_state, "conn-b", None, &join(&share)).await;

    handle_change_message(&app_state, "conn-a", Some(7), change(&share, "lost write")).await;

    // Other members see the edit even though it never reached storage.
    let frame = recv_json(&mut rx_b);
    assert_eq!(frame["type"], "document-change");
    assert_eq!(frame["content"], "lost write");

    // The originator is still told about the failure, asynchronously.
    let frame = recv_json_eventually(&mut rx_a).await;
    assert_eq!(frame["type"], "error");
    assert_eq!(frame["message"], "Failed to save document");

    // Nobody else hears about it.
    assert!(rx_b.try_recv().is_err(), "the failure report is unicast");
}
