use tracing::{error, info};

use crate::config;
use crate::models::messages::MAX_CONTENT_CHARS;
use crate::models::{
    DocRef, DocumentChangeBroadcastMessage, DocumentChangeMessage, ServerMessage, WsError,
};
use crate::services::access_policy;
use crate::state::AppState;

/// Handle a document-change event.
///
/// Pipeline: validate size, check edit rights, persist, broadcast. The
/// broadcast payload is always the content as received — never re-read
/// from storage — so a concurrent edit racing through the store cannot
/// corrupt what this event's room members see.
///
/// With `broadcast_after_persist` (the default) the fan-out waits for the
/// write to succeed, so no update is ever broadcast whose write failed.
/// When disabled, the fan-out happens immediately in receipt order and
/// the write runs concurrently, with failures still reported to the
/// originator.
pub async fn handle_change_message(
    app_state: &AppState,
    conn_id: &str,
    user_id: Option<i64>,
    change_msg: DocumentChangeMessage,
) {
    if change_msg.content.chars().count() > MAX_CONTENT_CHARS {
        info!(conn_id = %conn_id, "Rejecting oversized edit for document {}", change_msg.document_id);
        app_state
            .registry
            .send_error(conn_id, &WsError::payload_too_large())
            .await;
        return;
    }

    let doc_ref = DocRef::parse(&change_msg.document_id);
    let document =
        match access_policy::can_edit(app_state.store.as_ref(), &doc_ref, user_id).await {
            Ok(document) => document,
            Err(e) => {
                info!(conn_id = %conn_id, "Edit denied for document {}: {}", change_msg.document_id, e);
                app_state.registry.send_error(conn_id, &e).await;
                return;
            }
        };

    let broadcast_msg = ServerMessage::DocumentChange(DocumentChangeBroadcastMessage {
        content: change_msg.content.clone(),
    });

    if config::get_config().broadcast_after_persist {
        match app_state
            .store
            .apply_edit(&doc_ref, &change_msg.content)
            .await
        {
            Ok(true) => {
                app_state
                    .registry
                    .broadcast(document.id, &broadcast_msg, conn_id)
                    .await;
            }
            Ok(false) => {
                // The document disappeared between the access check and
                // the write (deleted or expired).
                app_state.registry.send_error(conn_id, &WsError::NotFound).await;
            }
            Err(e) => {
                error!("Error updating document {}: {}", document.id, e);
                app_state
                    .registry
                    .send_error(conn_id, &WsError::PersistenceFailure(e))
                    .await;
            }
        }
    } else {
        // Fire-and-forget ordering: fan out on receipt, persist
        // concurrently. Last-writer-wins in storage.
        app_state
            .registry
            .broadcast(document.id, &broadcast_msg, conn_id)
            .await;

        let store = app_state.store.clone();
        let registry = app_state.registry.clone();
        let conn_id = conn_id.to_string();
        let content = change_msg.content;
        tokio::spawn(async move {
            match store.apply_edit(&doc_ref, &content).await {
                Ok(true) => {}
                Ok(false) => {
                    registry.send_error(&conn_id, &WsError::NotFound).await;
                }
                Err(e) => {
                    error!("Error updating document {}: {}", document.id, e);
                    registry
                        .send_error(&conn_id, &WsError::PersistenceFailure(e))
                        .await;
                }
            }
        });
    }
}
