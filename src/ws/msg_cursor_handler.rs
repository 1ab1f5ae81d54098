use tracing::info;

use crate::models::{CursorBroadcastMessage, CursorUpdateMessage, DocRef, ServerMessage};
use crate::services::access_policy;
use crate::state::AppState;

/// Handle a cursor-update event.
///
/// Presence data is ephemeral: it is rebroadcast to the room, tagged with
/// the sender's identity, and never persisted.
pub async fn handle_cursor_message(
    app_state: &AppState,
    conn_id: &str,
    user_id: Option<i64>,
    cursor_msg: &CursorUpdateMessage,
) {
    let doc_ref = DocRef::parse(&cursor_msg.document_id);
    let document =
        match access_policy::can_join(app_state.store.as_ref(), &doc_ref, user_id).await {
            Ok(document) => document,
            Err(e) => {
                info!(conn_id = %conn_id, "Cursor update denied for document {}: {}", cursor_msg.document_id, e);
                app_state.registry.send_error(conn_id, &e).await;
                return;
            }
        };

    let broadcast_msg = ServerMessage::CursorUpdate(CursorBroadcastMessage {
        user_id,
        position: cursor_msg.position.clone(),
    });
    app_state
        .registry
        .broadcast(document.id, &broadcast_msg, conn_id)
        .await;
}
