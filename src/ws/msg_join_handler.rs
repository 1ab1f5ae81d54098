use tracing::info;

use crate::models::{DocRef, JoinDocumentMessage};
use crate::services::access_policy;
use crate::state::AppState;

/// Handle a join-document event.
///
/// The access check runs against whichever addressing form the client
/// used; membership is recorded under the canonical numeric id so both
/// forms land in the same room. A failed join leaves the connection open.
pub async fn handle_join_message(
    app_state: &AppState,
    conn_id: &str,
    user_id: Option<i64>,
    join_msg: &JoinDocumentMessage,
) {
    info!(conn_id = %conn_id, "Join requested for document: {}", join_msg.document_id);

    let doc_ref = DocRef::parse(&join_msg.document_id);
    match access_policy::can_join(app_state.store.as_ref(), &doc_ref, user_id).await {
        Ok(document) => {
            app_state.registry.join(document.id, conn_id).await;
            info!(conn_id = %conn_id, room = document.id, "Client joined document room");
        }
        Err(e) => {
            info!(conn_id = %conn_id, "Join denied for document {}: {}", join_msg.document_id, e);
            app_state.registry.send_error(conn_id, &e).await;
        }
    }
}
