use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config;
use crate::models::ClientMessage;
use crate::services::auth_service;
use crate::state::AppState;
use crate::ws::msg_change_handler::handle_change_message;
use crate::ws::msg_cursor_handler::handle_cursor_message;
use crate::ws::msg_join_handler::handle_join_message;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
}

/// WebSocket handler
///
/// Authentication is opportunistic: a connection without a token proceeds
/// as anonymous (so holders of a share link can view public documents),
/// but a token that is present and invalid refuses the upgrade.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
    State(app_state): State<AppState>,
) -> Response {
    info!("New WebSocket connection attempt");

    let user_id = match authenticate_handshake(&headers, query.token) {
        Ok(user_id) => user_id,
        Err(status) => return status.into_response(),
    };

    ws.on_upgrade(move |socket| handle_socket(socket, user_id, app_state))
}

/// Resolve the identity offered at handshake time.
///
/// Any offered credential that cannot be verified is refused as 401,
/// including a token offered while no JWT secret is configured: the
/// credential is the client's, and a 5xx would wrongly blame the server.
fn authenticate_handshake(
    headers: &HeaderMap,
    query_token: Option<String>,
) -> Result<Option<i64>, StatusCode> {
    let Some(token) = auth_service::extract_token(headers, query_token) else {
        return Ok(None);
    };

    let config = config::get_config();
    let Some(secret) = &config.auth_jwt_secret else {
        error!("Auth JWT secret not configured, refusing offered token");
        return Err(StatusCode::UNAUTHORIZED);
    };

    match auth_service::verify_credential(&token, secret) {
        Ok(user_id) => Ok(Some(user_id)),
        Err(e) => {
            info!("Rejecting WebSocket handshake: {}", e);
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

/// Handle a WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with the session registry.
///   2. Spawns a sender task that forwards messages from the registry
///      channel to the sink.
///   3. Dispatches inbound events on the current task, in receipt order.
///   4. Cleans up registry state on disconnect.
async fn handle_socket(socket: WebSocket, user_id: Option<i64>, app_state: AppState) {
    // Generate unique connection ID to identify this client
    let conn_id = Uuid::new_v4().to_string();
    info!(conn_id = %conn_id, user_id = ?user_id, "WebSocket connection established");

    // Register and get the receiver for outbound messages.
    let mut rx = app_state.registry.add(conn_id.clone(), user_id).await;

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward registry channel messages to the socket.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() {
                debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
            if closing {
                break;
            }
        }
    });

    // Receive loop: one event at a time, each run to completion before the
    // next is taken up, so per-connection order is preserved end to end.
    while let Some(result) = stream.next().await {
        let msg = match result {
            Ok(msg) => msg,
            Err(e) => {
                debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        };

        app_state.registry.touch(&conn_id).await;

        match msg {
            Message::Text(text) => {
                let client_msg: ClientMessage = match serde_json::from_str(&text) {
                    Ok(client_msg) => client_msg,
                    Err(e) => {
                        error!(conn_id = %conn_id, "Failed to parse message: {}", e);
                        continue;
                    }
                };

                match client_msg {
                    ClientMessage::JoinDocument(join_msg) => {
                        handle_join_message(&app_state, &conn_id, user_id, &join_msg).await;
                    }
                    ClientMessage::DocumentChange(change_msg) => {
                        handle_change_message(&app_state, &conn_id, user_id, change_msg).await;
                    }
                    ClientMessage::CursorUpdate(cursor_msg) => {
                        handle_cursor_message(&app_state, &conn_id, user_id, &cursor_msg).await;
                    }
                }
            }
            Message::Close(_) => break,
            Message::Pong(_) => {
                // Already counted as activity by the touch above.
            }
            _ => {}
        }
    }

    // Clean up: membership is implicit, so dropping the connection from
    // the registry is all that is needed.
    app_state.registry.remove(&conn_id).await;
    send_task.abort();
    info!(conn_id = %conn_id, "WebSocket connection terminated");
}
