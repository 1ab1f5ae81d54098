use axum::extract::ws::Message;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, error};

use crate::models::{ErrorMessage, ServerMessage, WsError};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// State for a single connection.
pub struct Connection {
    /// Authenticated identity, `None` for anonymous viewers.
    pub user_id: Option<i64>,
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    /// Last time any frame arrived from this connection. Read by the
    /// idle reaper.
    last_seen: Instant,
}

/// Tracks which connection belongs to which document room.
///
/// Rooms are keyed by the canonical numeric document id and exist only as
/// long as they have members — created on first join, dropped when the
/// last member leaves. Nothing here survives a restart; clients re-join
/// after reconnecting.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application.
#[derive(Default)]
pub struct SessionRegistry {
    connections: RwLock<HashMap<String, Connection>>,
    rooms: RwLock<HashMap<i64, HashSet<String>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn add(
        &self,
        conn_id: String,
        user_id: Option<i64>,
    ) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = Connection {
            user_id,
            sender: tx,
            last_seen: Instant::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    /// Remove a connection and clean up its room memberships.
    pub async fn remove(&self, conn_id: &str) {
        self.connections.write().await.remove(conn_id);
        let mut rooms = self.rooms.write().await;
        for members in rooms.values_mut() {
            members.remove(conn_id);
        }
        rooms.retain(|_, members| !members.is_empty());
    }

    /// Record inbound activity on a connection.
    pub async fn touch(&self, conn_id: &str) {
        if let Some(conn) = self.connections.write().await.get_mut(conn_id) {
            conn.last_seen = Instant::now();
        }
    }

    /// Add a connection to a room. Idempotent if already a member.
    pub async fn join(&self, room: i64, conn_id: &str) {
        self.rooms
            .write()
            .await
            .entry(room)
            .or_default()
            .insert(conn_id.to_string());
    }

    /// Remove a connection from a room, dropping the room when it empties.
    pub async fn leave(&self, room: i64, conn_id: &str) {
        let mut rooms = self.rooms.write().await;
        if let Some(members) = rooms.get_mut(&room) {
            members.remove(conn_id);
            if members.is_empty() {
                rooms.remove(&room);
            }
        }
    }

    pub async fn is_member(&self, room: i64, conn_id: &str) -> bool {
        self.rooms
            .read()
            .await
            .get(&room)
            .is_some_and(|members| members.contains(conn_id))
    }

    /// Deliver a message to every member of a room except `exclude` (the
    /// originator never receives an echo of its own event).
    ///
    /// Connections whose send channels are closed are silently skipped;
    /// they are cleaned up when their receive loop ends.
    pub async fn broadcast(&self, room: i64, message: &ServerMessage, exclude: &str) {
        let text = match serde_json::to_string(message) {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to serialize broadcast message: {}", e);
                return;
            }
        };

        let rooms = self.rooms.read().await;
        let Some(members) = rooms.get(&room) else {
            return;
        };
        let connections = self.connections.read().await;
        for conn_id in members {
            if conn_id == exclude {
                continue;
            }
            if let Some(conn) = connections.get(conn_id) {
                let _ = conn.sender.send(Message::Text(text.clone()));
            }
        }
    }

    /// Send a message to a single connection.
    pub async fn unicast(&self, conn_id: &str, message: &ServerMessage) {
        let text = match serde_json::to_string(message) {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to serialize message for {}: {}", conn_id, e);
                return;
            }
        };
        if let Some(conn) = self.connections.read().await.get(conn_id) {
            let _ = conn.sender.send(Message::Text(text));
        }
    }

    /// Unicast an error event to the originating connection.
    pub async fn send_error(&self, conn_id: &str, error: &WsError) {
        let message = ServerMessage::Error(ErrorMessage {
            message: error.client_message(),
        });
        self.unicast(conn_id, &message).await;
    }

    /// Send a Ping frame to every connected client.
    pub async fn ping_all(&self) {
        let connections = self.connections.read().await;
        for conn in connections.values() {
            let _ = conn.sender.send(Message::Ping(Vec::new()));
        }
    }

    /// Close connections with no inbound traffic for longer than
    /// `max_idle`. Returns the number of connections reaped.
    pub async fn reap_idle(&self, max_idle: Duration) -> usize {
        let stale: Vec<String> = {
            let connections = self.connections.read().await;
            connections
                .iter()
                .filter(|(_, conn)| conn.last_seen.elapsed() > max_idle)
                .map(|(id, _)| id.clone())
                .collect()
        };

        for conn_id in &stale {
            debug!(conn_id = %conn_id, "Closing idle WebSocket connection");
            if let Some(conn) = self.connections.read().await.get(conn_id) {
                let _ = conn.sender.send(Message::Close(None));
            }
            self.remove(conn_id).await;
        }

        stale.len()
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Return the current number of members in a room.
    pub async fn room_size(&self, room: i64) -> usize {
        self.rooms
            .read()
            .await
            .get(&room)
            .map_or(0, |members| members.len())
    }
}
