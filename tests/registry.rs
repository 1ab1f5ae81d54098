//! Unit tests for `SessionRegistry`.
//!
//! These exercise the room membership and fan-out logic directly, without
//! performing any WebSocket upgrades: connections are registered by hand
//! and their channel receivers inspected.

use std::time::Duration;

use axum::extract::ws::Message;
use padsync::models::{DocumentChangeBroadcastMessage, ServerMessage};
use padsync::ws::registry::SessionRegistry;
use tokio::sync::mpsc::UnboundedReceiver;

fn change(content: &str) -> ServerMessage {
    ServerMessage::DocumentChange(DocumentChangeBroadcastMessage {
        content: content.to_string(),
    })
}

fn recv_text(rx: &mut UnboundedReceiver<Message>) -> String {
    match rx.try_recv() {
        Ok(Message::Text(text)) => text,
        other => panic!("Expected a text frame, got: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test: new registry starts empty
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_registry_has_zero_connections() {
    let registry = SessionRegistry::new();

    assert_eq!(registry.connection_count().await, 0);
    assert_eq!(registry.room_size(1).await, 0);
}

// ---------------------------------------------------------------------------
// Test: add/remove update the connection count
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_and_remove_update_connection_count() {
    let registry = SessionRegistry::new();

    let _rx = registry.add("conn-1".to_string(), None).await;
    assert_eq!(registry.connection_count().await, 1);

    registry.remove("conn-1").await;
    assert_eq!(registry.connection_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: join is idempotent
// ---------------------------------------------------------------------------

#[tokio::test]
async fn repeated_join_does_not_duplicate_membership() {
    let registry = SessionRegistry::new();

    let _rx = registry.add("conn-1".to_string(), None).await;
    registry.join(42, "conn-1").await;
    registry.join(42, "conn-1").await;

    assert_eq!(registry.room_size(42).await, 1);
}

// ---------------------------------------------------------------------------
// Test: broadcast reaches every member except the originator
// ---------------------------------------------------------------------------

#[tokio::test]
async fn broadcast_excludes_the_originator() {
    let registry = SessionRegistry::new();

    let mut rx_a = registry.add("conn-a".to_string(), None).await;
    let mut rx_b = registry.add("conn-b".to_string(), None).await;
    let mut rx_c = registry.add("conn-c".to_string(), None).await;
    registry.join(42, "conn-a").await;
    registry.join(42, "conn-b").await;
    registry.join(42, "conn-c").await;

    registry.broadcast(42, &change("hello"), "conn-a").await;

    assert!(rx_a.try_recv().is_err(), "originator must not receive an echo");
    assert!(recv_text(&mut rx_b).contains("hello"));
    assert!(recv_text(&mut rx_c).contains("hello"));
}

// ---------------------------------------------------------------------------
// Test: broadcast is scoped to one room
// ---------------------------------------------------------------------------

#[tokio::test]
async fn broadcast_does_not_cross_rooms() {
    let registry = SessionRegistry::new();

    let mut rx_a = registry.add("conn-a".to_string(), None).await;
    let mut rx_b = registry.add("conn-b".to_string(), None).await;
    registry.join(1, "conn-a").await;
    registry.join(2, "conn-b").await;

    registry.broadcast(1, &change("for room 1"), "conn-other").await;

    assert!(recv_text(&mut rx_a).contains("for room 1"));
    assert!(rx_b.try_recv().is_err(), "other rooms must not receive the event");
}

// ---------------------------------------------------------------------------
// Test: removing a connection cleans up its memberships
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remove_cleans_up_room_membership() {
    let registry = SessionRegistry::new();

    let _rx_a = registry.add("conn-a".to_string(), None).await;
    let mut rx_b = registry.add("conn-b".to_string(), None).await;
    registry.join(42, "conn-a").await;
    registry.join(42, "conn-b").await;

    registry.remove("conn-a").await;
    assert_eq!(registry.room_size(42).await, 1);

    // The departed connection no longer receives anything; the remaining
    // member still does.
    registry.broadcast(42, &change("still here"), "conn-other").await;
    assert!(recv_text(&mut rx_b).contains("still here"));
}

// ---------------------------------------------------------------------------
// Test: leave drops empty rooms
// ---------------------------------------------------------------------------

#[tokio::test]
async fn leave_drops_room_when_last_member_departs() {
    let registry = SessionRegistry::new();

    let _rx = registry.add("conn-a".to_string(), None).await;
    registry.join(42, "conn-a").await;
    assert!(registry.is_member(42, "conn-a").await);

    registry.leave(42, "conn-a").await;
    assert!(!registry.is_member(42, "conn-a").await);
    assert_eq!(registry.room_size(42).await, 0);
}

// ---------------------------------------------------------------------------
// Test: unicast targets a single connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unicast_reaches_only_the_target() {
    let registry = SessionRegistry::new();

    let mut rx_a = registry.add("conn-a".to_string(), None).await;
    let mut rx_b = registry.add("conn-b".to_string(), None).await;

    registry.unicast("conn-a", &change("just you")).await;

    assert!(recv_text(&mut rx_a).contains("just you"));
    assert!(rx_b.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// Test: idle reaper closes silent connections and keeps active ones
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reap_idle_closes_stale_connections() {
    let registry = SessionRegistry::new();

    let mut rx_stale = registry.add("conn-stale".to_string(), None).await;
    let _rx_fresh = registry.add("conn-fresh".to_string(), None).await;
    registry.join(42, "conn-stale").await;

    // Nothing is stale against a generous bound.
    assert_eq!(registry.reap_idle(Duration::from_secs(60)).await, 0);

    tokio::time::sleep(Duration::from_millis(20)).await;
    registry.touch("conn-fresh").await;

    let reaped = registry.reap_idle(Duration::from_millis(10)).await;
    assert_eq!(reaped, 1);
    assert_eq!(registry.connection_count().await, 1);
    assert_eq!(registry.room_size(42).await, 0);

    // The reaped connection was sent a Close frame.
    assert!(matches!(rx_stale.try_recv(), Ok(Message::Close(None))));
}
