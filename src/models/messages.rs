use serde::{Deserialize, Serialize};

/// Maximum document content length, in characters.
///
/// Oversized edits are rejected outright: the store is left unchanged and
/// nothing is broadcast, so stored and broadcast content can never
/// diverge. Clients enforce the same limit before sending.
pub const MAX_CONTENT_CHARS: usize = 50_000;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct JoinDocumentMessage {
    pub document_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DocumentChangeMessage {
    pub document_id: String,
    pub content: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CursorUpdateMessage {
    pub document_id: String,
    pub position: serde_json::Value,
}

/// Messages received from clients over the WebSocket
#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "join-document")]
    JoinDocument(JoinDocumentMessage),
    #[serde(rename = "document-change")]
    DocumentChange(DocumentChangeMessage),
    #[serde(rename = "cursor-update")]
    CursorUpdate(CursorUpdateMessage),
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DocumentChangeBroadcastMessage {
    pub content: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CursorBroadcastMessage {
    pub user_id: Option<i64>,
    pub position: serde_json::Value,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorMessage {
    pub message: String,
}

/// Messages sent to clients over the WebSocket
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "document-change")]
    DocumentChange(DocumentChangeBroadcastMessage),
    #[serde(rename = "cursor-update")]
    CursorUpdate(CursorBroadcastMessage),
    #[serde(rename = "error")]
    Error(ErrorMessage),
}
