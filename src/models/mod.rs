pub mod document;
pub mod error;
pub mod health;
pub mod messages;

pub use document::{DocRef, Document, Visibility};
pub use error::WsError;
pub use health::HealthResponse;
pub use messages::{
    ClientMessage, CursorBroadcastMessage, CursorUpdateMessage, DocumentChangeBroadcastMessage,
    DocumentChangeMessage, ErrorMessage, JoinDocumentMessage, ServerMessage, MAX_CONTENT_CHARS,
};
