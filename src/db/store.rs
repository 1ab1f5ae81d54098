use async_trait::async_trait;
use thiserror::Error;

use crate::models::{DocRef, Document};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence seam for document content.
///
/// Both implementations resolve references with the same dual-addressing
/// rule as the access policy (numeric id first, share id fallback), and
/// both treat a document whose expiry has passed as absent — on reads and
/// on writes.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Cheap liveness probe, used by the readiness endpoint.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Fetch a document by reference. Returns `None` for unknown
    /// references and for expired documents.
    async fn get(&self, doc_ref: &DocRef) -> Result<Option<Document>, StoreError>;

    /// Replace the content of the referenced document (last-writer-wins).
    /// Returns `false` when no live document matched the reference.
    async fn apply_edit(&self, doc_ref: &DocRef, content: &str) -> Result<bool, StoreError>;

    /// Delete documents whose expiry has passed. Returns the number of
    /// documents removed.
    async fn sweep_expired(&self) -> Result<u64, StoreError>;
}
