use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::db::store::{DocumentStore, StoreError};
use crate::models::{DocRef, Document};

/// In-memory document store.
///
/// Used when no database URL is configured and by the test suite. Contents
/// do not survive a restart.
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<i64, Document>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document, keyed by its numeric id.
    pub async fn insert(&self, document: Document) {
        self.documents.write().await.insert(document.id, document);
    }

    fn find<'a>(
        documents: &'a HashMap<i64, Document>,
        doc_ref: &DocRef,
    ) -> Option<&'a Document> {
        match doc_ref {
            DocRef::Id(id) => documents.get(id),
            DocRef::Share(share) => documents
                .values()
                .find(|doc| doc.share_id.to_string() == *share),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn get(&self, doc_ref: &DocRef) -> Result<Option<Document>, StoreError> {
        let documents = self.documents.read().await;
        let now = Utc::now();
        Ok(Self::find(&documents, doc_ref)
            .filter(|doc| !doc.is_expired(now))
            .cloned())
    }

    async fn apply_edit(&self, doc_ref: &DocRef, content: &str) -> Result<bool, StoreError> {
        let mut documents = self.documents.write().await;
        let now = Utc::now();
        let id = match Self::find(&documents, doc_ref) {
            Some(doc) if !doc.is_expired(now) => doc.id,
            _ => return Ok(false),
        };
        if let Some(doc) = documents.get_mut(&id) {
            doc.content = content.to_string();
        }
        Ok(true)
    }

    async fn sweep_expired(&self) -> Result<u64, StoreError> {
        let mut documents = self.documents.write().await;
        let now = Utc::now();
        let before = documents.len();
        documents.retain(|_, doc| !doc.is_expired(now));
        Ok((before - documents.len()) as u64)
    }
}
