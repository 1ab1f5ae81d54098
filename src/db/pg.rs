use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::db::store::{DocumentStore, StoreError};
use crate::models::{DocRef, Document, Visibility};

/// Document row as stored in the `documents` table
#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: i64,
    share_id: Uuid,
    title: String,
    content: String,
    owner_id: Option<i64>,
    visibility: String,
    expires_at: Option<DateTime<Utc>>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document {
            id: row.id,
            share_id: row.share_id,
            title: row.title,
            content: row.content,
            owner_id: row.owner_id,
            visibility: Visibility::parse(&row.visibility),
            expires_at: row.expires_at,
        }
    }
}

const SELECT_BY_ID: &str = r#"
    SELECT id::bigint AS id, share_id, title,
           COALESCE(content, '') AS content,
           owner_id::bigint AS owner_id,
           COALESCE(visibility, 'private') AS visibility, expires_at
    FROM documents
    WHERE id = $1 AND (expires_at IS NULL OR expires_at > now())
"#;

const SELECT_BY_SHARE_ID: &str = r#"
    SELECT id::bigint AS id, share_id, title,
           COALESCE(content, '') AS content,
           owner_id::bigint AS owner_id,
           COALESCE(visibility, 'private') AS visibility, expires_at
    FROM documents
    WHERE share_id = $1 AND (expires_at IS NULL OR expires_at > now())
"#;

const UPDATE_BY_ID: &str = r#"
    UPDATE documents SET content = $1
    WHERE id = $2 AND (expires_at IS NULL OR expires_at > now())
"#;

const UPDATE_BY_SHARE_ID: &str = r#"
    UPDATE documents SET content = $1
    WHERE share_id = $2 AND (expires_at IS NULL OR expires_at > now())
"#;

const DELETE_EXPIRED: &str = r#"
    DELETE FROM documents
    WHERE expires_at IS NOT NULL AND expires_at < now()
"#;

/// Postgres-backed document store
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Create a new store with its own connection pool
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        info!("Connecting to database...");

        let pool = PgPoolOptions::new()
            .max_connections(20)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .connect(database_url)
            .await?;

        info!("Database connection pool created successfully");

        Ok(Self { pool })
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn get(&self, doc_ref: &DocRef) -> Result<Option<Document>, StoreError> {
        let row = match doc_ref {
            DocRef::Id(id) => {
                sqlx::query_as::<_, DocumentRow>(SELECT_BY_ID)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            DocRef::Share(share) => {
                // Share ids are uuids in storage. A reference that does
                // not even parse as one cannot match any document.
                let Ok(share_uuid) = Uuid::parse_str(share) else {
                    return Ok(None);
                };
                sqlx::query_as::<_, DocumentRow>(SELECT_BY_SHARE_ID)
                    .bind(share_uuid)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };

        Ok(row.map(Document::from))
    }

    async fn apply_edit(&self, doc_ref: &DocRef, content: &str) -> Result<bool, StoreError> {
        let result = match doc_ref {
            DocRef::Id(id) => {
                sqlx::query(UPDATE_BY_ID)
                    .bind(content)
                    .bind(id)
                    .execute(&self.pool)
                    .await?
            }
            DocRef::Share(share) => {
                let Ok(share_uuid) = Uuid::parse_str(share) else {
                    return Ok(false);
                };
                sqlx::query(UPDATE_BY_SHARE_ID)
                    .bind(content)
                    .bind(share_uuid)
                    .execute(&self.pool)
                    .await?
            }
        };

        Ok(result.rows_affected() > 0)
    }

    async fn sweep_expired(&self) -> Result<u64, StoreError> {
        let result = sqlx::query(DELETE_EXPIRED).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
