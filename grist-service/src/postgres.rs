//! PostgreSQL document store backend.
//!
//! This module is only available when the `postgres` feature is enabled.

use async_trait::async_trait;
use grist_rag::{Document, Metadata};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::debug;
use uuid::Uuid;

use crate::docstore::DocumentStore;
use crate::error::{Result, ServiceError};

/// A [`DocumentStore`] backed by a `raw_documents` table in PostgreSQL.
///
/// The pool is shared process-wide. Saving is an upsert keyed on `id`;
/// listing orders by insertion time, newest first.
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Connect to the database and ensure the `raw_documents` table exists.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(Self::map_err)?;
        Self::from_pool(pool).await
    }

    /// Build a store on an existing connection pool, ensuring the schema.
    pub async fn from_pool(pool: PgPool) -> Result<Self> {
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    fn map_err(e: sqlx::Error) -> ServiceError {
        ServiceError::Storage(e.to_string())
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS raw_documents (\
                id TEXT PRIMARY KEY, \
                title TEXT NOT NULL, \
                text TEXT NOT NULL, \
                metadata JSONB, \
                created_at TIMESTAMPTZ DEFAULT NOW()\
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(Self::map_err)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_raw_documents_title ON raw_documents(title)")
            .execute(&self.pool)
            .await
            .map_err(Self::map_err)?;

        debug!("ensured raw_documents schema");
        Ok(())
    }

    fn row_to_document(row: &sqlx::postgres::PgRow) -> Document {
        let metadata: Option<serde_json::Value> = row.get("metadata");
        let metadata = match metadata {
            Some(serde_json::Value::Object(map)) => map,
            _ => Metadata::new(),
        };
        Document {
            id: Some(row.get("id")),
            title: row.get("title"),
            text: row.get("text"),
            metadata,
        }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn save(&self, mut document: Document) -> Result<Document> {
        let id = match &document.id {
            Some(id) => id.clone(),
            None => {
                let id = Uuid::new_v4().to_string();
                document.id = Some(id.clone());
                id
            }
        };
        let metadata_json = serde_json::Value::Object(document.metadata.clone()).to_string();

        sqlx::query(
            "INSERT INTO raw_documents (id, title, text, metadata) \
             VALUES ($1, $2, $3, $4::jsonb) \
             ON CONFLICT (id) DO UPDATE SET \
                title = EXCLUDED.title, \
                text = EXCLUDED.text, \
                metadata = EXCLUDED.metadata",
        )
        .bind(&id)
        .bind(&document.title)
        .bind(&document.text)
        .bind(metadata_json)
        .execute(&self.pool)
        .await
        .map_err(Self::map_err)?;

        debug!(%id, "saved document");
        Ok(document)
    }

    async fn get(&self, id: &str) -> Result<Option<Document>> {
        let row = sqlx::query(
            "SELECT id, title, text, metadata FROM raw_documents WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Self::map_err)?;

        Ok(row.as_ref().map(Self::row_to_document))
    }

    async fn list(&self, title_filter: Option<&str>, limit: usize) -> Result<Vec<Document>> {
        let rows = match title_filter {
            Some(filter) => {
                sqlx::query(
                    "SELECT id, title, text, metadata FROM raw_documents \
                     WHERE title ILIKE $1 \
                     ORDER BY created_at DESC LIMIT $2",
                )
                .bind(format!("%{filter}%"))
                .bind(limit as i64)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    "SELECT id, title, text, metadata FROM raw_documents \
                     ORDER BY created_at DESC LIMIT $1",
                )
                .bind(limit as i64)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(Self::map_err)?;

        Ok(rows.iter().map(Self::row_to_document).collect())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM raw_documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Self::map_err)?;
        Ok(result.rows_affected() > 0)
    }
}
