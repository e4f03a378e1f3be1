//! Document record store: the thin keyed collaborator holding raw documents.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use grist_rag::Document;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::Result;

/// Keyed storage of raw [`Document`] records.
///
/// `save` assigns a fresh UUID when the document has no id and upserts by id
/// after that. Listing returns newest first, optionally filtered by a
/// case-insensitive title substring.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Save a document, assigning an id if absent. Returns the saved record.
    async fn save(&self, document: Document) -> Result<Document>;

    /// Fetch a document by id. `None` is an ordinary miss.
    async fn get(&self, id: &str) -> Result<Option<Document>>;

    /// List documents, newest first, optionally filtered by title substring.
    async fn list(&self, title_filter: Option<&str>, limit: usize) -> Result<Vec<Document>>;

    /// Delete a document by id. Returns whether a record was removed.
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// A process-local [`DocumentStore`] for development and tests.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<String, (Document, DateTime<Utc>)>>,
}

impl InMemoryDocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn save(&self, mut document: Document) -> Result<Document> {
        let id = match &document.id {
            Some(id) => id.clone(),
            None => {
                let id = Uuid::new_v4().to_string();
                document.id = Some(id.clone());
                id
            }
        };

        let mut documents = self.documents.write().await;
        let created_at = documents.get(&id).map(|(_, at)| *at).unwrap_or_else(Utc::now);
        documents.insert(id, (document.clone(), created_at));
        Ok(document)
    }

    async fn get(&self, id: &str) -> Result<Option<Document>> {
        let documents = self.documents.read().await;
        Ok(documents.get(id).map(|(doc, _)| doc.clone()))
    }

    async fn list(&self, title_filter: Option<&str>, limit: usize) -> Result<Vec<Document>> {
        let documents = self.documents.read().await;
        let mut entries: Vec<(&Document, DateTime<Utc>)> = documents
            .values()
            .filter(|(doc, _)| match title_filter {
                Some(filter) => doc.title.to_lowercase().contains(&filter.to_lowercase()),
                None => true,
            })
            .map(|(doc, at)| (doc, *at))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(entries.into_iter().take(limit).map(|(doc, _)| doc.clone()).collect())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut documents = self.documents.write().await;
        Ok(documents.remove(id).is_some())
    }
}
