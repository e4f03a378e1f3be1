//! Data types for documents, indexed chunk rows, and search results.

use serde::{Deserialize, Serialize};

/// Open key-value metadata attached to documents and chunks.
///
/// Values are arbitrary JSON so callers can store nested structures; the
/// pgvector backend persists this as a `JSONB` column.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A source document containing text content and metadata.
///
/// `id` may be absent on input; the document store assigns a fresh UUID on
/// save and upserts by id after that.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier, generated on save if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Human-readable title.
    pub title: String,
    /// The text content to be chunked and indexed.
    pub text: String,
    /// Key-value metadata associated with the document.
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    /// Create a document with no id and empty metadata.
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: None, title: title.into(), text: text.into(), metadata: Metadata::new() }
    }

    /// The identifier chunks are indexed under: the document id, or the
    /// title when no id has been assigned yet.
    pub fn index_key(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.title)
    }

    /// The metadata snapshot stored with every chunk of this document:
    /// the title merged over the document metadata. The snapshot is taken
    /// at index time and is not updated if the document changes later.
    pub fn chunk_metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("title".to_string(), serde_json::Value::String(self.title.clone()));
        for (key, value) in &self.metadata {
            metadata.insert(key.clone(), value.clone());
        }
        metadata
    }
}

/// A row in the vector index: one chunk of one document with its embedding.
///
/// `chunk_idx` is 0-based and unique within `doc_id` for a single indexing
/// pass. Re-indexing the same `doc_id` without deleting first appends a
/// second run of rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkRecord {
    /// The id of the document this chunk came from. Not a foreign key: a
    /// chunk may outlive its document.
    pub doc_id: String,
    /// 0-based position of this chunk within its indexing batch.
    pub chunk_idx: i32,
    /// The chunk text.
    pub text: String,
    /// The embedding vector, fixed dimensionality per index.
    pub embedding: Vec<f32>,
    /// Metadata snapshot taken from the document at index time.
    pub metadata: Metadata,
}

/// A chunk returned from a similarity search, paired with its distance to
/// the query vector. Lower distance means more similar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// The id of the source document.
    pub doc_id: String,
    /// 0-based chunk position within its indexing batch.
    pub chunk_idx: i32,
    /// The chunk text.
    pub text: String,
    /// Inner-product distance to the query vector (ascending = nearest).
    pub distance: f32,
    /// Metadata snapshot stored with the chunk.
    pub metadata: Metadata,
}
