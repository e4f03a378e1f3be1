//! Vector index trait for storing and searching chunk embeddings.

use async_trait::async_trait;

use crate::document::{Metadata, RetrievedChunk};
use crate::error::Result;

/// A similarity-searchable store of `(doc_id, chunk_idx, text, embedding,
/// metadata)` rows.
///
/// Dimensionality is fixed when the index is created and enforced at write
/// time. Inserts append rows — they never update existing ones, so
/// re-indexing a document without deleting first produces duplicate rows.
///
/// # Example
///
/// ```rust,ignore
/// use grist_rag::{InMemoryIndex, VectorIndex};
///
/// let index = InMemoryIndex::new(384);
/// index.insert("doc-1", &chunks, &embeddings, &metadata).await?;
/// let hits = index.search(&query_embedding, 3).await?;
/// ```
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Append one row per chunk, assigning `chunk_idx = 0..n-1`.
    ///
    /// `chunks`, `embeddings`, and `metadata` are positionally aligned and
    /// must have equal lengths; every embedding must match
    /// [`dimensions`](VectorIndex::dimensions). The batch is atomic: either
    /// all rows become searchable or none do.
    async fn insert(
        &self,
        doc_id: &str,
        chunks: &[String],
        embeddings: &[Vec<f32>],
        metadata: &[Metadata],
    ) -> Result<()>;

    /// Return up to `top_k` rows ordered by ascending inner-product distance
    /// (nearest first) to the query vector.
    async fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<RetrievedChunk>>;

    /// Delete every row for `doc_id`, returning the number of rows removed.
    async fn delete_by_doc_id(&self, doc_id: &str) -> Result<u64>;

    /// The dimensionality this index was created with.
    fn dimensions(&self) -> usize;
}
