//! In-memory vector index using inner-product distance.
//!
//! [`InMemoryIndex`] keeps rows in a `Vec` behind a `tokio::sync::RwLock`.
//! It is suitable for development, testing, and small corpora; the single
//! write lock makes every insert batch atomic with respect to searches.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{ChunkRecord, Metadata, RetrievedChunk};
use crate::error::{RagError, Result};
use crate::index::VectorIndex;

const BACKEND: &str = "InMemory";

/// An in-memory [`VectorIndex`] with the same distance semantics as the
/// pgvector backend: inner-product distance (negative dot product),
/// ascending.
#[derive(Debug)]
pub struct InMemoryIndex {
    dimensions: usize,
    rows: RwLock<Vec<ChunkRecord>>,
}

impl InMemoryIndex {
    /// Create an empty index with the given fixed dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, rows: RwLock::new(Vec::new()) }
    }

    /// Number of rows currently stored.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Whether the index holds no rows.
    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    fn check_dimensions(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimensions {
            return Err(RagError::Index {
                backend: BACKEND.to_string(),
                message: format!(
                    "expected {} dimensions, got {}",
                    self.dimensions,
                    vector.len()
                ),
            });
        }
        Ok(())
    }
}

/// Inner-product distance: the negative dot product, as pgvector's `<#>`
/// operator computes it. Smaller is more similar.
fn inner_product_distance(a: &[f32], b: &[f32]) -> f32 {
    -a.iter().zip(b.iter()).map(|(x, y)| x * y).sum::<f32>()
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn insert(
        &self,
        doc_id: &str,
        chunks: &[String],
        embeddings: &[Vec<f32>],
        metadata: &[Metadata],
    ) -> Result<()> {
        if chunks.len() != embeddings.len() || chunks.len() != metadata.len() {
            return Err(RagError::Index {
                backend: BACKEND.to_string(),
                message: format!(
                    "misaligned insert batch: {} chunks, {} embeddings, {} metadata entries",
                    chunks.len(),
                    embeddings.len(),
                    metadata.len()
                ),
            });
        }
        for embedding in embeddings {
            self.check_dimensions(embedding)?;
        }

        // Single write lock: the whole batch becomes visible at once.
        let mut rows = self.rows.write().await;
        for (idx, ((chunk, embedding), meta)) in
            chunks.iter().zip(embeddings).zip(metadata).enumerate()
        {
            rows.push(ChunkRecord {
                doc_id: doc_id.to_string(),
                chunk_idx: idx as i32,
                text: chunk.clone(),
                embedding: embedding.clone(),
                metadata: meta.clone(),
            });
        }
        Ok(())
    }

    async fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<RetrievedChunk>> {
        self.check_dimensions(query)?;

        let rows = self.rows.read().await;
        let mut scored: Vec<RetrievedChunk> = rows
            .iter()
            .map(|row| RetrievedChunk {
                doc_id: row.doc_id.clone(),
                chunk_idx: row.chunk_idx,
                text: row.text.clone(),
                distance: inner_product_distance(&row.embedding, query),
                metadata: row.metadata.clone(),
            })
            .collect();

        scored.sort_by(|a, b| {
            a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn delete_by_doc_id(&self, doc_id: &str) -> Result<u64> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|row| row.doc_id != doc_id);
        Ok((before - rows.len()) as u64)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
