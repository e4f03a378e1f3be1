//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that maps text to fixed-length dense vectors.
///
/// The dimensionality is a process-wide constant that must match the vector
/// index the vectors are stored in;
/// [`RetrievalPipeline::builder`](crate::RetrievalPipeline::builder) checks
/// the agreement at build time.
///
/// Providers own their retry behavior: transient backend failures are retried
/// with the fixed policy in [`retry`](crate::retry) and then propagated —
/// never replaced with a zero vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of inputs, one per input in
    /// the same order.
    ///
    /// The default implementation calls [`embed_one`](EmbeddingProvider::embed_one)
    /// sequentially; backends with native batching should override it.
    async fn embed_many(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed_one(text).await?);
        }
        Ok(results)
    }

    /// The dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;
}
