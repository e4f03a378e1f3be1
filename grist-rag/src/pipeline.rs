//! Retrieval pipeline orchestrator.
//!
//! [`RetrievalPipeline`] composes a [`Chunker`], an [`EmbeddingProvider`],
//! and a [`VectorIndex`]. The index path runs chunk → embed → insert; the
//! query path runs embed → search. Construction is explicit — the pipeline
//! is meant to be built once at startup and passed to request handlers, not
//! held in a global.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use grist_rag::{InMemoryIndex, RagConfig, RecursiveChunker, RetrievalPipeline};
//!
//! let config = RagConfig::default();
//! let pipeline = RetrievalPipeline::builder()
//!     .config(config.clone())
//!     .embedder(Arc::new(embedder))
//!     .index(Arc::new(InMemoryIndex::new(config.dimensions)))
//!     .chunker(Arc::new(RecursiveChunker::new(config.chunk_size, config.chunk_overlap)?))
//!     .build()?;
//!
//! let indexed = pipeline.index_document(&document).await?;
//! let hits = pipeline.query("what changed in Q3?", config.top_k).await?;
//! ```

use std::sync::Arc;
use std::time::Instant;

use opentelemetry::global;
use opentelemetry::metrics::Histogram;
use tracing::{error, info};

use crate::chunking::Chunker;
use crate::config::RagConfig;
use crate::document::{Document, RetrievedChunk};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::VectorIndex;

/// The retrieval pipeline: chunk → embed → insert and embed → search.
///
/// Embeddings are recomputed on every call; nothing is cached across calls.
pub struct RetrievalPipeline {
    config: RagConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    chunker: Arc<dyn Chunker>,
    retrieval_latency: Histogram<f64>,
}

impl RetrievalPipeline {
    /// Create a new [`RetrievalPipelineBuilder`].
    pub fn builder() -> RetrievalPipelineBuilder {
        RetrievalPipelineBuilder::default()
    }

    /// The pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// The embedding provider.
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    /// The vector index.
    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    /// Index a document: chunk its text, embed the chunks, and insert one
    /// row per chunk. Returns the number of chunks indexed.
    ///
    /// Every chunk carries the same metadata snapshot: the document title
    /// merged over its metadata, taken now and not updated later. A document
    /// with no extractable text indexes zero chunks and is not an error.
    ///
    /// # Errors
    ///
    /// Embedding and index errors propagate with their variant intact so
    /// callers can distinguish the failing stage.
    pub async fn index_document(&self, document: &Document) -> Result<usize> {
        let doc_id = document.index_key();

        let chunks = self.chunker.chunk(&document.text);
        if chunks.is_empty() {
            info!(doc_id, chunk_count = 0, "indexed document (no extractable text)");
            return Ok(0);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.as_str()).collect();
        let embeddings = self.embedder.embed_many(&texts).await.inspect_err(|e| {
            error!(doc_id, error = %e, "embedding failed during indexing");
        })?;

        let metadata = vec![document.chunk_metadata(); chunks.len()];
        self.index.insert(doc_id, &chunks, &embeddings, &metadata).await.inspect_err(|e| {
            error!(doc_id, error = %e, "index insert failed during indexing");
        })?;

        let chunk_count = chunks.len();
        info!(doc_id, chunk_count, "indexed document");
        Ok(chunk_count)
    }

    /// Query the pipeline: embed the question and return up to `top_k`
    /// chunks ordered by ascending distance.
    pub async fn query(&self, question: &str, top_k: usize) -> Result<Vec<RetrievedChunk>> {
        let query_embedding = self.embedder.embed_one(question).await.inspect_err(|e| {
            error!(error = %e, "embedding failed during query");
        })?;

        let started = Instant::now();
        let results = self.index.search(&query_embedding, top_k).await.inspect_err(|e| {
            error!(error = %e, "vector index search failed");
        })?;
        self.retrieval_latency.record(started.elapsed().as_secs_f64(), &[]);

        info!(result_count = results.len(), top_k, "query completed");
        Ok(results)
    }
}

/// Builder for constructing a [`RetrievalPipeline`].
///
/// All fields are required. [`build()`](RetrievalPipelineBuilder::build)
/// validates that the embedder and the index agree on dimensionality.
#[derive(Default)]
pub struct RetrievalPipelineBuilder {
    config: Option<RagConfig>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    index: Option<Arc<dyn VectorIndex>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl RetrievalPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector index backend.
    pub fn index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the [`RetrievalPipeline`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if a component is missing, and
    /// [`RagError::Pipeline`] if the embedder and index disagree on
    /// dimensionality.
    pub fn build(self) -> Result<RetrievalPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::Config("config is required".to_string()))?;
        let embedder =
            self.embedder.ok_or_else(|| RagError::Config("embedder is required".to_string()))?;
        let index = self.index.ok_or_else(|| RagError::Config("index is required".to_string()))?;
        let chunker =
            self.chunker.ok_or_else(|| RagError::Config("chunker is required".to_string()))?;

        if embedder.dimensions() != index.dimensions() {
            return Err(RagError::Pipeline(format!(
                "embedder produces {}-dimensional vectors but the index expects {}",
                embedder.dimensions(),
                index.dimensions()
            )));
        }

        let retrieval_latency = global::meter("grist-rag")
            .f64_histogram("ai_retrieval_latency_seconds")
            .with_description("Time taken for vector index retrieval (seconds)")
            .init();

        Ok(RetrievalPipeline { config, embedder, index, chunker, retrieval_latency })
    }
}
