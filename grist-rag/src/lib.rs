//! # grist-rag
//!
//! The retrieval core of the Grist RAG backend: document chunking, embedding
//! generation, a similarity-searchable vector index, and the pipeline that
//! composes them.
//!
//! The index path runs chunk → embed → insert; the query path runs
//! embed → search and returns chunks ranked by ascending distance. All
//! components are trait objects wired together through
//! [`RetrievalPipeline::builder()`], so backends can be swapped without
//! touching the pipeline.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use grist_rag::{Document, InMemoryIndex, RagConfig, RecursiveChunker, RetrievalPipeline};
//!
//! let config = RagConfig::default();
//! let pipeline = RetrievalPipeline::builder()
//!     .config(config.clone())
//!     .embedder(Arc::new(my_embedder))
//!     .index(Arc::new(InMemoryIndex::new(config.dimensions)))
//!     .chunker(Arc::new(RecursiveChunker::new(config.chunk_size, config.chunk_overlap)?))
//!     .build()?;
//!
//! let indexed = pipeline.index_document(&document).await?;
//! let hits = pipeline.query("what changed in Q3?", 3).await?;
//! ```
//!
//! ## Features
//!
//! - `openai` — [`OpenAiEmbedder`] backed by the OpenAI embeddings API
//! - `pgvector` — [`PgVectorIndex`] backed by PostgreSQL + pgvector

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod index;
pub mod inmemory;
pub mod pipeline;
pub mod retry;

#[cfg(feature = "openai")]
pub mod openai;
#[cfg(feature = "pgvector")]
pub mod pgvector;

pub use chunking::{Chunker, RecursiveChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{ChunkRecord, Document, Metadata, RetrievedChunk};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use index::VectorIndex;
pub use inmemory::InMemoryIndex;
pub use pipeline::{RetrievalPipeline, RetrievalPipelineBuilder};
pub use retry::{RetryPolicy, retry_fixed};

#[cfg(feature = "openai")]
pub use openai::OpenAiEmbedder;
#[cfg(feature = "pgvector")]
pub use pgvector::PgVectorIndex;
