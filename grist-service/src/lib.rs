//! # grist-service
//!
//! The application layer of the Grist RAG backend: a dependency-injected
//! [`RagService`] that a routing layer calls for its index, search, query,
//! and delete endpoints.
//!
//! The query path resolves a conversation, retrieves grounding chunks
//! through `grist-rag`, assembles a bounded history window from
//! `grist-memory`, invokes a [`CompletionModel`], and records the exchange
//! back into memory.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use grist_service::{QueryRequest, RagService};
//!
//! let service = RagService::builder()
//!     .pipeline(pipeline)
//!     .documents(Arc::new(document_store))
//!     .memory(Arc::new(conversation_store))
//!     .model(Arc::new(completion_model))
//!     .build()?;
//!
//! let saved = service.index_documents(vec![document]).await?;
//! let outcome = service.query(QueryRequest::new("What changed in Q3?")).await?;
//! ```
//!
//! ## Features
//!
//! - `openai` — [`OpenAiChatModel`] backed by the OpenAI chat completions API
//! - `postgres` — [`PgDocumentStore`] backed by PostgreSQL

pub mod completion;
pub mod docstore;
pub mod error;
pub mod service;
pub mod telemetry;

#[cfg(feature = "openai")]
pub mod openai;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use completion::CompletionModel;
pub use docstore::{DocumentStore, InMemoryDocumentStore};
pub use error::{Result, ServiceError};
pub use service::{
    DeleteOutcome, QueryRequest, QueryOutcome, RagService, RagServiceBuilder, SearchHit,
};

#[cfg(feature = "openai")]
pub use openai::OpenAiChatModel;
#[cfg(feature = "postgres")]
pub use postgres::PgDocumentStore;

// Re-export the core data types boundary callers exchange with the service.
pub use grist_memory::{Message, Role};
pub use grist_rag::{Document, Metadata, RetrievedChunk};
