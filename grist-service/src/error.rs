//! Error types for the `grist-service` crate.

use thiserror::Error;

/// Errors surfaced by the service boundary.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The requested entity does not exist. A typed miss, distinct from
    /// backend failures.
    #[error("not found: {0}")]
    NotFound(String),

    /// The completion model failed. Provider errors and transport failures
    /// both collapse into this single kind; no partial answer accompanies
    /// it.
    #[error("Model error: {0}")]
    Model(String),

    /// The document store failed.
    #[error("Document store error: {0}")]
    Storage(String),

    /// An error propagated from the retrieval pipeline.
    #[error(transparent)]
    Rag(#[from] grist_rag::RagError),

    /// An error propagated from conversation storage.
    #[error(transparent)]
    Memory(#[from] grist_memory::MemoryError),
}

/// A convenience result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
