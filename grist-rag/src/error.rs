//! Error types for the `grist-rag` crate.

use thiserror::Error;

/// Errors that can occur in retrieval operations.
///
/// [`Embedding`](RagError::Embedding) and [`Index`](RagError::Index) cover
/// transient I/O against external backends and are the variants the fixed
/// retry policy applies to; [`Config`](RagError::Config) is fatal at
/// construction time and never retried.
#[derive(Debug, Error)]
pub enum RagError {
    /// A configuration validation error (bad chunk parameters, missing
    /// credentials, dimension mismatch).
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector index backend.
    #[error("Vector index error ({backend}): {message}")]
    Index {
        /// The index backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during document chunking.
    #[error("Chunking error: {0}")]
    Chunking(String),

    /// An error in the retrieval pipeline orchestration.
    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
