//! Error types for the index crate.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;

/// Errors that can occur in the session index store.
#[derive(Error, Debug)]
pub enum IndexError {
    /// Storage read or write failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted artifact exists but cannot be parsed.
    ///
    /// An absent artifact means a new session; a present-but-unreadable one
    /// is fatal and must never be treated as empty.
    #[error("corrupt artifact at {path}: {detail}")]
    Corrupt { path: PathBuf, detail: String },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Vector dimension does not match the index dimension.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A chunk batch was empty.
    #[error("empty chunk batch for document {document_id}")]
    EmptyBatch { document_id: String },

    /// Chunk and embedding counts differ.
    #[error("batch length mismatch: {chunks} chunks, {embeddings} embeddings")]
    BatchLengthMismatch { chunks: usize, embeddings: usize },

    /// Embedding distance computation failed.
    #[error("embedding error: {0}")]
    Embedding(#[from] docmind_embeddings::EmbeddingError),
}
