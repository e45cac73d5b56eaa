//! Error types for the retrieval service.

use thiserror::Error;

/// Result type alias for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Errors that can occur in the retrieval service.
///
/// Querying, removing, or probing a document that was never indexed is not an
/// error: those operations return empty, no-op, and `false` respectively.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// Embedding error.
    #[error("embedding error: {0}")]
    Embedding(#[from] docmind_embeddings::EmbeddingError),

    /// Index error.
    #[error("index error: {0}")]
    Index(#[from] docmind_index::IndexError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A document was submitted with no chunks.
    #[error("document {document_id} has no chunks to index")]
    EmptyDocument { document_id: String },

    /// A document contained an empty chunk.
    #[error("document {document_id} contains an empty chunk at position {position}")]
    EmptyChunk {
        document_id: String,
        position: usize,
    },
}
