//! Configuration for the retrieval service.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for the retrieval service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Root directory for per-session index and metadata artifacts.
    pub data_dir: PathBuf,

    /// Embedding dimension. Must match the embedder's output dimension;
    /// validated when the service is constructed.
    pub dimension: usize,

    /// Number of chunks returned by `search` callers that have no better
    /// value of their own.
    pub default_top_k: usize,
}

impl RetrievalConfig {
    /// Create a new configuration with default values.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            dimension: docmind_embeddings::DEFAULT_DIMENSION,
            default_top_k: 3,
        }
    }

    /// Set the embedding dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Set the default top-k.
    pub fn with_default_top_k(mut self, k: usize) -> Self {
        self.default_top_k = k;
        self
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self::new("data/vector_store")
    }
}
