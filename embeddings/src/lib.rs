//! # Embeddings
//!
//! This crate provides the embedding provider contract and the vector
//! distance helpers used by the docmind chunk index.
//!
//! - **Embedding Generation**: the [`Embedder`] trait maps an ordered batch of
//!   texts to an ordered batch of fixed-dimension vectors
//! - **Providers**: an OpenAI-compatible HTTP provider is included; the index
//!   treats any provider as a black box
//! - **Distance**: squared Euclidean distance and top-k ranking, matching the
//!   metric of the vector index

pub mod distance;
pub mod error;
pub mod provider;

pub use distance::{RankedCandidate, rank_top_k, squared_euclidean};
pub use error::{EmbeddingError, Result};
pub use provider::{Embedder, OpenAiEmbedder};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;

/// Dimension of embeddings produced by the default model.
pub const DEFAULT_DIMENSION: usize = 384; // all-MiniLM-L6-v2
