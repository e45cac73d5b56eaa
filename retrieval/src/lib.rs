//! # Retrieval
//!
//! Session-scoped document retrieval for docmind: index a document's chunks,
//! ask a question against one document, get the top-k chunks back.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                   RetrievalService                      │
//! ├─────────────────────────────────────────────────────────┤
//! │                                                         │
//! │  ┌──────────────┐            ┌────────────────────┐     │
//! │  │   Embedder   │            │  SessionIndexStore │     │
//! │  │  (black box) │            │  (per-session)     │     │
//! │  └──────────────┘            └────────────────────┘     │
//! │         │                            │                  │
//! │         └──────────────┬─────────────┘                  │
//! │                        ▼                                │
//! │        index / deindex / search / is_indexed            │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docmind_embeddings::OpenAiEmbedder;
//! use docmind_retrieval::{RetrievalConfig, RetrievalService};
//!
//! let config = RetrievalConfig::new("data/vector_store").with_dimension(1536);
//! let service = RetrievalService::new(config, Arc::new(OpenAiEmbedder::new()))?;
//!
//! service.index_document("s1", "doc.txt", &chunks).await?;
//! let hits = service.search("s1", "doc.txt", "What color is the sky?", 3).await?;
//! ```

pub mod chunker;
pub mod config;
pub mod error;
pub mod service;

pub use chunker::split_chunks;
pub use config::RetrievalConfig;
pub use error::{Result, RetrievalError};
pub use service::{BatchReport, DocumentChunks, RetrievalService, RetrievedChunk};

// Re-export from dependencies for convenience
pub use docmind_embeddings::{Embedder, OpenAiEmbedder};
pub use docmind_index::{MetadataRecord, SessionIndexStore};
