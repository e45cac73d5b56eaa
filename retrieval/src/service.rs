//! Session-scoped retrieval service.

use std::sync::Arc;

use tracing::{debug, info, warn};

use docmind_embeddings::{Embedder, EmbeddingError, squared_euclidean};
use docmind_index::SessionIndexStore;

use crate::config::RetrievalConfig;
use crate::error::{Result, RetrievalError};

/// A ranked chunk returned from [`RetrievalService::search`].
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedChunk {
    /// 0-based position of the chunk within its document.
    pub position: usize,

    /// Raw chunk text.
    pub text: String,

    /// Squared Euclidean distance to the query; smaller is closer.
    pub distance: f32,
}

/// One document's chunks in a batch ingestion call.
#[derive(Debug, Clone)]
pub struct DocumentChunks {
    /// Document id, unique within the session.
    pub document_id: String,

    /// Ordered, non-empty chunk texts.
    pub chunks: Vec<String>,
}

/// Outcome of a batch ingestion call.
///
/// A failed document never aborts the batch; callers get both sides
/// explicitly instead of failures disappearing into a log.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Document ids indexed successfully, in input order.
    pub succeeded: Vec<String>,

    /// Documents that failed, with the error that stopped each one.
    pub failed: Vec<(String, RetrievalError)>,
}

/// The public face of the chunk index: add, remove, and search a document's
/// chunks within one session.
///
/// Every call loads the session's persisted state fresh under the session
/// lock, so a write is observable by the next read with no cache to
/// invalidate. The embedder is a black box; any failure it reports aborts the
/// enclosing call with nothing persisted. No operation retries internally.
pub struct RetrievalService {
    config: RetrievalConfig,

    /// Embedding provider shared across calls.
    embedder: Arc<dyn Embedder>,

    /// Per-session durable storage.
    store: SessionIndexStore,
}

impl std::fmt::Debug for RetrievalService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RetrievalService {
    /// Create a service from a config and an embedding provider.
    ///
    /// Fails if the embedder's output dimension does not match the configured
    /// index dimension.
    pub fn new(config: RetrievalConfig, embedder: Arc<dyn Embedder>) -> Result<Self> {
        if embedder.dimension() != config.dimension {
            return Err(RetrievalError::Config(format!(
                "embedder '{}' produces {}-dimensional vectors, index expects {}",
                embedder.name(),
                embedder.dimension(),
                config.dimension
            )));
        }

        let store = SessionIndexStore::new(&config.data_dir, config.dimension);
        info!(
            "Retrieval service ready: provider {}, dimension {}, data dir {}",
            embedder.name(),
            config.dimension,
            config.data_dir.display()
        );

        Ok(Self {
            config,
            embedder,
            store,
        })
    }

    /// The service's configuration.
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Embed and index a document's chunks under a session.
    ///
    /// Chunks must be non-empty; positions are assigned from input order. A
    /// document already indexed under this id must be removed with
    /// [`Self::deindex_document`] first, otherwise duplicate entries
    /// accumulate — the service does not remove the old copy itself.
    pub async fn index_document(
        &self,
        session_id: &str,
        document_id: &str,
        chunks: &[String],
    ) -> Result<()> {
        if chunks.is_empty() {
            return Err(RetrievalError::EmptyDocument {
                document_id: document_id.to_string(),
            });
        }
        for (position, chunk) in chunks.iter().enumerate() {
            if chunk.trim().is_empty() {
                return Err(RetrievalError::EmptyChunk {
                    document_id: document_id.to_string(),
                    position,
                });
            }
        }

        let embeddings = self.embedder.embed_batch(chunks).await?;
        if embeddings.len() != chunks.len() {
            return Err(EmbeddingError::BatchLengthMismatch {
                sent: chunks.len(),
                received: embeddings.len(),
            }
            .into());
        }

        self.store
            .upsert_chunks(session_id, document_id, chunks, embeddings)
            .await?;

        debug!("Document {document_id} indexed in session {session_id}");
        Ok(())
    }

    /// Remove a document's chunks from a session.
    ///
    /// Idempotent: removing a document that is not indexed is a no-op.
    pub async fn deindex_document(&self, session_id: &str, document_id: &str) -> Result<()> {
        self.store.remove_document(session_id, document_id).await?;
        Ok(())
    }

    /// Return the top `k` chunks of one document for a natural-language
    /// query, ranked by ascending distance.
    ///
    /// Returns an empty vec for a document with no indexed chunks.
    pub async fn search(
        &self,
        session_id: &str,
        document_id: &str,
        query_text: &str,
        k: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        let query_vector = self.embedder.embed_one(query_text).await?;
        let records = self
            .store
            .query(session_id, document_id, &query_vector, k)
            .await?;

        records
            .into_iter()
            .map(|record| {
                let distance = squared_euclidean(&query_vector, &record.embedding)?;
                Ok(RetrievedChunk {
                    position: record.position,
                    text: record.text,
                    distance,
                })
            })
            .collect()
    }

    /// Check whether a document has at least one indexed chunk in a session.
    pub async fn is_indexed(&self, session_id: &str, document_id: &str) -> Result<bool> {
        Ok(self.store.is_indexed(session_id, document_id).await?)
    }

    /// Index a batch of documents, replacing any previously indexed copy of
    /// each.
    ///
    /// Documents are processed independently: one failure is recorded in the
    /// report and the rest of the batch continues.
    pub async fn index_batch(
        &self,
        session_id: &str,
        docs: Vec<DocumentChunks>,
    ) -> BatchReport {
        info!(
            "Starting batch ingestion of {} document(s) in session {session_id}",
            docs.len()
        );

        let mut report = BatchReport::default();
        for doc in docs {
            let outcome = self
                .reindex_document(session_id, &doc.document_id, &doc.chunks)
                .await;
            match outcome {
                Ok(()) => report.succeeded.push(doc.document_id),
                Err(e) => {
                    warn!("Failed to index document {}: {e}", doc.document_id);
                    report.failed.push((doc.document_id, e));
                }
            }
        }

        info!(
            "Batch ingestion complete: {} succeeded, {} failed",
            report.succeeded.len(),
            report.failed.len()
        );
        report
    }

    /// Remove then re-add one document, the replace semantics the batch path
    /// uses.
    async fn reindex_document(
        &self,
        session_id: &str,
        document_id: &str,
        chunks: &[String],
    ) -> Result<()> {
        self.deindex_document(session_id, document_id).await?;
        self.index_document(session_id, document_id, chunks).await
    }
}
