//! Durable per-session index and metadata storage.
//!
//! Each session's state lives under `data_dir/<session_id>/` as two
//! artifacts: `vectors.json` (the flat vector index) and `meta.json` (the
//! metadata table). The reverse map from document id to handles is always
//! derived from metadata on load and never persisted, so it cannot fall out
//! of sync with the table it summarizes.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use docmind_embeddings::{Embedding, rank_top_k};

use crate::error::{IndexError, Result};
use crate::flat::FlatIndex;
use crate::handle::chunk_handle;

const INDEX_FILE: &str = "vectors.json";
const META_FILE: &str = "meta.json";

/// The durable descriptor paired 1:1 with an indexed vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// Session that owns the chunk.
    pub session_id: String,

    /// Document the chunk belongs to. Stored explicitly; never reconstructed
    /// from the handle's input string.
    pub document_id: String,

    /// 0-based position within the document, set at ingestion and never
    /// renumbered.
    pub position: usize,

    /// The chunk's handle, matching its key in the vector index.
    pub handle: i64,

    /// Raw chunk text.
    pub text: String,

    /// Kept redundantly so per-document queries can re-rank without touching
    /// the global index.
    pub embedding: Embedding,
}

/// In-memory state for one session.
#[derive(Debug)]
pub struct SessionState {
    /// The session's vector index.
    pub index: FlatIndex,

    /// One record per indexed chunk, in insertion order.
    pub metadata: Vec<MetadataRecord>,

    /// Document id to handles, in metadata order. Derived on load; never
    /// persisted.
    pub reverse_map: BTreeMap<String, Vec<i64>>,
}

/// Durable per-session storage of (handle → vector) and (handle → metadata).
///
/// Sessions are fully independent. Within one session, writers are mutually
/// excluded for the whole load+mutate+persist sequence, and readers share a
/// lock with them, so no call observes a half-written pair.
pub struct SessionIndexStore {
    /// Root directory; each session gets a subdirectory.
    data_dir: PathBuf,

    /// Dimension every stored vector must have.
    dimension: usize,

    /// One lock per session id, created lazily.
    locks: Mutex<HashMap<String, Arc<RwLock<()>>>>,
}

impl SessionIndexStore {
    /// Create a store rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>, dimension: usize) -> Self {
        Self {
            data_dir: data_dir.into(),
            dimension,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Dimension the store was created with.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn session_dir(&self, session_id: &str) -> PathBuf {
        self.data_dir.join(session_id)
    }

    async fn session_lock(&self, session_id: &str) -> Arc<RwLock<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }

    /// Read a session's persisted state, or empty state for a new session.
    ///
    /// Absent artifacts mean a session with no prior successful write. A
    /// present-but-unparseable artifact is a fatal [`IndexError::Corrupt`].
    /// Does not lock; the public operations hold the session lock around it.
    pub async fn load(&self, session_id: &str) -> Result<SessionState> {
        let dir = self.session_dir(session_id);

        let index = match read_artifact::<FlatIndex>(&dir.join(INDEX_FILE)).await? {
            Some(index) => {
                if index.dimension() != self.dimension {
                    return Err(IndexError::DimensionMismatch {
                        expected: self.dimension,
                        actual: index.dimension(),
                    });
                }
                index.validate()?;
                index
            }
            None => FlatIndex::new(self.dimension),
        };

        let metadata = read_artifact::<Vec<MetadataRecord>>(&dir.join(META_FILE))
            .await?
            .unwrap_or_default();

        let reverse_map = build_reverse_map(&metadata);
        debug!(
            "Loaded session {session_id}: {} vector(s), {} record(s), {} document(s)",
            index.len(),
            metadata.len(),
            reverse_map.len()
        );

        Ok(SessionState {
            index,
            metadata,
            reverse_map,
        })
    }

    /// Write both artifacts for a session.
    ///
    /// Each artifact is written to a temp sibling and renamed into place.
    /// The pair is not atomic as a unit: a crash between the two renames can
    /// leave a new index beside old metadata. Known gap, carried from the
    /// source system.
    pub async fn persist(&self, session_id: &str, state: &SessionState) -> Result<()> {
        let dir = self.session_dir(session_id);
        fs::create_dir_all(&dir).await?;

        write_artifact(&dir.join(INDEX_FILE), &state.index).await?;
        write_artifact(&dir.join(META_FILE), &state.metadata).await?;

        debug!(
            "Persisted session {session_id}: {} vector(s), {} record(s)",
            state.index.len(),
            state.metadata.len()
        );
        Ok(())
    }

    /// Add a document's chunks and their embeddings to the session.
    ///
    /// Handles are computed from (document id, position); (handle, vector)
    /// pairs go into the index in one batch and one record per chunk is
    /// appended to metadata, then both artifacts are persisted. The whole
    /// batch commits or nothing does.
    ///
    /// Does NOT remove a previously indexed copy of the document first.
    /// Callers re-adding a document must call [`Self::remove_document`]
    /// first, or duplicate handles accumulate under the same document id.
    pub async fn upsert_chunks(
        &self,
        session_id: &str,
        document_id: &str,
        chunks: &[String],
        embeddings: Vec<Embedding>,
    ) -> Result<()> {
        if chunks.is_empty() {
            return Err(IndexError::EmptyBatch {
                document_id: document_id.to_string(),
            });
        }
        if chunks.len() != embeddings.len() {
            return Err(IndexError::BatchLengthMismatch {
                chunks: chunks.len(),
                embeddings: embeddings.len(),
            });
        }

        let lock = self.session_lock(session_id).await;
        let _guard = lock.write().await;

        let mut state = self.load(session_id).await?;

        let mut entries = Vec::with_capacity(chunks.len());
        let mut records = Vec::with_capacity(chunks.len());
        for (position, (text, embedding)) in chunks.iter().zip(embeddings).enumerate() {
            let handle = chunk_handle(document_id, position);
            entries.push((handle, embedding.clone()));
            records.push(MetadataRecord {
                session_id: session_id.to_string(),
                document_id: document_id.to_string(),
                position,
                handle,
                text: text.clone(),
                embedding,
            });
        }

        state.index.add_batch(entries)?;
        state.metadata.extend(records);
        self.persist(session_id, &state).await?;

        info!(
            "Indexed {} chunk(s) for document {document_id} in session {session_id}",
            chunks.len()
        );
        Ok(())
    }

    /// Remove all of a document's chunks from the session.
    ///
    /// No-op (and no persist) when the document has no handles.
    pub async fn remove_document(&self, session_id: &str, document_id: &str) -> Result<()> {
        let lock = self.session_lock(session_id).await;
        let _guard = lock.write().await;

        let mut state = self.load(session_id).await?;

        let Some(handles) = state.reverse_map.get(document_id).cloned() else {
            debug!("Document {document_id} not indexed in session {session_id}; nothing to remove");
            return Ok(());
        };

        let removed = state.index.remove_batch(&handles);
        state.metadata.retain(|r| r.document_id != document_id);
        self.persist(session_id, &state).await?;

        info!("Removed {removed} vector(s) for document {document_id} from session {session_id}");
        Ok(())
    }

    /// Return the top `k` records of one document, ranked by ascending
    /// squared Euclidean distance to `query_vector`.
    ///
    /// Candidates are restricted to the document's records and ranked over an
    /// ephemeral per-call structure built from their redundant embeddings;
    /// the global index has no per-document filter and is never searched
    /// here. Returns fewer than `k` results if the document has fewer chunks,
    /// and an empty vec if the document is absent.
    pub async fn query(
        &self,
        session_id: &str,
        document_id: &str,
        query_vector: &[f32],
        k: usize,
    ) -> Result<Vec<MetadataRecord>> {
        if query_vector.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query_vector.len(),
            });
        }

        let lock = self.session_lock(session_id).await;
        let _guard = lock.read().await;

        let state = self.load(session_id).await?;

        let doc_records: Vec<&MetadataRecord> = state
            .metadata
            .iter()
            .filter(|r| r.document_id == document_id)
            .collect();
        if doc_records.is_empty() {
            return Ok(Vec::new());
        }

        let candidates: Vec<Embedding> =
            doc_records.iter().map(|r| r.embedding.clone()).collect();
        let ranked = rank_top_k(query_vector, &candidates, k)?;

        Ok(ranked
            .into_iter()
            .map(|c| doc_records[c.index].clone())
            .collect())
    }

    /// Check whether a document has at least one indexed chunk.
    pub async fn is_indexed(&self, session_id: &str, document_id: &str) -> Result<bool> {
        let lock = self.session_lock(session_id).await;
        let _guard = lock.read().await;

        let state = self.load(session_id).await?;
        Ok(state.reverse_map.contains_key(document_id))
    }
}

/// Rebuild the document id → handles map by scanning metadata in order.
fn build_reverse_map(metadata: &[MetadataRecord]) -> BTreeMap<String, Vec<i64>> {
    let mut reverse_map: BTreeMap<String, Vec<i64>> = BTreeMap::new();
    for record in metadata {
        reverse_map
            .entry(record.document_id.clone())
            .or_default()
            .push(record.handle);
    }
    reverse_map
}

async fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(content) => {
            let value = serde_json::from_str(&content).map_err(|e| IndexError::Corrupt {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(IndexError::Io(e)),
    }
}

async fn write_artifact<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string(value)?;

    // Write atomically using a temp file
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, &content).await?;
    fs::rename(&temp_path, path).await?;

    Ok(())
}
