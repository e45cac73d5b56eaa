//! Exact vector index keyed by chunk handle.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use docmind_embeddings::Embedding;

use crate::error::{IndexError, Result};

/// An exact index over fixed-dimension vectors, keyed by chunk handle.
///
/// This is the durable vector artifact for a session. Per-document queries do
/// not search it; they re-rank the metadata table's redundant embeddings
/// instead (see [`crate::SessionIndexStore::query`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatIndex {
    /// Expected dimension of every stored vector.
    dimension: usize,

    /// Stored vectors by handle.
    entries: HashMap<i64, Embedding>,
}

impl FlatIndex {
    /// Create a new empty index.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            entries: HashMap::new(),
        }
    }

    /// Dimension the index was created with.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if a handle is present.
    pub fn contains(&self, handle: i64) -> bool {
        self.entries.contains_key(&handle)
    }

    /// Get a vector by handle.
    pub fn get(&self, handle: i64) -> Option<&Embedding> {
        self.entries.get(&handle)
    }

    /// Add a batch of (handle, vector) pairs.
    ///
    /// The whole batch is validated before anything is inserted, so a bad
    /// batch leaves the index untouched.
    pub fn add_batch(&mut self, entries: Vec<(i64, Embedding)>) -> Result<()> {
        for (_, vector) in &entries {
            if vector.len() != self.dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: self.dimension,
                    actual: vector.len(),
                });
            }
        }

        let count = entries.len();
        for (handle, vector) in entries {
            self.entries.insert(handle, vector);
        }
        debug!("Added {count} vector(s) to index");

        Ok(())
    }

    /// Remove a batch of handles, returning how many were present.
    pub fn remove_batch(&mut self, handles: &[i64]) -> usize {
        let mut removed = 0;
        for handle in handles {
            if self.entries.remove(handle).is_some() {
                removed += 1;
            }
        }
        debug!("Removed {removed} vector(s) from index");
        removed
    }

    /// Validate every stored vector against the index dimension.
    ///
    /// Called after deserializing a persisted artifact.
    pub fn validate(&self) -> Result<()> {
        for vector in self.entries.values() {
            if vector.len() != self.dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: self.dimension,
                    actual: vector.len(),
                });
            }
        }
        Ok(())
    }
}
