//! Deterministic chunk identity.

use sha2::{Digest, Sha256};

/// Upper bound (exclusive) for chunk handles.
pub const HANDLE_RANGE: u64 = 1_000_000_000;

/// Compute the stable handle for a (document, position) pair.
///
/// The handle is the vector index's primary key. It is derived from the
/// document id and the chunk's 0-based position, is stable across process
/// restarts and platforms, and always lies in `0..HANDLE_RANGE`.
///
/// Distinct (document, position) pairs collide only with negligible
/// probability; collisions are not detected.
pub fn chunk_handle(document_id: &str, position: usize) -> i64 {
    let digest = Sha256::digest(format!("{document_id}_chunk_{position}"));
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(prefix) % HANDLE_RANGE) as i64
}
