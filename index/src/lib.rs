//! # Index
//!
//! Session-scoped vector index and chunk metadata storage for docmind.
//!
//! Each session owns exactly one vector index and one metadata table,
//! persisted together under a session-specific directory. The invariant the
//! crate exists to protect: every handle in the vector index has exactly one
//! [`MetadataRecord`], and vice versa. Add and remove update both before
//! returning.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                  SessionIndexStore                     │
//! ├────────────────────────────────────────────────────────┤
//! │  chunk_handle ──► FlatIndex (handle → vector)          │
//! │       │                                                │
//! │       └─────────► metadata  (handle → MetadataRecord)  │
//! │                       │                                │
//! │                       ▼                                │
//! │            reverse map (derived, never persisted)      │
//! └────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod flat;
pub mod handle;
pub mod store;

pub use error::{IndexError, Result};
pub use flat::FlatIndex;
pub use handle::{HANDLE_RANGE, chunk_handle};
pub use store::{MetadataRecord, SessionIndexStore, SessionState};
