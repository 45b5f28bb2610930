//! Persisted vector storage for embedded fragments.
//!
//! ```text
//!                  ┌──────────────────┐
//!                  │  VectorBackend   │
//!                  │  (async, dyn)    │
//!                  └────────┬─────────┘
//!                           │
//!                           ▼
//!                 ┌───────────────────┐
//!                 │      SQLite       │
//!                 │    sqlite-vec     │
//!                 └───────────────────┘
//! ```
//!
//! The store is additive-only: fragments are inserted during index builds
//! and never partially removed. The single destructive operation is
//! [`reset_index`], which deletes the whole database file.

pub mod sqlite;

use std::io::ErrorKind;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::types::RagError;

pub use sqlite::{FragmentRow, SqliteFragmentStore};

/// A chunked, embedded slice of verse text ready for storage — the unit
/// actually searched at query time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FragmentRecord {
    /// Unique row identifier.
    pub id: String,
    /// Citation of the parent verse, `"<book> <chapter>:<verse>"`.
    pub reference: String,
    /// Book name, duplicated out of the metadata for indexed filtering.
    pub book: String,
    /// Zero-based ordinal of this fragment within its document.
    pub chunk_index: usize,
    /// Fragment text.
    pub content: String,
    /// Full provenance metadata as JSON.
    pub metadata: serde_json::Value,
    /// Embedding vector, when computed.
    pub embedding: Option<Vec<f32>>,
}

impl FragmentRecord {
    pub fn new(
        id: impl Into<String>,
        reference: impl Into<String>,
        book: impl Into<String>,
        chunk_index: usize,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            reference: reference.into(),
            book: book.into(),
            chunk_index,
            content: content.into(),
            metadata: serde_json::Value::Object(Default::default()),
            embedding: None,
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    #[must_use]
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// Outcome of an insert: how many rows were written and how many were
/// skipped for lacking an embedding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InsertOutcome {
    pub inserted: usize,
    pub skipped: usize,
}

/// Nearest-neighbor storage over embedded fragments.
#[async_trait]
pub trait VectorBackend: Send + Sync {
    /// Inserts fragment records; records without embeddings are skipped
    /// and counted, never silently dropped.
    async fn insert_fragments(
        &self,
        fragments: Vec<FragmentRecord>,
    ) -> Result<InsertOutcome, RagError>;

    /// Returns up to `top_k` fragments nearest to `query_embedding`,
    /// highest similarity first; ties break deterministically.
    async fn search_similar(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<(FragmentRecord, f32)>, RagError>;

    /// Current fragment count; used for readiness and status reporting.
    async fn count(&self) -> Result<usize, RagError>;
}

/// Deletes the persisted index wholesale.
///
/// Returns `true` when a store existed and was removed, `false` when there
/// was nothing to delete.
pub async fn reset_index(path: impl AsRef<Path>) -> Result<bool, RagError> {
    match fs::remove_file(path.as_ref()).await {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err.into()),
    }
}
