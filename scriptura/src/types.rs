//! Shared error taxonomy for the retrieval pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by corpus loading, indexing, retrieval, and generation.
///
/// Data-integrity failures ([`RagError::CorpusParse`],
/// [`RagError::EmptyCorpus`]) are never swallowed. Provider failures during
/// answer generation are the one place callers downgrade to an in-band
/// message instead of propagating; see
/// [`crate::generation::failure_message`].
#[derive(Debug, Error)]
pub enum RagError {
    /// The corpus resource does not exist at the configured path.
    ///
    /// Recoverable: callers may fall back to
    /// [`crate::corpus::sample_corpus`] so the pipeline still demonstrates
    /// end-to-end behavior with degraded data.
    #[error("corpus not found at {path}")]
    CorpusNotFound { path: PathBuf },

    /// The corpus resource exists but is not valid corpus JSON. Fatal.
    #[error("corpus parse error: {0}")]
    CorpusParse(String),

    /// An index build was attempted with zero fragments.
    ///
    /// Building an empty store would succeed silently and answer nothing;
    /// refuse instead.
    #[error("no fragments to index; refusing to build an empty store")]
    EmptyCorpus,

    /// A remote embedding or generation call failed (network, quota, auth).
    #[error("provider error ({provider}): {message}")]
    Provider { provider: String, message: String },

    /// A query or generation was attempted before the index holds data.
    ///
    /// Programmer error: build the index first. Never downgraded.
    #[error("vector index is empty or missing; build the index before querying")]
    Uninitialized,

    /// Vector store failure (connection, schema, SQL).
    #[error("storage error: {0}")]
    Storage(String),

    /// Invalid pipeline configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP transport failure while fetching the corpus.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Filesystem failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RagError {
    /// Convenience constructor for provider failures.
    pub fn provider(provider: impl Into<String>, message: impl ToString) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.to_string(),
        }
    }
}
