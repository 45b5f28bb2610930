//! Pipeline configuration.
//!
//! Configuration is an explicit value constructed once (usually from the
//! environment, in the binary) and passed into each component's
//! constructor. Nothing in this crate reads the environment on its own.

use std::env;
use std::path::PathBuf;

use crate::chunking::TextSplitter;
use crate::corpus::fetch::DEFAULT_CORPUS_URL;
use crate::types::RagError;

/// Settings for corpus location, chunking, retrieval, and model selection.
#[derive(Clone, Debug)]
pub struct RagConfig {
    /// Maximum fragment size in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive fragments in characters. Must be
    /// strictly smaller than `chunk_size`.
    pub chunk_overlap: usize,
    /// Number of fragments retrieved per question.
    pub retrieval_k: usize,
    /// Location of the persisted vector index (a SQLite database file).
    pub index_path: PathBuf,
    /// Location of the corpus JSON resource.
    pub corpus_path: PathBuf,
    /// Download source for the corpus resource.
    pub corpus_url: String,
    /// Remote embedding model identifier.
    pub embedding_model: String,
    /// Dimensionality of the embedding vectors.
    pub embedding_dims: usize,
    /// Remote generation model identifier.
    pub generation_model: String,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            retrieval_k: 5,
            index_path: PathBuf::from("data/verse_index.sqlite3"),
            corpus_path: PathBuf::from("data/KJV.json"),
            corpus_url: DEFAULT_CORPUS_URL.to_string(),
            embedding_model: "text-embedding-004".to_string(),
            embedding_dims: 768,
            generation_model: "gemini-2.0-flash".to_string(),
        }
    }
}

impl RagConfig {
    /// Builds a configuration from the process environment, falling back to
    /// defaults for anything unset or unparsable.
    ///
    /// Recognized keys: `CHUNK_SIZE`, `CHUNK_OVERLAP`, `RETRIEVAL_K`,
    /// `INDEX_PATH`, `BIBLE_DATA_PATH`, `BIBLE_DATA_URL`, `MODEL_ID`
    /// (generation), `EMBEDDING_MODEL_ID`, `EMBEDDING_DIMS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(value) = env_usize("CHUNK_SIZE") {
            config.chunk_size = value;
        }
        if let Some(value) = env_usize("CHUNK_OVERLAP") {
            config.chunk_overlap = value;
        }
        if let Some(value) = env_usize("RETRIEVAL_K") {
            config.retrieval_k = value;
        }
        if let Ok(value) = env::var("INDEX_PATH") {
            config.index_path = PathBuf::from(value);
        }
        if let Ok(value) = env::var("BIBLE_DATA_PATH") {
            config.corpus_path = PathBuf::from(value);
        }
        if let Ok(value) = env::var("BIBLE_DATA_URL") {
            config.corpus_url = value;
        }
        if let Ok(value) = env::var("MODEL_ID") {
            config.generation_model = value;
        }
        if let Ok(value) = env::var("EMBEDDING_MODEL_ID") {
            config.embedding_model = value;
        }
        if let Some(value) = env_usize("EMBEDDING_DIMS") {
            config.embedding_dims = value;
        }
        config
    }

    /// Checks the invariants the pipeline relies on.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.chunk_size == 0 {
            return Err(RagError::Config("chunk size must be positive".into()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::Config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.retrieval_k == 0 {
            return Err(RagError::Config("retrieval k must be at least 1".into()));
        }
        if self.embedding_dims == 0 {
            return Err(RagError::Config(
                "embedding dimensionality must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Constructs the text splitter described by this configuration.
    pub fn splitter(&self) -> Result<TextSplitter, RagError> {
        TextSplitter::new(self.chunk_size, self.chunk_overlap)
    }
}

fn env_usize(key: &str) -> Option<usize> {
    env::var(key).ok().and_then(|value| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RagConfig::default();
        config.validate().unwrap();
        config.splitter().unwrap();
    }

    #[test]
    fn overlap_must_be_smaller_than_size() {
        let config = RagConfig {
            chunk_size: 100,
            chunk_overlap: 100,
            ..RagConfig::default()
        };
        assert!(matches!(config.validate(), Err(RagError::Config(_))));
    }

    #[test]
    fn zero_k_is_rejected() {
        let config = RagConfig {
            retrieval_k: 0,
            ..RagConfig::default()
        };
        assert!(matches!(config.validate(), Err(RagError::Config(_))));
    }
}
