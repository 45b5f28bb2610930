//! Embedding provider seam.
//!
//! The pipeline embeds text through an object-safe [`EmbeddingProvider`]
//! so the remote model stays swappable: [`RemoteEmbeddingProvider`] adapts
//! any rig [`EmbeddingModel`] (Gemini in production), while
//! [`MockEmbeddingProvider`] produces deterministic vectors for tests and
//! offline runs.
//!
//! A provider returning a batch whose length differs from the input is a
//! hard failure — a silently mismatched batch would corrupt the index.

use async_trait::async_trait;
use rig::embeddings::embedding::{Embedding, EmbeddingError, EmbeddingModel};

use crate::types::RagError;

/// Converts text into fixed-dimension vectors, one per input, in order.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Provider label used in errors and logs.
    fn name(&self) -> &str;

    /// Dimensionality of every vector this provider returns.
    fn dims(&self) -> usize;

    /// Largest batch the provider accepts in one call.
    fn max_batch(&self) -> usize {
        64
    }

    /// Embeds a batch, returning exactly one vector per input text.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError>;

    /// Embeds a single query string.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RagError> {
        let query = [text.to_string()];
        let mut vectors = self.embed_batch(&query).await?;
        vectors
            .pop()
            .ok_or_else(|| RagError::provider(self.name(), "no vector returned for query"))
    }
}

/// Adapter over a rig embedding model (a remote service call).
#[derive(Clone)]
pub struct RemoteEmbeddingProvider<M> {
    model: M,
    label: String,
}

impl<M: EmbeddingModel> RemoteEmbeddingProvider<M> {
    pub fn new(model: M, label: impl Into<String>) -> Self {
        Self {
            model,
            label: label.into(),
        }
    }
}

#[async_trait]
impl<M> EmbeddingProvider for RemoteEmbeddingProvider<M>
where
    M: EmbeddingModel,
{
    fn name(&self) -> &str {
        &self.label
    }

    fn dims(&self) -> usize {
        self.model.ndims()
    }

    fn max_batch(&self) -> usize {
        M::MAX_DOCUMENTS
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let embeddings = self
            .model
            .embed_texts(texts.to_vec())
            .await
            .map_err(|err| RagError::provider(&self.label, err))?;
        if embeddings.len() != texts.len() {
            return Err(RagError::provider(
                &self.label,
                format!(
                    "batch size mismatch: sent {} texts, received {} vectors",
                    texts.len(),
                    embeddings.len()
                ),
            ));
        }
        Ok(embeddings
            .into_iter()
            .map(|embedding| embedding.vec.into_iter().map(|v| v as f32).collect())
            .collect())
    }
}

/// Deterministic offline provider: vectors are derived from a hash of the
/// input text, so identical text always embeds identically and distinct
/// text almost always differs.
///
/// Also implements rig's [`EmbeddingModel`] so the same instance can back
/// the sqlite store schema in tests.
#[derive(Clone, Debug)]
pub struct MockEmbeddingProvider {
    dims: usize,
}

impl MockEmbeddingProvider {
    pub fn new() -> Self {
        Self { dims: 8 }
    }

    pub fn with_dims(dims: usize) -> Self {
        Self { dims }
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut state: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in text.bytes() {
            state ^= u64::from(byte);
            state = state.wrapping_mul(0x0000_0100_0000_01b3);
        }
        (0..self.dims)
            .map(|lane| {
                let mixed = state
                    .rotate_left((lane % 64) as u32)
                    .wrapping_add(lane as u64);
                (mixed as f64 / u64::MAX as f64) as f32
            })
            .collect()
    }
}

impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        Ok(texts.iter().map(|text| self.vector_for(text)).collect())
    }
}

impl EmbeddingModel for MockEmbeddingProvider {
    const MAX_DOCUMENTS: usize = 64;

    type Client = ();

    fn make(_client: &Self::Client, _model: impl Into<String>, dims: Option<usize>) -> Self {
        match dims {
            Some(dims) => Self::with_dims(dims),
            None => Self::new(),
        }
    }

    fn ndims(&self) -> usize {
        self.dims
    }

    fn embed_texts(
        &self,
        texts: impl IntoIterator<Item = String> + Send,
    ) -> impl std::future::Future<Output = Result<Vec<Embedding>, EmbeddingError>> + Send {
        let documents: Vec<String> = texts.into_iter().collect();
        let provider = self.clone();
        async move {
            Ok(documents
                .into_iter()
                .map(|document| Embedding {
                    vec: provider
                        .vector_for(&document)
                        .into_iter()
                        .map(f64::from)
                        .collect(),
                    document,
                })
                .collect())
        }
    }
}
