//! The retrieval-augmented answer pipeline.
//!
//! ```text
//! build time:
//!   VerseRecord ──► VerseDocument ──► Fragment ──► EmbeddingProvider
//!                                                       │
//!                                                       ▼
//!                                                 VectorBackend
//!
//! query time:
//!   question ──► EmbeddingProvider ──► VectorBackend ──► context block
//!                                                            │
//!                                                            ▼
//!                                            render_prompt ──► AnswerModel
//! ```
//!
//! [`RagPipeline`] is an immutable value assembled from its collaborators
//! up front; nothing is wired in place by later setup calls. One logical
//! request runs at a time — there is no internal parallelism, and the
//! build phase runs synchronously to completion with coarse progress
//! logging.

pub mod prompt;

use std::sync::Arc;

use uuid::Uuid;

use crate::chunking::{Fragment, TextSplitter, split_document};
use crate::corpus::VerseRecord;
use crate::document::build_documents;
use crate::embeddings::EmbeddingProvider;
use crate::generation::{AnswerModel, AnswerStream, failure_message};
use crate::stores::{FragmentRecord, VectorBackend};
use crate::types::RagError;

pub use prompt::{ANSWER_INSTRUCTIONS, format_context, format_fragment, render_prompt};

/// Tunables threaded into the pipeline at construction.
#[derive(Clone, Debug)]
pub struct PipelineOptions {
    /// Number of fragments retrieved per question.
    pub retrieval_k: usize,
    /// Splitter applied to document content at build time.
    pub splitter: TextSplitter,
}

/// Counts reported after an index build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub documents: usize,
    pub fragments: usize,
    pub inserted: usize,
    pub skipped: usize,
}

/// Fragments retrieved for a question plus their rendered context block.
#[derive(Clone, Debug)]
pub struct RetrievedContext {
    /// Hits in similarity-descending order, with scores.
    pub hits: Vec<(FragmentRecord, f32)>,
    /// `[reference] content` lines joined by blank lines.
    pub context: String,
}

/// Readiness snapshot of the persisted index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexStats {
    pub ready: bool,
    pub fragments: usize,
}

/// The assembled pipeline: corpus in, grounded answers out.
pub struct RagPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    backend: Arc<dyn VectorBackend>,
    model: Arc<dyn AnswerModel>,
    options: PipelineOptions,
}

impl RagPipeline {
    /// Assembles a pipeline from its external collaborators.
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        backend: Arc<dyn VectorBackend>,
        model: Arc<dyn AnswerModel>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            embedder,
            backend,
            model,
            options,
        }
    }

    /// Embeds and persists the whole corpus.
    ///
    /// Runs synchronously to completion; interruption leaves a partial
    /// index whose only recovery is deletion and a fresh build. Fails with
    /// [`RagError::EmptyCorpus`] rather than creating an empty store.
    pub async fn build(&self, records: &[VerseRecord]) -> Result<BuildReport, RagError> {
        let documents = build_documents(records);
        let fragments: Vec<Fragment> = documents
            .iter()
            .flat_map(|document| split_document(document, &self.options.splitter))
            .collect();

        if fragments.is_empty() {
            return Err(RagError::EmptyCorpus);
        }

        tracing::info!(
            documents = documents.len(),
            fragments = fragments.len(),
            embedder = self.embedder.name(),
            "building vector index"
        );

        let batch_size = self.embedder.max_batch().max(1);
        let batches = fragments.len().div_ceil(batch_size);
        let mut report = BuildReport {
            documents: documents.len(),
            fragments: fragments.len(),
            ..BuildReport::default()
        };

        for (batch_index, batch) in fragments.chunks(batch_size).enumerate() {
            let texts: Vec<String> = batch
                .iter()
                .map(|fragment| fragment.content.clone())
                .collect();
            let vectors = self.embedder.embed_batch(&texts).await?;
            if vectors.len() != texts.len() {
                // A short batch would silently mis-align fragments and
                // vectors and corrupt the index.
                return Err(RagError::provider(
                    self.embedder.name(),
                    format!(
                        "batch size mismatch: {} texts, {} vectors",
                        texts.len(),
                        vectors.len()
                    ),
                ));
            }

            let mut rows = Vec::with_capacity(batch.len());
            for (fragment, vector) in batch.iter().zip(vectors) {
                rows.push(fragment_record(fragment, vector)?);
            }

            let outcome = self.backend.insert_fragments(rows).await?;
            report.inserted += outcome.inserted;
            report.skipped += outcome.skipped;

            tracing::info!(
                batch = batch_index + 1,
                batches,
                inserted = report.inserted,
                "index build progress"
            );
        }

        Ok(report)
    }

    /// Embeds the question and returns the top-k fragments with their
    /// rendered context block. No deduplication, no re-ranking beyond raw
    /// similarity order.
    pub async fn retrieve(&self, question: &str) -> Result<RetrievedContext, RagError> {
        let query = self.embedder.embed_query(question).await?;
        let hits = self
            .backend
            .search_similar(&query, self.options.retrieval_k)
            .await?;
        let context = format_context(
            hits.iter()
                .map(|(fragment, _)| (fragment.reference.as_str(), fragment.content.as_str())),
        );
        Ok(RetrievedContext { hits, context })
    }

    /// Answers a question with the whole response at once.
    ///
    /// Retrieval-side failures propagate typed; a failure of the
    /// generation call itself is downgraded to an in-band message so the
    /// chat never crashes on a flaky model.
    pub async fn answer(&self, question: &str) -> Result<String, RagError> {
        self.ensure_ready().await?;
        let retrieved = self.retrieve(question).await?;
        let prompt = render_prompt(&retrieved.context, question);
        match self.model.complete(&prompt).await {
            Ok(answer) => Ok(answer),
            Err(err) => {
                tracing::warn!(%err, "generation failed; returning in-band message");
                Ok(failure_message(&err))
            }
        }
    }

    /// Answers a question as a stream of increments.
    ///
    /// Same prompt-construction path as [`RagPipeline::answer`]; the
    /// concatenated increments equal the whole response. A generation
    /// failure at start becomes a single in-band increment.
    pub async fn answer_stream(&self, question: &str) -> Result<AnswerStream, RagError> {
        self.ensure_ready().await?;
        let retrieved = self.retrieve(question).await?;
        let prompt = render_prompt(&retrieved.context, question);
        match self.model.stream(&prompt).await {
            Ok(stream) => Ok(stream),
            Err(err) => {
                tracing::warn!(%err, "generation failed; streaming in-band message");
                Ok(AnswerStream::once(failure_message(&err)))
            }
        }
    }

    /// Current index readiness and size.
    pub async fn stats(&self) -> Result<IndexStats, RagError> {
        let fragments = self.backend.count().await?;
        Ok(IndexStats {
            ready: fragments > 0,
            fragments,
        })
    }

    /// Queries against an empty index are a programmer error, never an
    /// empty-but-successful answer.
    async fn ensure_ready(&self) -> Result<(), RagError> {
        if self.backend.count().await? == 0 {
            return Err(RagError::Uninitialized);
        }
        Ok(())
    }
}

fn fragment_record(fragment: &Fragment, embedding: Vec<f32>) -> Result<FragmentRecord, RagError> {
    let metadata = serde_json::to_value(&fragment.metadata)
        .map_err(|err| RagError::Storage(format!("failed to encode fragment metadata: {err}")))?;
    Ok(FragmentRecord::new(
        Uuid::new_v4().to_string(),
        fragment.metadata.reference.clone(),
        fragment.metadata.book.clone(),
        fragment.chunk_index,
        fragment.content.clone(),
    )
    .with_metadata(metadata)
    .with_embedding(embedding))
}
