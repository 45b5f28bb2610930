//! Retrieval-augmented question answering over the King James Bible.
//!
//! ```text
//! build time:
//!   corpus JSON ──► corpus::load_corpus ──► document::build_documents
//!                                                 │
//!                                                 ▼
//!                         chunking::split_document ──► embeddings
//!                                                           │
//!                                                           ▼
//!                                              stores (sqlite-vec, persisted)
//!
//! query time:
//!   question ──► pipeline::RagPipeline::answer / answer_stream
//!                   (embed ──► search ──► prompt ──► generation)
//! ```
//!
//! The heavy lifting — embedding, vector search, generation — is delegated
//! to remote models and the `sqlite-vec` store; this crate supplies the
//! typed seams between them and the corpus-specific transforms.

pub mod chunking;
pub mod config;
pub mod corpus;
pub mod document;
pub mod embeddings;
pub mod generation;
pub mod pipeline;
pub mod stores;
pub mod types;

pub use chunking::{Fragment, TextSplitter};
pub use config::RagConfig;
pub use corpus::{VerseRecord, load_corpus, sample_corpus};
pub use document::{VerseDocument, VerseMetadata};
pub use embeddings::{EmbeddingProvider, MockEmbeddingProvider, RemoteEmbeddingProvider};
pub use generation::{AnswerModel, AnswerStream, MockAnswerModel, RigAnswerModel};
pub use pipeline::{BuildReport, IndexStats, PipelineOptions, RagPipeline, RetrievedContext};
pub use stores::{FragmentRecord, SqliteFragmentStore, VectorBackend, reset_index};
pub use types::RagError;
