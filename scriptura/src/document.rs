//! Verse records → retrievable documents.
//!
//! A pure, deterministic transform: each [`VerseRecord`] maps to exactly
//! one [`VerseDocument`] whose metadata is derived from the record plus
//! the canonical book tables in [`crate::corpus::canon`].

use serde::{Deserialize, Serialize};

use crate::corpus::canon::{Testament, book_number, testament};
use crate::corpus::VerseRecord;

/// Tag distinguishing verse-level fragments from any future passage-level
/// grouping.
pub const CHUNK_TYPE_VERSE: &str = "verse";

/// Provenance metadata attached to every retrievable unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseMetadata {
    /// Human-readable citation, `"<book> <chapter>:<verse>"`.
    pub reference: String,
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub translation: String,
    pub testament: Testament,
    /// Canonical ordering, 1..=66; 0 for books outside the canon.
    pub book_number: u8,
    pub chunk_type: String,
}

/// A retrievable unit: verse text plus its provenance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseDocument {
    pub content: String,
    pub metadata: VerseMetadata,
}

/// Citation string for a `(book, chapter, verse)` triple.
#[must_use]
pub fn reference(book: &str, chapter: u32, verse: u32) -> String {
    format!("{book} {chapter}:{verse}")
}

/// Maps one verse record to its document.
#[must_use]
pub fn verse_to_document(record: &VerseRecord) -> VerseDocument {
    VerseDocument {
        content: record.text.clone(),
        metadata: VerseMetadata {
            reference: reference(&record.book, record.chapter, record.verse),
            book: record.book.clone(),
            chapter: record.chapter,
            verse: record.verse,
            translation: record.translation.clone(),
            testament: testament(&record.book),
            book_number: book_number(&record.book),
            chunk_type: CHUNK_TYPE_VERSE.to_string(),
        },
    }
}

/// Maps a record sequence to documents, one per record, order preserved.
#[must_use]
pub fn build_documents(records: &[VerseRecord]) -> Vec<VerseDocument> {
    records.iter().map(verse_to_document).collect()
}
