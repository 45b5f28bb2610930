//! Corpus loading.
//!
//! The corpus is a single JSON resource with a book → chapter → verse
//! hierarchy. Loading flattens it into an ordered sequence of
//! [`VerseRecord`]s, preserving source order throughout (book, then
//! chapter, then verse). Raw records are never persisted; only documents
//! derived from them are.

pub mod canon;
pub mod fetch;

use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::types::RagError;

pub use canon::{CANONICAL_BOOKS, OLD_TESTAMENT_BOOKS, Testament, book_number, testament};
pub use fetch::{CorpusFetch, DEFAULT_CORPUS_URL, fetch_corpus};

/// One scripture verse, flattened out of the corpus hierarchy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseRecord {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
    pub translation: String,
}

/// Top level of the corpus resource.
#[derive(Debug, Deserialize)]
pub struct CorpusFile {
    pub translation: String,
    pub books: Vec<BookEntry>,
}

#[derive(Debug, Deserialize)]
pub struct BookEntry {
    pub name: String,
    pub chapters: Vec<ChapterEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ChapterEntry {
    pub chapter: u32,
    pub verses: Vec<VerseEntry>,
}

#[derive(Debug, Deserialize)]
pub struct VerseEntry {
    pub verse: u32,
    pub text: String,
}

impl CorpusFile {
    /// Total verse count across all books and chapters.
    #[must_use]
    pub fn verse_count(&self) -> usize {
        self.books
            .iter()
            .flat_map(|book| &book.chapters)
            .map(|chapter| chapter.verses.len())
            .sum()
    }

    /// Flattens the hierarchy into ordered verse records.
    #[must_use]
    pub fn into_records(self) -> Vec<VerseRecord> {
        let translation = self.translation;
        let mut records = Vec::new();
        for book in self.books {
            for chapter in book.chapters {
                for verse in chapter.verses {
                    records.push(VerseRecord {
                        book: book.name.clone(),
                        chapter: chapter.chapter,
                        verse: verse.verse,
                        text: verse.text,
                        translation: translation.clone(),
                    });
                }
            }
        }
        records
    }
}

/// Reads and flattens the corpus resource at `path`.
///
/// A missing file is [`RagError::CorpusNotFound`] (callers may fall back to
/// [`sample_corpus`]); malformed JSON is [`RagError::CorpusParse`] and is
/// not recovered.
pub async fn load_corpus(path: impl AsRef<Path>) -> Result<Vec<VerseRecord>, RagError> {
    let path = path.as_ref();
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(RagError::CorpusNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(err) => return Err(err.into()),
    };
    parse_corpus(&raw).map(CorpusFile::into_records)
}

/// Parses raw corpus JSON without touching the filesystem.
pub fn parse_corpus(raw: &str) -> Result<CorpusFile, RagError> {
    serde_json::from_str(raw).map_err(|err| RagError::CorpusParse(err.to_string()))
}

/// A small built-in corpus used when the real resource is unavailable, so
/// the pipeline can still demonstrate end-to-end behavior.
#[must_use]
pub fn sample_corpus() -> Vec<VerseRecord> {
    const SAMPLE: &[(&str, u32, u32, &str)] = &[
        (
            "Genesis",
            1,
            1,
            "In the beginning God created the heaven and the earth.",
        ),
        (
            "Genesis",
            1,
            2,
            "And the earth was without form, and void; and darkness was upon the face of the deep. \
             And the Spirit of God moved upon the face of the waters.",
        ),
        (
            "Genesis",
            1,
            3,
            "And God said, Let there be light: and there was light.",
        ),
        (
            "John",
            3,
            16,
            "For God so loved the world, that he gave his only begotten Son, that whosoever \
             believeth in him should not perish, but have everlasting life.",
        ),
        (
            "John",
            3,
            17,
            "For God sent not his Son into the world to condemn the world; but that the world \
             through him might be saved.",
        ),
        ("Psalms", 23, 1, "The LORD is my shepherd; I shall not want."),
        (
            "Psalms",
            23,
            2,
            "He maketh me to lie down in green pastures: he leadeth me beside the still waters.",
        ),
        (
            "Psalms",
            23,
            3,
            "He restoreth my soul: he leadeth me in the paths of righteousness for his name's sake.",
        ),
    ];

    SAMPLE
        .iter()
        .map(|(book, chapter, verse, text)| VerseRecord {
            book: (*book).to_string(),
            chapter: *chapter,
            verse: *verse,
            text: (*text).to_string(),
            translation: "KJV".to_string(),
        })
        .collect()
}

/// Summary counts for status reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CorpusStats {
    pub books: usize,
    pub chapters: usize,
    pub verses: usize,
}

/// Counts books, chapters, and verses in an ordered record sequence.
#[must_use]
pub fn corpus_stats(records: &[VerseRecord]) -> CorpusStats {
    let mut books = 0;
    let mut chapters = 0;
    let mut previous: Option<(&str, u32)> = None;
    for record in records {
        match previous {
            Some((book, _)) if book != record.book => {
                books += 1;
                chapters += 1;
            }
            Some((_, chapter)) if chapter != record.chapter => chapters += 1,
            None => {
                books += 1;
                chapters += 1;
            }
            _ => {}
        }
        previous = Some((record.book.as_str(), record.chapter));
    }
    CorpusStats {
        books,
        chapters,
        verses: records.len(),
    }
}
