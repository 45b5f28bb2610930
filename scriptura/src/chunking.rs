//! Bounded, overlapping text fragments.
//!
//! Long document content is split into fragments of at most `chunk_size`
//! characters with `chunk_overlap` characters shared between consecutive
//! fragments. Split points prefer natural boundaries in priority order:
//! paragraph break, line break, sentence end, plain space, then a hard
//! cut. Purely computational and deterministic — the same input and
//! settings always produce the same boundaries.

use crate::document::{VerseDocument, VerseMetadata};
use crate::types::RagError;

/// Boundary separators in preference order. The earliest entry found
/// anywhere in the window wins, regardless of position.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// Character-based splitter with fixed size and overlap.
#[derive(Clone, Debug)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    /// Creates a splitter; `chunk_overlap` must be strictly smaller than
    /// `chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, RagError> {
        if chunk_size == 0 {
            return Err(RagError::Config("chunk size must be positive".into()));
        }
        if chunk_overlap >= chunk_size {
            return Err(RagError::Config(format!(
                "chunk overlap ({chunk_overlap}) must be smaller than chunk size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    #[must_use]
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Splits `text` into ordered fragments.
    ///
    /// Text no longer than `chunk_size` comes back as a single fragment
    /// equal to the input. Otherwise each fragment ends at the preferred
    /// boundary inside its window and the next fragment starts exactly
    /// `chunk_overlap` characters before that cut (clamped so every step
    /// makes progress). Sizes and offsets count Unicode scalar values;
    /// slicing never lands inside a code point.
    #[must_use]
    pub fn split(&self, text: &str) -> Vec<String> {
        // Byte offset of every char, plus an end sentinel.
        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(offset, _)| offset)
            .chain([text.len()])
            .collect();
        let total_chars = offsets.len() - 1;

        if total_chars <= self.chunk_size {
            return vec![text.to_string()];
        }

        let mut fragments = Vec::new();
        let mut start = 0usize;
        loop {
            if total_chars - start <= self.chunk_size {
                fragments.push(text[offsets[start]..].to_string());
                break;
            }

            let window_end = start + self.chunk_size;
            let window = &text[offsets[start]..offsets[window_end]];
            let cut = start + cut_chars(window);
            fragments.push(text[offsets[start]..offsets[cut]].to_string());

            let rewound = cut.saturating_sub(self.chunk_overlap);
            start = if rewound > start { rewound } else { cut };
        }
        fragments
    }
}

/// Number of characters to keep from `window`: everything up to and
/// including the last occurrence of the highest-priority separator, or the
/// whole window when none is present.
fn cut_chars(window: &str) -> usize {
    for separator in SEPARATORS {
        if let Some(position) = window.rfind(separator) {
            let cut_bytes = position + separator.len();
            return window[..cut_bytes].chars().count();
        }
    }
    window.chars().count()
}

/// A bounded slice of document content carrying the parent's metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fragment {
    pub content: String,
    /// Zero-based ordinal of this fragment within its document.
    pub chunk_index: usize,
    pub metadata: VerseMetadata,
}

/// Fans one document into fragments; metadata is inherited unchanged.
#[must_use]
pub fn split_document(document: &VerseDocument, splitter: &TextSplitter) -> Vec<Fragment> {
    splitter
        .split(&document.content)
        .into_iter()
        .enumerate()
        .map(|(chunk_index, content)| Fragment {
            content,
            chunk_index,
            metadata: document.metadata.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::VerseRecord;
    use crate::document::verse_to_document;

    fn splitter(size: usize, overlap: usize) -> TextSplitter {
        TextSplitter::new(size, overlap).unwrap()
    }

    /// Rebuilds the original text by trimming the known overlap off every
    /// fragment after the first.
    fn reassemble(fragments: &[String], overlap: usize) -> String {
        let mut text = String::new();
        for (index, fragment) in fragments.iter().enumerate() {
            if index == 0 {
                text.push_str(fragment);
            } else {
                text.extend(fragment.chars().skip(overlap));
            }
        }
        text
    }

    #[test]
    fn short_text_is_returned_whole() {
        let s = splitter(100, 20);
        assert_eq!(s.split("short"), vec!["short".to_string()]);
        assert_eq!(s.split(""), vec![String::new()]);
    }

    #[test]
    fn fragments_respect_the_size_bound() {
        let text = "word ".repeat(200);
        let s = splitter(50, 10);
        for fragment in s.split(&text) {
            assert!(fragment.chars().count() <= 50);
        }
    }

    #[test]
    fn consecutive_fragments_overlap_exactly() {
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa ".repeat(10);
        let overlap = 12;
        let s = splitter(80, overlap);
        let fragments = s.split(&text);
        assert!(fragments.len() > 1);
        assert_eq!(reassemble(&fragments, overlap), text);
    }

    #[test]
    fn paragraph_breaks_win_over_later_spaces() {
        // The window holds a paragraph break early and spaces after it; the
        // cut must land after the paragraph break.
        let text = format!("first paragraph.\n\n{}", "filler words here ".repeat(20));
        let s = splitter(40, 0);
        let fragments = s.split(&text);
        assert_eq!(fragments[0], "first paragraph.\n\n");
    }

    #[test]
    fn line_break_preferred_over_sentence_and_space() {
        let text = format!("one. two\nthree {}", "x".repeat(60));
        let s = splitter(20, 0);
        let fragments = s.split(&text);
        assert_eq!(fragments[0], "one. two\n");
    }

    #[test]
    fn hard_cut_when_no_boundary_exists() {
        let text = "a".repeat(120);
        let s = splitter(50, 10);
        let fragments = s.split(&text);
        assert_eq!(fragments[0].chars().count(), 50);
        assert_eq!(reassemble(&fragments, 10), text);
    }

    #[test]
    fn splitting_is_deterministic() {
        let text = "In the beginning God created the heaven and the earth. ".repeat(30);
        let s = splitter(90, 15);
        assert_eq!(s.split(&text), s.split(&text));
    }

    #[test]
    fn multibyte_text_never_splits_inside_a_char() {
        let text = "číslo šťastné žluté ".repeat(30);
        let s = splitter(40, 8);
        let fragments = s.split(&text);
        assert!(fragments.len() > 1);
        assert_eq!(reassemble(&fragments, 8), text);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        assert!(TextSplitter::new(0, 0).is_err());
        assert!(TextSplitter::new(10, 10).is_err());
        assert!(TextSplitter::new(10, 20).is_err());
    }

    #[test]
    fn fragments_inherit_metadata_and_index() {
        let record = VerseRecord {
            book: "Psalms".to_string(),
            chapter: 119,
            verse: 1,
            text: "Blessed are the undefiled in the way, who walk in the law of the LORD. "
                .repeat(5),
            translation: "KJV".to_string(),
        };
        let document = verse_to_document(&record);
        let fragments = split_document(&document, &splitter(60, 10));
        assert!(fragments.len() > 1);
        for (expected_index, fragment) in fragments.iter().enumerate() {
            assert_eq!(fragment.chunk_index, expected_index);
            assert_eq!(fragment.metadata, document.metadata);
        }
    }

    #[test]
    fn short_document_yields_one_fragment() {
        let record = VerseRecord {
            book: "Genesis".to_string(),
            chapter: 1,
            verse: 1,
            text: "In the beginning God created the heaven and the earth.".to_string(),
            translation: "KJV".to_string(),
        };
        let document = verse_to_document(&record);
        let fragments = split_document(&document, &splitter(1000, 200));
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].content, document.content);
        assert_eq!(fragments[0].chunk_index, 0);
    }
}
