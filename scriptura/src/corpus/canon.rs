//! Canonical book tables.
//!
//! One ordered table drives both lookups: a book's position yields its
//! canonical number (1..=66), and the first 39 positions are the Old
//! Testament. Names not in the canon get number 0 and default to the New
//! Testament — a data-quality signal in the source corpus, not an error.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of Old Testament books; positions beyond this are New Testament.
pub const OLD_TESTAMENT_BOOKS: usize = 39;

/// The 66 protestant-canon book names in canonical order.
pub const CANONICAL_BOOKS: [&str; 66] = [
    "Genesis",
    "Exodus",
    "Leviticus",
    "Numbers",
    "Deuteronomy",
    "Joshua",
    "Judges",
    "Ruth",
    "1 Samuel",
    "2 Samuel",
    "1 Kings",
    "2 Kings",
    "1 Chronicles",
    "2 Chronicles",
    "Ezra",
    "Nehemiah",
    "Esther",
    "Job",
    "Psalms",
    "Proverbs",
    "Ecclesiastes",
    "Song of Solomon",
    "Isaiah",
    "Jeremiah",
    "Lamentations",
    "Ezekiel",
    "Daniel",
    "Hosea",
    "Joel",
    "Amos",
    "Obadiah",
    "Jonah",
    "Micah",
    "Nahum",
    "Habakkuk",
    "Zephaniah",
    "Haggai",
    "Zechariah",
    "Malachi",
    "Matthew",
    "Mark",
    "Luke",
    "John",
    "Acts",
    "Romans",
    "1 Corinthians",
    "2 Corinthians",
    "Galatians",
    "Ephesians",
    "Philippians",
    "Colossians",
    "1 Thessalonians",
    "2 Thessalonians",
    "1 Timothy",
    "2 Timothy",
    "Titus",
    "Philemon",
    "Hebrews",
    "James",
    "1 Peter",
    "2 Peter",
    "1 John",
    "2 John",
    "3 John",
    "Jude",
    "Revelation",
];

/// The Old/New grouping used as a coarse metadata facet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Testament {
    Old,
    New,
}

impl fmt::Display for Testament {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Testament::Old => f.write_str("Old"),
            Testament::New => f.write_str("New"),
        }
    }
}

/// Canonical number of `book` (1..=66), or 0 when the name is not in the
/// canon.
#[must_use]
pub fn book_number(book: &str) -> u8 {
    CANONICAL_BOOKS
        .iter()
        .position(|name| *name == book)
        .map_or(0, |position| (position + 1) as u8)
}

/// Testament membership of `book`. Unknown names default to
/// [`Testament::New`].
#[must_use]
pub fn testament(book: &str) -> Testament {
    match CANONICAL_BOOKS.iter().position(|name| *name == book) {
        Some(position) if position < OLD_TESTAMENT_BOOKS => Testament::Old,
        _ => Testament::New,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbering_spans_the_canon() {
        assert_eq!(book_number("Genesis"), 1);
        assert_eq!(book_number("Malachi"), 39);
        assert_eq!(book_number("Matthew"), 40);
        assert_eq!(book_number("Revelation"), 66);
    }

    #[test]
    fn unknown_books_get_zero_and_new() {
        assert_eq!(book_number("Maccabees"), 0);
        assert_eq!(testament("Maccabees"), Testament::New);
    }

    #[test]
    fn testament_boundary_sits_between_malachi_and_matthew() {
        assert_eq!(testament("Malachi"), Testament::Old);
        assert_eq!(testament("Matthew"), Testament::New);
    }

    #[test]
    fn every_old_testament_book_maps_old() {
        for name in &CANONICAL_BOOKS[..OLD_TESTAMENT_BOOKS] {
            assert_eq!(testament(name), Testament::Old, "{name}");
        }
        for name in &CANONICAL_BOOKS[OLD_TESTAMENT_BOOKS..] {
            assert_eq!(testament(name), Testament::New, "{name}");
        }
    }
}
