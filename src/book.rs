//! Raw narrative text split into chapters.
//!
//! A book is read from a plain-text file, flattened to a single line and cut
//! into chapters on a breaker string. The chapters are the units handed to
//! the annotation pipeline.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Default chapter delimiter
pub const DEFAULT_BREAKER: &str = "#######";

/// A book: title, flattened content and chapters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Book {
    pub title: String,
    content: String,
    chapters: Vec<String>,
}

impl Book {
    /// Create a book from its title and content
    pub fn new(title: &str, content: &str) -> Self {
        Book {
            title: title.to_string(),
            content: content.to_string(),
            chapters: Vec::new(),
        }
    }

    /// Read a book, stripping each line and joining them with single spaces
    pub fn open(title: &str, path: &Path) -> io::Result<Self> {
        let raw = fs::read_to_string(path)?;
        let content = raw.lines().map(str::trim).collect::<Vec<_>>().join(" ");
        debug!(title, bytes = content.len(), "opened book");
        Ok(Book::new(title, &content))
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn chapters(&self) -> &[String] {
        &self.chapters
    }

    /// Number of chapters after slicing
    pub fn chapter_total(&self) -> usize {
        self.chapters.len()
    }

    /// Lowercase the content
    pub fn lowercase(mut self) -> Self {
        self.content = self.content.to_lowercase();
        self
    }

    /// Decompose the content (NFKD) and drop combining marks
    pub fn remove_accents(mut self) -> Self {
        self.content = self
            .content
            .nfkd()
            .filter(|c| !is_combining_mark(*c))
            .collect();
        self
    }

    /// Split the content into chapters on `breaker`
    pub fn slice(mut self, breaker: &str) -> Self {
        self.chapters = self.content.split(breaker).map(str::to_string).collect();
        debug!(chapters = self.chapters.len(), "sliced book");
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_slice() {
        let book = Book::new("Test", "One. ####### Two. ####### Three.").slice(DEFAULT_BREAKER);
        assert_eq!(book.chapter_total(), 3);
        assert_eq!(book.chapters()[1], " Two. ");
    }

    #[test]
    fn test_slice_without_breaker() {
        let book = Book::new("Test", "Only one chapter").slice(DEFAULT_BREAKER);
        assert_eq!(book.chapters(), &["Only one chapter"]);
    }

    #[test]
    fn test_remove_accents_and_lowercase() {
        let book = Book::new("Test", "Élodie à São Paulo").remove_accents().lowercase();
        assert_eq!(book.content(), "elodie a sao paulo");
    }

    #[test]
    fn test_open_joins_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  Chapter one  ").unwrap();
        writeln!(file, "ends here.").unwrap();

        let book = Book::open("Test", file.path()).unwrap();
        assert_eq!(book.content(), "Chapter one ends here.");
    }
}
