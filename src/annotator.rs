//! Seam to the external annotation pipeline.
//!
//! Tokenization, tagging, entity recognition and parsing are done by an
//! outside tool. Anything that can turn chapter text into a [`Chapter`] of
//! annotated tokens implements [`Annotator`].

use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use crate::book::Book;
use crate::document::{Chapter, Document, DocumentError};

/// Boxed error returned by annotator implementations
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while annotating a book
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("annotation of chapter {chapter} failed: {source}")]
    Failed {
        chapter: usize,
        #[source]
        source: BoxError,
    },

    #[error("annotator produced an invalid document: {0}")]
    InvalidDocument(#[from] DocumentError),
}

/// Produces annotated tokens for a chapter of text
pub trait Annotator {
    fn annotate(&self, text: &str) -> Result<Chapter, BoxError>;
}

/// Pause inserted between chapters for rate-limited annotators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Pause after every `every` chapters; 0 disables pacing
    pub every: usize,
    pub pause: Duration,
}

impl Pacing {
    /// No pauses
    pub fn none() -> Self {
        Pacing {
            every: 0,
            pause: Duration::ZERO,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Pacing {
            every: 2,
            pause: Duration::from_millis(1500),
        }
    }
}

/// Annotate every chapter of a sliced book, in order.
///
/// The first failure aborts the run; no partial document is returned.
pub fn annotate_book<A>(book: &Book, annotator: &A, pacing: Pacing) -> Result<Document, AnnotationError>
where
    A: Annotator + ?Sized,
{
    let mut chapters = Vec::with_capacity(book.chapter_total());

    for (c, text) in book.chapters().iter().enumerate() {
        let chapter = annotator
            .annotate(text)
            .map_err(|source| AnnotationError::Failed { chapter: c, source })?;
        debug!(chapter = c, tokens = chapter.len(), "annotated chapter");
        chapters.push(chapter);

        if pacing.every > 0 && chapters.len() % pacing.every == 0 && !pacing.pause.is_zero() {
            thread::sleep(pacing.pause);
        }
    }

    let doc = Document::new(chapters)?;
    info!(
        title = %book.title,
        chapters = doc.len(),
        tokens = doc.token_count(),
        "annotated book"
    );
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Token;

    /// Splits on whitespace; enough to exercise the driver
    struct WhitespaceAnnotator;

    impl Annotator for WhitespaceAnnotator {
        fn annotate(&self, text: &str) -> Result<Chapter, BoxError> {
            Ok(Chapter::new(
                text.split_whitespace()
                    .enumerate()
                    .map(|(i, w)| Token::new(w, i))
                    .collect(),
            ))
        }
    }

    struct FailingAnnotator;

    impl Annotator for FailingAnnotator {
        fn annotate(&self, text: &str) -> Result<Chapter, BoxError> {
            if text.contains("bad") {
                Err("model unavailable".into())
            } else {
                WhitespaceAnnotator.annotate(text)
            }
        }
    }

    #[test]
    fn test_annotate_book() {
        let book = Book::new("Test", "Anne ran ## Diana walked home").slice("##");
        let doc = annotate_book(&book, &WhitespaceAnnotator, Pacing::none()).unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.chapters[1].len(), 3);
    }

    #[test]
    fn test_failure_is_terminal() {
        let book = Book::new("Test", "fine ## bad ## fine").slice("##");
        let err = annotate_book(&book, &FailingAnnotator, Pacing::none()).unwrap_err();
        assert!(matches!(err, AnnotationError::Failed { chapter: 1, .. }));
    }

    #[test]
    fn test_pacing_default() {
        let pacing = Pacing::default();
        assert_eq!(pacing.every, 2);
        assert_eq!(pacing.pause, Duration::from_millis(1500));
    }
}
