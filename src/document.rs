//! Annotated documents: chapters of tokens in narrative order.
//!
//! This is the input contract shared by character extraction, network
//! building and emotion scoring. Documents are produced by an
//! [`Annotator`](crate::annotator::Annotator) or loaded from JSON.

use std::fs;
use std::ops::Range;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::token::{EntityBoundary, Token};

/// Errors raised while loading or validating a document
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("chapter {chapter}: token {token} has head {head} outside the chapter")]
    InvalidHead {
        chapter: usize,
        token: usize,
        head: usize,
    },

    #[error("chapter {chapter}: token at position {position} claims index {index}")]
    InvalidIndex {
        chapter: usize,
        position: usize,
        index: usize,
    },

    #[error("chapter {chapter}: sentence index decreases at token {token}")]
    InvalidSentence { chapter: usize, token: usize },
}

/// A contiguous named-entity span within a chapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Index of the first token
    pub start: usize,
    /// Index one past the last token
    pub end: usize,
    /// Entity label
    pub label: String,
    /// Span text, rebuilt from token text and trailing whitespace
    pub text: String,
}

/// An ordered sequence of tokens
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub tokens: Vec<Token>,
}

impl Chapter {
    pub fn new(tokens: Vec<Token>) -> Self {
        Chapter { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Get the token at `i`, or `None` when it falls outside the chapter
    pub fn get(&self, i: usize) -> Option<&Token> {
        self.tokens.get(i)
    }

    /// Token ranges of each sentence, in order.
    ///
    /// Sentences are runs of tokens sharing the same sentence index.
    pub fn sentence_ranges(&self) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut start = 0;

        for i in 1..self.tokens.len() {
            if self.tokens[i].sent != self.tokens[i - 1].sent {
                ranges.push(start..i);
                start = i;
            }
        }

        if start < self.tokens.len() {
            ranges.push(start..self.tokens.len());
        }

        ranges
    }

    /// Tokens of the sentence containing token `i`
    pub fn sentence_of(&self, i: usize) -> &[Token] {
        let Some(token) = self.tokens.get(i) else {
            return &[];
        };

        let mut start = i;
        while start > 0 && self.tokens[start - 1].sent == token.sent {
            start -= 1;
        }
        let mut end = i + 1;
        while end < self.tokens.len() && self.tokens[end].sent == token.sent {
            end += 1;
        }

        &self.tokens[start..end]
    }

    /// Named-entity spans built from Begin/Inside runs
    pub fn entities(&self) -> Vec<EntitySpan> {
        let mut spans = Vec::new();
        let mut current: Option<(usize, String)> = None;

        for (i, token) in self.tokens.iter().enumerate() {
            let continues = token.ent_iob == EntityBoundary::Inside
                && current
                    .as_ref()
                    .is_some_and(|(_, label)| token.has_entity(label));

            if continues {
                continue;
            }

            if let Some((start, label)) = current.take() {
                spans.push(self.make_span(start, i, label));
            }

            if token.ent_iob != EntityBoundary::Outside {
                if let Some(ref label) = token.ent_type {
                    current = Some((i, label.clone()));
                }
            }
        }

        if let Some((start, label)) = current {
            spans.push(self.make_span(start, self.tokens.len(), label));
        }

        spans
    }

    fn make_span(&self, start: usize, end: usize, label: String) -> EntitySpan {
        let mut text = String::new();
        for (offset, token) in self.tokens[start..end].iter().enumerate() {
            text.push_str(&token.text);
            if token.whitespace && start + offset + 1 < end {
                text.push(' ');
            }
        }

        EntitySpan {
            start,
            end,
            label,
            text,
        }
    }
}

/// An annotated document: chapters in narrative order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub chapters: Vec<Chapter>,
}

impl Document {
    /// Build a document from chapters, validating token references
    pub fn new(chapters: Vec<Chapter>) -> Result<Self, DocumentError> {
        let doc = Document { chapters };
        doc.validate()?;
        Ok(doc)
    }

    /// Parse a document from its JSON representation
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let mut doc: Document = serde_json::from_str(json)?;
        for chapter in &mut doc.chapters {
            for token in &mut chapter.tokens {
                token.normalize();
            }
        }
        doc.validate()?;

        debug!(
            chapters = doc.chapters.len(),
            tokens = doc.token_count(),
            "loaded annotated document"
        );
        Ok(doc)
    }

    /// Read and parse a JSON document from disk
    pub fn from_path(path: &Path) -> Result<Self, DocumentError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Serialize the document to pretty JSON
    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    /// Total number of tokens across all chapters
    pub fn token_count(&self) -> usize {
        self.chapters.iter().map(Chapter::len).sum()
    }

    /// Check that positional indices, heads and sentence indices are consistent
    pub fn validate(&self) -> Result<(), DocumentError> {
        for (c, chapter) in self.chapters.iter().enumerate() {
            for (position, token) in chapter.tokens.iter().enumerate() {
                if token.i != position {
                    return Err(DocumentError::InvalidIndex {
                        chapter: c,
                        position,
                        index: token.i,
                    });
                }
                if token.head >= chapter.len() {
                    return Err(DocumentError::InvalidHead {
                        chapter: c,
                        token: position,
                        head: token.head,
                    });
                }
                if position > 0 && token.sent < chapter.tokens[position - 1].sent {
                    return Err(DocumentError::InvalidSentence {
                        chapter: c,
                        token: position,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::ENT_PERSON;

    fn sample_chapter() -> Chapter {
        Chapter::new(vec![
            Token::new("Mr", 0).with_entity(ENT_PERSON, EntityBoundary::Begin),
            Token::new("Darcy", 1).with_entity(ENT_PERSON, EntityBoundary::Inside),
            Token::new("left", 2),
            Token::new(".", 3).punct(),
            Token::new("London", 4)
                .with_entity("GPE", EntityBoundary::Begin)
                .in_sentence(1),
            Token::new("waited", 5).in_sentence(1),
        ])
    }

    #[test]
    fn test_entities() {
        let spans = sample_chapter().entities();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "Mr Darcy");
        assert_eq!(spans[0].label, ENT_PERSON);
        assert_eq!((spans[0].start, spans[0].end), (0, 2));
        assert_eq!(spans[1].text, "London");
        assert_eq!(spans[1].label, "GPE");
    }

    #[test]
    fn test_sentence_ranges() {
        let chapter = sample_chapter();
        assert_eq!(chapter.sentence_ranges(), vec![0..4, 4..6]);
        assert_eq!(chapter.sentence_of(5).len(), 2);
        assert_eq!(chapter.sentence_of(0).len(), 4);
        assert!(chapter.sentence_of(10).is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_head() {
        let chapter = Chapter::new(vec![Token::new("She", 0).with_dep("nsubj", 4)]);
        let err = Document::new(vec![chapter]).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidHead { head: 4, .. }));
    }

    #[test]
    fn test_validate_rejects_bad_index() {
        let chapter = Chapter::new(vec![Token::new("She", 0), Token::new("ran", 0)]);
        let err = Document::new(vec![chapter]).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidIndex { position: 1, .. }));
    }

    #[test]
    fn test_json_roundtrip() {
        let doc = Document::new(vec![sample_chapter()]).unwrap();
        let json = doc.to_json().unwrap();
        let parsed = Document::from_json(&json).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::from_json(r#"{"chapters": []}"#).unwrap();
        assert!(doc.is_empty());
        assert_eq!(doc.token_count(), 0);
    }
}
