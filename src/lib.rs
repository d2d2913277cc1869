//! # enlace-rs
//!
//! Character networks and emotion analysis for annotated narrative text.
//!
//! The crate works on documents that were already annotated by an external
//! NLP pipeline (tags, named entities, lemmas, dependency parse, sentences).
//! It provides three analyses:
//!
//! - [`extract_characters`]: find the character names of a book
//! - [`build_network`]: link characters that appear close to each other
//! - [`analysis_emotion`]: score chapters against an emotion lexicon
//!
//! [`analyse_network`] then reduces the network to its giant component and
//! adds communities and centrality for the graph export.
//!
//! ## Quick Start
//!
//! ```rust
//! use enlace::{
//!     build_network, extract_characters, Chapter, CharacterSet, Document, EntityBoundary,
//!     NetworkConfig, Token,
//! };
//!
//! let person = |text: &str, i: usize| {
//!     Token::new(text, i)
//!         .with_tag("NNP")
//!         .with_entity("PERSON", EntityBoundary::Begin)
//! };
//! let chapter = Chapter::new(vec![
//!     person("Anne", 0),
//!     Token::new("and", 1).with_tag("CC"),
//!     person("Diana", 2),
//!     Token::new("laughed", 3).with_tag("VBD"),
//! ]);
//! let doc = Document::new(vec![chapter]).unwrap();
//!
//! let characters = CharacterSet::new(extract_characters(&doc));
//! assert_eq!(characters.names(), &["anne", "diana"]);
//!
//! let network = build_network(&doc, &characters, NetworkConfig::default());
//! assert_eq!(network.edges, vec![(0, 1)]);
//! assert_eq!(network.weights, vec![1]);
//! ```
//!
//! ## Emotion Analysis
//!
//! ```rust
//! use enlace::{analysis_emotion, Chapter, Document, Emotion, EmotionConfig, EmotionLexicon,
//!     EmotionReport, Token};
//!
//! let lexicon = EmotionLexicon::parse("happy joy 1\nhappy positive 1").unwrap();
//! let doc = Document::new(vec![Chapter::new(vec![
//!     Token::new("She", 0),
//!     Token::new("was", 1),
//!     Token::new("happy", 2),
//! ])])
//! .unwrap();
//!
//! let report = analysis_emotion(&doc, &lexicon, EmotionConfig::default()).unwrap();
//! if let EmotionReport::PerChapter(series) = report {
//!     assert_eq!(series.series(Emotion::Joy), &[100.0]);
//! }
//! ```

pub mod annotator;
pub mod book;
pub mod characters;
pub mod document;
pub mod emotion;
pub mod export;
pub mod graph;
pub mod lexicon;
pub mod network;
pub mod token;

// Re-export main types for convenience
pub use annotator::{annotate_book, AnnotationError, Annotator, Pacing};
pub use book::{Book, DEFAULT_BREAKER};
pub use characters::{extract_characters, CharacterExtractor, CharacterSet, ExtractionConfig};
pub use document::{Chapter, Document, DocumentError, EntitySpan};
pub use emotion::{
    analysis_emotion, ChapterAlignment, ChapterSeries, EmotionAccumulator, EmotionConfig,
    EmotionError, EmotionReport, EmotionScorer, Scope,
};
pub use export::{EdgeType, ExportError};
pub use graph::{analyse_network, Centrality, GraphAnalysis, GraphConfig, GraphError};
pub use lexicon::{Emotion, EmotionLexicon, LexiconError};
pub use network::{build_network, Network, NetworkConfig, DEFAULT_WINDOW_SIZE};
pub use token::{EntityBoundary, Token};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
