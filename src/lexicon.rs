//! Emotion lexicon and the fixed emotion tables.
//!
//! The lexicon is a whitespace-delimited table with three columns:
//! word, emotion label and polarity value. A positive value means the word
//! evokes the emotion.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors raised while loading a lexicon or selecting emotions
#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: expected 3 columns (word, emotion, value), got {content:?}")]
    MalformedLine { line: usize, content: String },

    #[error("line {line}: polarity value {value:?} is not a number")]
    InvalidValue { line: usize, value: String },

    #[error("unknown emotion: {0}")]
    UnknownEmotion(String),
}

/// The emotions known to the analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Joy,
    Trust,
    Disgust,
    Fear,
    Anger,
    Surprise,
    Anticipation,
    Sadness,
    Positive,
    Negative,
}

impl Emotion {
    /// Every emotion, in table order
    pub const ALL: [Emotion; 10] = [
        Emotion::Joy,
        Emotion::Trust,
        Emotion::Disgust,
        Emotion::Fear,
        Emotion::Anger,
        Emotion::Surprise,
        Emotion::Anticipation,
        Emotion::Sadness,
        Emotion::Positive,
        Emotion::Negative,
    ];

    /// The eight basic emotions analysed when no selection is given
    pub const BASIC: [Emotion; 8] = [
        Emotion::Joy,
        Emotion::Trust,
        Emotion::Disgust,
        Emotion::Fear,
        Emotion::Anger,
        Emotion::Surprise,
        Emotion::Anticipation,
        Emotion::Sadness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Joy => "joy",
            Emotion::Trust => "trust",
            Emotion::Disgust => "disgust",
            Emotion::Fear => "fear",
            Emotion::Anger => "anger",
            Emotion::Surprise => "surprise",
            Emotion::Anticipation => "anticipation",
            Emotion::Sadness => "sadness",
            Emotion::Positive => "positive",
            Emotion::Negative => "negative",
        }
    }

    /// The emotion a negated trigger is redirected to
    pub fn opposite(&self) -> Emotion {
        match self {
            Emotion::Joy => Emotion::Sadness,
            Emotion::Sadness => Emotion::Joy,
            Emotion::Trust => Emotion::Disgust,
            Emotion::Disgust => Emotion::Trust,
            Emotion::Fear => Emotion::Anger,
            Emotion::Anger => Emotion::Fear,
            Emotion::Surprise => Emotion::Anticipation,
            Emotion::Anticipation => Emotion::Surprise,
            Emotion::Positive => Emotion::Negative,
            Emotion::Negative => Emotion::Positive,
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = LexiconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_lowercase();
        Emotion::ALL
            .iter()
            .find(|e| e.as_str() == label)
            .copied()
            .ok_or_else(|| LexiconError::UnknownEmotion(s.to_string()))
    }
}

/// Parse a comma-separated list of emotion labels
pub fn parse_emotions(list: &str) -> Result<Vec<Emotion>, LexiconError> {
    list.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(Emotion::from_str)
        .collect()
}

/// Adverbs that double the intensity of the word they modify
static INCREASE_ADVERBS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "absolutely", "completely", "incredibly", "deeply", "totally", "fully", "entirely",
        "extremely", "fairly", "much", "hardly", "pretty", "rather", "really", "so", "too",
        "very",
    ]
    .into_iter()
    .collect()
});

/// Adverbs that halve the intensity of the word they modify
static DECREASE_ADVERBS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "almost", "barely", "little", "far", "just", "nearly", "only", "quite", "scarcely",
    ]
    .into_iter()
    .collect()
});

/// Intensity contributed by an adverbial modifier (lowercase form)
pub fn adverb_intensity(adverb: &str) -> f64 {
    if INCREASE_ADVERBS.contains(adverb) {
        2.0
    } else if DECREASE_ADVERBS.contains(adverb) {
        0.5
    } else {
        1.0
    }
}

/// One lexicon row for a word
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconEntry {
    /// Emotion label as written in the lexicon
    pub emotion: String,
    /// Polarity value; positive when the word evokes the emotion
    pub value: f64,
}

/// A word → emotion rows mapping
#[derive(Debug, Clone, Default)]
pub struct EmotionLexicon {
    words: HashMap<String, Vec<LexiconEntry>>,
    rows: usize,
}

impl EmotionLexicon {
    pub fn new() -> Self {
        EmotionLexicon::default()
    }

    /// Parse a whitespace-delimited lexicon (format: word emotion value)
    pub fn parse(content: &str) -> Result<Self, LexiconError> {
        let mut lexicon = EmotionLexicon::new();

        for (n, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            let [word, emotion, value] = parts.as_slice() else {
                return Err(LexiconError::MalformedLine {
                    line: n + 1,
                    content: line.to_string(),
                });
            };

            let value: f64 = value.parse().map_err(|_| LexiconError::InvalidValue {
                line: n + 1,
                value: value.to_string(),
            })?;

            lexicon.add(word, emotion, value);
        }

        debug!(
            words = lexicon.len(),
            rows = lexicon.rows(),
            "loaded emotion lexicon"
        );
        Ok(lexicon)
    }

    /// Read and parse a lexicon file
    pub fn from_path(path: &Path) -> Result<Self, LexiconError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Add a row
    pub fn add(&mut self, word: &str, emotion: &str, value: f64) {
        self.words
            .entry(word.to_string())
            .or_default()
            .push(LexiconEntry {
                emotion: emotion.to_string(),
                value,
            });
        self.rows += 1;
    }

    /// Rows for an exact surface form
    pub fn entries(&self, word: &str) -> &[LexiconEntry] {
        self.words.get(word).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Words with at least one row labelled with a selected emotion
    pub fn words_for(&self, selected: &[Emotion]) -> HashSet<&str> {
        self.words
            .iter()
            .filter(|(_, entries)| {
                entries
                    .iter()
                    .any(|entry| selected.iter().any(|e| e.as_str() == entry.emotion))
            })
            .map(|(word, _)| word.as_str())
            .collect()
    }

    /// Number of distinct words
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lexicon() {
        let content = "# word emotion value\nhappy joy 1\nhappy sadness 0\n\nawful disgust 1";
        let lexicon = EmotionLexicon::parse(content).unwrap();
        assert_eq!(lexicon.len(), 2);
        assert_eq!(lexicon.rows(), 3);
        assert_eq!(lexicon.entries("happy").len(), 2);
        assert!(lexicon.entries("sad").is_empty());
    }

    #[test]
    fn test_malformed_line() {
        let err = EmotionLexicon::parse("happy joy 1\nbroken joy").unwrap_err();
        assert!(matches!(err, LexiconError::MalformedLine { line: 2, .. }));

        let err = EmotionLexicon::parse("happy joy 1 extra").unwrap_err();
        assert!(matches!(err, LexiconError::MalformedLine { line: 1, .. }));
    }

    #[test]
    fn test_invalid_value() {
        let err = EmotionLexicon::parse("happy joy yes").unwrap_err();
        assert!(matches!(err, LexiconError::InvalidValue { line: 1, .. }));
    }

    #[test]
    fn test_words_for_selection() {
        let lexicon = EmotionLexicon::parse("happy joy 1\nafraid fear 1\ngood positive 1").unwrap();
        let words = lexicon.words_for(&[Emotion::Joy, Emotion::Fear]);
        assert!(words.contains("happy"));
        assert!(words.contains("afraid"));
        assert!(!words.contains("good"));
    }

    #[test]
    fn test_emotion_pairs_are_symmetric() {
        for emotion in Emotion::ALL {
            assert_ne!(emotion.opposite(), emotion);
            assert_eq!(emotion.opposite().opposite(), emotion);
        }
        assert_eq!(Emotion::Joy.opposite(), Emotion::Sadness);
        assert_eq!(Emotion::Trust.opposite(), Emotion::Disgust);
    }

    #[test]
    fn test_parse_emotions() {
        let emotions = parse_emotions("joy, Fear,sadness").unwrap();
        assert_eq!(emotions, vec![Emotion::Joy, Emotion::Fear, Emotion::Sadness]);

        let err = parse_emotions("joy,boredom").unwrap_err();
        assert!(matches!(err, LexiconError::UnknownEmotion(ref s) if s == "boredom"));
    }

    #[test]
    fn test_adverb_intensity() {
        assert_eq!(adverb_intensity("very"), 2.0);
        assert_eq!(adverb_intensity("barely"), 0.5);
        assert_eq!(adverb_intensity("slowly"), 1.0);
    }
}
