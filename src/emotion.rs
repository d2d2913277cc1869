//! Lexicon-based emotion scoring.
//!
//! Every token whose surface text is a lexicon word (restricted to the
//! selected emotions) is a *hit*. Hits add their intensity to the emotions
//! they evoke, or to the opposite emotion when negated. At the end of each
//! scope (a chapter, or the whole book) the accumulated values are turned into
//! percentages of the number of hits in that scope.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::document::{Chapter, Document};
use crate::lexicon::{adverb_intensity, Emotion, EmotionLexicon};
use crate::token::{DEP_ADVERBIAL_MODIFIER, DEP_NEGATION};

/// The range over which emotions are accumulated and normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    /// A single chapter (0-based)
    Chapter(usize),
    /// The whole book
    Book,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Chapter(i) => write!(f, "chapter {}", i + 1),
            Scope::Book => write!(f, "book"),
        }
    }
}

/// Errors raised by emotion scoring
#[derive(Debug, Error)]
pub enum EmotionError {
    #[error("no emotion data in {scope}: no token matched the lexicon")]
    NoEmotionData { scope: Scope },

    #[error("no emotion selected for analysis")]
    EmptySelection,
}

/// How per-chapter series treat chapters where an emotion never occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChapterAlignment {
    /// Append 0.0, so every series has one value per chapter
    #[default]
    ZeroFill,
    /// Append nothing; series may have different lengths
    Ragged,
}

/// Options for [`EmotionScorer`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionConfig {
    /// Emotions considered in the analysis
    pub emotions: Vec<Emotion>,
    /// Score each chapter separately instead of the whole book
    pub per_chapter: bool,
    /// Missing-chapter policy for per-chapter series
    pub alignment: ChapterAlignment,
}

impl Default for EmotionConfig {
    fn default() -> Self {
        EmotionConfig {
            emotions: Emotion::BASIC.to_vec(),
            per_chapter: true,
            alignment: ChapterAlignment::default(),
        }
    }
}

/// Negation and intensity found in a token's sentence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Modifiers {
    pub negated: bool,
    pub intensity: f64,
}

/// Look for negators and adverbial modifiers of token `i` in its sentence.
///
/// A negator counts when it attaches to the token itself or to the token's
/// head. The last adverbial modifier of the token sets the intensity.
pub fn sentence_modifiers(chapter: &Chapter, i: usize) -> Modifiers {
    let mut modifiers = Modifiers {
        negated: false,
        intensity: 1.0,
    };
    let Some(token) = chapter.get(i) else {
        return modifiers;
    };

    for other in chapter.sentence_of(i) {
        if other.dep == DEP_NEGATION && (other.head == token.head || other.head == token.i) {
            modifiers.negated = true;
        }
        if other.dep == DEP_ADVERBIAL_MODIFIER && other.head == token.i {
            modifiers.intensity = adverb_intensity(&other.lower);
        }
    }

    modifiers
}

/// Running emotion values and lexicon-hit count for one scope
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmotionAccumulator {
    values: BTreeMap<Emotion, f64>,
    hits: usize,
}

impl EmotionAccumulator {
    pub fn new() -> Self {
        EmotionAccumulator::default()
    }

    /// Count one lexicon-hit token
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn get(&self, emotion: Emotion) -> Option<f64> {
        self.values.get(&emotion).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Add one trigger of `emotion`.
    ///
    /// Once an emotion has an entry, negated triggers feed its opposite, but
    /// only if the opposite has an entry too. A negated trigger of an emotion
    /// without an entry (re)sets the opposite to `intensity`.
    pub fn record(&mut self, emotion: Emotion, negated: bool, intensity: f64) {
        if self.values.contains_key(&emotion) {
            let target = if negated { emotion.opposite() } else { emotion };
            if let Some(value) = self.values.get_mut(&target) {
                *value += intensity;
            }
        } else if negated {
            self.values.insert(emotion.opposite(), intensity);
        } else {
            self.values.insert(emotion, intensity);
        }
    }

    /// Turn values into percentages of the hit count
    pub fn normalize(&self, scope: Scope) -> Result<BTreeMap<Emotion, f64>, EmotionError> {
        if self.hits == 0 {
            return Err(EmotionError::NoEmotionData { scope });
        }
        let hits = self.hits as f64;
        Ok(self
            .values
            .iter()
            .map(|(&emotion, &value)| (emotion, value * 100.0 / hits))
            .collect())
    }
}

/// Per-chapter percentages for each selected emotion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChapterSeries {
    /// One sequence per selected emotion
    pub emotions: BTreeMap<Emotion, Vec<f64>>,
    /// Chapters (0-based) without any lexicon hit
    pub empty_chapters: Vec<usize>,
    /// Policy used to build the sequences
    pub alignment: ChapterAlignment,
}

impl ChapterSeries {
    /// The sequence for one emotion
    pub fn series(&self, emotion: Emotion) -> &[f64] {
        self.emotions
            .get(&emotion)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Result of an emotion analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionReport {
    PerChapter(ChapterSeries),
    Book(BTreeMap<Emotion, f64>),
}

/// Scores emotions of a document against a lexicon
#[derive(Debug, Clone)]
pub struct EmotionScorer<'a> {
    lexicon: &'a EmotionLexicon,
    config: EmotionConfig,
}

impl<'a> EmotionScorer<'a> {
    pub fn new(lexicon: &'a EmotionLexicon, config: EmotionConfig) -> Self {
        EmotionScorer { lexicon, config }
    }

    pub fn config(&self) -> &EmotionConfig {
        &self.config
    }

    /// Run the analysis over the whole document
    pub fn analyse(&self, doc: &Document) -> Result<EmotionReport, EmotionError> {
        if self.config.emotions.is_empty() {
            return Err(EmotionError::EmptySelection);
        }

        let words = self.lexicon.words_for(&self.config.emotions);
        debug!(
            words = words.len(),
            emotions = self.config.emotions.len(),
            "scoring emotions"
        );

        if self.config.per_chapter {
            Ok(EmotionReport::PerChapter(self.per_chapter(doc, &words)))
        } else {
            self.whole_book(doc, &words).map(EmotionReport::Book)
        }
    }

    fn per_chapter(&self, doc: &Document, words: &HashSet<&str>) -> ChapterSeries {
        let mut series = ChapterSeries {
            emotions: self
                .config
                .emotions
                .iter()
                .map(|&emotion| (emotion, Vec::with_capacity(doc.len())))
                .collect(),
            empty_chapters: Vec::new(),
            alignment: self.config.alignment,
        };

        for (c, chapter) in doc.chapters.iter().enumerate() {
            let mut acc = EmotionAccumulator::new();
            self.score_chapter(chapter, words, &mut acc);

            let percentages = match acc.normalize(Scope::Chapter(c)) {
                Ok(percentages) => percentages,
                Err(e) => {
                    debug!("{}", e);
                    series.empty_chapters.push(c);
                    BTreeMap::new()
                }
            };

            for (emotion, values) in series.emotions.iter_mut() {
                match (percentages.get(emotion), self.config.alignment) {
                    (Some(&value), _) => values.push(value),
                    (None, ChapterAlignment::ZeroFill) => values.push(0.0),
                    (None, ChapterAlignment::Ragged) => {}
                }
            }
        }

        if !series.empty_chapters.is_empty() {
            warn!(
                chapters = series.empty_chapters.len(),
                "chapters without emotion data"
            );
        }
        series
    }

    fn whole_book(
        &self,
        doc: &Document,
        words: &HashSet<&str>,
    ) -> Result<BTreeMap<Emotion, f64>, EmotionError> {
        if doc.token_count() == 0 {
            return Ok(BTreeMap::new());
        }

        let mut acc = EmotionAccumulator::new();
        for chapter in &doc.chapters {
            self.score_chapter(chapter, words, &mut acc);
        }

        debug!(hits = acc.hits(), "scored whole book");
        acc.normalize(Scope::Book)
    }

    fn score_chapter(&self, chapter: &Chapter, words: &HashSet<&str>, acc: &mut EmotionAccumulator) {
        for token in &chapter.tokens {
            if !words.contains(token.text.as_str()) {
                continue;
            }

            let modifiers = sentence_modifiers(chapter, token.i);
            acc.hit();

            for entry in self.lexicon.entries(&token.text) {
                if entry.value <= 0.0 {
                    continue;
                }
                let selected = self
                    .config
                    .emotions
                    .iter()
                    .find(|e| e.as_str() == entry.emotion);
                if let Some(&emotion) = selected {
                    acc.record(emotion, modifiers.negated, modifiers.intensity);
                }
            }
        }
    }
}

/// Score a document with the given lexicon and options
pub fn analysis_emotion(
    doc: &Document,
    lexicon: &EmotionLexicon,
    config: EmotionConfig,
) -> Result<EmotionReport, EmotionError> {
    EmotionScorer::new(lexicon, config).analyse(doc)
}
