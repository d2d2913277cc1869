//! Token representation for annotated narrative text.
//!
//! A Token is one unit produced by the external annotation pipeline, carrying
//! its tag, entity and dependency annotations. The three analysis components
//! only read the fields defined here, so any annotator that fills them can be
//! substituted.

use serde::{Deserialize, Serialize};

/// Fine-grained tag for a singular proper noun
pub const TAG_PROPER_NOUN: &str = "NNP";

/// Fine-grained tag for a possessive determiner ("his", "her", ...)
pub const TAG_POSSESSIVE: &str = "PRP$";

/// Entity label for people
pub const ENT_PERSON: &str = "PERSON";

/// Dependency label attached to negators
pub const DEP_NEGATION: &str = "neg";

/// Dependency label attached to adverbial modifiers
pub const DEP_ADVERBIAL_MODIFIER: &str = "advmod";

/// Position of a token relative to a named-entity span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EntityBoundary {
    /// First token of an entity span
    #[serde(alias = "B")]
    Begin,
    /// Continuation of an entity span
    #[serde(alias = "I")]
    Inside,
    /// Not part of any entity
    #[default]
    #[serde(alias = "O", alias = "")]
    Outside,
}

impl EntityBoundary {
    /// Convert to the single-letter IOB representation
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityBoundary::Begin => "B",
            EntityBoundary::Inside => "I",
            EntityBoundary::Outside => "O",
        }
    }
}

/// A single annotated token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Token {
    /// The surface text of the token
    pub text: String,

    /// Lowercase form, used for all name matching
    pub lower: String,

    /// Lemma (base form) of the word
    pub lemma: String,

    /// Fine-grained part-of-speech tag
    pub tag: String,

    /// Entity type, if the token belongs to a named entity
    pub ent_type: Option<String>,

    /// Entity boundary marker
    pub ent_iob: EntityBoundary,

    /// Whether the token is a stopword
    pub is_stop: bool,

    /// Whether the token is punctuation
    pub is_punct: bool,

    /// Whether the token looks like a number ("10", "ten", ...)
    pub like_num: bool,

    /// Dependency label
    pub dep: String,

    /// Index of the governing token within the chapter
    pub head: usize,

    /// Index of the containing sentence within the chapter
    pub sent: usize,

    /// Position of this token within its chapter
    pub i: usize,

    /// Whether the token is followed by whitespace in the source text
    #[serde(default = "default_true")]
    pub whitespace: bool,
}

fn default_true() -> bool {
    true
}

impl Token {
    /// Create a token with text and position.
    ///
    /// The lowercase form and lemma are derived from the text, and the token
    /// is its own head (a sentence root).
    pub fn new(text: &str, i: usize) -> Self {
        Token {
            text: text.to_string(),
            lower: text.to_lowercase(),
            lemma: text.to_string(),
            head: i,
            i,
            whitespace: true,
            ..Default::default()
        }
    }

    /// Set the part-of-speech tag
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = tag.to_string();
        self
    }

    /// Set the lemma
    pub fn with_lemma(mut self, lemma: &str) -> Self {
        self.lemma = lemma.to_string();
        self
    }

    /// Mark the token as part of an entity span
    pub fn with_entity(mut self, label: &str, boundary: EntityBoundary) -> Self {
        self.ent_type = Some(label.to_string());
        self.ent_iob = boundary;
        self
    }

    /// Set the dependency label and head
    pub fn with_dep(mut self, dep: &str, head: usize) -> Self {
        self.dep = dep.to_string();
        self.head = head;
        self
    }

    /// Set the containing sentence
    pub fn in_sentence(mut self, sent: usize) -> Self {
        self.sent = sent;
        self
    }

    /// Mark the token as a stopword
    pub fn stop(mut self) -> Self {
        self.is_stop = true;
        self
    }

    /// Mark the token as punctuation
    pub fn punct(mut self) -> Self {
        self.is_punct = true;
        self
    }

    /// Mark the token as number-like
    pub fn num(mut self) -> Self {
        self.like_num = true;
        self
    }

    /// Fill the derived fields an annotator may have left empty
    pub fn normalize(&mut self) {
        if self.lower.is_empty() {
            self.lower = self.text.to_lowercase();
        }
        if self.lemma.is_empty() {
            self.lemma = self.text.clone();
        }
    }

    /// Check if the entity type equals the given label
    pub fn has_entity(&self, label: &str) -> bool {
        self.ent_type.as_deref() == Some(label)
    }

    /// Check if this token is typed PERSON
    pub fn is_person(&self) -> bool {
        self.has_entity(ENT_PERSON)
    }

    /// Check if this is a singular proper noun
    pub fn is_proper_noun(&self) -> bool {
        self.tag == TAG_PROPER_NOUN
    }

    /// Check if the lowercase form contains an ASCII punctuation character
    pub fn has_punctuation(&self) -> bool {
        self.lower.chars().any(|c| c.is_ascii_punctuation())
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)?;
        if !self.tag.is_empty() {
            write!(f, "/{}", self.tag)?;
        }
        if let Some(ref label) = self.ent_type {
            write!(f, "[{}-{}]", self.ent_iob.as_str(), label)?;
        }
        Ok(())
    }
}
