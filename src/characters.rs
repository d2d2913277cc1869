//! Character name extraction and disambiguation.
//!
//! Candidate names are proper nouns tagged as the beginning of a PERSON span.
//! After the scan, a series of heuristic filters each produce an exclusion
//! set; the surviving names are returned in discovery order.
//!
//! The filters trade precision for recall and never fail: a bad annotation
//! only makes the character list smaller or larger.

use std::collections::{BTreeSet, HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::document::Document;
use crate::token::{EntityBoundary, Token, ENT_PERSON, TAG_POSSESSIVE, TAG_PROPER_NOUN};

/// Matches single letters and pairs of initials: "a", "a.", "a b", "a.b."
static INITIALS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z]$|^[a-z]\.$|^[a-z]\s[a-z]$|^[a-z]\.[a-z]\.$").expect("Invalid regex")
});

/// Which post-scan filters to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Drop names that collide with the second part of a two-token name
    pub surnames: bool,
    /// Drop singular/plural name pairs ("john"/"johns")
    pub plurals: bool,
    /// Drop names more often tagged with another entity label
    pub ambiguous_entities: bool,
    /// Drop words caught in title patterns ("the Duke", "Lizzy, the ...")
    pub person_groups: bool,
    /// Drop words more often tagged as something other than a proper noun
    pub pseudo_proper_nouns: bool,
    /// Drop initials
    pub initials: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        ExtractionConfig {
            surnames: true,
            plurals: true,
            ambiguous_entities: true,
            person_groups: true,
            pseudo_proper_nouns: true,
            initials: true,
        }
    }
}

/// Raw output of the candidate scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidates {
    /// Single-token names, lowercase, in discovery order
    pub names: Vec<String>,
    /// Two-token names as (first, second), lowercase
    pub surnames: Vec<(String, String)>,
}

/// Extracts validated character names from an annotated document
#[derive(Debug, Clone, Default)]
pub struct CharacterExtractor {
    config: ExtractionConfig,
}

impl CharacterExtractor {
    pub fn new() -> Self {
        CharacterExtractor::default()
    }

    pub fn with_config(config: ExtractionConfig) -> Self {
        CharacterExtractor { config }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract character names, lowercase, in discovery order
    pub fn extract(&self, doc: &Document) -> Vec<String> {
        let candidates = scan_candidates(doc);
        let names = &candidates.names;
        debug!(
            names = names.len(),
            surnames = candidates.surnames.len(),
            "scanned name candidates"
        );

        let mut excluded: HashSet<String> = HashSet::new();

        if self.config.surnames {
            let out = surname_exclusions(names, &candidates.surnames);
            debug!(count = out.len(), "surname exclusions");
            excluded.extend(out);
        }
        if self.config.plurals {
            let out = plural_exclusions(names);
            debug!(count = out.len(), "plural exclusions");
            excluded.extend(out);
        }

        // The remaining filters look at the whole document, so only the
        // words that were actually recorded as names count.
        let known: HashSet<&str> = names.iter().map(String::as_str).collect();
        let mut document_wide: Vec<(&str, HashSet<String>)> = Vec::new();

        if self.config.ambiguous_entities {
            document_wide.push(("ambiguous entity", ambiguous_entities(doc, ENT_PERSON)));
        }
        if self.config.person_groups {
            document_wide.push(("person group", person_groups(doc)));
        }
        if self.config.pseudo_proper_nouns {
            document_wide.push(("pseudo proper noun", pseudo_proper_nouns(doc)));
        }
        if self.config.initials {
            document_wide.push(("initials", initials(names)));
        }

        for (filter, out) in document_wide {
            let hits: Vec<String> = out
                .into_iter()
                .filter(|word| known.contains(word.as_str()))
                .collect();
            debug!(filter, count = hits.len(), "exclusions");
            excluded.extend(hits);
        }

        let characters: Vec<String> = candidates
            .names
            .iter()
            .filter(|name| !excluded.contains(*name))
            .cloned()
            .collect();

        info!(
            candidates = candidates.names.len(),
            characters = characters.len(),
            "extracted characters"
        );
        characters
    }
}

/// Extract character names with every filter enabled
pub fn extract_characters(doc: &Document) -> Vec<String> {
    CharacterExtractor::new().extract(doc)
}

/// Check the conditions shared by the first and second token of a name
fn is_name_token(token: &Token, boundary: EntityBoundary) -> bool {
    token.is_proper_noun()
        && token.is_person()
        && token.ent_iob == boundary
        && token.text == token.lemma
        && !token.is_stop
        && !token.like_num
        && !token.has_punctuation()
}

/// Scan each chapter left to right, collecting names and two-token names.
pub fn scan_candidates(doc: &Document) -> Candidates {
    let mut candidates = Candidates::default();

    for chapter in &doc.chapters {
        let mut i = 0;
        while i < chapter.len() {
            let token = &chapter.tokens[i];
            let prev = i.checked_sub(1).and_then(|p| chapter.get(p));
            let next = chapter.get(i + 1);

            let after_possessive = prev.is_some_and(|t| t.tag == TAG_POSSESSIVE);

            if is_name_token(token, EntityBoundary::Begin) && !after_possessive {
                let embedded =
                    next.is_some_and(Token::is_person) || prev.is_some_and(Token::is_person);

                if !embedded && !candidates.names.contains(&token.lower) {
                    candidates.names.push(token.lower.clone());
                }

                if let Some(second) = next {
                    if is_name_token(second, EntityBoundary::Inside)
                        && !candidates.names.contains(&second.lower)
                    {
                        candidates
                            .surnames
                            .push((token.lower.clone(), second.lower.clone()));
                        i += 1;
                    }
                }
            }

            i += 1;
        }
    }

    candidates
}

/// Names containing the second part of a two-token name whose first part
/// is itself a known name.
///
/// "elizabeth bennet" with "elizabeth" known excludes every name containing
/// "bennet". This can remove more than intended.
pub fn surname_exclusions(names: &[String], surnames: &[(String, String)]) -> HashSet<String> {
    let mut out = HashSet::new();

    for (first, second) in surnames {
        if names.contains(first) {
            for name in names {
                if name.contains(second.as_str()) {
                    out.insert(name.clone());
                }
            }
        }
    }

    out
}

/// Both forms of a name that also appears with a trailing "s" or "es".
pub fn plural_exclusions(names: &[String]) -> HashSet<String> {
    let known: HashSet<&str> = names.iter().map(String::as_str).collect();
    let mut out = HashSet::new();

    for word in names {
        if let Some(stem) = word.strip_suffix('s') {
            if !word.ends_with("es") {
                if known.contains(stem) {
                    out.insert(stem.to_string());
                    out.insert(word.clone());
                }
                continue;
            }
        }
        if let Some(stem) = word.strip_suffix("es") {
            if !stem.is_empty() && known.contains(stem) {
                out.insert(stem.to_string());
                out.insert(word.clone());
            }
        }
    }

    out
}

/// Count occurrences of each (span text, entity label) pair
pub fn count_entity_labels(doc: &Document) -> HashMap<(String, String), usize> {
    let mut counts = HashMap::new();
    for chapter in &doc.chapters {
        for span in chapter.entities() {
            *counts.entry((span.text, span.label)).or_insert(0) += 1;
        }
    }
    counts
}

/// Entity texts seen more often under another label than under `label`.
pub fn ambiguous_entities(doc: &Document, label: &str) -> HashSet<String> {
    let counts = count_entity_labels(doc);
    let mut out = HashSet::new();

    for ((text, l), count) in &counts {
        if l != label {
            continue;
        }
        let outnumbered = counts
            .iter()
            .any(|((other_text, other_label), other)| {
                other_text == text && other_label != label && count < other
            });
        if outnumbered {
            out.insert(text.to_lowercase());
        }
    }

    out
}

/// Words falsely tagged as people by title or role patterns.
///
/// - `the NNP(PERSON) NNP(PERSON)` flags the first proper noun
/// - `NNP the X` flags X
/// - `NNP , the X` flags X
pub fn person_groups(doc: &Document) -> HashSet<String> {
    let mut group = HashSet::new();

    for chapter in &doc.chapters {
        let tokens = &chapter.tokens;
        for p in 0..tokens.len().saturating_sub(3) {
            let (word, t1, t2, t3) = (&tokens[p], &tokens[p + 1], &tokens[p + 2], &tokens[p + 3]);

            if word.lower == "the"
                && t1.is_proper_noun()
                && t2.is_proper_noun()
                && t1.is_person()
                && t2.is_person()
            {
                group.insert(t1.lower.clone());
            }
            if word.is_proper_noun() && t1.lower == "the" {
                group.insert(t2.lower.clone());
            }
            if word.is_proper_noun() && t1.text == "," && t2.lower == "the" {
                group.insert(t3.lower.clone());
            }
        }
    }

    group
}

/// Words tagged as proper nouns less often than under some other tag.
pub fn pseudo_proper_nouns(doc: &Document) -> HashSet<String> {
    let mut counts: HashMap<(&str, &str), usize> = HashMap::new();
    for chapter in &doc.chapters {
        for token in &chapter.tokens {
            *counts
                .entry((token.lower.as_str(), token.tag.as_str()))
                .or_insert(0) += 1;
        }
    }

    let mut by_word: HashMap<&str, Vec<(&str, usize)>> = HashMap::new();
    for (&(word, tag), &count) in &counts {
        by_word.entry(word).or_default().push((tag, count));
    }

    let mut out = HashSet::new();
    for (word, tags) in by_word {
        let Some(proper) = tags
            .iter()
            .find(|(tag, _)| *tag == TAG_PROPER_NOUN)
            .map(|(_, count)| *count)
        else {
            continue;
        };

        if tags
            .iter()
            .any(|(tag, count)| *tag != TAG_PROPER_NOUN && proper < *count)
        {
            out.insert(word.to_string());
        }
    }

    out
}

/// Check if a name looks like initials
pub fn is_initials(name: &str) -> bool {
    INITIALS.is_match(name)
}

/// Names that look like initials
pub fn initials(names: &[String]) -> HashSet<String> {
    names
        .iter()
        .filter(|name| is_initials(name))
        .cloned()
        .collect()
}

/// A canonical, sorted, duplicate-free list of lowercase character names.
///
/// The position of a name is its vertex index in the character network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct CharacterSet {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl CharacterSet {
    /// Build a set from names in any case
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique: BTreeSet<String> = names
            .into_iter()
            .map(|name| name.as_ref().to_lowercase())
            .collect();
        let names: Vec<String> = unique.into_iter().collect();
        let index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();

        CharacterSet { names, index }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Lowercase names in index order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Index of a lowercase name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Names with the first letter capitalized, for presentation
    pub fn display_names(&self) -> Vec<String> {
        self.names.iter().map(|name| capitalize(name)).collect()
    }
}

impl From<Vec<String>> for CharacterSet {
    fn from(names: Vec<String>) -> Self {
        CharacterSet::new(names)
    }
}

impl From<CharacterSet> for Vec<String> {
    fn from(set: CharacterSet) -> Self {
        set.names
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Chapter;

    fn person(text: &str, i: usize, boundary: EntityBoundary) -> Token {
        Token::new(text, i)
            .with_tag(TAG_PROPER_NOUN)
            .with_entity(ENT_PERSON, boundary)
    }

    fn word(text: &str, i: usize, tag: &str) -> Token {
        Token::new(text, i).with_tag(tag)
    }

    fn doc(tokens: Vec<Token>) -> Document {
        Document::new(vec![Chapter::new(tokens)]).unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_scan_single_name() {
        let d = doc(vec![
            person("Emma", 0, EntityBoundary::Begin),
            word("smiled", 1, "VBD"),
        ]);
        let c = scan_candidates(&d);
        assert_eq!(c.names, vec!["emma"]);
        assert!(c.surnames.is_empty());
    }

    #[test]
    fn test_scan_two_token_name() {
        let d = doc(vec![
            person("Emma", 0, EntityBoundary::Begin),
            person("Woodhouse", 1, EntityBoundary::Inside),
            word("smiled", 2, "VBD"),
        ]);
        let c = scan_candidates(&d);
        // Embedded in a longer mention, so not a single name
        assert!(c.names.is_empty());
        assert_eq!(c.surnames, vec![("emma".to_string(), "woodhouse".to_string())]);
    }

    #[test]
    fn test_scan_second_part_already_known() {
        let d = doc(vec![
            person("Bennet", 0, EntityBoundary::Begin),
            word("sighed", 1, "VBD"),
            person("Elizabeth", 2, EntityBoundary::Begin),
            person("Bennet", 3, EntityBoundary::Inside),
            word("and", 4, "CC"),
            person("Jane", 5, EntityBoundary::Begin),
        ]);
        let c = scan_candidates(&d);
        // No pair is recorded and the scan goes on token by token
        assert!(c.surnames.is_empty());
        assert_eq!(c.names, vec!["bennet", "jane"]);
    }

    #[test]
    fn test_scan_rejects_possessive_and_inflected() {
        let d = doc(vec![
            word("her", 0, TAG_POSSESSIVE),
            person("Harriet", 1, EntityBoundary::Begin),
            word("and", 2, "CC"),
            person("Knightleys", 3, EntityBoundary::Begin).with_lemma("Knightley"),
            word("came", 4, "VBD"),
            person("St.", 5, EntityBoundary::Begin),
        ]);
        assert!(scan_candidates(&d).names.is_empty());
    }

    #[test]
    fn test_scan_first_token_has_no_previous() {
        let d = doc(vec![person("Anne", 0, EntityBoundary::Begin)]);
        assert_eq!(scan_candidates(&d).names, vec!["anne"]);
    }

    #[test]
    fn test_surname_exclusions() {
        let n = names(&["elizabeth", "bennet", "mrs bennet"]);
        let s = vec![("elizabeth".to_string(), "bennet".to_string())];
        let out = surname_exclusions(&n, &s);
        assert!(out.contains("bennet"));
        assert!(out.contains("mrs bennet"));
        assert!(!out.contains("elizabeth"));

        // First part unknown: nothing excluded
        let s = vec![("jane".to_string(), "bennet".to_string())];
        assert!(surname_exclusions(&n, &s).is_empty());
    }

    #[test]
    fn test_plural_exclusions_removes_both_forms() {
        let out = plural_exclusions(&names(&["john", "johns", "mary"]));
        assert!(out.contains("john"));
        assert!(out.contains("johns"));
        assert!(!out.contains("mary"));

        let out = plural_exclusions(&names(&["jam", "james"]));
        assert!(out.contains("jam"));
        assert!(out.contains("james"));

        // "es" ending with no matching stem, and a name that is only "es"
        assert!(plural_exclusions(&names(&["james", "es"])).is_empty());
    }

    #[test]
    fn test_ambiguous_entities() {
        let d = doc(vec![
            Token::new("Paris", 0).with_entity("GPE", EntityBoundary::Begin),
            Token::new("Paris", 1).with_entity("GPE", EntityBoundary::Begin),
            Token::new("Paris", 2).with_entity(ENT_PERSON, EntityBoundary::Begin),
            Token::new("Tom", 3).with_entity(ENT_PERSON, EntityBoundary::Begin),
        ]);
        let out = ambiguous_entities(&d, ENT_PERSON);
        assert!(out.contains("paris"));
        assert!(!out.contains("tom"));
    }

    #[test]
    fn test_person_groups() {
        let d = doc(vec![
            word("the", 0, "DT"),
            person("Duke", 1, EntityBoundary::Begin),
            person("Wellington", 2, EntityBoundary::Inside),
            word("met", 3, "VBD"),
            word("Lizzy", 4, TAG_PROPER_NOUN),
            word(",", 5, ","),
            word("the", 6, "DT"),
            word("Heiress", 7, TAG_PROPER_NOUN),
            word("and", 8, "CC"),
            word("Bingley", 9, TAG_PROPER_NOUN),
            word("the", 10, "DT"),
            word("Younger", 11, TAG_PROPER_NOUN),
            word("left", 12, "VBD"),
            word("early", 13, "RB"),
        ]);
        let out = person_groups(&d);
        assert!(out.contains("duke"));
        assert!(out.contains("heiress"));
        assert!(out.contains("younger"));
        assert!(!out.contains("lizzy"));
    }

    #[test]
    fn test_pseudo_proper_nouns() {
        let d = doc(vec![
            word("Hope", 0, TAG_PROPER_NOUN),
            word("hope", 1, "NN"),
            word("hope", 2, "VB"),
            word("hope", 3, "NN"),
            word("Jane", 4, TAG_PROPER_NOUN),
            word("Jane", 5, TAG_PROPER_NOUN),
            word("jane", 6, "NN"),
        ]);
        let out = pseudo_proper_nouns(&d);
        assert!(out.contains("hope"));
        assert!(!out.contains("jane"));
    }

    #[test]
    fn test_initials_pattern() {
        for name in ["a", "a.", "a b", "a.b."] {
            assert!(is_initials(name), "{name} should match");
        }
        for name in ["ab", "a b c", "A", "anne"] {
            assert!(!is_initials(name), "{name} should not match");
        }
    }

    #[test]
    fn test_filters_can_be_disabled() {
        let d = doc(vec![
            person("J", 0, EntityBoundary::Begin),
            word("ran", 1, "VBD"),
        ]);
        assert!(extract_characters(&d).is_empty());

        let config = ExtractionConfig {
            initials: false,
            ..Default::default()
        };
        assert_eq!(CharacterExtractor::with_config(config).extract(&d), vec!["j"]);
    }

    #[test]
    fn test_character_set() {
        let set = CharacterSet::new(["Emma", "harriet", "emma", "Frank"]);
        assert_eq!(set.names(), &["emma", "frank", "harriet"]);
        assert_eq!(set.index_of("harriet"), Some(2));
        assert_eq!(set.index_of("Emma"), None);
        assert_eq!(set.display_names(), vec!["Emma", "Frank", "Harriet"]);
    }
}
