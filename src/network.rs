//! Character co-occurrence network.
//!
//! Two characters are linked each time they appear within a fixed window of
//! tokens of each other. Counts accumulate over the whole document, and the
//! result is handed to a graph library as an edge list with parallel weights.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::characters::CharacterSet;
use crate::document::Document;

/// Default number of tokens scanned after each character mention
pub const DEFAULT_WINDOW_SIZE: usize = 15;

/// Options for [`build_network`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Tokens scanned after each character mention
    pub window_size: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

/// Weighted undirected edges between character indices
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    /// Sorted index pairs, in first-insertion order
    pub edges: Vec<(usize, usize)>,
    /// Co-occurrence count of each edge
    pub weights: Vec<usize>,
}

impl Network {
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Weight of the edge between two indices, in either order
    pub fn weight(&self, a: usize, b: usize) -> Option<usize> {
        let pair = (a.min(b), a.max(b));
        self.edges
            .iter()
            .position(|&edge| edge == pair)
            .map(|i| self.weights[i])
    }

    /// Iterate over (source, target, weight)
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.edges
            .iter()
            .zip(&self.weights)
            .map(|(&(a, b), &w)| (a, b, w))
    }
}

/// Link characters appearing within `config.window_size` tokens of each other.
pub fn build_network(doc: &Document, characters: &CharacterSet, config: NetworkConfig) -> Network {
    let window = config.window_size;
    let mut slots: HashMap<(usize, usize), usize> = HashMap::new();
    let mut network = Network::default();

    for chapter in &doc.chapters {
        let tokens = &chapter.tokens;

        for (i, token) in tokens.iter().enumerate() {
            let Some(source) = characters.index_of(&token.lower) else {
                continue;
            };

            let last = i.saturating_add(window).min(tokens.len().saturating_sub(1));
            for other in tokens.iter().take(last + 1).skip(i + 1) {
                let Some(target) = characters.index_of(&other.lower) else {
                    continue;
                };
                if source == target {
                    continue;
                }

                let pair = (source.min(target), source.max(target));
                match slots.get(&pair) {
                    Some(&slot) => network.weights[slot] += 1,
                    None => {
                        slots.insert(pair, network.edges.len());
                        network.edges.push(pair);
                        network.weights.push(1);
                    }
                }
            }
        }
    }

    debug!(
        characters = characters.len(),
        edges = network.len(),
        window,
        "built co-occurrence network"
    );
    network
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Chapter;
    use crate::token::Token;

    fn chapter(words: &[&str]) -> Chapter {
        Chapter::new(
            words
                .iter()
                .enumerate()
                .map(|(i, w)| Token::new(w, i))
                .collect(),
        )
    }

    #[test]
    fn test_window_limits_links() {
        let doc = Document::new(vec![chapter(&["Anne", "met", "Gilbert", "and", "then", "Diana"])])
            .unwrap();
        let characters = CharacterSet::new(["anne", "diana", "gilbert"]);

        let network = build_network(&doc, &characters, NetworkConfig { window_size: 2 });
        assert_eq!(network.edges, vec![(0, 2)]);
        assert_eq!(network.weights, vec![1]);

        let network = build_network(&doc, &characters, NetworkConfig { window_size: 5 });
        assert_eq!(network.weight(0, 2), Some(1));
        assert_eq!(network.weight(0, 1), Some(1));
        assert_eq!(network.weight(2, 1), Some(1));
    }

    #[test]
    fn test_no_self_links() {
        let doc = Document::new(vec![chapter(&["Anne", "Anne", "anne"])]).unwrap();
        let characters = CharacterSet::new(["anne"]);
        assert!(build_network(&doc, &characters, NetworkConfig::default()).is_empty());
    }

    #[test]
    fn test_counts_accumulate_across_chapters() {
        let doc = Document::new(vec![
            chapter(&["Anne", "saw", "Diana"]),
            chapter(&["Diana", "saw", "Anne"]),
        ])
        .unwrap();
        let characters = CharacterSet::new(["anne", "diana"]);

        let network = build_network(&doc, &characters, NetworkConfig::default());
        assert_eq!(network.edges, vec![(0, 1)]);
        assert_eq!(network.weights, vec![2]);
    }

    #[test]
    fn test_zero_window_and_empty_document() {
        let doc = Document::new(vec![chapter(&["Anne", "Diana"])]).unwrap();
        let characters = CharacterSet::new(["anne", "diana"]);
        assert!(build_network(&doc, &characters, NetworkConfig { window_size: 0 }).is_empty());
        assert!(build_network(&Document::default(), &characters, NetworkConfig::default()).is_empty());
    }

    #[test]
    fn test_unbounded_window_reaches_chapter_end() {
        let doc = Document::new(vec![chapter(&["Anne", "x", "x", "Diana", "x", "Gilbert"])]).unwrap();
        let characters = CharacterSet::new(["anne", "diana", "gilbert"]);

        let network = build_network(&doc, &characters, NetworkConfig { window_size: usize::MAX });
        assert_eq!(network.edges, vec![(0, 1), (0, 2), (1, 2)]);
        assert_eq!(network.weights, vec![1, 1, 1]);
    }
}
