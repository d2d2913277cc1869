//! Graph analysis of the character network.
//!
//! The co-occurrence network is loaded into a petgraph graph and reduced to
//! its giant connected component. Communities come from Walktrap (short
//! random walks, merged agglomeratively, cut at the best modularity) and
//! vertex sizes from a centrality measure. The results fill the Size and
//! Community columns of the vertex table.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use std::str::FromStr;

use petgraph::algo::page_rank;
use petgraph::graph::{DiGraph, NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::characters::CharacterSet;
use crate::export::{self, ExportError, VertexRow};
use crate::network::Network;

/// Default random-walk length for Walktrap
pub const DEFAULT_WALK_LENGTH: usize = 4;

/// Damping factor for PageRank
pub const PAGE_RANK_DAMPING: f64 = 0.85;

const PAGE_RANK_ITERATIONS: usize = 100;

/// Character graph with names on vertices and co-occurrence counts on edges
pub type CharacterGraph = UnGraph<String, usize>;

/// Errors raised while configuring graph analysis
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("unknown centrality measure: {0} (expected betweenness or page_rank)")]
    UnknownCentrality(String),
}

/// Centrality measure used as vertex size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Centrality {
    /// Number of shortest paths through a vertex (unweighted)
    #[default]
    Betweenness,
    /// PageRank with damping 0.85 (unweighted)
    PageRank,
}

impl Centrality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Centrality::Betweenness => "betweenness",
            Centrality::PageRank => "page_rank",
        }
    }
}

impl fmt::Display for Centrality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Centrality {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "betweenness" => Ok(Centrality::Betweenness),
            "page_rank" | "pagerank" => Ok(Centrality::PageRank),
            _ => Err(GraphError::UnknownCentrality(s.to_string())),
        }
    }
}

/// Options for [`analyse_network`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphConfig {
    pub centrality: Centrality,
    /// Random-walk length used by Walktrap
    pub walk_length: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        GraphConfig {
            centrality: Centrality::default(),
            walk_length: DEFAULT_WALK_LENGTH,
        }
    }
}

/// A vertex partition and its modularity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    /// Community of each vertex, numbered by first appearance
    pub membership: Vec<usize>,
    pub modularity: f64,
}

/// The giant component of a character network with per-vertex results.
///
/// Indices in `network`, `sizes` and `communities` refer to `characters`.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphAnalysis {
    pub characters: CharacterSet,
    pub network: Network,
    pub sizes: Vec<f64>,
    pub communities: Vec<usize>,
    pub modularity: f64,
}

impl GraphAnalysis {
    /// Vertex rows with Size and Community filled in
    pub fn vertex_table(&self) -> Result<Vec<VertexRow>, ExportError> {
        export::vertex_table(
            &self.characters,
            Some(self.sizes.as_slice()),
            Some(self.communities.as_slice()),
        )
    }

    pub fn community_count(&self) -> usize {
        self.communities.iter().max().map_or(0, |&c| c + 1)
    }
}

/// Load a network into an undirected petgraph graph.
///
/// Edges referring to indices outside `characters` are skipped.
pub fn to_graph(characters: &CharacterSet, network: &Network) -> CharacterGraph {
    let n = characters.len();
    let mut graph = UnGraph::with_capacity(n, network.len());
    for name in characters.names() {
        graph.add_node(name.clone());
    }
    for (a, b, weight) in network.iter() {
        if a < n && b < n {
            graph.add_edge(NodeIndex::new(a), NodeIndex::new(b), weight);
        }
    }
    graph
}

/// The largest connected component, as an induced subgraph.
///
/// Vertex order is kept; ties go to the component of the lowest vertex.
pub fn giant_component(graph: &CharacterGraph) -> CharacterGraph {
    let n = graph.node_count();
    if n == 0 {
        return graph.clone();
    }

    let mut components = UnionFind::<usize>::new(n);
    for edge in graph.edge_references() {
        components.union(edge.source().index(), edge.target().index());
    }
    let labels = components.into_labeling();

    let mut counts = vec![0usize; n];
    for &label in &labels {
        counts[label] += 1;
    }
    let mut giant = labels[0];
    for &label in &labels {
        if counts[label] > counts[giant] {
            giant = label;
        }
    }

    graph.filter_map(
        |node, name| (labels[node.index()] == giant).then(|| name.clone()),
        |_, &weight| Some(weight),
    )
}

/// Edge list of a graph in edge order, as sorted index pairs
pub fn edge_list(graph: &CharacterGraph) -> Network {
    let mut network = Network::default();
    for edge in graph.edge_references() {
        let (a, b) = (edge.source().index(), edge.target().index());
        network.edges.push((a.min(b), a.max(b)));
        network.weights.push(*edge.weight());
    }
    network
}

/// Unweighted betweenness centrality (Brandes), each pair counted once
pub fn betweenness(graph: &CharacterGraph) -> Vec<f64> {
    let n = graph.node_count();
    let mut centrality = vec![0.0; n];

    for source in graph.node_indices() {
        let s = source.index();
        let mut order = Vec::with_capacity(n);
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut paths = vec![0.0_f64; n];
        let mut distance = vec![usize::MAX; n];
        paths[s] = 1.0;
        distance[s] = 0;

        let mut queue = VecDeque::from([source]);
        while let Some(v) = queue.pop_front() {
            let vi = v.index();
            order.push(vi);
            for w in graph.neighbors(v) {
                let wi = w.index();
                if distance[wi] == usize::MAX {
                    distance[wi] = distance[vi] + 1;
                    queue.push_back(w);
                }
                if distance[wi] == distance[vi] + 1 {
                    paths[wi] += paths[vi];
                    predecessors[wi].push(vi);
                }
            }
        }

        let mut dependency = vec![0.0_f64; n];
        while let Some(w) = order.pop() {
            for &v in &predecessors[w] {
                dependency[v] += paths[v] / paths[w] * (1.0 + dependency[w]);
            }
            if w != s {
                centrality[w] += dependency[w];
            }
        }
    }

    // Undirected: every pair was walked from both ends
    centrality.iter().map(|c| c / 2.0).collect()
}

/// Unweighted PageRank, each undirected edge followed both ways
pub fn page_rank_scores(graph: &CharacterGraph) -> Vec<f64> {
    let mut directed: DiGraph<(), ()> =
        DiGraph::with_capacity(graph.node_count(), graph.edge_count() * 2);
    for _ in graph.node_indices() {
        directed.add_node(());
    }
    for edge in graph.edge_references() {
        directed.add_edge(edge.source(), edge.target(), ());
        directed.add_edge(edge.target(), edge.source(), ());
    }
    page_rank(&directed, PAGE_RANK_DAMPING, PAGE_RANK_ITERATIONS)
}

struct Community {
    size: usize,
    walk: Vec<f64>,
    members: Vec<usize>,
}

/// Variation of the mean squared walk distance when merging two communities
fn merge_cost(a: &Community, b: &Community, degree: &[f64], n: usize) -> f64 {
    let distance: f64 = a
        .walk
        .iter()
        .zip(&b.walk)
        .zip(degree)
        .map(|((p, q), d)| (p - q) * (p - q) / d)
        .sum();
    let (sa, sb) = (a.size as f64, b.size as f64);
    sa * sb / (sa + sb) * distance / n as f64
}

/// Newman modularity of a labelling over unweighted edges
fn modularity(edges: &[(usize, usize)], label: &[usize]) -> f64 {
    if edges.is_empty() {
        return 0.0;
    }
    let m = edges.len() as f64;
    let mut inside: BTreeMap<usize, f64> = BTreeMap::new();
    let mut degree: BTreeMap<usize, f64> = BTreeMap::new();

    for &(a, b) in edges {
        if label[a] == label[b] {
            *inside.entry(label[a]).or_default() += 1.0;
        }
        *degree.entry(label[a]).or_default() += 1.0;
        *degree.entry(label[b]).or_default() += 1.0;
    }

    degree
        .iter()
        .map(|(c, &d)| {
            let within = inside.get(c).copied().unwrap_or(0.0);
            within / m - (d / (2.0 * m)).powi(2)
        })
        .sum()
}

/// Renumber community labels by first appearance in vertex order
fn renumber(label: &[usize]) -> Vec<usize> {
    let mut ids: BTreeMap<usize, usize> = BTreeMap::new();
    label
        .iter()
        .map(|&c| {
            let next = ids.len();
            *ids.entry(c).or_insert(next)
        })
        .collect()
}

/// Walktrap community detection (Pons & Latapy), unweighted.
///
/// Every vertex gets a self-loop for the random walks. Adjacent communities
/// are merged in order of smallest distance increase, and the partition with
/// the highest modularity along the way is returned.
pub fn walktrap(graph: &CharacterGraph, walk_length: usize) -> Partition {
    let n = graph.node_count();
    if n == 0 {
        return Partition {
            membership: Vec::new(),
            modularity: 0.0,
        };
    }

    let edges: Vec<(usize, usize)> = graph
        .edge_references()
        .map(|e| (e.source().index(), e.target().index()))
        .collect();

    let mut adjacency: Vec<BTreeSet<usize>> = (0..n).map(|v| BTreeSet::from([v])).collect();
    for &(a, b) in &edges {
        adjacency[a].insert(b);
        adjacency[b].insert(a);
    }
    let degree: Vec<f64> = adjacency.iter().map(|a| a.len() as f64).collect();

    let walk = |start: usize| -> Vec<f64> {
        let mut current = vec![0.0; n];
        current[start] = 1.0;
        for _ in 0..walk_length {
            let mut next = vec![0.0; n];
            for (k, &p) in current.iter().enumerate() {
                if p == 0.0 {
                    continue;
                }
                let share = p / degree[k];
                for &j in &adjacency[k] {
                    next[j] += share;
                }
            }
            current = next;
        }
        current
    };

    let mut communities: BTreeMap<usize, Community> = (0..n)
        .map(|v| {
            (
                v,
                Community {
                    size: 1,
                    walk: walk(v),
                    members: vec![v],
                },
            )
        })
        .collect();
    let mut neighbours: BTreeMap<usize, BTreeSet<usize>> = (0..n)
        .map(|v| (v, adjacency[v].iter().copied().filter(|&u| u != v).collect()))
        .collect();

    let mut label: Vec<usize> = (0..n).collect();
    let mut best_label = label.clone();
    let mut best_modularity = modularity(&edges, &label);

    loop {
        let mut closest: Option<(f64, usize, usize)> = None;
        for (&c1, adjacent) in &neighbours {
            for &c2 in adjacent.range(c1 + 1..) {
                let cost = merge_cost(&communities[&c1], &communities[&c2], &degree, n);
                if closest.map_or(true, |(best, _, _)| cost < best) {
                    closest = Some((cost, c1, c2));
                }
            }
        }
        let Some((_, c1, c2)) = closest else {
            break;
        };

        // c2 is merged into c1
        let Some(absorbed) = communities.remove(&c2) else {
            break;
        };
        if let Some(target) = communities.get_mut(&c1) {
            let (s1, s2) = (target.size as f64, absorbed.size as f64);
            for (p, q) in target.walk.iter_mut().zip(&absorbed.walk) {
                *p = (*p * s1 + q * s2) / (s1 + s2);
            }
            target.size += absorbed.size;
            for &v in &absorbed.members {
                label[v] = c1;
            }
            target.members.extend(absorbed.members);
        }

        let moved = neighbours.remove(&c2).unwrap_or_default();
        for x in moved {
            if x == c1 {
                continue;
            }
            if let Some(set) = neighbours.get_mut(&x) {
                set.remove(&c2);
                set.insert(c1);
            }
            if let Some(set) = neighbours.get_mut(&c1) {
                set.insert(x);
            }
        }
        if let Some(set) = neighbours.get_mut(&c1) {
            set.remove(&c2);
        }

        let q = modularity(&edges, &label);
        if q > best_modularity {
            best_modularity = q;
            best_label = label.clone();
        }
    }

    Partition {
        membership: renumber(&best_label),
        modularity: best_modularity,
    }
}

/// Reduce a network to its giant component, detect communities and score
/// vertex centrality.
pub fn analyse_network(
    characters: &CharacterSet,
    network: &Network,
    config: GraphConfig,
) -> GraphAnalysis {
    let graph = giant_component(&to_graph(characters, network));
    debug!(
        vertices = graph.node_count(),
        edges = graph.edge_count(),
        "giant component"
    );

    let partition = walktrap(&graph, config.walk_length);
    let sizes = match config.centrality {
        Centrality::Betweenness => betweenness(&graph),
        Centrality::PageRank => page_rank_scores(&graph),
    };

    let analysis = GraphAnalysis {
        characters: CharacterSet::new(graph.node_indices().map(|i| graph[i].clone())),
        network: edge_list(&graph),
        sizes,
        communities: partition.membership,
        modularity: partition.modularity,
    };
    info!(
        characters = analysis.characters.len(),
        communities = analysis.community_count(),
        modularity = analysis.modularity,
        centrality = %config.centrality,
        "analysed character graph"
    );
    analysis
}
