//! Tables and files handed to graph and plotting tools.
//!
//! The network is exported as an edge table (Source, Target, Weight, Type)
//! and a vertex table (Id, Label, Size, Community). Size and Community come
//! from the external graph library and are left empty when absent. Files
//! never overwrite: `name.csv` becomes `name(1).csv`, `name(2).csv`, ...

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::characters::CharacterSet;
use crate::network::Network;

/// Errors raised while writing exports
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{table} table has {got} values for {expected} vertices")]
    LengthMismatch {
        table: &'static str,
        expected: usize,
        got: usize,
    },
}

/// Edge direction written to the Type column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EdgeType {
    #[default]
    Undirected,
    Directed,
}

impl EdgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::Undirected => "Undirected",
            EdgeType::Directed => "Directed",
        }
    }
}

/// One row of the edge table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRow {
    pub source: usize,
    pub target: usize,
    pub weight: usize,
    pub kind: EdgeType,
}

/// One row of the vertex table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexRow {
    pub id: usize,
    pub label: String,
    pub size: Option<f64>,
    pub community: Option<usize>,
}

/// Edge rows for a network
pub fn edge_table(network: &Network, kind: EdgeType) -> Vec<EdgeRow> {
    network
        .iter()
        .map(|(source, target, weight)| EdgeRow {
            source,
            target,
            weight,
            kind,
        })
        .collect()
}

/// Vertex rows labelled with capitalized character names.
///
/// `sizes` and `communities`, when given, must have one value per character.
pub fn vertex_table(
    characters: &CharacterSet,
    sizes: Option<&[f64]>,
    communities: Option<&[usize]>,
) -> Result<Vec<VertexRow>, ExportError> {
    let expected = characters.len();
    if let Some(sizes) = sizes {
        if sizes.len() != expected {
            return Err(ExportError::LengthMismatch {
                table: "size",
                expected,
                got: sizes.len(),
            });
        }
    }
    if let Some(communities) = communities {
        if communities.len() != expected {
            return Err(ExportError::LengthMismatch {
                table: "community",
                expected,
                got: communities.len(),
            });
        }
    }

    Ok(characters
        .display_names()
        .into_iter()
        .enumerate()
        .map(|(id, label)| VertexRow {
            id,
            label,
            size: sizes.map(|s| s[id]),
            community: communities.map(|c| c[id]),
        })
        .collect())
}

/// First unused path among `dir/stem.ext`, `dir/stem(1).ext`, ...
pub fn unique_path(dir: &Path, stem: &str, extension: &str) -> PathBuf {
    let mut path = dir.join(format!("{}.{}", stem, extension));
    let mut n = 0;
    while path.exists() {
        n += 1;
        path = dir.join(format!("{}({}).{}", stem, n, extension));
    }
    path
}

/// Quote a CSV field when it contains a delimiter, quote or newline
fn csv_field(value: &str) -> String {
    if value.contains(&[',', '"', '\n'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render the edge table as CSV
pub fn edges_to_csv(rows: &[EdgeRow]) -> String {
    let body: String = rows
        .iter()
        .map(|row| {
            format!(
                "{},{},{},{}\n",
                row.source,
                row.target,
                row.weight,
                row.kind.as_str()
            )
        })
        .collect();
    format!("Source,Target,Weight,Type\n{}", body)
}

/// Render the vertex table as CSV
pub fn vertices_to_csv(rows: &[VertexRow]) -> String {
    let body: String = rows
        .iter()
        .map(|row| {
            let size = row.size.map(|s| s.to_string()).unwrap_or_default();
            let community = row.community.map(|c| c.to_string()).unwrap_or_default();
            format!("{},{},{},{}\n", row.id, csv_field(&row.label), size, community)
        })
        .collect();
    format!("Id,Label,Size,Community\n{}", body)
}

/// Write content to a new file in `dir`, creating `dir` if needed
pub fn write_new(dir: &Path, stem: &str, extension: &str, content: &str) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir)?;
    let path = unique_path(dir, stem, extension);
    fs::write(&path, content)?;
    info!(path = %path.display(), "wrote export");
    Ok(path)
}

/// Write a value as pretty JSON to a new file in `dir`
pub fn write_json<T: Serialize>(dir: &Path, stem: &str, value: &T) -> Result<PathBuf, ExportError> {
    let json = serde_json::to_string_pretty(value)?;
    write_new(dir, stem, "json", &json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_network() -> Network {
        Network {
            edges: vec![(0, 1), (1, 2)],
            weights: vec![3, 1],
        }
    }

    #[test]
    fn test_edges_csv() {
        let rows = edge_table(&sample_network(), EdgeType::Undirected);
        assert_eq!(
            edges_to_csv(&rows),
            "Source,Target,Weight,Type\n0,1,3,Undirected\n1,2,1,Undirected\n"
        );
    }

    #[test]
    fn test_vertices_csv() {
        let characters = CharacterSet::new(["emma", "frank"]);
        let rows = vertex_table(&characters, Some(&[2.5, 0.0][..]), None).unwrap();
        assert_eq!(
            vertices_to_csv(&rows),
            "Id,Label,Size,Community\n0,Emma,2.5,\n1,Frank,0,\n"
        );
    }

    #[test]
    fn test_vertex_table_length_mismatch() {
        let characters = CharacterSet::new(["emma", "frank"]);
        let err = vertex_table(&characters, None, Some(&[0][..])).unwrap_err();
        assert!(matches!(err, ExportError::LengthMismatch { expected: 2, got: 1, .. }));
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_unique_path_increments() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_new(dir.path(), "book - edges", "csv", "x").unwrap();
        let second = write_new(dir.path(), "book - edges", "csv", "y").unwrap();
        let third = write_new(dir.path(), "book - edges", "csv", "z").unwrap();

        assert_eq!(first.file_name().unwrap(), "book - edges.csv");
        assert_eq!(second.file_name().unwrap(), "book - edges(1).csv");
        assert_eq!(third.file_name().unwrap(), "book - edges(2).csv");
    }
}
