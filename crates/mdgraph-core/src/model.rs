//! Core data structures for the document graph

use std::path::Path;

use serde::{Deserialize, Serialize};

/// A single document in the graph, keyed by its basename.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentNode {
    #[serde(rename = "id")]
    pub name: String,
    /// False while the node only exists because another document links to it.
    pub observed: bool,
}

impl DocumentNode {
    /// A node for a document that has been seen on disk.
    pub fn observed(name: impl Into<String>) -> Self {
        DocumentNode {
            name: name.into(),
            observed: true,
        }
    }

    /// A bare node created for a dangling reference.
    pub fn dangling(name: impl Into<String>) -> Self {
        DocumentNode {
            name: name.into(),
            observed: false,
        }
    }
}

/// A directed "references" edge, by document name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub source: String,
    pub target: String,
}

impl Reference {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Reference {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Serializable view of the whole graph, shared by the renderer and the API.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GraphSnapshot {
    pub nodes: Vec<DocumentNode>,
    pub edges: Vec<Reference>,
    /// Sequence number of the last diff reflected in this snapshot.
    pub sequence: u64,
}

/// Document identifier for a path: its basename.
pub fn document_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

/// Whether `name` ends with `.` followed by `extension` (case-sensitive).
///
/// Shared by the directory scan, the watcher and link extraction so that a
/// file which becomes a node is also a valid link target.
pub fn has_document_suffix(name: &str, extension: &str) -> bool {
    name.strip_suffix(extension.trim_start_matches('.'))
        .is_some_and(|stem| stem.ends_with('.'))
}

/// Whether the file name of `path` carries the recognized document extension.
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| has_document_suffix(n, extension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_document_name_is_basename() {
        assert_eq!(
            document_name(&PathBuf::from("notes/daily/today.md")),
            Some("today.md".to_string())
        );
        assert_eq!(document_name(&PathBuf::from("/")), None);
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension(Path::new("a.md"), "md"));
        assert!(has_extension(Path::new("notes/.draft.md"), ".md"));
        assert!(!has_extension(Path::new("a.markdown"), "md"));
        assert!(!has_extension(Path::new("README"), "md"));
        assert!(!has_extension(Path::new("amd"), "md"));
    }

    #[test]
    fn test_suffix_match_is_case_sensitive() {
        assert!(has_document_suffix("a.md", "md"));
        assert!(!has_document_suffix("A.MD", "md"));
        assert!(!has_extension(Path::new("A.MD"), "md"));
        assert!(has_document_suffix("A.MD", "MD"));
    }

    #[test]
    fn test_snapshot_json_shape() {
        let snapshot = GraphSnapshot {
            nodes: vec![DocumentNode::observed("a.md"), DocumentNode::dangling("b.md")],
            edges: vec![Reference::new("a.md", "b.md")],
            sequence: 3,
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "nodes": [
                    {"id": "a.md", "observed": true},
                    {"id": "b.md", "observed": false},
                ],
                "edges": [{"source": "a.md", "target": "b.md"}],
                "sequence": 3,
            })
        );
    }
}
