//! Graph diff for incremental updates

use crate::model::Reference;
use serde::{Deserialize, Serialize};

/// The mutations one reconciliation applied, broadcast to live clients.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GraphDiff {
    /// Monotonically increasing diff sequence number.
    pub sequence: u64,
    /// The document whose outbound references were reconciled.
    pub document: String,
    /// Nodes created in this update (the document itself or dangling targets).
    pub added_nodes: Vec<String>,
    /// Nodes removed in this update. Only populated when pruning isolated nodes.
    pub removed_nodes: Vec<String>,
    pub added_edges: Vec<Reference>,
    pub removed_edges: Vec<Reference>,
}

impl GraphDiff {
    /// Create an empty diff for `document`.
    pub fn new(document: impl Into<String>) -> Self {
        GraphDiff {
            document: document.into(),
            ..Default::default()
        }
    }

    /// Check if this diff is empty (no changes).
    pub fn is_empty(&self) -> bool {
        self.added_nodes.is_empty()
            && self.removed_nodes.is_empty()
            && self.added_edges.is_empty()
            && self.removed_edges.is_empty()
    }
}

/// Hands out diff sequence numbers.
#[derive(Debug)]
pub struct DiffEngine {
    sequence: u64,
}

impl DiffEngine {
    pub fn new() -> Self {
        DiffEngine { sequence: 0 }
    }

    /// Stamp `diff` with the next sequence number.
    pub fn stamp(&mut self, mut diff: GraphDiff) -> GraphDiff {
        self.sequence += 1;
        diff.sequence = self.sequence;
        diff
    }

    /// Get current sequence number.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_increases() {
        let mut engine = DiffEngine::new();
        let first = engine.stamp(GraphDiff::new("a.md"));
        let second = engine.stamp(GraphDiff::new("a.md"));
        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
        assert_eq!(engine.sequence(), 2);
    }

    #[test]
    fn test_diff_serialization() {
        let mut diff = GraphDiff::new("a.md");
        diff.added_edges.push(Reference::new("a.md", "b.md"));
        assert!(!diff.is_empty());

        let json = serde_json::to_value(&diff).unwrap();
        assert_eq!(json["document"], "a.md");
        assert_eq!(json["added_edges"][0]["target"], "b.md");
    }
}
