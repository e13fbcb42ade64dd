//! Graph store using petgraph::StableDiGraph keyed by document name

use crate::model::*;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::Direction;
use std::collections::HashMap;

/// The document graph, a directed graph with at most one edge per ordered pair.
pub struct DocGraph {
    inner: StableDiGraph<DocumentNode, ()>,
    index: HashMap<String, NodeIndex>,
    /// Sequence number of the last diff applied.
    sequence: u64,
}

impl std::fmt::Debug for DocGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocGraph")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .field("sequence", &self.sequence)
            .finish()
    }
}

impl DocGraph {
    pub fn new() -> Self {
        DocGraph {
            inner: StableDiGraph::new(),
            index: HashMap::new(),
            sequence: 0,
        }
    }

    /// Sequence number of the last diff applied to this graph.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn set_sequence(&mut self, sequence: u64) {
        self.sequence = sequence;
    }

    pub fn has_node(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Add a node. Returns false if it already existed.
    pub fn add_node(&mut self, node: DocumentNode) -> bool {
        if self.index.contains_key(&node.name) {
            return false;
        }
        let name = node.name.clone();
        let idx = self.inner.add_node(node);
        self.index.insert(name, idx);
        true
    }

    /// Get a node by name.
    pub fn node(&self, name: &str) -> Option<&DocumentNode> {
        self.index
            .get(name)
            .and_then(|&idx| self.inner.node_weight(idx))
    }

    /// Flag a node as seen on disk. Returns false if the node is missing.
    pub fn mark_observed(&mut self, name: &str) -> bool {
        match self
            .index
            .get(name)
            .and_then(|&idx| self.inner.node_weight_mut(idx))
        {
            Some(node) => {
                node.observed = true;
                true
            }
            None => false,
        }
    }

    /// Remove a node and all of its edges.
    pub fn remove_node(&mut self, name: &str) -> Option<DocumentNode> {
        let idx = self.index.remove(name)?;
        self.inner.remove_node(idx)
    }

    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        match (self.index.get(source), self.index.get(target)) {
            (Some(&s), Some(&t)) => self.inner.find_edge(s, t).is_some(),
            _ => false,
        }
    }

    /// Add an edge, creating missing endpoints as dangling nodes.
    /// Returns false if the edge already existed.
    pub fn add_edge(&mut self, source: &str, target: &str) -> bool {
        let s = self.ensure_node(source);
        let t = self.ensure_node(target);
        if self.inner.find_edge(s, t).is_some() {
            return false;
        }
        self.inner.add_edge(s, t, ());
        true
    }

    /// Remove an edge. Returns false if there was none.
    pub fn remove_edge(&mut self, source: &str, target: &str) -> bool {
        let (Some(&s), Some(&t)) = (self.index.get(source), self.index.get(target)) else {
            return false;
        };
        match self.inner.find_edge(s, t) {
            Some(edge) => self.inner.remove_edge(edge).is_some(),
            None => false,
        }
    }

    /// Outbound targets of a node, sorted by name.
    pub fn neighbors(&self, name: &str) -> Vec<String> {
        let Some(&idx) = self.index.get(name) else {
            return Vec::new();
        };
        let mut out: Vec<String> = self
            .inner
            .neighbors_directed(idx, Direction::Outgoing)
            .filter_map(|n| self.inner.node_weight(n))
            .map(|n| n.name.clone())
            .collect();
        out.sort();
        out
    }

    /// Iterate over all node names.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.inner
            .node_indices()
            .filter_map(move |idx| self.inner.node_weight(idx))
            .map(|n| n.name.as_str())
    }

    /// Iterate over all edges as (source, target) name pairs.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.edge_indices().filter_map(move |e| {
            let (s, t) = self.inner.edge_endpoints(e)?;
            let source = self.inner.node_weight(s)?;
            let target = self.inner.node_weight(t)?;
            Some((source.name.as_str(), target.name.as_str()))
        })
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// In-degree plus out-degree. A self-loop counts twice.
    pub fn degree(&self, name: &str) -> usize {
        let Some(&idx) = self.index.get(name) else {
            return 0;
        };
        self.inner.edges_directed(idx, Direction::Outgoing).count()
            + self.inner.edges_directed(idx, Direction::Incoming).count()
    }

    /// Names of nodes with no edges at all, sorted.
    pub fn isolated_nodes(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .nodes()
            .filter(|name| self.degree(name) == 0)
            .map(str::to_string)
            .collect();
        out.sort();
        out
    }

    /// Sorted, serializable copy of the graph.
    pub fn snapshot(&self) -> GraphSnapshot {
        let mut nodes: Vec<DocumentNode> = self
            .inner
            .node_indices()
            .filter_map(|idx| self.inner.node_weight(idx))
            .cloned()
            .collect();
        nodes.sort_by(|a, b| a.name.cmp(&b.name));

        let mut edges: Vec<Reference> = self
            .edges()
            .map(|(s, t)| Reference::new(s, t))
            .collect();
        edges.sort();

        GraphSnapshot {
            nodes,
            edges,
            sequence: self.sequence,
        }
    }

    fn ensure_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.inner.add_node(DocumentNode::dangling(name));
        self.index.insert(name.to_string(), idx);
        idx
    }
}

impl Default for DocGraph {
    fn default() -> Self {
        Self::new()
    }
}
