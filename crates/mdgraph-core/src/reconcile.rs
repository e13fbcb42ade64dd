//! Reconciles a document's outbound edges against its extracted references

use crate::diff::{DiffEngine, GraphDiff};
use crate::graph::DocGraph;
use crate::model::{DocumentNode, Reference};
use std::collections::BTreeSet;
use tracing::debug;

/// Make the outbound edge set of `document` equal `references`.
///
/// Missing edges are added before stale ones are removed, so a reader never
/// sees the document with an empty outbound set during an update. Inbound
/// edges and edges owned by other documents are left alone.
pub fn reconcile(graph: &mut DocGraph, document: &str, references: &BTreeSet<String>) -> GraphDiff {
    let mut diff = GraphDiff::new(document);

    if graph.add_node(DocumentNode::observed(document)) {
        diff.added_nodes.push(document.to_string());
    } else {
        graph.mark_observed(document);
    }

    for target in references {
        if graph.has_edge(document, target) {
            continue;
        }
        if !graph.has_node(target) {
            diff.added_nodes.push(target.clone());
        }
        graph.add_edge(document, target);
        debug!("+ {} -> {}", document, target);
        diff.added_edges.push(Reference::new(document, target.as_str()));
    }

    for neighbor in graph.neighbors(document) {
        if references.contains(&neighbor) {
            continue;
        }
        graph.remove_edge(document, &neighbor);
        debug!("- {} -> {}", document, neighbor);
        diff.removed_edges.push(Reference::new(document, neighbor));
    }

    diff
}

/// Options controlling graph maintenance beyond edge reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Drop nodes left without any edge after each reconciliation.
    pub prune_isolated: bool,
}

/// Stateful reconciler: applies [`reconcile`], optional pruning and sequencing.
#[derive(Debug, Default)]
pub struct Reconciler {
    options: ReconcileOptions,
    diff_engine: DiffEngine,
}

impl Reconciler {
    pub fn new(options: ReconcileOptions) -> Self {
        Reconciler {
            options,
            diff_engine: DiffEngine::new(),
        }
    }

    pub fn options(&self) -> ReconcileOptions {
        self.options
    }

    /// Reconcile `document` and return the sequenced diff.
    pub fn apply(
        &mut self,
        graph: &mut DocGraph,
        document: &str,
        references: &BTreeSet<String>,
    ) -> GraphDiff {
        let mut diff = reconcile(graph, document, references);

        if self.options.prune_isolated {
            for name in graph.isolated_nodes() {
                graph.remove_node(&name);
                debug!("pruned isolated node {}", name);
                diff.added_nodes.retain(|n| n != &name);
                diff.removed_nodes.push(name);
            }
        }

        let diff = self.diff_engine.stamp(diff);
        graph.set_sequence(diff.sequence);
        diff
    }

    /// Current diff sequence number.
    pub fn sequence(&self) -> u64 {
        self.diff_engine.sequence()
    }
}
