//! mdgraph core: document graph store, reconciler and diff engine

pub mod graph;
pub mod model;
pub mod diff;
pub mod reconcile;


pub use model::{
    DocumentNode, GraphSnapshot, Reference, document_name, has_document_suffix, has_extension,
};
pub use graph::DocGraph;
pub use diff::{GraphDiff, DiffEngine};
pub use reconcile::{reconcile, Reconciler, ReconcileOptions};
