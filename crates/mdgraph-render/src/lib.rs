//! Graph rendering to an interactive vis-network page

pub mod assets;
pub mod html;
pub mod options;

use mdgraph_core::DocGraph;
use std::path::PathBuf;
use thiserror::Error;

pub use html::{HtmlRenderer, render_html};
pub use options::RenderOptions;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize graph: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("embedded template {0} is missing")]
    MissingTemplate(&'static str),
}

/// Produces a viewable artifact from the whole graph.
///
/// Rendering is synchronous and non-incremental: every call serializes the
/// complete graph.
pub trait Renderer: Send + Sync {
    fn render(&self, graph: &DocGraph) -> Result<(), RenderError>;
}
