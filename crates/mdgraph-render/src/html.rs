//! Self-contained HTML output

use crate::assets::{GRAPH_TEMPLATE, LIVE_RELOAD_SNIPPET, template};
use crate::{RenderError, RenderOptions, Renderer};
use mdgraph_core::{DocGraph, GraphSnapshot};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct VisNode<'a> {
    id: &'a str,
    label: &'a str,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<&'static str>,
    #[serde(rename = "shapeProperties", skip_serializing_if = "Option::is_none")]
    shape_properties: Option<ShapeProperties>,
}

#[derive(Debug, Serialize)]
struct ShapeProperties {
    #[serde(rename = "borderDashes")]
    border_dashes: bool,
}

#[derive(Debug, Serialize)]
struct VisEdge<'a> {
    from: &'a str,
    to: &'a str,
}

const DANGLING_COLOR: &str = "#c8c8c8";

/// Render the graph to an HTML page.
pub fn render_html(graph: &DocGraph, options: &RenderOptions) -> Result<String, RenderError> {
    let snapshot = graph.snapshot();
    render_snapshot(&snapshot, options)
}

fn render_snapshot(snapshot: &GraphSnapshot, options: &RenderOptions) -> Result<String, RenderError> {
    let nodes: Vec<VisNode<'_>> = snapshot
        .nodes
        .iter()
        .map(|n| {
            let inbound = snapshot.edges.iter().filter(|e| e.target == n.name).count();
            let outbound = snapshot.edges.iter().filter(|e| e.source == n.name).count();
            let mut title = format!("{}\n{} outbound, {} inbound", n.name, outbound, inbound);
            if !n.observed {
                title.push_str("\n(not found on disk)");
            }
            VisNode {
                id: &n.name,
                label: &n.name,
                title,
                color: (!n.observed).then_some(DANGLING_COLOR),
                shape_properties: (!n.observed).then_some(ShapeProperties { border_dashes: true }),
            }
        })
        .collect();

    let edges: Vec<VisEdge<'_>> = snapshot
        .edges
        .iter()
        .map(|e| VisEdge {
            from: &e.source,
            to: &e.target,
        })
        .collect();

    let live_reload = if options.live_reload {
        template(LIVE_RELOAD_SNIPPET)?
    } else {
        String::new()
    };

    let values = [
        ("__TITLE__", escape_html(&options.title)),
        ("__WIDTH__", escape_html(&options.width)),
        ("__HEIGHT__", escape_html(&options.height)),
        ("__NODE_COUNT__", snapshot.nodes.len().to_string()),
        ("__EDGE_COUNT__", snapshot.edges.len().to_string()),
        ("__NODES__", script_json(&nodes)?),
        ("__EDGES__", script_json(&edges)?),
        ("__OPTIONS__", script_json(&options.vis_options())?),
        ("__LIVE_RELOAD__", live_reload),
    ];

    Ok(fill_template(&template(GRAPH_TEMPLATE)?, &values))
}

/// Substitute placeholders in a single pass over `template`.
///
/// Inserted values are never scanned again, so data that happens to contain
/// a placeholder name comes out verbatim.
fn fill_template(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("__") {
        out.push_str(&rest[..start]);
        let marker = &rest[start..];
        match values.iter().find(|(key, _)| marker.starts_with(key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &marker[key.len()..];
            }
            None => {
                out.push_str("__");
                rest = &marker[2..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// JSON that can sit inside a `<script>` element.
fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String, RenderError> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Writes the rendered page to a fixed output path.
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    output: PathBuf,
    options: RenderOptions,
}

impl HtmlRenderer {
    pub fn new(output: impl Into<PathBuf>, options: RenderOptions) -> Self {
        HtmlRenderer {
            output: output.into(),
            options,
        }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    fn io_error(&self, source: std::io::Error) -> RenderError {
        RenderError::Io {
            path: self.output.clone(),
            source,
        }
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, graph: &DocGraph) -> Result<(), RenderError> {
        let page = render_html(graph, &self.options)?;
        let bytes = page.len();

        if let Some(parent) = self.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        // Write then rename so the server never serves a half-written page.
        let staging = self.output.with_extension("html.tmp");
        fs::write(&staging, page).map_err(|e| self.io_error(e))?;
        fs::rename(&staging, &self.output).map_err(|e| self.io_error(e))?;

        debug!("Wrote {} bytes to {}", bytes, self.output.display());
        info!(
            "Rendered {} nodes, {} edges to {}",
            graph.node_count(),
            graph.edge_count(),
            self.output.display()
        );
        Ok(())
    }
}
