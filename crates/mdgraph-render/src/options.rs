//! Visualization settings

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Settings passed to the vis-network page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Draw arrowheads on edges.
    pub directed: bool,
    /// Run the force-directed layout.
    pub physics: bool,
    /// Stabilize and fit the layout before first paint.
    pub stabilize_on_load: bool,
    /// CSS height of the canvas, e.g. `800px`.
    pub height: String,
    /// CSS width of the canvas, e.g. `100%`.
    pub width: String,
    pub title: String,
    /// Reload the page whenever the live-preview server reports a change.
    pub live_reload: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            directed: true,
            physics: true,
            stabilize_on_load: true,
            height: "800px".to_string(),
            width: "100%".to_string(),
            title: "mdgraph".to_string(),
            live_reload: false,
        }
    }
}

impl RenderOptions {
    /// The vis-network `options` object.
    pub fn vis_options(&self) -> Value {
        json!({
            "edges": {
                "arrows": { "to": { "enabled": self.directed } },
                "color": { "inherit": false, "color": "#848484" },
                "smooth": { "enabled": true, "type": "dynamic" }
            },
            "nodes": {
                "shape": "dot",
                "size": 12,
                "font": { "size": 14 }
            },
            "physics": {
                "enabled": self.physics,
                "stabilization": {
                    "enabled": self.stabilize_on_load,
                    "fit": true
                }
            },
            "interaction": { "hover": true }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vis_options_follow_settings() {
        let options = RenderOptions {
            directed: false,
            physics: false,
            stabilize_on_load: false,
            ..Default::default()
        };
        let vis = options.vis_options();
        assert_eq!(vis["edges"]["arrows"]["to"]["enabled"], false);
        assert_eq!(vis["physics"]["enabled"], false);
        assert_eq!(vis["physics"]["stabilization"]["enabled"], false);
        assert_eq!(vis["physics"]["stabilization"]["fit"], true);
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let options: RenderOptions = serde_json::from_str(r#"{"height": "600px"}"#).unwrap();
        assert_eq!(options.height, "600px");
        assert!(options.directed);
        assert_eq!(options.width, "100%");
    }
}
