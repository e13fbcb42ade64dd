//! Page templates embedded with rust-embed

use rust_embed::RustEmbed;

use crate::RenderError;

/// Embed the assets directory at compile time
#[derive(RustEmbed)]
#[folder = "assets/"]
struct Templates;

pub const GRAPH_TEMPLATE: &str = "graph.html";
pub const LIVE_RELOAD_SNIPPET: &str = "live-reload.html";

/// Load an embedded template as text
pub fn template(name: &'static str) -> Result<String, RenderError> {
    let file = Templates::get(name).ok_or(RenderError::MissingTemplate(name))?;
    Ok(String::from_utf8_lossy(&file.data).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assets_exist() {
        assert!(template(GRAPH_TEMPLATE).is_ok());
        assert!(template(LIVE_RELOAD_SNIPPET).is_ok());
    }

    #[test]
    fn test_nonexistent_asset() {
        assert!(matches!(
            template("nonexistent.file"),
            Err(RenderError::MissingTemplate("nonexistent.file"))
        ));
    }
}
