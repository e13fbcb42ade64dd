//! Configuration file loading

use anyhow::Context;
use mdgraph_core::ReconcileOptions;
use mdgraph_indexer::{DEFAULT_EXTENSION, ScanOptions};
use mdgraph_render::RenderOptions;
use mdgraph_watcher::EventFilter;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Looked up in the source directory when no `--config` is given.
pub const CONFIG_FILE: &str = "mdgraph.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MdgraphConfig {
    /// Directory of documents to watch.
    pub source: PathBuf,
    /// Where the rendered page is written.
    pub output: PathBuf,
    /// Recognized document extension.
    pub extension: String,
    /// Include documents in subdirectories.
    pub recursive: bool,
    /// Drop documents that no longer have any links.
    pub prune_isolated: bool,
    pub render: RenderOptions,
}

impl Default for MdgraphConfig {
    fn default() -> Self {
        MdgraphConfig {
            source: PathBuf::from("."),
            output: PathBuf::from("dist/index.html"),
            extension: DEFAULT_EXTENSION.to_string(),
            recursive: false,
            prune_isolated: false,
            render: RenderOptions::default(),
        }
    }
}

impl MdgraphConfig {
    /// Parse a TOML document.
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load `explicit` if given, else `<source>/mdgraph.toml` if it exists,
    /// else defaults.
    pub fn load(explicit: Option<&Path>, source: Option<&Path>) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let dir = source.unwrap_or_else(|| Path::new("."));
                let candidate = dir.join(CONFIG_FILE);
                candidate.is_file().then_some(candidate)
            }
        };

        let Some(path) = path else {
            return Ok(Self::default());
        };

        tracing::debug!("Loading config from {}", path.display());
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, source: Option<PathBuf>, output: Option<PathBuf>) -> Self {
        if let Some(source) = source {
            self.source = source;
        }
        if let Some(output) = output {
            self.output = output;
        }
        self
    }

    pub fn extension(&self) -> &str {
        self.extension.trim_start_matches('.')
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            extension: self.extension().to_string(),
            recursive: self.recursive,
        }
    }

    pub fn event_filter(&self) -> EventFilter {
        EventFilter {
            root: self.source.clone(),
            extension: self.extension().to_string(),
            recursive: self.recursive,
        }
    }

    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            prune_isolated: self.prune_isolated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = MdgraphConfig::from_toml("").unwrap();
        assert_eq!(config, MdgraphConfig::default());
        assert_eq!(config.output, PathBuf::from("dist/index.html"));
        assert!(!config.prune_isolated);
        assert!(config.render.directed);
    }

    #[test]
    fn test_full_file() {
        let config = MdgraphConfig::from_toml(
            r#"
            source = "notes"
            output = "out/graph.html"
            extension = ".markdown"
            recursive = true
            prune_isolated = true

            [render]
            physics = false
            height = "600px"
            "#,
        )
        .unwrap();

        assert_eq!(config.source, PathBuf::from("notes"));
        assert_eq!(config.extension(), "markdown");
        assert!(config.scan_options().recursive);
        assert!(config.event_filter().recursive);
        assert_eq!(config.event_filter().root, PathBuf::from("notes"));
        assert!(config.reconcile_options().prune_isolated);
        assert!(!config.render.physics);
        assert_eq!(config.render.height, "600px");
        assert!(config.render.stabilize_on_load);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(MdgraphConfig::from_toml("sauce = \"notes\"").is_err());
    }

    #[test]
    fn test_load_from_source_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "prune_isolated = true\n").unwrap();

        let config = MdgraphConfig::load(None, Some(dir.path())).unwrap();
        assert!(config.prune_isolated);

        let empty = TempDir::new().unwrap();
        let config = MdgraphConfig::load(None, Some(empty.path())).unwrap();
        assert_eq!(config, MdgraphConfig::default());
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(MdgraphConfig::load(Some(&missing), None).is_err());
    }

    #[test]
    fn test_cli_overrides_win() {
        let config = MdgraphConfig::default()
            .with_overrides(Some(PathBuf::from("docs")), None);
        assert_eq!(config.source, PathBuf::from("docs"));
        assert_eq!(config.output, PathBuf::from("dist/index.html"));
    }
}
