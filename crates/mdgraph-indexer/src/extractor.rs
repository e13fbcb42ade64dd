//! Markdown link extraction
//!
//! Documents are parsed with comrak and every hyperlink target is collected:
//! markdown links (inline, reference-style, autolinks) and `href` attributes
//! of raw HTML anchors embedded in the text. Only targets ending with the
//! document extension are kept, reduced to their basename.
//!
//! Extraction cannot fail. Markup comrak cannot make sense of is treated as
//! plain text, which just yields fewer links.

use comrak::{Arena, Options, nodes::NodeValue, parse_document};
use mdgraph_core::has_document_suffix;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Default recognized document extension.
pub const DEFAULT_EXTENSION: &str = "md";

static HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
        .expect("valid href regex")
});

/// Extracts document references for one recognized extension.
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    suffix: String,
}

impl LinkExtractor {
    /// `extension` may be given with or without its leading dot.
    pub fn new(extension: &str) -> Self {
        LinkExtractor {
            suffix: format!(".{}", extension.trim_start_matches('.')),
        }
    }

    /// The suffix a link target must end with, including the dot.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Basenames of every document `content` links to.
    pub fn extract(&self, content: &str) -> BTreeSet<String> {
        link_targets(content)
            .into_iter()
            .filter_map(|target| self.document_basename(&target))
            .collect()
    }

    fn document_basename(&self, target: &str) -> Option<String> {
        let target = target.trim();
        if !has_document_suffix(target, &self.suffix) {
            return None;
        }
        let base = target.rsplit('/').next().unwrap_or(target);
        if base.is_empty() {
            None
        } else {
            Some(base.to_string())
        }
    }
}

impl Default for LinkExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSION)
    }
}

/// Basenames of every `.md` document `content` links to.
pub fn extract(content: &str) -> BTreeSet<String> {
    LinkExtractor::default().extract(content)
}

/// Every hyperlink target in `content`, in document order.
pub fn link_targets(content: &str) -> Vec<String> {
    let arena = Arena::new();
    let options = Options::default();
    let root = parse_document(&arena, content, &options);

    let mut out = Vec::new();
    for node in root.descendants() {
        match &node.data.borrow().value {
            NodeValue::Link(link) => out.push(link.url.clone()),
            NodeValue::HtmlInline(html) => collect_hrefs(html, &mut out),
            NodeValue::HtmlBlock(block) => collect_hrefs(&block.literal, &mut out),
            _ => {}
        }
    }
    out
}

fn collect_hrefs(html: &str, out: &mut Vec<String>) {
    for caps in HREF_RE.captures_iter(html) {
        if let Some(href) = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)) {
            out.push(href.as_str().to_string());
        }
    }
}
