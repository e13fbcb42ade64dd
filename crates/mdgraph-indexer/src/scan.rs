//! Directory scanning for documents

use ignore::WalkBuilder;
use mdgraph_core::has_extension;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("source directory {0} does not exist or is not a directory")]
    NotADirectory(PathBuf),
}

/// Which documents a scan picks up.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Recognized document extension, without the dot.
    pub extension: String,
    /// Descend into subdirectories.
    pub recursive: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            extension: crate::extractor::DEFAULT_EXTENSION.to_string(),
            recursive: false,
        }
    }
}

/// Directories below the source root that never hold documents.
pub const IGNORED_DIRS: &[&str] = &["target", ".git", "node_modules"];

pub fn is_ignored_dir(name: &OsStr) -> bool {
    IGNORED_DIRS.iter().any(|dir| name == *dir)
}

/// Whether `path` sits inside an ignored directory below `root`.
///
/// Only the part of `path` under `root` is checked, so a root that itself
/// lives in e.g. `target/` still works. Paths outside `root` are not ignored.
pub fn is_ignored(root: &Path, path: &Path) -> bool {
    let Ok(relative) = path.strip_prefix(root) else {
        return false;
    };
    relative
        .parent()
        .is_some_and(|dir| dir.components().any(|c| is_ignored_dir(c.as_os_str())))
}

/// List every document under `root`, sorted by path.
///
/// Hidden files count as documents. Ignored directories below `root` are not
/// entered. Unreadable entries are logged and skipped.
pub fn scan_documents(root: &Path, options: &ScanOptions) -> Result<Vec<PathBuf>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let mut walker = WalkBuilder::new(root);
    walker
        .hidden(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .ignore(false)
        .parents(false)
        .filter_entry(|entry| {
            entry.depth() == 0
                || !(entry.file_type().is_some_and(|t| t.is_dir())
                    && is_ignored_dir(entry.file_name()))
        });
    if !options.recursive {
        walker.max_depth(Some(1));
    }

    let mut documents = Vec::new();
    for entry in walker.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Cannot read entry: {}", e);
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        if has_extension(path, &options.extension) {
            debug!("Found document: {}", path.display());
            documents.push(path.to_path_buf());
        }
    }

    documents.sort();
    Ok(documents)
}
