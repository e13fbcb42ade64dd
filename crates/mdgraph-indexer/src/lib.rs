//! Document scanning and link extraction

pub mod extractor;
pub mod scan;


pub use extractor::{LinkExtractor, DEFAULT_EXTENSION, extract, link_targets};
pub use scan::{IGNORED_DIRS, ScanError, ScanOptions, is_ignored, is_ignored_dir, scan_documents};
