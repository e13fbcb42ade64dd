//! Change source and incremental update service

pub mod service;
pub mod watcher;

pub use service::WatcherService;
pub use watcher::{ChangeEvent, ChangeKind, EventFilter, FileWatcher, WatchError, classify};
