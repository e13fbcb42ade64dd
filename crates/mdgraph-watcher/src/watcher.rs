//! Filesystem watcher implementation

use mdgraph_core::has_extension;
use mdgraph_indexer::{DEFAULT_EXTENSION, is_ignored};
use notify::event::{ModifyKind, RenameMode};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("file watcher error: {0}")]
    Notify(#[from] notify::Error),
}

/// What happened to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Deleted,
    /// Access, metadata-only and unclassifiable events.
    Other,
}

/// A change to one document under the watched directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub path: PathBuf,
}

impl ChangeEvent {
    pub fn new(kind: ChangeKind, path: impl Into<PathBuf>) -> Self {
        ChangeEvent {
            kind,
            path: path.into(),
        }
    }
}

/// Which paths produce change events, and where to watch for them.
#[derive(Debug, Clone)]
pub struct EventFilter {
    /// Directory being watched.
    pub root: PathBuf,
    /// Recognized document extension, without the dot.
    pub extension: String,
    /// Watch subdirectories too.
    pub recursive: bool,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self::new(".")
    }
}

impl EventFilter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        EventFilter {
            root: root.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            recursive: false,
        }
    }

    /// Documents only: recognized extension, not a directory, not inside an
    /// ignored directory below the root. Hidden files are documents too.
    pub fn accepts(&self, path: &Path) -> bool {
        has_extension(path, &self.extension) && !path.is_dir() && !is_ignored(&self.root, path)
    }
}

/// Translate a notify event into document change events.
pub fn classify(event: &notify::Event, filter: &EventFilter) -> Vec<ChangeEvent> {
    let kinds: Vec<(ChangeKind, &PathBuf)> = match event.kind {
        EventKind::Create(_) => event.paths.iter().map(|p| (ChangeKind::Created, p)).collect(),
        EventKind::Remove(_) => event.paths.iter().map(|p| (ChangeKind::Deleted, p)).collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            event.paths.iter().map(|p| (ChangeKind::Deleted, p)).collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            event.paths.iter().map(|p| (ChangeKind::Created, p)).collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => event
            .paths
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let kind = if i == 0 { ChangeKind::Deleted } else { ChangeKind::Created };
                (kind, p)
            })
            .collect(),
        // Backends that cannot tell the rename side apart: look at the disk.
        EventKind::Modify(ModifyKind::Name(_)) => event
            .paths
            .iter()
            .map(|p| {
                let kind = if p.exists() { ChangeKind::Created } else { ChangeKind::Deleted };
                (kind, p)
            })
            .collect(),
        EventKind::Modify(ModifyKind::Metadata(_)) => {
            event.paths.iter().map(|p| (ChangeKind::Other, p)).collect()
        }
        EventKind::Modify(_) => event.paths.iter().map(|p| (ChangeKind::Modified, p)).collect(),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => {
            event.paths.iter().map(|p| (ChangeKind::Other, p)).collect()
        }
    };

    kinds
        .into_iter()
        .filter(|(_, path)| filter.accepts(path))
        .map(|(kind, path)| ChangeEvent::new(kind, path.clone()))
        .collect()
}

/// File system watcher for monitoring document changes
pub struct FileWatcher {
    watcher: RecommendedWatcher,
    event_rx: mpsc::UnboundedReceiver<ChangeEvent>,
    root_path: PathBuf,
    filter: EventFilter,
}

impl FileWatcher {
    /// Create a new file watcher for `filter.root`
    pub fn new(mut filter: EventFilter) -> Result<Self, WatchError> {
        // Backends report canonical paths; match them against the same form.
        if let Ok(canonical) = filter.root.canonicalize() {
            filter.root = canonical;
        }
        let root_path = filter.root.clone();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let callback_filter = filter.clone();
        let watcher = notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
            match res {
                Ok(event) => {
                    debug!("File system event: {:?}", event);
                    Self::forward(&event, &callback_filter, &event_tx);
                }
                Err(e) => {
                    error!("File system watch error: {}", e);
                }
            }
        })?;

        Ok(Self {
            watcher,
            event_rx,
            root_path,
            filter,
        })
    }

    fn forward(
        event: &notify::Event,
        filter: &EventFilter,
        event_tx: &mpsc::UnboundedSender<ChangeEvent>,
    ) {
        for change in classify(event, filter) {
            if let Err(e) = event_tx.send(change) {
                warn!("Failed to send change event: {}", e);
            }
        }
    }

    /// Start watching the root directory
    pub fn start(&mut self) -> Result<(), WatchError> {
        let mode = if self.filter.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        info!("Watching directory: {:?} ({:?})", self.root_path, mode);

        self.watcher.watch(&self.root_path, mode)?;
        Ok(())
    }

    /// Stop watching the root directory
    pub fn stop(&mut self) -> Result<(), WatchError> {
        info!("Stopping watch for: {:?}", self.root_path);

        self.watcher.unwatch(&self.root_path)?;
        Ok(())
    }

    /// Get the event receiver
    pub fn event_receiver(&mut self) -> &mut mpsc::UnboundedReceiver<ChangeEvent> {
        &mut self.event_rx
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }
}
