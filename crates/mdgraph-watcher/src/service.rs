//! Update service: keeps the document graph in step with the directory

use anyhow::{Context, Result};
use mdgraph_core::{DocGraph, GraphDiff, Reconciler, document_name};
use mdgraph_indexer::{LinkExtractor, ScanOptions, scan_documents};
use mdgraph_render::Renderer;
use std::collections::BTreeSet;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast, mpsc};
use tracing::{debug, error, info, warn};

use crate::watcher::{ChangeEvent, ChangeKind};

/// Runs Extractor → Reconciler → Renderer for every document change.
///
/// All graph mutation goes through one service instance, and each event is
/// finished before the next is taken off the queue. The write lock is held
/// for a whole reconciliation, so readers never see a half-updated edge set.
pub struct WatcherService {
    graph: Arc<RwLock<DocGraph>>,
    reconciler: Reconciler,
    extractor: LinkExtractor,
    renderer: Arc<dyn Renderer>,
    diff_tx: Option<broadcast::Sender<String>>,
}

impl WatcherService {
    /// Create a new watcher service
    pub fn new(
        graph: Arc<RwLock<DocGraph>>,
        reconciler: Reconciler,
        extractor: LinkExtractor,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            graph,
            reconciler,
            extractor,
            renderer,
            diff_tx: None,
        }
    }

    /// Broadcast every non-empty graph diff on `diff_tx`
    pub fn with_broadcast(mut self, diff_tx: broadcast::Sender<String>) -> Self {
        self.diff_tx = Some(diff_tx);
        self
    }

    pub fn graph(&self) -> Arc<RwLock<DocGraph>> {
        Arc::clone(&self.graph)
    }

    /// Build the graph from every document under `root`. Does not render.
    ///
    /// Returns the number of documents indexed. Unreadable documents are
    /// skipped with a warning.
    pub async fn initial_scan(&mut self, root: &Path, options: &ScanOptions) -> Result<usize> {
        let documents = scan_documents(root, options)?;
        let mut indexed = 0;

        for path in documents {
            let Some(name) = document_name(&path) else {
                continue;
            };
            let content = match tokio::fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };
            let references = self.extractor.extract(&content);
            let mut graph = self.graph.write().await;
            self.reconciler.apply(&mut graph, &name, &references);
            indexed += 1;
        }

        let graph = self.graph.read().await;
        info!(
            "Indexed {} documents: {} nodes, {} edges",
            indexed,
            graph.node_count(),
            graph.edge_count()
        );
        Ok(indexed)
    }

    /// Render the whole graph once.
    ///
    /// Renderers do blocking I/O, so this runs on the blocking pool and keeps
    /// the runtime workers free for the server.
    pub async fn render(&self) -> Result<()> {
        let graph = Arc::clone(&self.graph);
        let renderer = Arc::clone(&self.renderer);
        tokio::task::spawn_blocking(move || {
            let graph = graph.blocking_read();
            renderer.render(&graph)
        })
        .await
        .context("render task failed")??;
        Ok(())
    }

    /// Process change events until the channel closes or `shutdown` resolves.
    pub async fn process_events(
        &mut self,
        event_rx: &mut mpsc::UnboundedReceiver<ChangeEvent>,
        shutdown: impl Future<Output = ()>,
    ) {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping event processing");
                    break;
                }
                event = event_rx.recv() => match event {
                    Some(event) => {
                        self.handle_event(event).await;
                    }
                    None => {
                        info!("Change source closed");
                        break;
                    }
                },
            }
        }
    }

    /// Apply one change event. Returns the diff if the graph was reconciled.
    pub async fn handle_event(&mut self, event: ChangeEvent) -> Option<GraphDiff> {
        debug!("Processing change event: {:?}", event);

        let name = document_name(&event.path)?;

        let references = match event.kind {
            ChangeKind::Created | ChangeKind::Modified => {
                info!("{} was {:?}", name, event.kind);
                match tokio::fs::read_to_string(&event.path).await {
                    Ok(content) => self.extractor.extract(&content),
                    Err(e) => {
                        warn!("Failed to read {}: {}", event.path.display(), e);
                        return None;
                    }
                }
            }
            ChangeKind::Deleted => {
                info!("{} was deleted", name);
                BTreeSet::new()
            }
            ChangeKind::Other => {
                debug!("Ignoring event for {}", name);
                return None;
            }
        };

        let diff = {
            let mut graph = self.graph.write().await;
            self.reconciler.apply(&mut graph, &name, &references)
        };
        debug!(
            "Reconciled {} (seq {}): +{} -{} edges",
            name,
            diff.sequence,
            diff.added_edges.len(),
            diff.removed_edges.len()
        );

        if let Err(e) = self.render().await {
            error!("Failed to render graph after {} changed: {}", name, e);
        }

        self.broadcast(&diff);
        Some(diff)
    }

    fn broadcast(&self, diff: &GraphDiff) {
        let Some(ref diff_tx) = self.diff_tx else {
            return;
        };
        if diff.is_empty() {
            return;
        }
        let message = serde_json::json!({ "type": "graph_diff", "diff": diff });
        // It's okay if there are no receivers - just means no WebSocket clients connected
        let _ = diff_tx.send(message.to_string());
    }
}
