//! CLI command implementations

use crate::config::MdgraphConfig;
use mdgraph_core::{DocGraph, Reconciler};
use mdgraph_indexer::LinkExtractor;
use mdgraph_render::{HtmlRenderer, RenderOptions};
use mdgraph_server::{MdgraphServer, ServerConfig, ServerState};
use mdgraph_watcher::{FileWatcher, WatcherService};
use std::sync::Arc;
use tokio::sync::{RwLock, oneshot};

/// Build the update service and index the source directory.
async fn build_service(
    config: &MdgraphConfig,
    graph: Arc<RwLock<DocGraph>>,
    render: RenderOptions,
) -> anyhow::Result<WatcherService> {
    tracing::info!("mdgraph v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Source directory: {}", config.source.display());

    let renderer = Arc::new(HtmlRenderer::new(&config.output, render));
    let mut service = WatcherService::new(
        graph,
        Reconciler::new(config.reconcile_options()),
        LinkExtractor::new(config.extension()),
        renderer,
    );
    service
        .initial_scan(&config.source, &config.scan_options())
        .await?;
    Ok(service)
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for interrupt: {}", e);
    }
}

fn open_in_browser(target: &str) {
    if let Err(e) = open::that(target) {
        tracing::warn!("Cannot open {}: {}", target, e);
    }
}

pub async fn render(config: MdgraphConfig) -> anyhow::Result<()> {
    let graph = Arc::new(RwLock::new(DocGraph::new()));
    let service = build_service(&config, graph, config.render.clone()).await?;
    service.render().await?;
    Ok(())
}

pub async fn watch(config: MdgraphConfig, open: bool) -> anyhow::Result<()> {
    let graph = Arc::new(RwLock::new(DocGraph::new()));
    let mut service = build_service(&config, graph, config.render.clone()).await?;
    service.render().await?;

    if open {
        open_in_browser(&config.output.to_string_lossy());
    }

    let mut watcher = FileWatcher::new(config.event_filter())?;
    watcher.start()?;
    tracing::info!("Watching for changes, press Ctrl-C to stop");

    service
        .process_events(watcher.event_receiver(), ctrl_c())
        .await;

    watcher.stop()?;
    Ok(())
}

pub async fn serve(config: MdgraphConfig, host: String, port: u16, open: bool) -> anyhow::Result<()> {
    let graph = Arc::new(RwLock::new(DocGraph::new()));
    let render = RenderOptions {
        live_reload: true,
        ..config.render.clone()
    };

    let state = ServerState::new(Arc::clone(&graph), &config.output);
    let diff_tx = state.diff_tx.clone();
    let mut service = build_service(&config, graph, render)
        .await?
        .with_broadcast(diff_tx);
    service.render().await?;

    let server = MdgraphServer::bind(state, &ServerConfig { host, port }).await?;
    let url = format!("http://{}", server.local_addr()?);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server_task = tokio::spawn(server.serve(async move {
        let _ = stop_rx.await;
    }));

    if open {
        open_in_browser(&url);
    }

    let mut watcher = FileWatcher::new(config.event_filter())?;
    watcher.start()?;
    tracing::info!("Watching for changes, press Ctrl-C to stop");

    service
        .process_events(watcher.event_receiver(), ctrl_c())
        .await;

    watcher.stop()?;
    let _ = stop_tx.send(());
    server_task.await??;
    Ok(())
}
