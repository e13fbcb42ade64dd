//! Live-preview HTTP + WebSocket server

pub mod handlers;
pub mod router;
pub mod websocket;

use anyhow::Context;
use mdgraph_core::DocGraph;
use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{RwLock, broadcast};
use tracing::info;

/// Capacity of the diff broadcast channel.
const DIFF_CHANNEL_CAPACITY: usize = 256;

/// Where the server listens.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 7890,
        }
    }
}

/// State shared by every request handler.
pub struct ServerState {
    pub graph: Arc<RwLock<DocGraph>>,
    pub diff_tx: broadcast::Sender<String>,
    /// The rendered page served at `/`.
    pub output: PathBuf,
}

impl ServerState {
    pub fn new(graph: Arc<RwLock<DocGraph>>, output: impl Into<PathBuf>) -> Self {
        let (diff_tx, _) = broadcast::channel(DIFF_CHANNEL_CAPACITY);
        ServerState {
            graph,
            diff_tx,
            output: output.into(),
        }
    }

    /// Send a message to every connected WebSocket client.
    pub fn broadcast(&self, message: String) -> Result<usize, broadcast::error::SendError<String>> {
        self.diff_tx.send(message)
    }
}

/// The live-preview server, bound to its socket.
pub struct MdgraphServer {
    state: Arc<ServerState>,
    listener: TcpListener,
}

impl MdgraphServer {
    /// Bind the listening socket. Fails right away if the address is taken.
    pub async fn bind(state: ServerState, config: &ServerConfig) -> anyhow::Result<Self> {
        let listener = TcpListener::bind((config.host.as_str(), config.port))
            .await
            .with_context(|| format!("cannot listen on {}:{}", config.host, config.port))?;
        Ok(MdgraphServer {
            state: Arc::new(state),
            listener,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn state(&self) -> Arc<ServerState> {
        Arc::clone(&self.state)
    }

    /// Serve until `shutdown` resolves.
    pub async fn serve(self, shutdown: impl Future<Output = ()> + Send + 'static) -> anyhow::Result<()> {
        info!("Live preview at http://{}", self.listener.local_addr()?);

        let app = router::create_router(self.state);
        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}
