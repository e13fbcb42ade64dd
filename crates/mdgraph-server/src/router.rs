//! Axum router setup for the live-preview server

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, services::ServeFile};

use crate::{
    ServerState,
    handlers::{get_graph, health_check},
    websocket::ws_handler,
};

/// Create the axum router with all routes
pub fn create_router(state: Arc<ServerState>) -> Router {
    let page = ServeFile::new(&state.output);
    Router::new()
        // WebSocket endpoint for real-time updates
        .route("/ws", get(ws_handler))
        // REST API endpoints
        .route("/api/graph", get(get_graph))
        .route("/api/health", get(health_check))
        // The rendered page, re-read from disk on every request
        .route_service("/", page.clone())
        .route_service("/index.html", page)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdgraph_core::DocGraph;
    use tokio::sync::RwLock;

    #[test]
    fn test_router_creation() {
        let graph = Arc::new(RwLock::new(DocGraph::new()));
        let state = Arc::new(ServerState::new(graph, "dist/index.html"));
        let _router = create_router(state);
    }
}
