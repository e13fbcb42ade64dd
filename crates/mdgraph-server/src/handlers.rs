//! REST API handlers for the live-preview server

use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use mdgraph_core::GraphSnapshot;
use serde::Serialize;

use crate::ServerState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub nodes: usize,
    pub edges: usize,
}

/// Get the current graph as JSON, with the sequence of the last diff applied
pub async fn get_graph(State(state): State<Arc<ServerState>>) -> Json<GraphSnapshot> {
    let graph = state.graph.read().await;
    Json(graph.snapshot())
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let graph = state.graph.read().await;
    let health = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        nodes: graph.node_count(),
        edges: graph.edge_count(),
    };
    Json(health)
}
