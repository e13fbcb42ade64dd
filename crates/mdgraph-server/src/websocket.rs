//! WebSocket handling for real-time graph updates

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use mdgraph_core::GraphSnapshot;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::ServerState;

/// WebSocket message types for client-server communication
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsMessage {
    /// Client requests the full graph
    #[serde(rename = "request_full_graph")]
    RequestFullGraph,
    /// Server sends the full graph
    #[serde(rename = "full_graph")]
    FullGraph { graph: GraphSnapshot },
    /// Ping/pong for keepalive
    #[serde(rename = "ping")]
    Ping,
    #[serde(rename = "pong")]
    Pong,
    /// Error message
    #[serde(rename = "error")]
    Error { message: String },
}

async fn full_graph_message(state: &ServerState) -> Option<String> {
    let graph = state.graph.read().await.snapshot();
    match serde_json::to_string(&WsMessage::FullGraph { graph }) {
        Ok(json) => Some(json),
        Err(e) => {
            warn!("Failed to serialize full graph message: {}", e);
            None
        }
    }
}

/// Handle WebSocket upgrade requests
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<ServerState>) {
    info!("New WebSocket connection established");

    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.diff_tx.subscribe();

    // Send full graph immediately after connection
    if let Some(json_msg) = full_graph_message(&state).await {
        if sender.send(Message::Text(json_msg)).await.is_err() {
            warn!("Failed to send initial full graph to WebSocket client");
            return;
        }
        debug!("Sent full graph to WebSocket client");
    }

    // Replies to client requests go through the send task
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<String>();

    let state_clone = Arc::clone(&state);
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    debug!("Received WebSocket message: {}", text);
                    let reply = match serde_json::from_str::<WsMessage>(&text) {
                        Ok(ws_msg) => handle_client_message(ws_msg, &state_clone).await,
                        Err(e) => {
                            warn!("Failed to parse WebSocket message: {}", e);
                            serde_json::to_string(&WsMessage::Error {
                                message: format!("unrecognized message: {}", e),
                            })
                            .ok()
                        }
                    };
                    if let Some(reply) = reply {
                        if reply_tx.send(reply).is_err() {
                            break;
                        }
                    }
                }
                Message::Close(_) => {
                    debug!("WebSocket client disconnected");
                    break;
                }
                _ => {}
            }
        }
    });

    let mut send_task = tokio::spawn(async move {
        loop {
            let outgoing = tokio::select! {
                reply = reply_rx.recv() => match reply {
                    Some(reply) => reply,
                    None => break,
                },
                diff = rx.recv() => match diff {
                    Ok(msg) => msg,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("WebSocket client lagged behind by {} diffs", skipped);
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            };
            if sender.send(Message::Text(outgoing)).await.is_err() {
                debug!("Failed to send message to WebSocket client");
                break;
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
        }
    }

    info!("WebSocket connection closed");
}

/// Handle a message from the client, returning the serialized reply if any
async fn handle_client_message(msg: WsMessage, state: &ServerState) -> Option<String> {
    match msg {
        WsMessage::RequestFullGraph => {
            debug!("Client requested full graph");
            full_graph_message(state).await
        }
        WsMessage::Ping => serde_json::to_string(&WsMessage::Pong).ok(),
        other => {
            debug!("Ignoring client message: {:?}", other);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdgraph_core::DocGraph;
    use tokio::sync::RwLock;

    fn state() -> ServerState {
        let mut graph = DocGraph::new();
        graph.add_edge("a.md", "b.md");
        ServerState::new(Arc::new(RwLock::new(graph)), "index.html")
    }

    #[test]
    fn test_ws_message_serialization() {
        let json = serde_json::to_string(&WsMessage::Ping).unwrap();
        assert_eq!(json, r#"{"type":"ping"}"#);

        let msg: WsMessage = serde_json::from_str(r#"{"type":"request_full_graph"}"#).unwrap();
        assert!(matches!(msg, WsMessage::RequestFullGraph));
    }

    #[tokio::test]
    async fn test_ping_gets_pong() {
        let reply = handle_client_message(WsMessage::Ping, &state()).await;
        assert_eq!(reply.as_deref(), Some(r#"{"type":"pong"}"#));
    }

    #[tokio::test]
    async fn test_full_graph_reply() {
        let reply = handle_client_message(WsMessage::RequestFullGraph, &state())
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(value["type"], "full_graph");
        assert_eq!(value["graph"]["edges"][0]["target"], "b.md");
    }

    #[tokio::test]
    async fn test_broadcast() {
        let state = state();
        let mut rx = state.diff_tx.subscribe();
        let result = state.broadcast("test message".to_string());
        assert!(result.is_ok());
        assert_eq!(rx.recv().await.unwrap(), "test message");
    }
}
