//! Integration tests for mdgraph
//!
//! These tests verify that multiple systems work together correctly.

use mdgraph_core::{DocGraph, ReconcileOptions, Reconciler};
use mdgraph_indexer::{LinkExtractor, ScanOptions};
use mdgraph_render::{HtmlRenderer, RenderOptions};
use mdgraph_watcher::{ChangeEvent, ChangeKind, EventFilter, WatcherService};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::RwLock;

fn service_for(output: &Path, options: ReconcileOptions) -> WatcherService {
    WatcherService::new(
        Arc::new(RwLock::new(DocGraph::new())),
        Reconciler::new(options),
        LinkExtractor::default(),
        Arc::new(HtmlRenderer::new(output, RenderOptions::default())),
    )
}

fn edge_set(graph: &DocGraph) -> BTreeSet<(String, String)> {
    graph
        .edges()
        .map(|(s, t)| (s.to_string(), t.to_string()))
        .collect()
}

/// Test that the CLI can be invoked
#[test]
fn test_cli_invocation() {
    let output = Command::new(env!("CARGO_BIN_EXE_mdgraph"))
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Live link graph of a directory of markdown notes"));
    assert!(stdout.contains("watch"));
    assert!(stdout.contains("serve"));
}

/// Test the one-shot render command against a real directory
#[test]
fn test_cli_render() {
    let dir = TempDir::new().unwrap();
    let notes = dir.path().join("notes");
    fs::create_dir(&notes).unwrap();
    fs::write(notes.join("a.md"), "[b](b.md)").unwrap();
    fs::write(notes.join("b.md"), "no links").unwrap();
    let out = dir.path().join("site").join("graph.html");

    let status = Command::new(env!("CARGO_BIN_EXE_mdgraph"))
        .arg("render")
        .arg("--source")
        .arg(&notes)
        .arg("--output")
        .arg(&out)
        .status()
        .expect("Failed to execute command");

    assert!(status.success());
    let html = fs::read_to_string(&out).unwrap();
    assert!(html.contains(r#"{"from":"a.md","to":"b.md"}"#));
}

/// Initial scan builds the expected graph from disk
#[tokio::test]
async fn test_initial_scan_graph() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.md"), "Links to [b](b.md).").unwrap();
    fs::write(dir.path().join("b.md"), "Links to nothing.").unwrap();
    let out = dir.path().join("out.html");

    let mut service = service_for(&out, ReconcileOptions::default());
    let indexed = service
        .initial_scan(dir.path(), &ScanOptions::default())
        .await
        .unwrap();
    service.render().await.unwrap();

    assert_eq!(indexed, 2);
    let graph = service.graph();
    let graph = graph.read().await;
    let nodes: BTreeSet<_> = graph.nodes().map(str::to_string).collect();
    assert_eq!(nodes, BTreeSet::from(["a.md".to_string(), "b.md".to_string()]));
    assert_eq!(
        edge_set(&graph),
        BTreeSet::from([("a.md".to_string(), "b.md".to_string())])
    );
    assert!(out.exists());
}

/// Editing a document updates only its outbound edges and re-renders
#[tokio::test]
async fn test_edit_cycle() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.md");
    let b = dir.path().join("b.md");
    fs::write(&a, "[b](b.md)").unwrap();
    fs::write(&b, "[a](a.md)").unwrap();
    let out = dir.path().join("out.html");

    let mut service = service_for(&out, ReconcileOptions::default());
    service
        .initial_scan(dir.path(), &ScanOptions::default())
        .await
        .unwrap();

    fs::write(&a, "now [c](c.md) and [me](a.md)").unwrap();
    let diff = service
        .handle_event(ChangeEvent::new(ChangeKind::Modified, &a))
        .await
        .unwrap();

    assert_eq!(diff.removed_edges.len(), 1);
    assert_eq!(diff.added_edges.len(), 2);
    assert_eq!(diff.added_nodes, vec!["c.md"]);

    let graph = service.graph();
    let graph = graph.read().await;
    assert_eq!(graph.neighbors("a.md"), vec!["a.md", "c.md"]);
    assert!(graph.has_edge("b.md", "a.md"));
    assert!(graph.has_node("b.md"));

    let html = fs::read_to_string(&out).unwrap();
    assert!(html.contains(r#"{"from":"a.md","to":"c.md"}"#));
}

/// Pruning removes documents left without links
#[tokio::test]
async fn test_prune_isolated_documents() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.md");
    fs::write(&a, "[b](b.md)").unwrap();
    let out = dir.path().join("out.html");

    let mut service = service_for(&out, ReconcileOptions { prune_isolated: true });
    service
        .initial_scan(dir.path(), &ScanOptions::default())
        .await
        .unwrap();

    fs::write(&a, "nothing").unwrap();
    let diff = service
        .handle_event(ChangeEvent::new(ChangeKind::Modified, &a))
        .await
        .unwrap();

    assert_eq!(diff.removed_nodes, vec!["a.md", "b.md"]);
    assert_eq!(service.graph().read().await.node_count(), 0);
}

/// A vanished file does not stop later events from being applied
#[tokio::test]
async fn test_missing_file_then_valid_event() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.html");
    let mut service = service_for(&out, ReconcileOptions::default());

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let real = dir.path().join("real.md");
    fs::write(&real, "[x](x.md)").unwrap();
    tx.send(ChangeEvent::new(ChangeKind::Modified, dir.path().join("gone.md")))
        .unwrap();
    tx.send(ChangeEvent::new(ChangeKind::Created, &real)).unwrap();
    drop(tx);

    service.process_events(&mut rx, std::future::pending()).await;

    let graph = service.graph();
    let graph = graph.read().await;
    assert!(!graph.has_node("gone.md"));
    assert!(graph.has_edge("real.md", "x.md"));
}

/// Hidden notes are indexed at startup and followed by the watcher alike
#[tokio::test]
async fn test_hidden_document_scanned_and_watched() {
    let dir = TempDir::new().unwrap();
    let draft = dir.path().join(".draft.md");
    fs::write(&draft, "[a](a.md)").unwrap();
    fs::write(dir.path().join("a.md"), "").unwrap();
    let out = dir.path().join("out.html");

    let mut service = service_for(&out, ReconcileOptions::default());
    service
        .initial_scan(dir.path(), &ScanOptions::default())
        .await
        .unwrap();
    assert!(service.graph().read().await.has_edge(".draft.md", "a.md"));

    assert!(EventFilter::new(dir.path()).accepts(&draft));
    fs::write(&draft, "[b](b.md)").unwrap();
    let diff = service
        .handle_event(ChangeEvent::new(ChangeKind::Modified, &draft))
        .await
        .unwrap();
    assert_eq!(diff.added_nodes, vec!["b.md"]);

    let graph = service.graph();
    let graph = graph.read().await;
    assert_eq!(graph.neighbors(".draft.md"), vec!["b.md"]);
    assert_eq!(graph.node_count(), 3);
}
