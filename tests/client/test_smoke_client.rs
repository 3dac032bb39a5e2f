// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Smoke client against a real listener on an ephemeral port

use async_trait::async_trait;
use embedding_server::{
    api::{serve, AppState},
    client::{run_smoke_test, SmokeOutcome, PREVIEW_DIMENSIONS, SAMPLE_TEXTS},
    embeddings::{EmbeddingModel, HashingEmbeddingModel},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

struct BrokenModel;

#[async_trait]
impl EmbeddingModel for BrokenModel {
    fn model_name(&self) -> &str {
        "all-MiniLM-L6-v2"
    }

    fn dimension(&self) -> usize {
        384
    }

    async fn encode(&self, _texts: Vec<String>) -> anyhow::Result<Vec<Vec<f32>>> {
        anyhow::bail!("inference exploded")
    }
}

/// Starts a server and returns its /embed URL plus a shutdown trigger
async fn spawn_server(model: Arc<dyn EmbeddingModel>) -> (String, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();
    let state = Arc::new(AppState::new_for_test(model));

    tokio::spawn(serve(listener, state, async move {
        let _ = rx.await;
    }));

    (format!("http://{}/embed", addr), tx)
}

#[tokio::test]
async fn test_smoke_passes_against_healthy_server() {
    let (url, shutdown) =
        spawn_server(Arc::new(HashingEmbeddingModel::new("all-MiniLM-L6-v2", 384))).await;

    let outcome = run_smoke_test(&url).await.unwrap();

    match &outcome {
        SmokeOutcome::Passed(previews) => {
            assert_eq!(previews.len(), SAMPLE_TEXTS.len());
            for preview in previews {
                assert_eq!(preview.length, 384);
                assert_eq!(preview.head.len(), PREVIEW_DIMENSIONS);
            }
        }
        other => panic!("expected pass, got {:?}", other),
    }
    assert!(outcome.to_string().contains("Text 2 embedding (first 5 dimensions)"));

    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_smoke_reports_server_error() {
    let (url, shutdown) = spawn_server(Arc::new(BrokenModel)).await;

    let outcome = run_smoke_test(&url).await.unwrap();

    match &outcome {
        SmokeOutcome::Failed { status, body } => {
            assert_eq!(*status, 500);
            assert!(body.contains("inference exploded"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(outcome.to_string().starts_with("Error: 500\n"));

    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_smoke_errors_when_nothing_listening() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = run_smoke_test(&format!("http://{}/embed", addr)).await;
    assert!(result.is_err());
}
