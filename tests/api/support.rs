// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Shared helpers for the HTTP-level tests

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use embedding_server::{
    api::{create_app, AppState},
    embeddings::{EmbeddingModel, HashingEmbeddingModel, MODEL_DIMENSION, MODEL_NAME},
};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

/// Backend whose inference always fails, counting how often it was called
#[derive(Default)]
pub struct FailingModel {
    pub calls: AtomicUsize,
}

#[async_trait]
impl EmbeddingModel for FailingModel {
    fn model_name(&self) -> &str {
        MODEL_NAME
    }

    fn dimension(&self) -> usize {
        MODEL_DIMENSION
    }

    async fn encode(&self, _texts: Vec<String>) -> anyhow::Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("CUDA out of memory")
    }
}

/// Deterministic stand-in for all-MiniLM-L6-v2 (384 dimensions)
pub fn hashing_model() -> Arc<HashingEmbeddingModel> {
    Arc::new(HashingEmbeddingModel::new(MODEL_NAME, MODEL_DIMENSION))
}

pub fn app_with_model(model: Arc<dyn EmbeddingModel>) -> Router {
    create_app(Arc::new(AppState::new_for_test(model)))
}

/// POSTs `body` to /embed and returns status plus parsed JSON body
pub async fn post_embed(app: Router, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/embed")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);
    (status, body)
}

/// Extracts `embeddings` as nested f64 vectors
pub fn embeddings_of(body: &Value) -> Vec<Vec<f64>> {
    body["embeddings"]
        .as_array()
        .expect("embeddings array")
        .iter()
        .map(|vector| {
            vector
                .as_array()
                .expect("embedding array")
                .iter()
                .map(|v| v.as_f64().expect("float"))
                .collect()
        })
        .collect()
}

pub fn norm(vector: &[f64]) -> f64 {
    vector.iter().map(|x| x * x).sum::<f64>().sqrt()
}
