// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! GET /health reflects the model lifecycle

use super::support::hashing_model;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use embedding_server::{
    api::{create_app, AppState, HealthResponse},
    config::ServerConfig,
    embeddings::{ModelHandle, ModelStatus},
};
use std::sync::Arc;
use tower::util::ServiceExt;

async fn get_health(app: Router) -> (StatusCode, HealthResponse) {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health_follows_lifecycle() {
    let handle = Arc::new(ModelHandle::new("all-MiniLM-L6-v2"));
    let app = create_app(Arc::new(AppState::with_handle(
        handle.clone(),
        &ServerConfig::default(),
    )));

    let (status, health) = get_health(app.clone()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(health.status, ModelStatus::Uninitialized);
    assert_eq!(health.dimension, None);

    handle.begin_loading().await;
    let (status, health) = get_health(app.clone()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(health.status, ModelStatus::Loading);

    handle.set_ready(hashing_model()).await;
    let (status, health) = get_health(app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health.status, ModelStatus::Ready);
    assert_eq!(health.model, "all-MiniLM-L6-v2");
    assert_eq!(health.dimension, Some(384));
}

#[tokio::test]
async fn test_health_status_serialized_lowercase() {
    let app = create_app(Arc::new(AppState::new_for_test(hashing_model())));
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["status"], "ready");
    assert_eq!(body["dimension"], 384);
}
