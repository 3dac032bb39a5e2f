// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Route registration tests
//!
//! - POST /embed is registered
//! - Other methods on /embed are rejected
//! - Unknown paths return 404

use super::support::{app_with_model, hashing_model};
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use tower::util::ServiceExt;

#[tokio::test]
async fn test_embed_route_accepts_post() {
    let app = app_with_model(hashing_model());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/embed")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"texts": ["test"]}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_embed_route_rejects_get() {
    let app = app_with_model(hashing_model());
    let request = Request::builder()
        .method(Method::GET)
        .uri("/embed")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_unknown_route_not_found() {
    let app = app_with_model(hashing_model());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/embed")
        .body(Body::from(r#"{"texts": ["test"]}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
