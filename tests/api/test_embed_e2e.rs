// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! End-to-End Tests for POST /embed
//!
//! These tests drive the full router (CORS, tracing, body limit, handler)
//! with the deterministic hashing backend in place of model weights.

use super::support::{app_with_model, embeddings_of, hashing_model, norm, post_embed};
use axum::http::StatusCode;
use serde_json::json;

/// Single text returns one 384-dimensional unit vector
#[tokio::test]
async fn test_e2e_single_embedding() {
    let app = app_with_model(hashing_model());

    let (status, body) = post_embed(app, r#"{"texts": ["hello world"]}"#).await;

    assert_eq!(status, StatusCode::OK);
    let embeddings = embeddings_of(&body);
    assert_eq!(embeddings.len(), 1);
    assert_eq!(embeddings[0].len(), 384);
    assert!((norm(&embeddings[0]) - 1.0).abs() < 1e-5);
}

/// Empty batch returns an empty list, not an error
#[tokio::test]
async fn test_e2e_empty_batch() {
    let app = app_with_model(hashing_model());

    let (status, body) = post_embed(app, r#"{"texts": []}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"embeddings": []}));
}

/// Output count and order follow the input
#[tokio::test]
async fn test_e2e_shape_and_order_preserved() {
    let model = hashing_model();
    let texts = ["first", "second", "", "first"];

    let (status, body) = post_embed(
        app_with_model(model.clone()),
        &json!({ "texts": texts }).to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let embeddings = embeddings_of(&body);
    assert_eq!(embeddings.len(), texts.len());
    for embedding in &embeddings {
        assert_eq!(embedding.len(), 384, "every vector has the same dimension");
        assert!((norm(embedding) - 1.0).abs() < 1e-5);
    }

    // Each position matches a single-text request for the same text
    for (text, embedding) in texts.iter().zip(&embeddings) {
        let (_, single) = post_embed(
            app_with_model(model.clone()),
            &json!({ "texts": [text] }).to_string(),
        )
        .await;
        assert_eq!(&embeddings_of(&single)[0], embedding);
    }

    assert_eq!(embeddings[0], embeddings[3]);
    assert_ne!(embeddings[0], embeddings[1]);
}

/// Same text in separate requests gives the same vector
#[tokio::test]
async fn test_e2e_deterministic_across_requests() {
    let model = hashing_model();
    let body = r#"{"texts": ["Modern apartment in Manchester city center"]}"#;

    let (_, first) = post_embed(app_with_model(model.clone()), body).await;
    let (_, second) = post_embed(app_with_model(model), body).await;

    let first = embeddings_of(&first);
    let second = embeddings_of(&second);
    for (a, b) in first[0].iter().zip(&second[0]) {
        assert!((a - b).abs() < 1e-12);
    }
}

/// Requests without a JSON content type are still accepted
#[tokio::test]
async fn test_e2e_missing_content_type_accepted() {
    use axum::{body::Body, http::Request};
    use tower::util::ServiceExt;

    let app = app_with_model(hashing_model());
    let request = Request::builder()
        .method("POST")
        .uri("/embed")
        .body(Body::from(r#"{"texts": ["curl -d default"]}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
