// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::cors::cors_layer;
use super::embed::embed_handler;
use crate::config::{AllowedOrigins, ServerConfig, DEFAULT_MAX_BODY_BYTES};
use crate::embeddings::{EmbeddingModel, ModelHandle, ModelStatus};
use crate::version;

/// Shared state for all route handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub model: Arc<ModelHandle>,
    pub allowed_origins: AllowedOrigins,
    pub max_batch_size: Option<usize>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn with_handle(model: Arc<ModelHandle>, config: &ServerConfig) -> Self {
        Self {
            model,
            allowed_origins: config.allowed_origins.clone(),
            max_batch_size: config.max_batch_size,
            max_body_bytes: config.max_body_bytes,
        }
    }

    /// Ready state with an open CORS policy and no batch cap
    pub fn new_for_test(model: Arc<dyn EmbeddingModel>) -> Self {
        Self {
            model: Arc::new(ModelHandle::ready(model)),
            allowed_origins: AllowedOrigins::Any,
            max_batch_size: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ModelStatus,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<usize>,
    pub version: String,
}

pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/embed", post(embed_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(state.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.allowed_origins))
        .with_state(state)
}

/// Serves the app on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!("Embedding server listening on {}", addr);

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Embedding server stopped");
    Ok(())
}

/// 200 once the model is ready, 503 before
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let model = state.model.get().await;
    let health = HealthResponse {
        status: state.model.status().await,
        model: state.model.model_name().to_string(),
        dimension: model.as_ref().map(|m| m.dimension()),
        version: version::VERSION_NUMBER.to_string(),
    };

    let status = if model.is_some() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(health))
}
