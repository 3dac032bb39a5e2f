// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /embed HTTP handler

use crate::api::embed::{EmbedRequest, EmbedResponse};
use crate::api::http_server::AppState;
use crate::api::ApiError;
use crate::embeddings::embed_texts;
use axum::{body::Bytes, extract::State, Json};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// POST /embed handler
///
/// # Request Body
/// ```json
/// { "texts": ["text1", "text2", ...] }
/// ```
///
/// # Response Body
/// ```json
/// { "embeddings": [[0.1, 0.2, ...], ...] }
/// ```
///
/// # Errors
/// - 503 while the model is still loading
/// - 400 when the body is not JSON
/// - 422 when the body does not match the schema or exceeds the batch cap
/// - 500 when inference fails
///
/// The body is taken as raw bytes so the schema check, not the extractor,
/// produces the error and a missing content type is tolerated.
pub async fn embed_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<EmbedResponse>, ApiError> {
    let Some(model) = state.model.get().await else {
        return Err(ApiError::ServiceUnavailable(format!(
            "embedding model {} is {}",
            state.model.model_name(),
            state.model.status().await
        )));
    };

    let request = EmbedRequest::from_slice(&body)?;
    request.validate(state.max_batch_size)?;

    let count = request.texts.len();
    debug!("Embedding {} texts with {}", count, model.model_name());

    let started = Instant::now();
    let embeddings = embed_texts(model.as_ref(), request.texts)
        .await
        .map_err(|e| ApiError::InternalError(format!("embedding inference failed: {:#}", e)))?;

    info!(
        "Embedded {} texts in {:.1}ms",
        count,
        started.elapsed().as_secs_f64() * 1000.0
    );

    Ok(Json(EmbedResponse::from(embeddings)))
}
