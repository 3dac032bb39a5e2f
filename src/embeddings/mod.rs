// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Sentence embedding backends
//!
//! The service loads exactly one model (all-MiniLM-L6-v2) at startup and
//! shares it read-only across requests. Backends implement
//! [`EmbeddingModel`] and return raw pooled vectors; [`embed_texts`] checks
//! the batch shape and applies L2 normalization.

pub mod errors;
pub mod handle;
pub mod hashing;
pub mod loader;
pub mod onnx_model;
pub mod pooling;

pub use errors::StartupError;
pub use handle::{ModelHandle, ModelStatus};
pub use hashing::HashingEmbeddingModel;
pub use loader::{load_default_model, ModelFiles};
pub use onnx_model::OnnxEmbeddingModel;
pub use pooling::{l2_norm, l2_normalize, mean_pool};

use anyhow::Result;
use async_trait::async_trait;

/// Name of the model served by this process
pub const MODEL_NAME: &str = "all-MiniLM-L6-v2";

/// Output dimension of all-MiniLM-L6-v2
pub const MODEL_DIMENSION: usize = 384;

/// A loaded sentence embedding model
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Model identifier (e.g. "all-MiniLM-L6-v2")
    fn model_name(&self) -> &str;

    /// Length of every vector this model produces
    fn dimension(&self) -> usize;

    /// Encodes `texts` into one pooled, unnormalized vector per text, in order.
    async fn encode(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;
}

/// Embeds a batch of texts and returns unit-length vectors in input order.
///
/// The whole batch goes to the model in one call; either every embedding
/// is returned or an error is.
pub async fn embed_texts(model: &dyn EmbeddingModel, texts: Vec<String>) -> Result<Vec<Vec<f64>>> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let expected = texts.len();
    let dimension = model.dimension();
    let raw = model.encode(texts).await?;

    if raw.len() != expected {
        anyhow::bail!(
            "model {} returned {} embeddings for {} texts",
            model.model_name(),
            raw.len(),
            expected
        );
    }

    raw.into_iter()
        .enumerate()
        .map(|(index, vector)| {
            if vector.len() != dimension {
                anyhow::bail!(
                    "Unexpected embedding dimension at index {}: {} (expected {})",
                    index,
                    vector.len(),
                    dimension
                );
            }
            let mut vector: Vec<f64> = vector.into_iter().map(f64::from).collect();
            l2_normalize(&mut vector);
            Ok(vector)
        })
        .collect()
}
