// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Process-wide model handle
//!
//! Lifecycle: `Uninitialized -> Loading -> Ready`. Once ready the model is
//! never replaced or torn down; request handling is gated on `Ready`.

use super::EmbeddingModel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Observable lifecycle state of the model handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    Uninitialized,
    Loading,
    Ready,
}

impl fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ModelStatus::Uninitialized => "uninitialized",
            ModelStatus::Loading => "loading",
            ModelStatus::Ready => "ready",
        };
        f.write_str(label)
    }
}

enum ModelState {
    Uninitialized,
    Loading,
    Ready(Arc<dyn EmbeddingModel>),
}

/// Shared slot holding the single loaded model
pub struct ModelHandle {
    model_name: String,
    state: RwLock<ModelState>,
}

impl ModelHandle {
    /// Creates an uninitialized handle for `model_name`
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            state: RwLock::new(ModelState::Uninitialized),
        }
    }

    /// Creates a handle that is already ready to serve `model`
    pub fn ready(model: Arc<dyn EmbeddingModel>) -> Self {
        Self {
            model_name: model.model_name().to_string(),
            state: RwLock::new(ModelState::Ready(model)),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Marks the start of loading. Has no effect once the model is ready.
    pub async fn begin_loading(&self) {
        let mut state = self.state.write().await;
        if matches!(*state, ModelState::Uninitialized) {
            info!("Loading embedding model: {}", self.model_name);
            *state = ModelState::Loading;
        }
    }

    /// Installs the loaded model. Returns false if a model was already installed.
    pub async fn set_ready(&self, model: Arc<dyn EmbeddingModel>) -> bool {
        let mut state = self.state.write().await;
        if matches!(*state, ModelState::Ready(_)) {
            warn!(
                "Embedding model {} is already loaded, ignoring replacement",
                self.model_name
            );
            return false;
        }

        info!(
            "✓ Embedding model ready: {} ({} dimensions)",
            model.model_name(),
            model.dimension()
        );
        *state = ModelState::Ready(model);
        true
    }

    pub async fn status(&self) -> ModelStatus {
        match *self.state.read().await {
            ModelState::Uninitialized => ModelStatus::Uninitialized,
            ModelState::Loading => ModelStatus::Loading,
            ModelState::Ready(_) => ModelStatus::Ready,
        }
    }

    /// Returns the model if it has finished loading
    pub async fn get(&self) -> Option<Arc<dyn EmbeddingModel>> {
        match &*self.state.read().await {
            ModelState::Ready(model) => Some(model.clone()),
            _ => None,
        }
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHandle")
            .field("model_name", &self.model_name)
            .finish_non_exhaustive()
    }
}
