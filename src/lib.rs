// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod client;
pub mod config;
pub mod embeddings;
pub mod version;

pub use api::{create_app, ApiError, AppState};
pub use config::{AllowedOrigins, ServerConfig};
pub use embeddings::{
    embed_texts, EmbeddingModel, HashingEmbeddingModel, ModelHandle, ModelStatus,
    OnnxEmbeddingModel, StartupError,
};
