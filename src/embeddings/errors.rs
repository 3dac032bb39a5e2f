// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for model resolution and loading
//!
//! Every variant is fatal: the service never becomes ready without a model.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StartupError {
    /// Model files are not on disk and downloading is disabled
    #[error("Model files missing in {}: {} (place them there or enable --download)", dir.display(), missing.join(", "))]
    ModelFilesMissing { dir: PathBuf, missing: Vec<String> },

    /// Fetching a file from the Hugging Face Hub failed
    #[error("Failed to download {file} from {repo}: {reason}")]
    DownloadFailed {
        repo: String,
        file: String,
        reason: String,
    },

    /// ONNX Runtime or the tokenizer rejected the model files
    #[error("Failed to load model {model}: {reason}")]
    LoadFailed { model: String, reason: String },

    /// Model loaded but produces vectors of the wrong size
    #[error("Model {model} dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        model: String,
        expected: usize,
        actual: usize,
    },

    /// The blocking load task panicked or was cancelled
    #[error("Model loading task failed: {0}")]
    TaskFailed(String),
}
