// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Model file resolution and startup loading
//!
//! Files are looked up in the configured model directory first. When they
//! are missing and downloading is enabled, they are fetched from the
//! Hugging Face Hub into the local hub cache.

use super::{EmbeddingModel, OnnxEmbeddingModel, StartupError, MODEL_DIMENSION, MODEL_NAME};
use hf_hub::api::tokio::Api;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Hugging Face repository hosting the ONNX export of the model
pub const HF_REPO: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// ONNX weights file name in a local model directory
pub const MODEL_FILE: &str = "model.onnx";

/// Tokenizer file name in a local model directory
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Location of the ONNX weights inside the hub repository
const HUB_MODEL_FILE: &str = "onnx/model.onnx";

/// Paths to the files needed to load the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub model_path: PathBuf,
    pub tokenizer_path: PathBuf,
}

impl ModelFiles {
    /// Expected file layout inside a local model directory
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            model_path: dir.join(MODEL_FILE),
            tokenizer_path: dir.join(TOKENIZER_FILE),
        }
    }

    /// File names that do not exist on disk
    pub fn missing(&self) -> Vec<String> {
        [&self.model_path, &self.tokenizer_path]
            .into_iter()
            .filter(|path| !path.is_file())
            .map(|path| {
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string())
            })
            .collect()
    }

    /// Uses local files when complete, otherwise downloads if allowed
    pub async fn resolve(dir: &Path, download: bool) -> Result<Self, StartupError> {
        let local = Self::in_dir(dir);
        let missing = local.missing();
        if missing.is_empty() {
            info!("Using local model files from {}", dir.display());
            return Ok(local);
        }

        if !download {
            return Err(StartupError::ModelFilesMissing {
                dir: dir.to_path_buf(),
                missing,
            });
        }

        info!(
            "Model files missing in {} ({}), downloading from {}",
            dir.display(),
            missing.join(", "),
            HF_REPO
        );
        Self::download(HF_REPO).await
    }

    /// Fetches the model files from the Hugging Face Hub
    pub async fn download(repo_id: &str) -> Result<Self, StartupError> {
        let download_error = |file: &str, reason: String| StartupError::DownloadFailed {
            repo: repo_id.to_string(),
            file: file.to_string(),
            reason,
        };

        let api = Api::new().map_err(|e| download_error(HUB_MODEL_FILE, e.to_string()))?;
        let repo = api.model(repo_id.to_string());

        let model_path = repo
            .get(HUB_MODEL_FILE)
            .await
            .map_err(|e| download_error(HUB_MODEL_FILE, e.to_string()))?;
        let tokenizer_path = repo
            .get(TOKENIZER_FILE)
            .await
            .map_err(|e| download_error(TOKENIZER_FILE, e.to_string()))?;

        info!("✓ Downloaded model files to {}", model_path.display());
        Ok(Self {
            model_path,
            tokenizer_path,
        })
    }
}

/// Resolves and loads all-MiniLM-L6-v2, checking its output dimension
pub async fn load_default_model(
    model_dir: &Path,
    download: bool,
) -> Result<OnnxEmbeddingModel, StartupError> {
    let files = ModelFiles::resolve(model_dir, download).await?;

    let model = OnnxEmbeddingModel::new(MODEL_NAME, &files.model_path, &files.tokenizer_path)
        .await
        .inspect_err(|e| error!("✗ Failed to load model {}: {}", MODEL_NAME, e))?;

    if model.dimension() != MODEL_DIMENSION {
        return Err(StartupError::DimensionMismatch {
            model: MODEL_NAME.to_string(),
            expected: MODEL_DIMENSION,
            actual: model.dimension(),
        });
    }

    info!(
        "✓ Successfully loaded model: {} ({} dimensions)",
        model.model_name(),
        model.dimension()
    );
    Ok(model)
}
