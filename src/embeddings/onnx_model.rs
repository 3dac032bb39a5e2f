// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX Embedding Model Wrapper
//!
//! This module provides a wrapper around ONNX Runtime for running
//! the all-MiniLM-L6-v2 sentence transformer model.
//!
//! Features:
//! - ONNX model loading from disk
//! - Optional CUDA acceleration (`cuda` feature) with CPU fallback
//! - BERT tokenization with truncation and batch padding
//! - Attention-masked mean pooling over token embeddings
//! - Inference on the blocking pool, serialized through one session lock

use super::pooling::mean_pool;
use super::{EmbeddingModel, StartupError};
use anyhow::{Context, Result};
use async_trait::async_trait;
use ndarray::{Array2, Axis, Ix2};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::session::Session;
use ort::value::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info};

/// Maximum sequence length for all-MiniLM-L6-v2; longer texts are truncated
pub const MAX_SEQUENCE_LENGTH: usize = 256;

/// Tokenized batch ready for the session
struct BatchInputs {
    input_ids: Array2<i64>,
    attention_mask: Array2<i64>,
    token_type_ids: Array2<i64>,
}

/// ONNX-based embedding model (all-MiniLM-L6-v2)
///
/// # Thread Safety
/// All fields are wrapped in Arc for cheap cloning. `Session::run` needs
/// exclusive access, so inference calls are serialized by the session mutex.
#[derive(Clone)]
pub struct OnnxEmbeddingModel {
    /// ONNX Runtime session
    session: Arc<Mutex<Session>>,

    /// BERT tokenizer
    tokenizer: Arc<Tokenizer>,

    model_name: String,

    /// Output dimension, read from the model during load
    dimension: usize,

    max_length: usize,
}

impl std::fmt::Debug for OnnxEmbeddingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEmbeddingModel")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .field("max_length", &self.max_length)
            .finish_non_exhaustive()
    }
}

impl OnnxEmbeddingModel {
    /// Loads an ONNX embedding model from disk paths
    ///
    /// Loading runs on the blocking pool. A validation inference is run to
    /// discover the output dimension.
    ///
    /// # Errors
    /// - Model or tokenizer file not found or invalid
    /// - ONNX Runtime initialization fails
    /// - Model output is not `[batch, seq_len, hidden]`
    ///
    /// # Example
    /// ```ignore
    /// let model = OnnxEmbeddingModel::new(
    ///     "all-MiniLM-L6-v2",
    ///     "./models/all-MiniLM-L6-v2-onnx/model.onnx",
    ///     "./models/all-MiniLM-L6-v2-onnx/tokenizer.json",
    /// ).await?;
    /// ```
    pub async fn new<P: AsRef<Path>>(
        model_name: impl Into<String>,
        model_path: P,
        tokenizer_path: P,
    ) -> Result<Self, StartupError> {
        let model_name = model_name.into();
        let model_path = model_path.as_ref().to_path_buf();
        let tokenizer_path = tokenizer_path.as_ref().to_path_buf();

        let name = model_name.clone();
        tokio::task::spawn_blocking(move || Self::load_blocking(name, model_path, tokenizer_path))
            .await
            .map_err(|e| StartupError::TaskFailed(e.to_string()))?
            .map_err(|e| StartupError::LoadFailed {
                model: model_name,
                reason: format!("{:#}", e),
            })
    }

    fn load_blocking(
        model_name: String,
        model_path: PathBuf,
        tokenizer_path: PathBuf,
    ) -> Result<Self> {
        if !model_path.exists() {
            anyhow::bail!("ONNX model file not found: {}", model_path.display());
        }
        if !tokenizer_path.exists() {
            anyhow::bail!("Tokenizer file not found: {}", tokenizer_path.display());
        }

        info!("🚀 Initializing ONNX embedding model {}", model_name);
        let session = Self::build_session(&model_path)?;
        info!("✅ ONNX session created from {}", model_path.display());

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Failed to configure truncation: {}", e))?;
        // Batches are padded by hand to the longest sequence
        tokenizer.with_padding(None);

        let mut model = Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            model_name,
            dimension: 0,
            max_length: MAX_SEQUENCE_LENGTH,
        };

        let probe = model.encode_blocking(&["validation test".to_string()])?;
        model.dimension = probe.first().map(Vec::len).unwrap_or(0);
        if model.dimension == 0 {
            anyhow::bail!("Model produced an empty embedding during validation");
        }

        Ok(model)
    }

    fn configure(builder: SessionBuilder) -> Result<SessionBuilder> {
        Ok(builder
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?)
    }

    fn build_session(model_path: &Path) -> Result<Session> {
        #[cfg(feature = "cuda")]
        {
            use ort::execution_providers::CUDAExecutionProvider;
            use tracing::warn;

            info!("   Attempting CUDA execution provider...");
            let cuda_builder = Session::builder()
                .context("Failed to create session builder")?
                .with_execution_providers([CUDAExecutionProvider::default().build()])
                .context("Failed to set CUDA execution provider")?;
            match Self::configure(cuda_builder)?.commit_from_file(model_path) {
                Ok(session) => {
                    info!("✅ CUDA execution provider initialized successfully!");
                    return Ok(session);
                }
                Err(e) => {
                    warn!("⚠️  CUDA execution provider failed: {}", e);
                    warn!("   Falling back to CPU execution provider");
                }
            }
        }

        let builder = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?;
        Self::configure(builder)?
            .commit_from_file(model_path)
            .with_context(|| format!("Failed to load ONNX model from {}", model_path.display()))
    }

    /// Tokenizes texts and pads every sequence to the longest one in the batch
    fn tokenize(&self, texts: &[String]) -> Result<BatchInputs> {
        let encodings = texts
            .iter()
            .map(|text| {
                self.tokenizer
                    .encode(text.as_str(), true)
                    .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))
            })
            .collect::<Result<Vec<_>>>()?;

        let max_len = encodings
            .iter()
            .map(|enc| enc.get_ids().len())
            .max()
            .unwrap_or(0);

        let mut input_ids = Vec::with_capacity(texts.len() * max_len);
        let mut attention_mask = Vec::with_capacity(texts.len() * max_len);

        for encoding in &encodings {
            let ids = encoding.get_ids();
            let padding_needed = max_len - ids.len();

            input_ids.extend(ids.iter().map(|&id| id as i64));
            input_ids.extend(std::iter::repeat(0i64).take(padding_needed));

            attention_mask.extend(encoding.get_attention_mask().iter().map(|&m| m as i64));
            attention_mask.extend(std::iter::repeat(0i64).take(padding_needed));
        }

        let shape = (texts.len(), max_len);
        Ok(BatchInputs {
            input_ids: Array2::from_shape_vec(shape, input_ids)
                .context("Failed to create batch input_ids array")?,
            attention_mask: Array2::from_shape_vec(shape, attention_mask)
                .context("Failed to create batch attention_mask array")?,
            token_type_ids: Array2::zeros(shape),
        })
    }

    /// Runs one batch through the session and mean-pools each item
    fn encode_blocking(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let inputs = self.tokenize(texts)?;
        let attention_mask = inputs.attention_mask.clone();

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("ONNX session lock poisoned"))?;
        let outputs = session.run(ort::inputs![
            "input_ids" => Value::from_array(inputs.input_ids)?,
            "attention_mask" => Value::from_array(inputs.attention_mask)?,
            "token_type_ids" => Value::from_array(inputs.token_type_ids)?
        ])?;

        // Index [0] rather than a name: exports differ in output naming
        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        // Token-level embeddings: [batch, seq_len, hidden_dim]
        if output.ndim() != 3 || output.shape()[0] != texts.len() {
            anyhow::bail!(
                "Model outputs unexpected dimensions: {:?} (expected [{}, seq_len, hidden])",
                output.shape(),
                texts.len()
            );
        }

        let mut embeddings = Vec::with_capacity(texts.len());
        for (batch_idx, mask) in attention_mask.outer_iter().enumerate() {
            let tokens = output
                .index_axis(Axis(0), batch_idx)
                .into_dimensionality::<Ix2>()
                .context("Failed to view token embeddings")?;
            let mask: Vec<i64> = mask.to_vec();
            embeddings.push(mean_pool(tokens, &mask));
        }

        debug!(
            "Encoded {} texts with {} ({} tokens max)",
            texts.len(),
            self.model_name,
            attention_mask.ncols()
        );

        Ok(embeddings)
    }

    /// Counts tokens in a text string, including special tokens
    pub fn count_tokens(&self, text: &str) -> Result<usize> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

        Ok(encoding.get_attention_mask().iter().map(|&m| m as usize).sum())
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

#[async_trait]
impl EmbeddingModel for OnnxEmbeddingModel {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    /// Runs to completion on the blocking pool even if the caller goes away
    async fn encode(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let model = self.clone();
        tokio::task::spawn_blocking(move || model.encode_blocking(&texts))
            .await
            .context("Embedding task failed")?
    }
}
