// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Smoke-test client for a running embedding server
//!
//! Sends one fixed two-text request and reports what came back. Dimension
//! and content correctness are left to whoever reads the output.

use crate::api::{EmbedRequest, EmbedResponse};
use anyhow::{Context, Result};
use std::fmt;
use tracing::debug;

/// Address the smoke test targets
pub const SERVICE_URL: &str = "http://localhost:5000/embed";

/// Payload sent by the smoke test
pub const SAMPLE_TEXTS: [&str; 2] = [
    "Beautiful 3-bedroom house in London with garden",
    "Modern apartment in Manchester city center",
];

/// Number of leading dimensions printed per embedding
pub const PREVIEW_DIMENSIONS: usize = 5;

/// Leading values and total length of one returned embedding
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingPreview {
    pub head: Vec<f64>,
    pub length: usize,
}

impl EmbeddingPreview {
    pub fn from_embedding(embedding: &[f64]) -> Self {
        Self {
            head: embedding.iter().take(PREVIEW_DIMENSIONS).copied().collect(),
            length: embedding.len(),
        }
    }
}

/// Result of one smoke-test call
#[derive(Debug, Clone, PartialEq)]
pub enum SmokeOutcome {
    /// HTTP 200 with parsed embeddings
    Passed(Vec<EmbeddingPreview>),
    /// Any other status, with the raw body
    Failed { status: u16, body: String },
}

impl SmokeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SmokeOutcome::Passed(_))
    }
}

impl fmt::Display for SmokeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SmokeOutcome::Passed(previews) => {
                for (i, preview) in previews.iter().enumerate() {
                    writeln!(
                        f,
                        "Text {} embedding (first {} dimensions): {:?}",
                        i + 1,
                        PREVIEW_DIMENSIONS,
                        preview.head
                    )?;
                    writeln!(f, "Embedding length: {}", preview.length)?;
                }
                Ok(())
            }
            SmokeOutcome::Failed { status, body } => {
                writeln!(f, "Error: {}", status)?;
                writeln!(f, "{}", body)
            }
        }
    }
}

/// POSTs the sample texts to `url`
///
/// Transport failures (connection refused, unparseable 200 body) are
/// returned as errors; non-200 statuses are a `Failed` outcome.
pub async fn run_smoke_test(url: &str) -> Result<SmokeOutcome> {
    let payload = EmbedRequest::new(SAMPLE_TEXTS);

    debug!("POST {} with {} texts", url, payload.texts.len());
    let response = reqwest::Client::new()
        .post(url)
        .json(&payload)
        .send()
        .await
        .with_context(|| format!("Failed to reach embedding service at {}", url))?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        let body = response.text().await.unwrap_or_default();
        return Ok(SmokeOutcome::Failed {
            status: status.as_u16(),
            body,
        });
    }

    let data: EmbedResponse = response
        .json()
        .await
        .context("Failed to parse embedding response")?;

    Ok(SmokeOutcome::Passed(
        data.embeddings
            .iter()
            .map(|embedding| EmbeddingPreview::from_embedding(embedding))
            .collect(),
    ))
}
