// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the embedding server

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-minilm-embed-2025-10-20";

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2025-10-20";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "embed-endpoint",
    "unit-norm-embeddings",
    "onnx-runtime",
    "hf-hub-download",
    "open-cors",
    "readiness-health-check",
];

/// Returns a one-line description used in startup logs
pub fn version_string() -> String {
    format!("{} (built {})", VERSION, BUILD_DATE)
}
