// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Server configuration
//!
//! Every flag can also be supplied through the environment (a `.env` file is
//! loaded by the binary before parsing).

use axum::http::HeaderValue;
use clap::{ArgAction, Parser};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default request body ceiling (16 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Origins allowed to call the service from a browser context
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AllowedOrigins {
    /// Wildcard policy: any origin, any method, any header
    #[default]
    Any,
    /// Explicit origin allow-list (e.g. `http://localhost:3000`)
    List(Vec<String>),
}

impl AllowedOrigins {
    pub fn is_any(&self) -> bool {
        matches!(self, AllowedOrigins::Any)
    }
}

impl FromStr for AllowedOrigins {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let origins: Vec<String> = s
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
            return Ok(AllowedOrigins::Any);
        }

        for origin in &origins {
            HeaderValue::from_str(origin)
                .map_err(|_| format!("invalid origin '{}' in allowed origins", origin))?;
        }

        Ok(AllowedOrigins::List(origins))
    }
}

impl fmt::Display for AllowedOrigins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllowedOrigins::Any => write!(f, "*"),
            AllowedOrigins::List(origins) => write!(f, "{}", origins.join(",")),
        }
    }
}

/// Embedding server configuration
#[derive(Parser, Debug, Clone)]
#[command(name = "embedding-server")]
#[command(version)]
#[command(about = "Serves all-MiniLM-L6-v2 sentence embeddings over HTTP", long_about = None)]
pub struct ServerConfig {
    /// Interface to bind
    #[arg(long, env = "EMBED_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "EMBED_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Directory holding model.onnx and tokenizer.json
    #[arg(
        long,
        env = "EMBED_MODEL_DIR",
        default_value = "./models/all-MiniLM-L6-v2-onnx"
    )]
    pub model_dir: PathBuf,

    /// Download the model from the Hugging Face Hub when the files are missing
    #[arg(long, env = "EMBED_DOWNLOAD_MODEL", default_value_t = true, action = ArgAction::Set)]
    pub download: bool,

    /// `*` or a comma-separated list of allowed origins
    #[arg(long, env = "EMBED_ALLOWED_ORIGINS", default_value = "*")]
    pub allowed_origins: AllowedOrigins,

    /// Maximum number of texts per request (unbounded when unset)
    #[arg(long, env = "EMBED_MAX_BATCH_SIZE")]
    pub max_batch_size: Option<usize>,

    /// Maximum request body size in bytes
    #[arg(long, env = "EMBED_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            model_dir: PathBuf::from("./models/all-MiniLM-L6-v2-onnx"),
            download: true,
            allowed_origins: AllowedOrigins::Any,
            max_batch_size: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}
