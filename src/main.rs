// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use embedding_server::{
    api::{serve, AppState},
    config::ServerConfig,
    embeddings::{load_default_model, ModelHandle, MODEL_NAME},
    version,
};
use std::{env, sync::Arc};
use tokio::{net::TcpListener, signal};
use tracing::{error, info};

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    println!("\n⏹️  Shutting down...");
}

fn print_banner(config: &ServerConfig) {
    let separator = "=".repeat(60);
    println!("\n{}", separator);
    println!("🧠 Embedding server {}", version::version_string());
    println!("{}", separator);
    println!("Model:          {}", MODEL_NAME);
    println!("Model dir:      {}", config.model_dir.display());
    println!("Listen:         {}", config.bind_addr());
    println!("CORS origins:   {}", config.allowed_origins);
    match config.max_batch_size {
        Some(limit) => println!("Max batch:      {}", limit),
        None => println!("Max batch:      unbounded"),
    }
    println!("\nAPI Endpoints:");
    println!("  Embed:        POST http://localhost:{}/embed", config.port);
    println!("  Health:       GET  http://localhost:{}/health", config.port);
    println!("\nTest with curl:");
    println!("  curl -X POST http://localhost:{}/embed \\", config.port);
    println!("    -H 'Content-Type: application/json' \\");
    println!("    -d '{{\"texts\": [\"hello world\"]}}'");
    println!("{}\n", separator);
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = ServerConfig::parse();
    print_banner(&config);

    let handle = Arc::new(ModelHandle::new(MODEL_NAME));
    let state = Arc::new(AppState::with_handle(handle.clone(), &config));

    // Bind before loading so /health can report progress
    let listener = TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr()))?;
    let mut server = tokio::spawn(serve(listener, state, shutdown_signal()));

    handle.begin_loading().await;
    tokio::select! {
        result = &mut server => {
            // Server exited before the model finished loading
            result.context("Server task failed")??;
            return Ok(());
        }
        loaded = load_default_model(&config.model_dir, config.download) => {
            match loaded {
                Ok(model) => {
                    handle.set_ready(Arc::new(model)).await;
                    info!("✅ Ready to serve embeddings");
                }
                Err(e) => {
                    error!("❌ Startup failed: {}", e);
                    server.abort();
                    return Err(e.into());
                }
            }
        }
    }

    server.await.context("Server task failed")??;
    println!("👋 Goodbye!");
    Ok(())
}
