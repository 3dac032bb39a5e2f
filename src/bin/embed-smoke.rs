// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use embedding_server::client::{run_smoke_test, SERVICE_URL};

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "warn");
    }
    tracing_subscriber::fmt::init();

    println!("Testing embedding service...");
    let outcome = run_smoke_test(SERVICE_URL).await?;
    print!("{}", outcome);

    if outcome.is_success() {
        println!("Test completed successfully!");
    } else {
        println!("Test failed!");
    }

    Ok(())
}
