// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stackrox_inventory::config::Config;
use stackrox_inventory::run::run;
use stackrox_inventory::store::JsonFileStore;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting inventory collection");
    let started = Instant::now();

    // Load configuration; missing endpoint or token stops us before any request
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: endpoint={}, max_concurrent_requests={}, output_dir={}",
        config.api_endpoint,
        config.max_concurrent_requests,
        config.output_dir.display()
    );

    // Request failures only leave gaps; no HTTP client or no merged tree exits non-zero
    let store = JsonFileStore::new(&config.output_dir);
    let summary = run(&config, &store).await?;

    info!(
        "Inventory collection completed in {:?}. Merged tree written to {}",
        started.elapsed(),
        store.path_for(&summary.master_document).display()
    );
    Ok(())
}
