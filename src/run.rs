// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! One fetch-and-merge run: collect, persist the flat collections, merge,
//! persist the merged tree.

use crate::api::{HttpBackend, ReqwestBackend, Transport, TransportSettings};
use crate::collector::{CollectOptions, Collector, Inventory};
use crate::config::Config;
use crate::constants::documents;
use crate::error::{Result, StoreError};
use crate::merge::merge;
use crate::store::InventoryStore;
use crate::types::{OrderedMap, TreeStats};
use chrono::{DateTime, Local};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, instrument};

/// Counts reported at the end of a run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub clusters: usize,
    pub nodes: usize,
    pub namespaces: usize,
    pub deployments: usize,
    pub pods: usize,
    pub images: usize,
    pub image_searches: Option<usize>,
    pub tree: TreeStats,
    /// Name the merged tree was stored under
    pub master_document: String,
}

/// Run against the real API.
///
/// Fails only when the HTTP client cannot be built or the merged tree cannot
/// be stored; every other failure is logged and leaves a gap in the output.
pub async fn run(config: &Config, store: &dyn InventoryStore) -> Result<RunSummary> {
    let backend = Arc::new(ReqwestBackend::new(config)?);
    run_with_backend(config, backend, store).await
}

#[instrument(skip_all, fields(endpoint = %config.api_endpoint))]
pub async fn run_with_backend(
    config: &Config,
    backend: Arc<dyn HttpBackend>,
    store: &dyn InventoryStore,
) -> Result<RunSummary> {
    info!("Connecting to API at {}", config.api_endpoint);

    let limiter = Arc::new(Semaphore::new(config.max_concurrent_requests));
    let transport = Arc::new(Transport::new(
        backend,
        limiter,
        TransportSettings::from_config(config),
    ));
    let collector = Collector::new(transport, CollectOptions::from_config(config));

    let inventory = collector.collect_all().await;
    persist_collections(&inventory, store);

    let tree = merge(
        &inventory.clusters,
        &inventory.nodes,
        &inventory.namespaces,
        &inventory.deployments,
        &inventory.pods,
    );
    let master_document = master_document_name(Local::now());
    let rendered = serde_json::to_value(&tree).map_err(StoreError::from)?;
    // Unlike the flat collections, losing the merged tree fails the run
    store.put(&master_document, &rendered)?;
    info!("Master JSON document created: {}", master_document);

    inventory.log_summary();
    let stats = tree.stats();
    info!(
        clusters = stats.clusters,
        nodes = stats.nodes,
        namespaces = stats.namespaces,
        deployments = stats.deployments,
        pods = stats.pods,
        "Merged tree statistics"
    );

    Ok(RunSummary {
        clusters: inventory.clusters.len(),
        nodes: inventory.node_count(),
        namespaces: inventory.namespaces.len(),
        deployments: inventory.deployments.len(),
        pods: inventory.pods.len(),
        images: inventory.images.len(),
        image_searches: inventory.image_search.as_ref().map(OrderedMap::len),
        tree: stats,
        master_document,
    })
}

pub fn master_document_name(now: DateTime<Local>) -> String {
    format!(
        "{}_{}",
        documents::MASTER_PREFIX,
        now.format("%Y%m%d_%H%M%S")
    )
}

/// Write every flat collection as received from the API. Failures are logged
/// and do not stop the run.
fn persist_collections(inventory: &Inventory, store: &dyn InventoryStore) {
    let raw = &inventory.raw;
    persist(store, documents::CLUSTERS, &raw.clusters);
    persist(store, documents::NAMESPACES, &raw.namespaces);
    persist(store, documents::DEPLOYMENTS, &raw.deployments);
    persist(store, documents::PODS, &raw.pods);
    persist(store, documents::IMAGES, &raw.images);

    let nodes: Map<String, Value> = raw
        .nodes
        .iter()
        .map(|(cluster_id, items)| (cluster_id.to_string(), wrap(documents::NODES, items)))
        .collect();
    save(store, documents::NODES, Ok(Value::Object(nodes)));

    if let Some(search) = &inventory.image_search {
        save(store, documents::SEARCH_RESULTS, serde_json::to_value(search));
    }
}

/// `{ "<name>": [...] }`
fn wrap(name: &str, items: &[Value]) -> Value {
    let mut wrapper = Map::new();
    wrapper.insert(name.to_string(), Value::Array(items.to_vec()));
    Value::Object(wrapper)
}

fn persist(store: &dyn InventoryStore, name: &str, items: &[Value]) {
    save(store, name, Ok(wrap(name, items)));
    info!("Saved {} data. Total {}: {}", name, name, items.len());
}

fn save(store: &dyn InventoryStore, name: &str, document: serde_json::Result<Value>) {
    let outcome = document
        .map_err(StoreError::from)
        .and_then(|doc| store.put(name, &doc));
    if let Err(e) = outcome {
        error!(document = name, error = %e, "Failed to save document");
    }
}
