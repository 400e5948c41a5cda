// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Concurrent retrieval of every inventory collection.
//!
//! Work runs in waves separated by join barriers: the top-level collections
//! first, then one node lookup per cluster, then (optionally) one search per
//! image. All requests share the transport's concurrency limiter. A failing
//! request only empties its own slice of the inventory.

use crate::api::{extract_items, Paginator, Query, Transport};
use crate::config::Config;
use crate::constants::{api, documents};
use crate::types::{Cluster, Deployment, Image, Namespace, Node, OrderedMap, Pod};
use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument, warn};

#[derive(Clone, Debug, Default)]
pub struct CollectOptions {
    /// Timeout override for the namespace listing
    pub namespaces_timeout: Option<Duration>,
    pub fetch_images: bool,
    pub search_images: bool,
}

impl CollectOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            namespaces_timeout: Some(config.namespaces_timeout),
            fetch_images: config.fetch_images,
            search_images: config.search_images,
        }
    }
}

/// API items exactly as received, one list per collection
#[derive(Clone, Debug, Default)]
pub struct RawCollections {
    pub clusters: Vec<Value>,
    /// Node items keyed by cluster ID, in cluster order
    pub nodes: OrderedMap<Vec<Value>>,
    pub namespaces: Vec<Value>,
    pub deployments: Vec<Value>,
    pub pods: Vec<Value>,
    pub images: Vec<Value>,
}

/// Everything retrieved in one run, still flat
#[derive(Clone, Debug, Default)]
pub struct Inventory {
    pub clusters: Vec<Cluster>,
    /// Node lists keyed by cluster ID, in cluster order
    pub nodes: OrderedMap<Vec<Node>>,
    pub namespaces: Vec<Namespace>,
    pub deployments: Vec<Deployment>,
    pub pods: Vec<Pod>,
    pub images: Vec<Image>,
    /// Search results keyed by image name; `None` when searching is disabled
    pub image_search: Option<OrderedMap<Value>>,
    pub raw: RawCollections,
}

impl Inventory {
    pub fn node_count(&self) -> usize {
        self.nodes.values().map(Vec::len).sum()
    }

    pub fn log_summary(&self) {
        info!("Total clusters: {}", self.clusters.len());
        info!("Total nodes: {}", self.node_count());
        info!("Total namespaces: {}", self.namespaces.len());
        info!("Total deployments: {}", self.deployments.len());
        info!("Total pods: {}", self.pods.len());
        info!("Total images: {}", self.images.len());
        if let Some(search) = &self.image_search {
            info!("Total image searches: {}", search.len());
        }
    }
}

pub struct Collector {
    paginator: Paginator,
    options: CollectOptions,
}

impl Collector {
    pub fn new(transport: Arc<Transport>, options: CollectOptions) -> Self {
        Self::with_paginator(Paginator::new(transport), options)
    }

    pub fn with_paginator(paginator: Paginator, options: CollectOptions) -> Self {
        Self { paginator, options }
    }

    fn transport(&self) -> &Transport {
        self.paginator.transport()
    }

    /// Run every wave and return the flat inventory
    #[instrument(skip(self))]
    pub async fn collect_all(&self) -> Inventory {
        let started = Instant::now();
        let (
            (raw_clusters, clusters),
            (raw_namespaces, namespaces),
            (raw_deployments, deployments),
            (raw_pods, pods),
            (raw_images, images),
        ) = tokio::join!(
            self.fetch_collection::<Cluster>(api::CLUSTERS, documents::CLUSTERS, None),
            self.fetch_collection::<Namespace>(
                api::NAMESPACES,
                documents::NAMESPACES,
                self.options.namespaces_timeout,
            ),
            self.fetch_collection::<Deployment>(api::DEPLOYMENTS, documents::DEPLOYMENTS, None),
            self.fetch_collection::<Pod>(api::PODS, documents::PODS, None),
            self.fetch_images(),
        );
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Collection wave complete"
        );

        let started = Instant::now();
        let raw_nodes = self.fetch_nodes(&clusters).await;
        let nodes: OrderedMap<Vec<Node>> = raw_nodes
            .iter()
            .map(|(cluster_id, items)| {
                (cluster_id.to_string(), decode_records(documents::NODES, items))
            })
            .collect();
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            clusters = nodes.len(),
            "Node wave complete"
        );

        let image_search = if self.options.search_images {
            let started = Instant::now();
            let results = self.search_images(&images).await;
            info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                searches = results.len(),
                "Image search wave complete"
            );
            Some(results)
        } else {
            None
        };

        Inventory {
            clusters,
            nodes,
            namespaces,
            deployments,
            pods,
            images,
            image_search,
            raw: RawCollections {
                clusters: raw_clusters,
                nodes: raw_nodes,
                namespaces: raw_namespaces,
                deployments: raw_deployments,
                pods: raw_pods,
                images: raw_images,
            },
        }
    }

    /// Fetch every page of a collection, returning the raw items alongside
    /// one decoded record per item
    async fn fetch_collection<T: DeserializeOwned + Default>(
        &self,
        path: &str,
        collection: &str,
        timeout_override: Option<Duration>,
    ) -> (Vec<Value>, Vec<T>) {
        info!(collection = collection, "Fetching collection");
        let items = self
            .paginator
            .fetch_all(path, collection, &Query::new(), timeout_override)
            .await;
        let records = decode_records(collection, &items);
        info!(collection = collection, count = records.len(), "Fetched collection");
        (items, records)
    }

    async fn fetch_images(&self) -> (Vec<Value>, Vec<Image>) {
        if !self.options.fetch_images {
            return (Vec::new(), Vec::new());
        }
        self.fetch_collection(api::IMAGES, documents::IMAGES, None)
            .await
    }

    /// One concurrent node lookup per distinct cluster ID
    pub async fn fetch_nodes(&self, clusters: &[Cluster]) -> OrderedMap<Vec<Value>> {
        let mut seen = HashSet::new();
        let lookups = clusters
            .iter()
            .map(|c| c.id.as_str())
            .filter(|id| !id.is_empty() && seen.insert(*id))
            .map(|id| async move { (id.to_string(), self.fetch_cluster_nodes(id).await) })
            .collect::<Vec<_>>();

        join_all(lookups).await.into_iter().collect()
    }

    async fn fetch_cluster_nodes(&self, cluster_id: &str) -> Vec<Value> {
        info!(cluster_id = cluster_id, "Fetching nodes for cluster");
        let path = format!("{}/{}", api::NODES, cluster_id);
        match self.transport().fetch(&path, &Query::new(), None).await {
            Ok(body) => extract_items(body, documents::NODES),
            Err(e) => {
                error!(cluster_id = cluster_id, error = %e, "Node lookup failed, recording no nodes");
                Vec::new()
            }
        }
    }

    /// One concurrent search per distinct image name. A failed search is
    /// recorded as `null`.
    pub async fn search_images(&self, images: &[Image]) -> OrderedMap<Value> {
        let mut seen = HashSet::new();
        let searches = images
            .iter()
            .map(|i| i.name.as_str())
            .filter(|name| !name.is_empty() && seen.insert(*name))
            .map(|name| async move { (name.to_string(), self.search_image(name).await) })
            .collect::<Vec<_>>();

        join_all(searches).await.into_iter().collect()
    }

    async fn search_image(&self, image_name: &str) -> Value {
        info!(image = image_name, "Searching for image");
        let query = Query::new()
            .with("query", format!("Image:{}", image_name))
            .with("categories", "DEPLOYMENTS")
            .with("categories", "IMAGES");

        self.transport()
            .fetch(api::SEARCH, &query, None)
            .await
            .unwrap_or(Value::Null)
    }
}

/// Decode raw items into typed records, one per item. Fields of the wrong
/// type decode as empty; an item that is not an object becomes an empty record.
fn decode_records<T: DeserializeOwned + Default>(collection: &str, items: &[Value]) -> Vec<T> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            T::deserialize(item).unwrap_or_else(|e| {
                warn!(collection = collection, index = index, error = %e, "Record is not an object, keeping an empty entry");
                T::default()
            })
        })
        .collect()
}
