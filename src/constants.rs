// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Environment variables read by the collector
pub mod env {
    pub const API_ENDPOINT: &str = "STACKROX_API_ENDPOINT";
    pub const API_TOKEN: &str = "STACKROX_API_TOKEN";
    pub const PROXY_URL: &str = "PROXY_URL";
    pub const MAX_CONCURRENT_REQUESTS: &str = "INVENTORY_MAX_CONCURRENT_REQUESTS";
    pub const MAX_RETRIES: &str = "INVENTORY_MAX_RETRIES";
    pub const RETRY_DELAY_MS: &str = "INVENTORY_RETRY_DELAY_MS";
    pub const REQUEST_TIMEOUT_SECS: &str = "INVENTORY_REQUEST_TIMEOUT_SECS";
    pub const NAMESPACES_TIMEOUT_SECS: &str = "INVENTORY_NAMESPACES_TIMEOUT_SECS";
    pub const INSECURE_SKIP_TLS_VERIFY: &str = "INVENTORY_INSECURE_SKIP_TLS_VERIFY";
    pub const FETCH_IMAGES: &str = "INVENTORY_FETCH_IMAGES";
    pub const SEARCH_IMAGES: &str = "INVENTORY_SEARCH_IMAGES";
    pub const OUTPUT_DIR: &str = "INVENTORY_OUTPUT_DIR";
}

/// Defaults applied when the corresponding variable is unset
pub mod defaults {
    pub const PROXY_URL: &str = "http://localhost:8080";
    pub const MAX_CONCURRENT_REQUESTS: usize = 100;
    pub const MAX_RETRIES: u32 = 3;
    pub const RETRY_DELAY_MS: u64 = 1000;
    pub const REQUEST_TIMEOUT_SECS: u64 = 60;
    /// The namespace listing query is heavy on the server side
    pub const NAMESPACES_TIMEOUT_SECS: u64 = 300;
    pub const OUTPUT_DIR: &str = ".";
}

/// REST paths and the top-level key each one returns its items under
pub mod api {
    pub const CLUSTERS: &str = "/v1/clusters";
    pub const NAMESPACES: &str = "/v1/namespaces";
    pub const DEPLOYMENTS: &str = "/v1/deployments";
    pub const PODS: &str = "/v1/pods";
    pub const IMAGES: &str = "/v1/images";
    pub const NODES: &str = "/v1/nodes";
    pub const SEARCH: &str = "/v1/search";

    /// Maximum page size accepted by the API
    pub const PAGE_LIMIT: usize = 1000;
    pub const PAGINATION_LIMIT: &str = "pagination.limit";
    pub const PAGINATION_OFFSET: &str = "pagination.offset";
}

/// Names of the persisted documents
pub mod documents {
    pub const CLUSTERS: &str = "clusters";
    pub const NAMESPACES: &str = "namespaces";
    pub const DEPLOYMENTS: &str = "deployments";
    pub const PODS: &str = "pods";
    pub const IMAGES: &str = "images";
    pub const NODES: &str = "nodes";
    pub const SEARCH_RESULTS: &str = "search_results";
    pub const MASTER_PREFIX: &str = "kubernetes_master_data";
}
