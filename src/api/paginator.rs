// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Offset/limit pagination over a list endpoint.

use super::transport::{Query, Transport};
use crate::constants::api::{PAGE_LIMIT, PAGINATION_LIMIT, PAGINATION_OFFSET};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Walks a list endpoint page by page until a short page is returned.
///
/// Pages are fetched strictly in offset order. Items are not deduplicated:
/// a backing collection that changes mid-walk can yield repeats or gaps.
#[derive(Clone)]
pub struct Paginator {
    transport: Arc<Transport>,
    page_limit: usize,
}

impl Paginator {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self::with_page_limit(transport, PAGE_LIMIT)
    }

    pub fn with_page_limit(transport: Arc<Transport>, page_limit: usize) -> Self {
        Self {
            transport,
            page_limit: page_limit.max(1),
        }
    }

    pub fn transport(&self) -> &Arc<Transport> {
        &self.transport
    }

    /// Fetch every item under `items_key` across all pages of `path`.
    ///
    /// A failed page ends the walk and the items gathered so far are returned.
    #[instrument(skip(self, query, timeout_override))]
    pub async fn fetch_all(
        &self,
        path: &str,
        items_key: &str,
        query: &Query,
        timeout_override: Option<Duration>,
    ) -> Vec<Value> {
        let mut all_items = Vec::new();
        let mut offset = 0;

        loop {
            let page_query = Query::new()
                .with(PAGINATION_LIMIT, self.page_limit)
                .with(PAGINATION_OFFSET, offset)
                .merged(query);

            let body = match self.transport.fetch(path, &page_query, timeout_override).await {
                Ok(body) => body,
                Err(e) => {
                    warn!(
                        offset = offset,
                        collected = all_items.len(),
                        error = %e,
                        "Page unavailable, keeping items collected so far"
                    );
                    break;
                }
            };

            let items = extract_items(body, items_key);
            let page_len = items.len();
            debug!(offset = offset, count = page_len, "Extracted items from page");
            all_items.extend(items);

            if page_len < self.page_limit {
                break;
            }
            offset += self.page_limit;
        }

        all_items
    }
}

/// Take the list stored under `key`. A single object counts as a one-item
/// list; anything else (absent, null, scalar) counts as no items.
pub fn extract_items(body: Value, key: &str) -> Vec<Value> {
    let Value::Object(mut fields) = body else {
        return Vec::new();
    };

    match fields.remove(key) {
        Some(Value::Array(items)) => items,
        Some(item @ Value::Object(_)) => vec![item],
        _ => Vec::new(),
    }
}
