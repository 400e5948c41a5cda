// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking inventory API responses.

use crate::api::HttpBackend;
use crate::error::{FetchError, StoreError};
use crate::store::InventoryStore;
use bytes::Bytes;
use futures::future::BoxFuture;
use http::{Response, StatusCode};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// What the mock answers a single request with
#[derive(Clone, Debug)]
pub enum MockReply {
    Json { status: u16, body: String },
    ConnectionError,
    /// Never completes, so the transport timeout fires
    Hang,
}

impl MockReply {
    pub fn ok(body: Value) -> Self {
        MockReply::Json {
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn status(status: u16) -> Self {
        MockReply::Json {
            status,
            body: r#"{"error":"mock failure"}"#.to_string(),
        }
    }

    pub fn raw(body: &str) -> Self {
        MockReply::Json {
            status: 200,
            body: body.to_string(),
        }
    }
}

/// Request lifecycle entry, recorded by path in the order it happened
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MockEvent {
    Started(String),
    Finished(String),
}

#[derive(Default)]
struct MockState {
    queued: HashMap<String, VecDeque<MockReply>>,
    fixed: HashMap<String, MockReply>,
    requests: Vec<Url>,
    events: Vec<MockEvent>,
}

/// A mock HTTP backend that returns predefined replies based on request paths.
///
/// Queued replies for a path are consumed first, in order; after that the
/// fixed reply for the path (if any) is returned on every call. Unmatched
/// paths answer 404.
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
    delay: Duration,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every GET to `path` with `status` and `body`
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.state.lock().unwrap().fixed.insert(
            path.to_string(),
            MockReply::Json {
                status,
                body: body.to_string(),
            },
        );
        self
    }

    /// Answer every GET to `path` with a 200 JSON body
    pub fn on_get_json(self, path: &str, body: Value) -> Self {
        self.state
            .lock()
            .unwrap()
            .fixed
            .insert(path.to_string(), MockReply::ok(body));
        self
    }

    /// Queue a one-shot reply for the next GET to `path`
    pub fn enqueue(self, path: &str, reply: MockReply) -> Self {
        self.state
            .lock()
            .unwrap()
            .queued
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    /// Hold every request open for `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn requests(&self) -> Vec<Url> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Url> {
        self.requests()
            .into_iter()
            .filter(|u| u.path() == path)
            .collect()
    }

    /// Highest number of requests observed in flight at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn events(&self) -> Vec<MockEvent> {
        self.state.lock().unwrap().events.clone()
    }

    /// Highest number of requests under `prefix` in flight at the same time
    pub fn peak_in_flight_for(&self, prefix: &str) -> usize {
        let (mut current, mut peak) = (0usize, 0usize);
        for event in self.events() {
            match event {
                MockEvent::Started(path) if path.starts_with(prefix) => {
                    current += 1;
                    peak = peak.max(current);
                }
                MockEvent::Finished(path) if path.starts_with(prefix) => current -= 1,
                _ => {}
            }
        }
        peak
    }

    fn next_reply(&self, url: &Url) -> MockReply {
        let mut state = self.state.lock().unwrap();
        state.requests.push(url.clone());
        let path = url.path().to_string();
        state.events.push(MockEvent::Started(path.clone()));

        if let Some(reply) = state.queued.get_mut(&path).and_then(VecDeque::pop_front) {
            return reply;
        }

        // Try exact match first, then prefix match for paths like /v1/nodes/<id>
        if let Some(reply) = state.fixed.get(&path) {
            return reply.clone();
        }
        for (p, reply) in state.fixed.iter() {
            if path.starts_with(p.as_str()) {
                return reply.clone();
            }
        }

        MockReply::Json {
            status: 404,
            body: json!({"error": "not found", "code": 5}).to_string(),
        }
    }
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl HttpBackend for MockBackend {
    fn get(&self, url: Url) -> BoxFuture<'_, Result<Response<Bytes>, FetchError>> {
        let reply = self.next_reply(&url);
        let path = url.path().to_string();

        Box::pin(async move {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            let _guard = InFlightGuard(&self.in_flight);
            self.peak.fetch_max(now, Ordering::SeqCst);

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let result = match reply {
                MockReply::Json { status, body } => {
                    let mut response = Response::new(Bytes::from(body));
                    *response.status_mut() =
                        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                    Ok(response)
                }
                MockReply::ConnectionError => {
                    Err(FetchError::Connection("connection refused".to_string()))
                }
                MockReply::Hang => futures::future::pending().await,
            };

            self.state.lock().unwrap().events.push(MockEvent::Finished(path));
            result
        })
    }
}

/// Read a single query parameter from a recorded request URL
pub fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Build a page body holding `count` generated items under `key`
pub fn page_json(key: &str, start: usize, count: usize) -> Value {
    let items: Vec<Value> = (start..start + count)
        .map(|i| json!({"id": format!("{}-{}", key, i), "name": format!("item-{}", i)}))
        .collect();
    let mut page = serde_json::Map::new();
    page.insert(key.to_string(), Value::Array(items));
    Value::Object(page)
}

/// In-memory store capturing every document written during a run
#[derive(Clone, Default)]
pub struct MemoryStore {
    documents: Arc<Mutex<HashMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.documents.lock().unwrap().get(name).cloned()
    }
}

impl InventoryStore for MemoryStore {
    fn put(&self, name: &str, document: &Value) -> Result<(), StoreError> {
        self.documents
            .lock()
            .unwrap()
            .insert(name.to_string(), document.clone());
        Ok(())
    }
}
