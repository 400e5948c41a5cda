// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Bounded, retrying GET against the inventory API.

use super::backend::HttpBackend;
use crate::config::Config;
use crate::error::FetchError;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info};
use url::Url;

/// Ordered query parameters. Keys may repeat.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.pairs.push((key.into(), value.to_string()));
        self
    }

    /// Overlay `other` on top of this query: every key present in `other`
    /// replaces all values of that key here.
    pub fn merged(mut self, other: &Query) -> Self {
        self.pairs
            .retain(|(k, _)| !other.pairs.iter().any(|(ok, _)| ok == k));
        self.pairs.extend(other.pairs.iter().cloned());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Exponential backoff between attempts of the same request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay to sleep after failed attempt number `attempt` (counted from 0)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

#[derive(Clone, Debug)]
pub struct TransportSettings {
    pub base_url: Url,
    pub retry: RetryPolicy,
    pub request_timeout: Duration,
}

impl TransportSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.api_endpoint.clone(),
            retry: RetryPolicy {
                max_attempts: config.max_retries,
                base_delay: config.retry_delay,
            },
            request_timeout: config.request_timeout,
        }
    }
}

/// Issues authenticated GETs with retry, holding one limiter slot per request
/// for its whole lifetime, retries and backoff included.
pub struct Transport {
    backend: Arc<dyn HttpBackend>,
    limiter: Arc<Semaphore>,
    settings: TransportSettings,
}

impl Transport {
    pub fn new(
        backend: Arc<dyn HttpBackend>,
        limiter: Arc<Semaphore>,
        settings: TransportSettings,
    ) -> Self {
        Self {
            backend,
            limiter,
            settings,
        }
    }

    /// Fetch `path` and decode the body as JSON.
    ///
    /// `timeout_override` replaces the default per-request timeout for this
    /// call only. Errors are logged here; callers treat an `Err` as the
    /// resource being unavailable for this run.
    pub async fn fetch(
        &self,
        path: &str,
        query: &Query,
        timeout_override: Option<Duration>,
    ) -> Result<Value, FetchError> {
        let url = self.url_for(path, query).map_err(|e| {
            error!(path = %path, error = %e, "Failed to build request URL");
            e
        })?;
        let request_timeout = timeout_override.unwrap_or(self.settings.request_timeout);
        let max_attempts = self.settings.retry.max_attempts.max(1);

        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|_| FetchError::LimiterClosed)?;

        let mut attempt = 0;
        loop {
            info!(url = %url, attempt = attempt + 1, "Making request");

            match self.attempt(&url, request_timeout).await {
                Ok(body) => {
                    info!(url = %url, "Request successful");
                    return Ok(body);
                }
                Err(e) => {
                    error!(url = %url, attempt = attempt + 1, error = %e, "Request attempt failed");

                    if attempt + 1 >= max_attempts {
                        error!(url = %url, attempts = max_attempts, "All attempts failed");
                        return Err(e);
                    }

                    let delay = self.settings.retry.delay_for(attempt);
                    info!(url = %url, delay_ms = delay.as_millis() as u64, "Retrying");
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn attempt(&self, url: &Url, request_timeout: Duration) -> Result<Value, FetchError> {
        let response = timeout(request_timeout, self.backend.get(url.clone()))
            .await
            .map_err(|_| FetchError::Timeout(request_timeout))??;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body: Value = serde_json::from_slice(response.body())?;
        debug!(url = %url, bytes = response.body().len(), "Decoded response body");
        Ok(body)
    }

    fn url_for(&self, path: &str, query: &Query) -> Result<Url, FetchError> {
        let mut url = self.settings.base_url.join(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.pairs());
        }
        Ok(url)
    }
}
