// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{defaults, env as vars};
use anyhow::{anyhow, bail, Context, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Collector configuration loaded from environment variables
#[derive(Clone)]
pub struct Config {
    /// Base URL of the inventory API
    pub api_endpoint: Url,
    pub api_token: String,
    /// Forward proxy all requests go through, `None` when disabled
    pub proxy_url: Option<Url>,
    pub max_concurrent_requests: usize,
    /// Total attempts per request, including the first one
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub request_timeout: Duration,
    pub namespaces_timeout: Duration,
    pub insecure_skip_tls_verify: bool,
    pub fetch_images: bool,
    pub search_images: bool,
    pub output_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_endpoint = required(&lookup, vars::API_ENDPOINT)?;
        let api_endpoint = Url::parse(&api_endpoint)
            .with_context(|| format!("{} is not a valid URL", vars::API_ENDPOINT))?;
        let api_token = required(&lookup, vars::API_TOKEN)?;

        // An explicitly empty PROXY_URL turns the proxy off
        let proxy_url = match lookup(vars::PROXY_URL) {
            Some(value) if value.trim().is_empty() => None,
            Some(value) => Some(
                Url::parse(value.trim())
                    .with_context(|| format!("{} is not a valid URL", vars::PROXY_URL))?,
            ),
            None => Some(Url::parse(defaults::PROXY_URL)?),
        };

        let max_concurrent_requests = parsed(
            &lookup,
            vars::MAX_CONCURRENT_REQUESTS,
            defaults::MAX_CONCURRENT_REQUESTS,
        )?;
        if max_concurrent_requests == 0 {
            bail!("{} must be at least 1", vars::MAX_CONCURRENT_REQUESTS);
        }

        let max_retries = parsed(&lookup, vars::MAX_RETRIES, defaults::MAX_RETRIES)?;
        if max_retries == 0 {
            bail!("{} must be at least 1", vars::MAX_RETRIES);
        }

        let retry_delay = Duration::from_millis(parsed(
            &lookup,
            vars::RETRY_DELAY_MS,
            defaults::RETRY_DELAY_MS,
        )?);
        let request_timeout = Duration::from_secs(parsed(
            &lookup,
            vars::REQUEST_TIMEOUT_SECS,
            defaults::REQUEST_TIMEOUT_SECS,
        )?);
        let namespaces_timeout = Duration::from_secs(parsed(
            &lookup,
            vars::NAMESPACES_TIMEOUT_SECS,
            defaults::NAMESPACES_TIMEOUT_SECS,
        )?);

        let output_dir = lookup(vars::OUTPUT_DIR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| defaults::OUTPUT_DIR.to_string());

        Ok(Config {
            api_endpoint,
            api_token,
            proxy_url,
            max_concurrent_requests,
            max_retries,
            retry_delay,
            request_timeout,
            namespaces_timeout,
            insecure_skip_tls_verify: parsed(&lookup, vars::INSECURE_SKIP_TLS_VERIFY, true)?,
            fetch_images: parsed(&lookup, vars::FETCH_IMAGES, true)?,
            search_images: parsed(&lookup, vars::SEARCH_IMAGES, false)?,
            output_dir: PathBuf::from(output_dir),
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_endpoint", &self.api_endpoint.as_str())
            .field("api_token", &"<redacted>")
            .field("proxy_url", &self.proxy_url.as_ref().map(Url::as_str))
            .field("max_concurrent_requests", &self.max_concurrent_requests)
            .field("max_retries", &self.max_retries)
            .field("retry_delay", &self.retry_delay)
            .field("request_timeout", &self.request_timeout)
            .field("namespaces_timeout", &self.namespaces_timeout)
            .field("insecure_skip_tls_verify", &self.insecure_skip_tls_verify)
            .field("fetch_images", &self.fetch_images)
            .field("search_images", &self.search_images)
            .field("output_dir", &self.output_dir)
            .finish()
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| anyhow!("{} environment variable not set", key))
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {}", key, value)),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    fn mandatory() -> Vec<(&'static str, &'static str)> {
        vec![
            (vars::API_ENDPOINT, "https://central.example.com"),
            (vars::API_TOKEN, "secret-token"),
        ]
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup_from(&mandatory())).unwrap();

        assert_eq!(config.api_endpoint.as_str(), "https://central.example.com/");
        assert_eq!(config.api_token, "secret-token");
        assert_eq!(
            config.proxy_url.as_ref().map(Url::as_str),
            Some("http://localhost:8080/")
        );
        assert_eq!(config.max_concurrent_requests, 100);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay, Duration::from_secs(1));
        assert_eq!(config.namespaces_timeout, Duration::from_secs(300));
        assert!(config.request_timeout < config.namespaces_timeout);
        assert!(config.insecure_skip_tls_verify);
        assert!(config.fetch_images);
        assert!(!config.search_images);
        assert_eq!(config.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_missing_endpoint_is_fatal() {
        let err = Config::from_lookup(lookup_from(&[(vars::API_TOKEN, "t")])).unwrap_err();
        assert!(err.to_string().contains(vars::API_ENDPOINT));
    }

    #[test]
    fn test_missing_token_is_fatal() {
        let err = Config::from_lookup(lookup_from(&[(
            vars::API_ENDPOINT,
            "https://central.example.com",
        )]))
        .unwrap_err();
        assert!(err.to_string().contains(vars::API_TOKEN));
    }

    #[test]
    fn test_blank_token_is_fatal() {
        let err = Config::from_lookup(lookup_from(&[
            (vars::API_ENDPOINT, "https://central.example.com"),
            (vars::API_TOKEN, "   "),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains(vars::API_TOKEN));
    }

    #[test]
    fn test_empty_proxy_disables_proxy() {
        let mut pairs = mandatory();
        pairs.push((vars::PROXY_URL, ""));
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert!(config.proxy_url.is_none());
    }

    #[test]
    fn test_overrides_parsed() {
        let mut pairs = mandatory();
        pairs.extend([
            (vars::MAX_CONCURRENT_REQUESTS, "20"),
            (vars::MAX_RETRIES, "5"),
            (vars::RETRY_DELAY_MS, "250"),
            (vars::SEARCH_IMAGES, "true"),
            (vars::OUTPUT_DIR, "/tmp/out"),
        ]);
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();

        assert_eq!(config.max_concurrent_requests, 20);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.retry_delay, Duration::from_millis(250));
        assert!(config.search_images);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut pairs = mandatory();
        pairs.push((vars::MAX_CONCURRENT_REQUESTS, "0"));
        assert!(Config::from_lookup(lookup_from(&pairs)).is_err());
    }

    #[test]
    fn test_invalid_number_rejected() {
        let mut pairs = mandatory();
        pairs.push((vars::MAX_RETRIES, "three"));
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(err.to_string().contains(vars::MAX_RETRIES));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = Config::from_lookup(lookup_from(&mandatory())).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("<redacted>"));
    }
}
