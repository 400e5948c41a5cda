// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! HTTP backends the transport issues its GET requests through.

use crate::config::Config;
use crate::error::{FetchError, Result};
use bytes::Bytes;
use futures::future::BoxFuture;
use http::header::ACCEPT;
use http::Response;
use tracing::{info, warn};
use url::Url;

/// Issues one GET request. Implementations attach credentials and proxy
/// routing themselves.
pub trait HttpBackend: Send + Sync {
    fn get(&self, url: Url) -> BoxFuture<'_, std::result::Result<Response<Bytes>, FetchError>>;
}

/// Backend talking to the real API through `reqwest`
pub struct ReqwestBackend {
    client: reqwest::Client,
    token: String,
}

impl ReqwestBackend {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder();

        if let Some(proxy_url) = &config.proxy_url {
            info!("Routing requests through proxy {}", proxy_url);
            builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
        } else {
            builder = builder.no_proxy();
        }

        if config.insecure_skip_tls_verify {
            warn!("Server certificate validation is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(Self {
            client: builder.build()?,
            token: config.api_token.clone(),
        })
    }
}

impl HttpBackend for ReqwestBackend {
    fn get(&self, url: Url) -> BoxFuture<'_, std::result::Result<Response<Bytes>, FetchError>> {
        Box::pin(async move {
            let response = self
                .client
                .get(url)
                .bearer_auth(&self.token)
                .header(ACCEPT, "application/json")
                .send()
                .await?;

            let status = response.status();
            let body = response.bytes().await?;

            let mut out = Response::new(body);
            *out.status_mut() = status;
            Ok(out)
        })
    }
}
