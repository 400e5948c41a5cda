// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Inventory API access: HTTP backends, the retrying transport, and pagination.

pub mod backend;
pub mod paginator;
pub mod transport;

pub use backend::{HttpBackend, ReqwestBackend};
pub use paginator::{extract_items, Paginator};
pub use transport::{Query, RetryPolicy, Transport, TransportSettings};
