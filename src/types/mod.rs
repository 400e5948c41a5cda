// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Inventory records and the merged document they are folded into.

pub mod inventory;
pub mod ordered;
pub mod tree;

pub use inventory::{
    Cluster, ContainerInstanceId, Deployment, Image, Labels, LiveInstance, Namespace,
    NamespaceMetadata, Node, Pod,
};
pub use ordered::OrderedMap;
pub use tree::{
    ClusterEntry, ClusterInfo, ContainerEntry, DeploymentEntry, DeploymentInfo, MergedTree,
    NamespaceEntry, NodeEntry, PodEntry, TreeStats,
};
