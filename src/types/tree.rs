// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The merged cluster → namespace → deployment → pod document.

use super::inventory::Labels;
use super::ordered::OrderedMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Root of the merged document, keyed by cluster ID
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct MergedTree {
    pub clusters: OrderedMap<ClusterEntry>,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct ClusterEntry {
    #[serde(serialize_with = "empty_object_if_none")]
    pub info: Option<ClusterInfo>,
    pub nodes: Vec<NodeEntry>,
    pub namespaces: OrderedMap<NamespaceEntry>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ClusterInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub cluster_type: String,
    pub labels: Labels,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct NodeEntry {
    pub id: String,
    pub name: String,
    pub labels: Labels,
    pub taints: Vec<Value>,
}

/// A namespace materialized either from its own record or by reference from
/// a deployment or pod. Placeholders have no `id` and empty metadata.
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct NamespaceEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub labels: Labels,
    pub annotations: Labels,
    pub deployments: OrderedMap<DeploymentEntry>,
    pub standalone_pods: Vec<PodEntry>,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct DeploymentEntry {
    #[serde(serialize_with = "empty_object_if_none")]
    pub info: Option<DeploymentInfo>,
    pub pods: Vec<PodEntry>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct DeploymentInfo {
    pub name: String,
    pub created: Option<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct PodEntry {
    pub id: String,
    pub name: String,
    /// Node of the last live instance, `None` when the pod has none
    pub node: Option<String>,
    pub containers: Vec<ContainerEntry>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ContainerEntry {
    pub name: String,
    pub id: String,
    pub runtime: String,
}

/// Totals over a merged tree
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub clusters: usize,
    pub nodes: usize,
    pub namespaces: usize,
    pub deployments: usize,
    pub pods: usize,
}

impl MergedTree {
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats {
            clusters: self.clusters.len(),
            ..Default::default()
        };

        for cluster in self.clusters.values() {
            stats.nodes += cluster.nodes.len();
            stats.namespaces += cluster.namespaces.len();
            for namespace in cluster.namespaces.values() {
                stats.deployments += namespace.deployments.len();
                stats.pods += namespace.standalone_pods.len();
                stats.pods += namespace
                    .deployments
                    .values()
                    .map(|d| d.pods.len())
                    .sum::<usize>();
            }
        }

        stats
    }

    pub fn cluster(&self, cluster_id: &str) -> Option<&ClusterEntry> {
        self.clusters.get(cluster_id)
    }

    pub fn namespace(&self, cluster_id: &str, namespace: &str) -> Option<&NamespaceEntry> {
        self.cluster(cluster_id)?.namespaces.get(namespace)
    }

    pub fn deployment(
        &self,
        cluster_id: &str,
        namespace: &str,
        deployment_id: &str,
    ) -> Option<&DeploymentEntry> {
        self.namespace(cluster_id, namespace)?
            .deployments
            .get(deployment_id)
    }
}

fn empty_object_if_none<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    match value {
        Some(inner) => inner.serialize(serializer),
        None => serializer.collect_map(std::iter::empty::<(&str, &str)>()),
    }
}
