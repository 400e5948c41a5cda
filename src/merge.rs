// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Folds the flat collections into the cluster → namespace → deployment → pod
//! tree.
//!
//! Records are associated by ID value, never by arrival order. Entries for
//! namespaces and deployments that are only referenced (never described by
//! their own record) are created as placeholders on first reference.

use crate::types::{
    Cluster, ClusterEntry, ClusterInfo, ContainerEntry, Deployment, DeploymentEntry,
    DeploymentInfo, MergedTree, Namespace, NamespaceEntry, Node, NodeEntry, OrderedMap, Pod,
    PodEntry,
};
use tracing::{debug, instrument};

#[instrument(skip_all, fields(clusters = clusters.len(), pods = pods.len()))]
pub fn merge(
    clusters: &[Cluster],
    nodes_by_cluster: &OrderedMap<Vec<Node>>,
    namespaces: &[Namespace],
    deployments: &[Deployment],
    pods: &[Pod],
) -> MergedTree {
    let mut tree = MergedTree::default();

    for cluster in clusters {
        tree.cluster_mut(&cluster.id).info = Some(ClusterInfo {
            name: cluster.name.clone(),
            cluster_type: cluster.cluster_type.clone(),
            labels: cluster.labels.clone(),
        });
    }

    for (cluster_id, nodes) in nodes_by_cluster.iter() {
        tree.cluster_mut(cluster_id)
            .nodes
            .extend(nodes.iter().map(node_entry));
    }

    for namespace in namespaces {
        let metadata = &namespace.metadata;
        let entry = tree.namespace_mut(&metadata.cluster_id, &metadata.name);
        entry.id = Some(metadata.id.clone());
        entry.labels = metadata.labels.clone();
        entry.annotations = metadata.annotations.clone();
    }

    for deployment in deployments {
        tree.deployment_mut(&deployment.cluster_id, &deployment.namespace, &deployment.id)
            .info = Some(DeploymentInfo {
            name: deployment.name.clone(),
            created: deployment.created.clone(),
        });
    }

    for pod in pods {
        let entry = pod_entry(pod);
        match pod.owning_deployment() {
            Some(deployment_id) => tree
                .deployment_mut(&pod.cluster_id, &pod.namespace, deployment_id)
                .pods
                .push(entry),
            None => tree
                .namespace_mut(&pod.cluster_id, &pod.namespace)
                .standalone_pods
                .push(entry),
        }
    }

    debug!(stats = ?tree.stats(), "Merged inventory");
    tree
}

// Get-or-create points. Nothing else in the tree is created implicitly.
impl MergedTree {
    fn cluster_mut(&mut self, cluster_id: &str) -> &mut ClusterEntry {
        self.clusters.entry_or_default(cluster_id)
    }

    fn namespace_mut(&mut self, cluster_id: &str, namespace: &str) -> &mut NamespaceEntry {
        self.cluster_mut(cluster_id)
            .namespaces
            .entry_or_default(namespace)
    }

    fn deployment_mut(
        &mut self,
        cluster_id: &str,
        namespace: &str,
        deployment_id: &str,
    ) -> &mut DeploymentEntry {
        self.namespace_mut(cluster_id, namespace)
            .deployments
            .entry_or_default(deployment_id)
    }
}

fn node_entry(node: &Node) -> NodeEntry {
    NodeEntry {
        id: node.id.clone(),
        name: node.name.clone(),
        labels: node.labels.clone(),
        taints: node.taints.clone(),
    }
}

/// One container per live instance; the node is taken from the last one
fn pod_entry(pod: &Pod) -> PodEntry {
    let mut node = None;
    let mut containers = Vec::with_capacity(pod.live_instances.len());

    for instance in &pod.live_instances {
        node = Some(instance.instance_id.node.clone());
        containers.push(ContainerEntry {
            name: instance.container_name.clone(),
            id: instance.instance_id.id.clone(),
            runtime: instance.instance_id.container_runtime.clone(),
        });
    }

    PodEntry {
        id: pod.id.clone(),
        name: pod.name.clone(),
        node,
        containers,
    }
}
