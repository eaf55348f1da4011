//! Phase 3: Ordering Manifests by Kind
//!
//! This is the third phase of the `applier` pipeline. It decides the order in
//! which manifests reach the cluster so that creation dependencies are met:
//! namespaces and CRDs before the resources that live in them, RBAC and
//! configuration before workloads, workloads last.
//!
//! ## Policies
//!
//! - [`KindOrder::Standard`] ranks each manifest by its kind using
//!   [`STANDARD_KINDS_ORDER`]. Kinds missing from the list rank after every
//!   listed kind.
//! - [`KindOrder::NoCreateUpdateKinds`] keeps discovery order. Core resource
//!   runs use it when `--sort-on-kind=false`.
//!
//! Both policies are stable: manifests of equal rank keep their relative
//! discovery order.

use crate::manifest::Manifest;

/// Kinds in creation order.
pub const STANDARD_KINDS_ORDER: &[&str] = &[
    "Namespace",
    "NetworkPolicy",
    "ResourceQuota",
    "LimitRange",
    "PodSecurityPolicy",
    "PodDisruptionBudget",
    "ServiceAccount",
    "Secret",
    "SecretList",
    "ConfigMap",
    "StorageClass",
    "PersistentVolume",
    "PersistentVolumeClaim",
    "CustomResourceDefinition",
    "ClusterRole",
    "ClusterRoleList",
    "ClusterRoleBinding",
    "ClusterRoleBindingList",
    "Role",
    "RoleList",
    "RoleBinding",
    "RoleBindingList",
    "Service",
    "DaemonSet",
    "Pod",
    "ReplicationController",
    "ReplicaSet",
    "Deployment",
    "HorizontalPodAutoscaler",
    "StatefulSet",
    "Job",
    "CronJob",
    "IngressClass",
    "Ingress",
    "APIService",
];

/// Manifest ordering policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KindOrder {
    #[default]
    Standard,
    NoCreateUpdateKinds,
}

impl KindOrder {
    /// Policy for a core resources run.
    pub fn from_sort_on_kind(sort_on_kind: bool) -> Self {
        if sort_on_kind {
            KindOrder::Standard
        } else {
            KindOrder::NoCreateUpdateKinds
        }
    }

    /// Rank of `kind` under this policy; lower ranks are applied first.
    pub fn rank(&self, kind: &str) -> usize {
        match self {
            KindOrder::Standard => STANDARD_KINDS_ORDER
                .iter()
                .position(|k| *k == kind)
                .unwrap_or(STANDARD_KINDS_ORDER.len()),
            KindOrder::NoCreateUpdateKinds => 0,
        }
    }
}

/// Execute Phase 3: stable sort of the batch under `order`.
pub fn execute(mut manifests: Vec<Manifest>, order: KindOrder) -> Vec<Manifest> {
    // `sort_by_key` is stable, which keeps discovery order within a rank.
    manifests.sort_by_key(|m| order.rank(&m.kind));
    manifests
}
