//! Cluster topology discovery.
//!
//! A proxy fronts one root cluster and any number of leaf clusters federated
//! to it. [`ClusterSource`] is the seam for whatever knows that topology;
//! [`StaticTopology`] answers from the `[clusters]` table of the profile.

use crate::config::Clusters;
use crate::error::{BastionError, Result};

/// A leaf cluster reachable through the root cluster's proxy.
pub trait LeafCluster {
    fn name(&self) -> &str;
}

impl LeafCluster for String {
    fn name(&self) -> &str {
        self
    }
}

/// Something that can report the clusters behind a proxy.
pub trait ClusterSource {
    type Leaf: LeafCluster;

    /// Name of the cluster the proxy belongs to.
    fn root_cluster_name(&self) -> Result<String>;

    /// Leaf clusters in discovery order.
    fn leaf_clusters(&self) -> Result<Vec<Self::Leaf>>;
}

/// Root and leaf cluster names, leaves in discovery order.
#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    pub root: String,
    pub leaves: Vec<String>,
}

/// Query both halves of the topology from `source`.
///
/// Both queries are always made; if both fail, both messages are reported.
///
/// # Errors
///
/// Returns [`BastionError::Connection`] if either query fails.
pub fn discover<S: ClusterSource + ?Sized>(source: &S) -> Result<Topology> {
    let root = source.root_cluster_name();
    let leaves = source.leaf_clusters();

    match (root, leaves) {
        (Ok(root), Ok(leaves)) => Ok(Topology {
            root,
            leaves: leaves.iter().map(|l| l.name().to_string()).collect(),
        }),
        (Err(e), Ok(_)) | (Ok(_), Err(e)) => Err(e),
        (Err(root_err), Err(leaf_err)) => Err(BastionError::Connection(format!(
            "{}, {}",
            connection_message(root_err),
            connection_message(leaf_err)
        ))),
    }
}

fn connection_message(err: BastionError) -> String {
    match err {
        BastionError::Connection(msg) => msg,
        other => other.to_string(),
    }
}

/// Topology recorded in the profile.
#[derive(Debug, Clone)]
pub struct StaticTopology {
    proxy: String,
    clusters: Clusters,
}

impl StaticTopology {
    /// `proxy` is only used to label errors.
    pub fn new(proxy: impl Into<String>, clusters: Clusters) -> Self {
        StaticTopology {
            proxy: proxy.into(),
            clusters,
        }
    }
}

impl ClusterSource for StaticTopology {
    type Leaf = String;

    fn root_cluster_name(&self) -> Result<String> {
        self.clusters.root.clone().ok_or_else(|| {
            BastionError::Connection(format!("no root cluster recorded for proxy {}", self.proxy))
        })
    }

    fn leaf_clusters(&self) -> Result<Vec<String>> {
        Ok(self.clusters.leaves.clone())
    }
}
