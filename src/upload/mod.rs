//! Snapshot upload — pre-signed URL exchange and integrity-verified PUT.

pub mod client;
pub mod wire;

pub use client::UploadClient;

use serde::Serialize;

/// One inventory snapshot, produced by the resource gatherers.
///
/// Only `cluster_id` and `agent_version` matter to the upload protocol;
/// the gathered resources are opaque payload carried alongside them.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Primary addressing key for the upload. Must be non-empty.
    pub cluster_id: String,
    /// Agent version, used for server-side compatibility checks and
    /// storage tagging.
    pub agent_version: String,
    /// Gathered cluster resources, opaque to the upload pipeline.
    #[serde(flatten)]
    pub resources: serde_json::Map<String, serde_json::Value>,
}

impl Snapshot {
    pub fn new(cluster_id: &str, agent_version: &str) -> Self {
        Self {
            cluster_id: cluster_id.to_string(),
            agent_version: agent_version.to_string(),
            resources: serde_json::Map::new(),
        }
    }
}
