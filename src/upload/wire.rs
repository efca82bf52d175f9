//! Wire types for the inventory ingestion API.

use serde::{Deserialize, Serialize};

/// Request body for a pre-signed snapshot upload link.
#[derive(Debug, Serialize)]
pub struct SnapshotLinkRequest<'a> {
    pub cluster_id: &'a str,
    pub checksum_sha256: &'a str,
    pub agent_version: &'a str,
}

/// The pre-signed upload target. Single-use, server-determined expiry;
/// obtained fresh for every upload attempt and never cached.
#[derive(Debug, Deserialize)]
pub struct SnapshotLinkResponse {
    pub url: String,
}
