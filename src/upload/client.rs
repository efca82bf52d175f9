//! Upload sub-client — two-phase snapshot delivery to object storage.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use reqwest::Client;
use sha2::{Digest, Sha256};

use crate::error::UploadError;
use crate::http::{diagnostic_body, read_limited};
use crate::identity::IdentityClient;
use crate::telemetry::Telemetry;
use crate::upload::wire::{SnapshotLinkRequest, SnapshotLinkResponse};
use crate::upload::Snapshot;

/// Cap on the snapshot-link response body.
const LINK_RESPONSE_CAP: usize = 10 * 1024;

/// Cap on error-body diagnostics embedded in errors.
const DIAGNOSTIC_CAP: usize = 500;

/// Delivers snapshots to object storage via pre-signed URLs.
///
/// Neither phase is retried here: a pre-signed URL may expire or consume
/// its single use, so a failed cycle must start over from phase 1. Callers
/// that want resilience re-invoke [`put_snapshot`](UploadClient::put_snapshot)
/// on their own schedule.
pub struct UploadClient {
    inventory_api: String,
    tenant_id: String,
    identity: Arc<IdentityClient>,
    http: Client,
    telemetry: Telemetry,
}

impl UploadClient {
    pub fn new(
        inventory_api: &str,
        tenant_id: &str,
        identity: Arc<IdentityClient>,
        http: Client,
        telemetry: Telemetry,
    ) -> Self {
        Self {
            inventory_api: inventory_api.trim_end_matches('/').to_string(),
            tenant_id: tenant_id.to_string(),
            identity,
            http,
            telemetry,
        }
    }

    /// Upload one snapshot: request a pre-signed URL for its checksum, then
    /// PUT the serialized bytes to it.
    ///
    /// The snapshot is serialized exactly once; the SHA-256 digest sent in
    /// both phases covers literally the bytes that reach storage.
    pub async fn put_snapshot(&self, snapshot: &Snapshot) -> Result<(), UploadError> {
        if snapshot.cluster_id.is_empty() {
            return Err(UploadError::EmptyClusterId);
        }

        let body = serde_json::to_vec(snapshot).map_err(UploadError::Serialize)?;
        let digest: [u8; 32] = Sha256::digest(&body).into();

        let (upload_url, principal) = self.request_upload_link(snapshot, &digest).await?;
        self.put_to_presigned_url(&upload_url, body, &digest, snapshot, &principal)
            .await
    }

    /// Phase 1: exchange the checksum for a pre-signed upload URL.
    async fn request_upload_link(
        &self,
        snapshot: &Snapshot,
        digest: &[u8],
    ) -> Result<(String, String), UploadError> {
        let url = format!("{}/ingestions/kubernetes/snapshot-links", self.inventory_api);
        let checksum_hex = hex::encode(digest);
        let request = SnapshotLinkRequest {
            cluster_id: &snapshot.cluster_id,
            checksum_sha256: &checksum_hex,
            agent_version: &snapshot.agent_version,
        };

        let req = self.http.post(&url).json(&request);
        let req = self.telemetry.apply(req);
        let (req, principal) = self.identity.sign(req).await?;

        tracing::debug!(cluster_id = %snapshot.cluster_id, "Requesting snapshot upload link");
        let resp = req.send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(UploadError::LinkRejected {
                status: status.as_u16(),
                body: diagnostic_body(resp, DIAGNOSTIC_CAP).await,
            });
        }

        let body = read_limited(resp, LINK_RESPONSE_CAP)
            .await
            .map_err(|_| UploadError::Oversized {
                cap: LINK_RESPONSE_CAP,
            })?;
        let link: SnapshotLinkResponse =
            serde_json::from_slice(&body).map_err(UploadError::Malformed)?;
        Ok((link.url, principal))
    }

    /// Phase 2: PUT the serialized snapshot to the pre-signed URL.
    ///
    /// The URL is self-authenticating and points outside the CyberArk API
    /// surface, so the request carries neither the bearer token nor the
    /// telemetry header.
    async fn put_to_presigned_url(
        &self,
        url: &str,
        body: Vec<u8>,
        digest: &[u8],
        snapshot: &Snapshot,
        principal: &str,
    ) -> Result<(), UploadError> {
        let resp = self
            .http
            .put(url)
            .header("X-Amz-Checksum-Sha256", BASE64_STANDARD.encode(digest))
            .header("X-Amz-Server-Side-Encryption", "AES256")
            .header(
                "X-Amz-Tagging",
                storage_tags(snapshot, &self.tenant_id, principal),
            )
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(UploadError::UploadRejected {
                status: status.as_u16(),
                body: diagnostic_body(resp, DIAGNOSTIC_CAP).await,
            });
        }
        tracing::debug!(cluster_id = %snapshot.cluster_id, "Snapshot uploaded");
        Ok(())
    }
}

/// Object-storage tags for cost and audit attribution, as a url-encoded
/// query string.
fn storage_tags(snapshot: &Snapshot, tenant_id: &str, principal: &str) -> String {
    let tags = [
        ("agent_version", snapshot.agent_version.as_str()),
        ("tenant_id", tenant_id),
        ("upload_type", "k8s_snapshot"),
        ("uploader_id", snapshot.cluster_id.as_str()),
        ("username", principal),
        ("vendor", "k8s"),
    ];
    tags.iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
