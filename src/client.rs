//! High-level client — `DiscoClient` wiring the full upload cycle.
//!
//! One instance targets one tenant subdomain. Discovery is constructed up
//! front; the Identity and Upload sub-clients can only exist once discovery
//! has resolved their endpoints, so they are wired lazily on first use and
//! cached. All sub-clients share one `reqwest::Client` and one [`Telemetry`]
//! value.

use std::sync::Arc;
use std::time::Duration;

use async_lock::RwLock;
use reqwest::Client;

use crate::discovery::{client::DEFAULT_CACHE_TTL, DiscoveryClient, ServiceEndpoints};
use crate::error::{IdentityError, SdkError};
use crate::identity::client::DEFAULT_RETRY_INTERVAL;
use crate::identity::IdentityClient;
use crate::network::DEFAULT_DISCOVERY_URL;
use crate::telemetry::Telemetry;
use crate::upload::{Snapshot, UploadClient};

/// The primary entry point for the secure-upload pipeline.
pub struct DiscoClient {
    subdomain: String,
    http: Client,
    telemetry: Telemetry,
    retry_interval: Duration,
    discovery: Arc<DiscoveryClient>,
    identity: Arc<RwLock<Option<Arc<IdentityClient>>>>,
    upload: Arc<RwLock<Option<Arc<UploadClient>>>>,
}

impl DiscoClient {
    pub fn builder() -> DiscoClientBuilder {
        DiscoClientBuilder::default()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn discovery(&self) -> &DiscoveryClient {
        &self.discovery
    }

    /// The Identity sub-client, once a login has wired it.
    pub async fn identity(&self) -> Option<Arc<IdentityClient>> {
        self.identity.read().await.clone()
    }

    /// The Upload sub-client, once an upload has wired it.
    pub async fn upload(&self) -> Option<Arc<UploadClient>> {
        self.upload.read().await.clone()
    }

    // ── Pipeline operations ──────────────────────────────────────────────

    /// Resolve endpoints (cached) and authenticate as `username`.
    ///
    /// The password buffer is zeroed before this returns, success or not.
    pub async fn login(&self, username: &str, password: &mut [u8]) -> Result<(), SdkError> {
        let endpoints = self.discovery.resolve().await?;
        let identity = self.identity_for(&endpoints).await;
        identity.login(username, password).await?;
        Ok(())
    }

    /// [`login`](Self::login), skipped when a previous login already
    /// completed. The password buffer is left untouched when skipping.
    pub async fn ensure_login(&self, username: &str, password: &mut [u8]) -> Result<(), SdkError> {
        if let Some(identity) = self.identity().await {
            if identity.is_authenticated().await {
                return Ok(());
            }
        }
        self.login(username, password).await
    }

    /// Deliver one snapshot. Requires a completed [`login`](Self::login).
    pub async fn put_snapshot(&self, snapshot: &Snapshot) -> Result<(), SdkError> {
        let endpoints = self.discovery.resolve().await?;
        let identity = self
            .identity()
            .await
            .ok_or(SdkError::Identity(IdentityError::NoCredential))?;

        let upload = {
            let mut upload = self.upload.write().await;
            match upload.as_ref() {
                Some(client) => client.clone(),
                None => {
                    if endpoints.discovery_context_api.is_empty() {
                        return Err(SdkError::Validation(format!(
                            "tenant {:?} has no active discovery-context endpoint; \
                             inventory ingestion is not enabled yet",
                            self.subdomain
                        )));
                    }
                    let client = Arc::new(UploadClient::new(
                        &endpoints.discovery_context_api,
                        &endpoints.tenant_id,
                        identity,
                        self.http.clone(),
                        self.telemetry.clone(),
                    ));
                    *upload = Some(client.clone());
                    client
                }
            }
        };

        upload.put_snapshot(snapshot).await?;
        Ok(())
    }

    async fn identity_for(&self, endpoints: &ServiceEndpoints) -> Arc<IdentityClient> {
        let mut identity = self.identity.write().await;
        match identity.as_ref() {
            Some(client) => client.clone(),
            None => {
                let client = Arc::new(IdentityClient::with_retry_interval(
                    &endpoints.identity_api,
                    &self.subdomain,
                    self.http.clone(),
                    self.telemetry.clone(),
                    self.retry_interval,
                ));
                *identity = Some(client.clone());
                client
            }
        }
    }
}

impl Clone for DiscoClient {
    fn clone(&self) -> Self {
        Self {
            subdomain: self.subdomain.clone(),
            http: self.http.clone(),
            telemetry: self.telemetry.clone(),
            retry_interval: self.retry_interval,
            discovery: self.discovery.clone(),
            identity: self.identity.clone(),
            upload: self.upload.clone(),
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct DiscoClientBuilder {
    subdomain: String,
    discovery_url: String,
    agent_version: String,
    cache_ttl: Duration,
    retry_interval: Duration,
}

impl Default for DiscoClientBuilder {
    fn default() -> Self {
        Self {
            subdomain: String::new(),
            discovery_url: DEFAULT_DISCOVERY_URL.to_string(),
            agent_version: env!("CARGO_PKG_VERSION").to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
            retry_interval: DEFAULT_RETRY_INTERVAL,
        }
    }
}

impl DiscoClientBuilder {
    /// Tenant subdomain to resolve. Required.
    pub fn subdomain(mut self, subdomain: &str) -> Self {
        self.subdomain = subdomain.to_string();
        self
    }

    /// Override the platform-discovery base URL (test environments).
    pub fn discovery_url(mut self, url: &str) -> Self {
        self.discovery_url = url.to_string();
        self
    }

    /// Agent version reported in telemetry and upload tagging.
    pub fn agent_version(mut self, version: &str) -> Self {
        self.agent_version = version.to_string();
        self
    }

    /// Discovery cache lifetime.
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Sleep between login attempts after transient failures.
    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    pub fn build(self) -> Result<DiscoClient, SdkError> {
        if self.subdomain.is_empty() {
            return Err(SdkError::Validation(
                "tenant subdomain must be provided".to_string(),
            ));
        }

        let http = crate::http::build_client(&self.agent_version);
        let telemetry = Telemetry::new(&self.agent_version);
        let discovery = Arc::new(DiscoveryClient::with_cache_ttl(
            &self.discovery_url,
            &self.subdomain,
            http.clone(),
            telemetry.clone(),
            self.cache_ttl,
        ));

        Ok(DiscoClient {
            subdomain: self.subdomain,
            http,
            telemetry,
            retry_interval: self.retry_interval,
            discovery,
            identity: Arc::new(RwLock::new(None)),
            upload: Arc::new(RwLock::new(None)),
        })
    }
}
