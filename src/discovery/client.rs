//! Discovery sub-client — subdomain resolution with a time-bounded cache.

use std::time::{Duration, Instant};

use async_lock::Mutex;
use reqwest::{Client, StatusCode};

use crate::discovery::wire::DiscoveryResponse;
use crate::discovery::ServiceEndpoints;
use crate::error::DiscoveryError;
use crate::http::read_limited;
use crate::network::{DISCOVERY_CONTEXT_SERVICE_NAME, IDENTITY_SERVICE_NAME};
use crate::telemetry::Telemetry;

/// Hard cap on discovery response bodies.
const RESPONSE_CAP: usize = 2 * 1024 * 1024;

/// How long a resolved endpoint set stays reusable.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

struct CacheEntry {
    endpoints: ServiceEndpoints,
    fetched_at: Instant,
}

/// Resolves one tenant subdomain to its service endpoints.
///
/// A client instance targets exactly one subdomain for its lifetime, so the
/// cache holds at most one entry. Concurrent `resolve` calls serialize on the
/// cache mutex; the discovery call is infrequent and idempotent, so holding
/// the lock across the fetch is fine and keeps read-check-update atomic.
pub struct DiscoveryClient {
    base_url: String,
    subdomain: String,
    http: Client,
    telemetry: Telemetry,
    cache: Mutex<Option<CacheEntry>>,
    cache_ttl: Duration,
}

impl DiscoveryClient {
    pub fn new(base_url: &str, subdomain: &str, http: Client, telemetry: Telemetry) -> Self {
        Self::with_cache_ttl(base_url, subdomain, http, telemetry, DEFAULT_CACHE_TTL)
    }

    pub fn with_cache_ttl(
        base_url: &str,
        subdomain: &str,
        http: Client,
        telemetry: Telemetry,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            subdomain: subdomain.to_string(),
            http,
            telemetry,
            cache: Mutex::new(None),
            cache_ttl,
        }
    }

    /// The subdomain this client resolves.
    pub fn subdomain(&self) -> &str {
        &self.subdomain
    }

    /// Resolve the subdomain to its service endpoints and tenant id.
    ///
    /// Returns the cached set unchanged while it is younger than the TTL;
    /// otherwise fetches and overwrites the cache entry.
    pub async fn resolve(&self) -> Result<ServiceEndpoints, DiscoveryError> {
        let mut cache = self.cache.lock().await;

        if let Some(entry) = cache.as_ref() {
            if entry.fetched_at.elapsed() < self.cache_ttl {
                tracing::debug!(subdomain = %self.subdomain, "Using cached discovery endpoints");
                return Ok(entry.endpoints.clone());
            }
        }

        let endpoints = self.fetch().await?;
        *cache = Some(CacheEntry {
            endpoints: endpoints.clone(),
            fetched_at: Instant::now(),
        });
        Ok(endpoints)
    }

    async fn fetch(&self) -> Result<ServiceEndpoints, DiscoveryError> {
        let url = format!(
            "{}?bySubdomain={}",
            self.base_url,
            urlencoding::encode(&self.subdomain)
        );
        tracing::debug!(subdomain = %self.subdomain, "Resolving tenant endpoints");

        let req = self
            .http
            .get(&url)
            .header("Accept", "application/json");
        let resp = self.telemetry.apply(req).send().await?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(DiscoveryError::NotFound {
                subdomain: self.subdomain.clone(),
            });
        }
        if !status.is_success() {
            return Err(DiscoveryError::UnexpectedStatus {
                status: status.to_string(),
            });
        }

        let body = read_limited(resp, RESPONSE_CAP)
            .await
            .map_err(|_| DiscoveryError::Oversized { cap: RESPONSE_CAP })?;
        let parsed: DiscoveryResponse = serde_json::from_slice(&body)?;

        let identity_api = self.select_service(&parsed, IDENTITY_SERVICE_NAME);
        let discovery_context_api = self.select_service(&parsed, DISCOVERY_CONTEXT_SERVICE_NAME);

        let identity_api = identity_api.ok_or_else(|| DiscoveryError::MissingService {
            subdomain: self.subdomain.clone(),
        })?;

        Ok(ServiceEndpoints {
            identity_api,
            discovery_context_api: discovery_context_api.unwrap_or_default(),
            tenant_id: parsed.tenant_id.clone(),
        })
    }

    /// First match wins; later entries for the same service name are ignored.
    fn select_service(&self, resp: &DiscoveryResponse, name: &str) -> Option<String> {
        resp.services
            .iter()
            .find(|s| s.service_name == name)
            .and_then(|s| s.main_api())
            .map(str::to_string)
    }
}
