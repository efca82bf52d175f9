//! Platform discovery — tenant subdomain to service endpoints.

pub mod client;
pub mod wire;

pub use client::DiscoveryClient;

/// Endpoints resolved for one tenant, immutable once returned.
///
/// `identity_api` is always non-empty on a successful resolve.
/// `discovery_context_api` may be empty: the inventory ingestion surface is
/// still rolling out and not every tenant has it enabled yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoints {
    /// Base URL of the Identity (authentication) API.
    pub identity_api: String,
    /// Base URL of the Discovery-Context (inventory ingestion) API.
    pub discovery_context_api: String,
    /// Tenant identifier (UUID string) reported by platform discovery.
    pub tenant_id: String,
}
