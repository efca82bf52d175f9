//! # disco-agent-sdk
//!
//! The secure-upload pipeline of the CyberArk Kubernetes inventory agent:
//! tenant service discovery, challenge-response identity login, and
//! integrity-verified snapshot delivery to object storage.
//!
//! ## Architecture
//!
//! The crate is organized in layers:
//!
//! 1. **Core** — network constants, error taxonomy, the telemetry value
//! 2. **Shared HTTP** — client construction, bounded body reads, the
//!    retryable/permanent backoff loop
//! 3. **Components** — `discovery`, `identity`, `upload` clients
//! 4. **High-Level Client** — `DiscoClient` wiring one upload cycle
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use disco_agent_sdk::prelude::*;
//!
//! let client = DiscoClient::builder()
//!     .subdomain("acme-corp")
//!     .agent_version("1.4.0")
//!     .build()?;
//!
//! let mut password = std::env::var("AGENT_SECRET")?.into_bytes();
//! client.login("svc-inventory@acme-corp", &mut password).await?;
//! client.put_snapshot(&snapshot).await?;
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Unified SDK error types.
pub mod error;

/// Network URL, service-name, and header-name constants.
pub mod network;

/// Vendor telemetry header value, computed once and injected.
pub mod telemetry;

// ── Layer 2: Shared HTTP ─────────────────────────────────────────────────────

/// HTTP client construction, bounded reads, retry classification.
pub mod http;

// ── Layer 3: Components ──────────────────────────────────────────────────────

/// Platform discovery: subdomain → service endpoints, with caching.
pub mod discovery;

/// Identity: two-step login, credential cache, request signing.
pub mod identity;

/// Upload: pre-signed URL exchange and integrity-verified PUT.
pub mod upload;

// ── Layer 4: High-Level Client ───────────────────────────────────────────────

/// `DiscoClient` — the primary entry point.
pub mod client;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    pub use crate::client::{DiscoClient, DiscoClientBuilder};
    pub use crate::discovery::{DiscoveryClient, ServiceEndpoints};
    pub use crate::error::{DiscoveryError, IdentityError, SdkError, UploadError};
    pub use crate::http::retry::{Classify, RetryClass};
    pub use crate::identity::IdentityClient;
    pub use crate::network::DEFAULT_DISCOVERY_URL;
    pub use crate::telemetry::Telemetry;
    pub use crate::upload::{Snapshot, UploadClient};
}
