//! Network constants for the CyberArk service surface.

/// Production platform-discovery base URL. Override via
/// `DiscoClientBuilder::discovery_url` for test and integration environments.
pub const DEFAULT_DISCOVERY_URL: &str = "https://platform-discovery.cyberark.cloud/api/v2/services";

/// Service name of the Identity (authentication) API in discovery responses.
pub const IDENTITY_SERVICE_NAME: &str = "identity_administration";

/// Service name of the Discovery-Context (inventory ingestion) API.
pub const DISCOVERY_CONTEXT_SERVICE_NAME: &str = "discovery_context";

/// Header carrying the vendor telemetry value on CyberArk-owned calls.
pub const TELEMETRY_HEADER: &str = "x-cybr-telemetry";

/// Marker header the Identity service expects from non-browser clients.
pub const NATIVE_CLIENT_HEADER: &str = "X-IDAP-NATIVE-CLIENT";

/// Integration name reported in telemetry and the user agent.
pub const AGENT_NAME: &str = "cyberark-disco-agent";
