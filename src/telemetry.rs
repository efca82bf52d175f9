//! Vendor telemetry header — computed once, injected into every client.
//!
//! The value identifies the integration to CyberArk-owned services:
//! a url-encoded field list, base64url-encoded without padding. It is
//! attached to discovery, identity, and snapshot-link requests but never
//! to the pre-signed storage PUT (that URL points outside the CyberArk
//! API surface).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use reqwest::RequestBuilder;

use crate::network::{AGENT_NAME, TELEMETRY_HEADER};

/// Immutable telemetry value for one process.
///
/// Constructed once with the agent version and handed to each client at
/// construction time; there is no global instance.
#[derive(Debug, Clone)]
pub struct Telemetry {
    value: String,
}

impl Telemetry {
    pub fn new(agent_version: &str) -> Self {
        let fields = [
            ("in", AGENT_NAME),
            ("vn", "CyberArk"),
            ("it", "KubernetesAgent"),
            ("iv", agent_version),
        ];
        let encoded = fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        Self {
            value: URL_SAFE_NO_PAD.encode(encoded),
        }
    }

    /// Attach the telemetry header to an outgoing request.
    pub fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        req.header(TELEMETRY_HEADER, &self.value)
    }

    /// The raw header value.
    pub fn header_value(&self) -> &str {
        &self.value
    }
}
