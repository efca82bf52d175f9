//! Wire types for platform-discovery responses.

use serde::Deserialize;

/// Top-level discovery response for one subdomain.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryResponse {
    pub tenant_id: String,
    #[serde(default)]
    pub services: Vec<ServiceEntry>,
}

/// One named service with its advertised endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceEntry {
    pub service_name: String,
    #[serde(default)]
    pub endpoints: Vec<EndpointEntry>,
}

/// One advertised endpoint of a service.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointEntry {
    #[serde(rename = "type")]
    pub endpoint_type: String,
    pub is_active: bool,
    #[serde(default)]
    pub api: String,
}

impl ServiceEntry {
    /// The first endpoint usable by the agent: tagged `main`, active, and
    /// carrying a non-empty API URL.
    pub fn main_api(&self) -> Option<&str> {
        self.endpoints
            .iter()
            .find(|e| e.endpoint_type == "main" && e.is_active && !e.api.is_empty())
            .map(|e| e.api.as_str())
    }
}
