//! Wire types for the Identity authentication API.
//!
//! The service speaks PascalCase with a lowercase `success` envelope flag;
//! renames are explicit rather than blanket `rename_all` because the
//! envelope mixes conventions.

use serde::{Deserialize, Serialize};

// ─── Requests ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StartAuthRequest<'a> {
    #[serde(rename = "TenantId")]
    pub tenant_id: &'a str,
    #[serde(rename = "Version")]
    pub version: &'a str,
    #[serde(rename = "User")]
    pub user: &'a str,
}

#[derive(Serialize)]
pub struct AdvanceAuthRequest<'a> {
    #[serde(rename = "Action")]
    pub action: &'a str,
    #[serde(rename = "Answer")]
    pub answer: &'a str,
    #[serde(rename = "MechanismId")]
    pub mechanism_id: &'a str,
    #[serde(rename = "SessionId")]
    pub session_id: &'a str,
    #[serde(rename = "TenantId")]
    pub tenant_id: &'a str,
    #[serde(rename = "PersistentLogin")]
    pub persistent_login: bool,
}

// ─── Responses ───────────────────────────────────────────────────────────────

/// Envelope common to both authentication steps.
#[derive(Debug, Deserialize)]
pub struct AuthEnvelope<T> {
    pub success: bool,
    #[serde(rename = "Result")]
    pub result: Option<T>,
    #[serde(rename = "Message")]
    pub message: Option<String>,
    #[serde(rename = "ErrorID")]
    pub error_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StartAuthResult {
    #[serde(rename = "SessionId")]
    pub session_id: String,
    #[serde(rename = "Challenges", default)]
    pub challenges: Vec<Challenge>,
}

#[derive(Debug, Deserialize)]
pub struct Challenge {
    #[serde(rename = "Mechanisms", default)]
    pub mechanisms: Vec<Mechanism>,
}

#[derive(Debug, Deserialize)]
pub struct Mechanism {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Enrolled", default)]
    pub enrolled: bool,
    #[serde(rename = "MechanismId")]
    pub mechanism_id: String,
}

#[derive(Debug, Deserialize)]
pub struct AdvanceAuthResult {
    #[serde(rename = "Summary", default)]
    pub summary: String,
    #[serde(rename = "Token", default)]
    pub token: String,
}
