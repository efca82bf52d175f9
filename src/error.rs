//! Unified SDK error types.

use thiserror::Error;

/// Top-level SDK error.
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("upload error: {0}")]
    Upload(#[from] UploadError),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Errors from the platform-discovery client.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("subdomain {subdomain:?} is unknown to platform discovery (check for a typo)")]
    NotFound { subdomain: String },

    #[error("no active identity service endpoint for subdomain {subdomain:?}; the tenant may be suspended")]
    MissingService { subdomain: String },

    #[error("discovery response exceeded or was truncated inside the {cap}-byte limit")]
    Oversized { cap: usize },

    #[error("unexpected discovery status: {status}")]
    UnexpectedStatus { status: String },

    #[error("malformed discovery response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors from the identity (challenge-response) client.
#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("identity service rejected {step}: {message} (error id: {error_id})")]
    Rejected {
        step: &'static str,
        message: String,
        error_id: String,
    },

    #[error("server error {status} during {step}: {body}")]
    ServerError {
        step: &'static str,
        status: u16,
        body: String,
    },

    #[error("client error {status} during {step}: {body}")]
    ClientError {
        step: &'static str,
        status: u16,
        body: String,
    },

    #[error("multi-factor authentication is configured for this principal and is not supported")]
    MfaConfigured,

    #[error("no usable authentication mechanism offered (expected a single enrolled \"UP\" mechanism)")]
    NoUsableMechanism,

    #[error("login did not complete: server answered with summary {summary:?}")]
    UnexpectedSummary { summary: String },

    #[error("login reported success but returned no token")]
    MissingToken,

    #[error("{step} response exceeded or was truncated inside the {cap}-byte limit")]
    Oversized { step: &'static str, cap: usize },

    #[error("malformed {step} response: {source}")]
    Malformed {
        step: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("password is not valid UTF-8")]
    InvalidPassword,

    #[error("not authenticated: no login has completed")]
    NoCredential,
}

/// Errors from the snapshot upload client.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("cluster ID cannot be left empty")]
    EmptyClusterId,

    #[error("signing snapshot-link request: {0}")]
    Sign(#[from] IdentityError),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("snapshot-link request returned {status}: {body}")]
    LinkRejected { status: u16, body: String },

    #[error("pre-signed upload returned {status}: {body}")]
    UploadRejected { status: u16, body: String },

    #[error("snapshot-link response exceeded or was truncated inside the {cap}-byte limit")]
    Oversized { cap: usize },

    #[error("malformed snapshot-link response: {0}")]
    Malformed(serde_json::Error),

    #[error("serializing snapshot: {0}")]
    Serialize(serde_json::Error),
}
