//! Identity — two-step challenge-response login and request signing.
//!
//! Models the upstream Identity service's `StartAuthentication` /
//! `AdvanceAuthentication` protocol. Only the username+password ("UP")
//! mechanism is supported: a tenant that presents more than one challenge
//! or mechanism has multi-factor authentication configured, which the agent
//! cannot complete non-interactively, so login fails without retrying.

pub mod client;
pub mod wire;

pub use client::IdentityClient;

/// Session state carried from the start step into the advance step.
///
/// Short-lived, scoped to one login attempt; holds no secret material.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub session_id: String,
    pub mechanism_id: String,
}
