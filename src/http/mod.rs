//! Shared HTTP plumbing: client construction and size-bounded body reads.

pub mod retry;

use std::time::Duration;

use reqwest::{Client, Response};
use thiserror::Error;

/// Build the shared HTTP client used by every component.
pub(crate) fn build_client(agent_version: &str) -> Client {
    Client::builder()
        .user_agent(format!(
            "{}/{}",
            crate::network::AGENT_NAME,
            agent_version
        ))
        .timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(10)
        .build()
        .expect("Failed to build HTTP client")
}

/// A response body could not be read in full within its byte cap.
///
/// Truncation mid-body and cap overflow are one error class: either way
/// the bytes on hand must not be fed to the JSON decoder.
#[derive(Error, Debug)]
pub enum BodyLimitError {
    #[error("response body exceeded the {cap}-byte limit")]
    TooLarge { cap: usize },

    #[error("response body truncated: {0}")]
    Truncated(#[from] reqwest::Error),
}

/// Read a response body with a hard byte cap, streaming chunk by chunk.
pub(crate) async fn read_limited(
    mut resp: Response,
    cap: usize,
) -> Result<Vec<u8>, BodyLimitError> {
    let mut body = Vec::new();
    while let Some(chunk) = resp.chunk().await? {
        if body.len() + chunk.len() > cap {
            return Err(BodyLimitError::TooLarge { cap });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Read up to `cap` bytes of an error body for diagnostics, best effort.
///
/// Longer bodies are cut at the cap rather than rejected; a lost connection
/// mid-read yields whatever arrived so far.
pub(crate) async fn diagnostic_body(mut resp: Response, cap: usize) -> String {
    let mut body = Vec::new();
    while body.len() < cap {
        match resp.chunk().await {
            Ok(Some(chunk)) => body.extend_from_slice(&chunk),
            Ok(None) | Err(_) => break,
        }
    }
    body.truncate(cap);
    String::from_utf8_lossy(&body).into_owned()
}
