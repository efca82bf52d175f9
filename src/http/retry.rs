//! Constant-backoff retry loop over retryable/permanent error classes.
//!
//! The loop knows nothing about HTTP: errors tag themselves via [`Classify`]
//! and the loop only decides whether to sleep and go again. Attempts are
//! unbounded; the caller bounds the loop by dropping the future (a timeout
//! or select at the call site), which also aborts an in-flight backoff
//! sleep promptly.

use std::future::Future;
use std::time::Duration;

use futures_timer::Delay;

/// Whether retrying an operation can possibly help.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    /// Transient: server errors, transport failures. Worth another attempt.
    Retryable,
    /// Permanent: client errors, protocol rejections. Retrying cannot help.
    Permanent,
}

/// Errors that know their own retry class.
pub trait Classify {
    fn retry_class(&self) -> RetryClass;
}

/// Run `op` until it succeeds or fails permanently, sleeping `interval`
/// between attempts.
pub async fn retry_constant<T, E, F, Fut>(interval: Duration, mut op: F) -> Result<T, E>
where
    E: Classify + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt: u64 = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.retry_class() == RetryClass::Permanent => return Err(e),
            Err(e) => {
                tracing::debug!(
                    attempt,
                    delay_ms = interval.as_millis() as u64,
                    "Retrying after transient failure: {}",
                    e
                );
                Delay::new(interval).await;
                attempt += 1;
            }
        }
    }
}
