//! Identity sub-client — login, credential cache, request signing.

use std::time::Duration;

use async_lock::Mutex;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use zeroize::{Zeroize, Zeroizing};

use crate::error::IdentityError;
use crate::http::retry::{retry_constant, Classify, RetryClass};
use crate::http::{diagnostic_body, read_limited};
use crate::identity::wire::{
    AdvanceAuthRequest, AdvanceAuthResult, AuthEnvelope, StartAuthRequest, StartAuthResult,
};
use crate::identity::AuthSession;
use crate::network::NATIVE_CLIENT_HEADER;
use crate::telemetry::Telemetry;

/// Caps on authentication response bodies. Advance responses carry the
/// token and a profile blob, so they get more room than start responses.
const START_CAP: usize = 10 * 1024;
const ADVANCE_CAP: usize = 30 * 1024;

/// Cap on error-body diagnostics embedded in errors.
const DIAGNOSTIC_CAP: usize = 500;

/// Sleep between login attempts after a transient failure.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(10);

/// The only mechanism the agent can answer non-interactively.
const UP_MECHANISM: &str = "UP";

struct Credential {
    token: String,
    principal: String,
}

/// Authenticates a service principal and signs outgoing requests.
///
/// Safe to share across tasks: the cached credential sits behind its own
/// mutex, written only by a successful login and read by concurrent
/// [`sign`](IdentityClient::sign) calls.
pub struct IdentityClient {
    identity_api: String,
    subdomain: String,
    http: Client,
    telemetry: Telemetry,
    credential: Mutex<Option<Credential>>,
    retry_interval: Duration,
}

impl IdentityClient {
    pub fn new(identity_api: &str, subdomain: &str, http: Client, telemetry: Telemetry) -> Self {
        Self::with_retry_interval(identity_api, subdomain, http, telemetry, DEFAULT_RETRY_INTERVAL)
    }

    pub fn with_retry_interval(
        identity_api: &str,
        subdomain: &str,
        http: Client,
        telemetry: Telemetry,
        retry_interval: Duration,
    ) -> Self {
        Self {
            identity_api: identity_api.trim_end_matches('/').to_string(),
            subdomain: subdomain.to_string(),
            http,
            telemetry,
            credential: Mutex::new(None),
            retry_interval,
        }
    }

    /// Authenticate as `username`, caching the resulting bearer token.
    ///
    /// The caller's password buffer is zeroed before the first network
    /// operation: the client works from an internal [`Zeroizing`] copy, so
    /// even cancellation mid-login cannot leave the caller's bytes behind.
    /// Transient failures (5xx, transport) are retried with a constant
    /// backoff, unbounded; bound the call with a timeout if needed.
    /// Protocol rejections (wrong password, unsupported MFA, 4xx) abort
    /// immediately.
    pub async fn login(&self, username: &str, password: &mut [u8]) -> Result<(), IdentityError> {
        let secret = Zeroizing::new(password.to_vec());
        password.zeroize();

        let answer =
            std::str::from_utf8(&secret).map_err(|_| IdentityError::InvalidPassword)?;

        let token = retry_constant(self.retry_interval, || async move {
            let session = self.start_authentication(username).await?;
            self.advance_authentication(&session, answer).await
        })
        .await?;

        *self.credential.lock().await = Some(Credential {
            token,
            principal: username.to_string(),
        });
        tracing::debug!(principal = %username, "Login succeeded");
        Ok(())
    }

    /// Sign an outgoing request with the cached bearer token.
    ///
    /// Returns the authenticated principal name alongside the signed
    /// builder; downstream uses it for audit tagging.
    pub async fn sign(
        &self,
        req: RequestBuilder,
    ) -> Result<(RequestBuilder, String), IdentityError> {
        let credential = self.credential.lock().await;
        let credential = credential.as_ref().ok_or(IdentityError::NoCredential)?;
        Ok((
            req.bearer_auth(&credential.token),
            credential.principal.clone(),
        ))
    }

    /// Whether a login has ever completed on this client.
    pub async fn is_authenticated(&self) -> bool {
        self.credential.lock().await.is_some()
    }

    // ── Protocol steps ───────────────────────────────────────────────────

    async fn start_authentication(&self, username: &str) -> Result<AuthSession, IdentityError> {
        let request = StartAuthRequest {
            tenant_id: &self.subdomain,
            version: "1.0",
            user: username,
        };
        let envelope: AuthEnvelope<StartAuthResult> = self
            .post_auth("Security/StartAuthentication", "start", &request, START_CAP)
            .await?;

        let result = unwrap_envelope(envelope, "start")?;
        let mechanism = select_up_mechanism(&result)?;

        Ok(AuthSession {
            session_id: result.session_id,
            mechanism_id: mechanism,
        })
    }

    async fn advance_authentication(
        &self,
        session: &AuthSession,
        answer: &str,
    ) -> Result<String, IdentityError> {
        let request = AdvanceAuthRequest {
            action: "Answer",
            answer,
            mechanism_id: &session.mechanism_id,
            session_id: &session.session_id,
            tenant_id: &self.subdomain,
            persistent_login: true,
        };
        let envelope: AuthEnvelope<AdvanceAuthResult> = self
            .post_auth(
                "Security/AdvanceAuthentication",
                "advance",
                &request,
                ADVANCE_CAP,
            )
            .await?;

        // HTTP 200 with success == false is the normal wrong-password path.
        let result = unwrap_envelope(envelope, "advance")?;
        if result.summary != "LoginSuccess" {
            return Err(IdentityError::UnexpectedSummary {
                summary: result.summary,
            });
        }
        // A success summary is not enough: an empty token must never be
        // cached, or every signed request would carry a blank bearer.
        if result.token.is_empty() {
            return Err(IdentityError::MissingToken);
        }
        Ok(result.token)
    }

    async fn post_auth<T, B>(
        &self,
        path: &str,
        step: &'static str,
        body: &B,
        cap: usize,
    ) -> Result<AuthEnvelope<T>, IdentityError>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let url = format!("{}/{}", self.identity_api, path);

        // Serialize by hand; this local copy of the (possibly
        // password-bearing) bytes zeroes on drop. reqwest keeps its own
        // copy of the body for the duration of the send.
        let body = Zeroizing::new(
            serde_json::to_vec(body).map_err(|e| IdentityError::Malformed { step, source: e })?,
        );

        let req = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .header(NATIVE_CLIENT_HEADER, "true")
            .body(body.to_vec());
        let resp = self.telemetry.apply(req).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(status_error(step, status, diagnostic_body(resp, DIAGNOSTIC_CAP).await));
        }

        let body = read_limited(resp, cap)
            .await
            .map_err(|_| IdentityError::Oversized { step, cap })?;
        serde_json::from_slice(&body).map_err(|e| IdentityError::Malformed { step, source: e })
    }
}

fn status_error(step: &'static str, status: StatusCode, body: String) -> IdentityError {
    if status.is_server_error() {
        IdentityError::ServerError {
            step,
            status: status.as_u16(),
            body,
        }
    } else {
        IdentityError::ClientError {
            step,
            status: status.as_u16(),
            body,
        }
    }
}

fn unwrap_envelope<T>(envelope: AuthEnvelope<T>, step: &'static str) -> Result<T, IdentityError> {
    if !envelope.success {
        return Err(IdentityError::Rejected {
            step,
            message: envelope.message.unwrap_or_default(),
            error_id: envelope.error_id.unwrap_or_default(),
        });
    }
    envelope.result.ok_or_else(|| IdentityError::Malformed {
        step,
        source: serde::de::Error::custom("successful envelope without a Result"),
    })
}

/// Pick the single enrolled username+password mechanism, or refuse.
///
/// More than one challenge or mechanism means MFA is configured for the
/// principal; the agent cannot complete further factors, so the login is
/// rejected before any secret is sent.
fn select_up_mechanism(result: &StartAuthResult) -> Result<String, IdentityError> {
    if result.challenges.len() > 1 {
        return Err(IdentityError::MfaConfigured);
    }
    let challenge = result
        .challenges
        .first()
        .ok_or(IdentityError::NoUsableMechanism)?;
    if challenge.mechanisms.len() > 1 {
        return Err(IdentityError::MfaConfigured);
    }
    let mechanism = challenge
        .mechanisms
        .first()
        .ok_or(IdentityError::NoUsableMechanism)?;
    if mechanism.name != UP_MECHANISM || !mechanism.enrolled {
        return Err(IdentityError::NoUsableMechanism);
    }
    Ok(mechanism.mechanism_id.clone())
}

impl Classify for IdentityError {
    fn retry_class(&self) -> RetryClass {
        match self {
            IdentityError::ServerError { .. } => RetryClass::Retryable,
            IdentityError::Transport(e) => {
                if e.is_connect() || e.is_timeout() || e.is_request() {
                    RetryClass::Retryable
                } else {
                    RetryClass::Permanent
                }
            }
            _ => RetryClass::Permanent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::wire::{Challenge, Mechanism};

    fn up_mechanism(id: &str) -> Mechanism {
        Mechanism {
            name: "UP".to_string(),
            enrolled: true,
            mechanism_id: id.to_string(),
        }
    }

    fn start_result(challenges: Vec<Challenge>) -> StartAuthResult {
        StartAuthResult {
            session_id: "sess-1".to_string(),
            challenges,
        }
    }

    #[test]
    fn test_single_enrolled_up_mechanism_is_selected() {
        let result = start_result(vec![Challenge {
            mechanisms: vec![up_mechanism("mech-1")],
        }]);
        assert_eq!(select_up_mechanism(&result).unwrap(), "mech-1");
    }

    #[test]
    fn test_two_challenges_is_mfa() {
        let result = start_result(vec![
            Challenge {
                mechanisms: vec![up_mechanism("mech-1")],
            },
            Challenge {
                mechanisms: vec![up_mechanism("mech-2")],
            },
        ]);
        assert!(matches!(
            select_up_mechanism(&result),
            Err(IdentityError::MfaConfigured)
        ));
    }

    #[test]
    fn test_two_mechanisms_is_mfa() {
        let result = start_result(vec![Challenge {
            mechanisms: vec![up_mechanism("mech-1"), up_mechanism("mech-2")],
        }]);
        assert!(matches!(
            select_up_mechanism(&result),
            Err(IdentityError::MfaConfigured)
        ));
    }

    #[test]
    fn test_no_challenges_is_unusable() {
        let result = start_result(vec![]);
        assert!(matches!(
            select_up_mechanism(&result),
            Err(IdentityError::NoUsableMechanism)
        ));
    }

    #[test]
    fn test_unenrolled_or_foreign_mechanism_is_unusable() {
        for mechanism in [
            Mechanism {
                name: "UP".to_string(),
                enrolled: false,
                mechanism_id: "mech-1".to_string(),
            },
            Mechanism {
                name: "SMS".to_string(),
                enrolled: true,
                mechanism_id: "mech-2".to_string(),
            },
        ] {
            let result = start_result(vec![Challenge {
                mechanisms: vec![mechanism],
            }]);
            assert!(matches!(
                select_up_mechanism(&result),
                Err(IdentityError::NoUsableMechanism)
            ));
        }
    }

    #[test]
    fn test_server_errors_are_retryable() {
        let err = IdentityError::ServerError {
            step: "start",
            status: 503,
            body: String::new(),
        };
        assert_eq!(err.retry_class(), RetryClass::Retryable);
    }

    #[test]
    fn test_protocol_rejections_are_permanent() {
        let errors = [
            IdentityError::ClientError {
                step: "start",
                status: 403,
                body: String::new(),
            },
            IdentityError::Rejected {
                step: "advance",
                message: "bad password".to_string(),
                error_id: "auth001".to_string(),
            },
            IdentityError::MfaConfigured,
            IdentityError::NoUsableMechanism,
            IdentityError::UnexpectedSummary {
                summary: "OobPending".to_string(),
            },
            IdentityError::MissingToken,
            IdentityError::Oversized {
                step: "start",
                cap: START_CAP,
            },
        ];
        for err in errors {
            assert_eq!(err.retry_class(), RetryClass::Permanent, "{err}");
        }
    }
}
