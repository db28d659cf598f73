//! Per-request access-token freshness check and refresh protocol.
//!
//! The guard runs once on each inbound request's own execution path. A
//! failed refresh is always terminal for that request: the session is
//! rejected and the next protected request starts the decision fresh. No
//! retries, and no writer other than this path ever touches the token
//! store.

use crate::options::ProviderOptions;
use crate::tokens::{TokenSet, TokenStore};
use chrono::{DateTime, Duration, Utc};
use gatewarden_core::{AuthFailure, HttpTransport};
use std::sync::Arc;
use tracing::instrument;

/// Safety margin subtracted from the stored expiry when deciding whether
/// the access token is still usable.
pub const EXPIRATION_BUFFER_SECONDS: i64 = 60;

/// Freshness decision for the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewalDecision {
    /// The access token is still inside its validity window.
    Valid,
    /// The expiry is near, absent, or unreadable; a refresh is required.
    NeedsRefresh,
}

/// Result of running the guard against a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewalOutcome {
    /// Fast path: nothing was touched, no network call was made.
    Valid,
    /// The token triple was replaced; the caller must persist the
    /// session.
    Renewed,
    /// The session was rejected and the user must re-authenticate.
    Rejected,
}

/// Decides, per request, whether the session's access token is fresh and
/// refreshes it against the primary provider's token endpoint when it is
/// not.
pub struct RenewalGuard {
    transport: Arc<dyn HttpTransport>,
    issuer: String,
    client_id: String,
}

impl RenewalGuard {
    /// Creates a guard for the configured primary provider.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, options: &ProviderOptions) -> Self {
        Self {
            transport,
            issuer: options.issuer.clone(),
            client_id: options.client_id.clone(),
        }
    }

    /// The primary provider's token endpoint.
    #[must_use]
    pub fn token_endpoint(&self) -> String {
        format!("{}/token-srv/token", self.issuer.trim_end_matches('/'))
    }

    /// Pure freshness decision.
    ///
    /// An absent or unparseable expiry counts as stale: the guard would
    /// rather refresh once too often than trust a timestamp it cannot
    /// read.
    #[must_use]
    pub fn decide(expires_at: Option<&str>, now: DateTime<Utc>) -> RenewalDecision {
        let Some(raw) = expires_at else {
            return RenewalDecision::NeedsRefresh;
        };

        let Ok(expires_at) = DateTime::parse_from_rfc3339(raw) else {
            return RenewalDecision::NeedsRefresh;
        };

        if expires_at.with_timezone(&Utc) - Duration::seconds(EXPIRATION_BUFFER_SECONDS) < now {
            RenewalDecision::NeedsRefresh
        } else {
            RenewalDecision::Valid
        }
    }

    /// Runs the refresh-or-reject protocol for one request.
    ///
    /// The fast path performs no network call and leaves the store
    /// untouched. On refresh, the new token triple is buffered and
    /// committed with a single atomic `replace` only after the response
    /// parsed completely; a cancelled or failed refresh leaves the
    /// session exactly as it was (apart from rejection).
    #[instrument(skip(self, store))]
    pub async fn validate_session(&self, store: &mut dyn TokenStore) -> RenewalOutcome {
        let now = Utc::now();

        if Self::decide(store.expires_at().as_deref(), now) == RenewalDecision::Valid {
            return RenewalOutcome::Valid;
        }

        let refresh_token = match store.refresh_token() {
            Some(token) if !token.is_empty() => token,
            _ => {
                tracing::warn!("no refresh token in session, forcing re-authentication");
                store.reject();
                return RenewalOutcome::Rejected;
            }
        };

        tracing::debug!("access token stale, calling token endpoint");

        match self.refresh(&refresh_token, now).await {
            Ok(tokens) => {
                store.replace(&tokens);
                tracing::info!("session renewed, cookie will be rewritten with new tokens");
                RenewalOutcome::Renewed
            }
            Err(failure) => {
                tracing::error!(%failure, "token refresh failed, forcing re-authentication");
                store.reject();
                RenewalOutcome::Rejected
            }
        }
    }

    /// Calls the token endpoint and builds the replacement token set.
    ///
    /// Nothing is written anywhere until this returns Ok with all three
    /// fields present.
    async fn refresh(
        &self,
        refresh_token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenSet, AuthFailure> {
        let reply = self
            .transport
            .post_form(
                &self.token_endpoint(),
                &[
                    ("grant_type", "refresh_token"),
                    ("client_id", &self.client_id),
                    ("refresh_token", refresh_token),
                ],
            )
            .await?;

        if !reply.is_success() {
            return Err(AuthFailure::Protocol {
                status: reply.status,
            });
        }

        let body: serde_json::Value =
            serde_json::from_str(&reply.body).map_err(|e| AuthFailure::MalformedResponse {
                reason: format!("token response is not JSON: {e}"),
            })?;

        let access_token = required_str(&body, "access_token")?;
        let new_refresh_token = required_str(&body, "refresh_token")?;
        let expires_in = body
            .get("expires_in")
            .and_then(serde_json::Value::as_i64)
            .ok_or(AuthFailure::MalformedResponse {
                reason: "missing field `expires_in`".to_string(),
            })?;

        Ok(TokenSet {
            access_token,
            refresh_token: new_refresh_token,
            expires_at: (now + Duration::seconds(expires_in)).to_rfc3339(),
        })
    }
}

fn required_str(body: &serde_json::Value, field: &str) -> Result<String, AuthFailure> {
    body.get(field)
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| AuthFailure::MalformedResponse {
            reason: format!("missing field `{field}`"),
        })
}
