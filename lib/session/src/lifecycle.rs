//! Login and logout entry points.
//!
//! The OIDC protocol itself (challenge redirect, sign-out mechanics) is
//! delegated to the host's middleware through `IdentityGateway`. The
//! lifecycle adds what the broker owns: starting the per-principal
//! monitor once a ticket is established and tearing it down on logout.

use crate::monitor::{RenewalMonitor, DEFAULT_MONITOR_INTERVAL};
use crate::options::ProviderOptions;
use async_trait::async_trait;
use gatewarden_core::AuthFailure;
use std::sync::{Arc, Mutex};

/// Which authentication scheme a sign-out targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutScheme {
    /// The host's local session (the cookie).
    Local,
    /// The primary OIDC provider.
    Provider,
}

/// Seam to the host's OIDC middleware.
#[async_trait]
pub trait IdentityGateway: Send + Sync {
    /// Triggers a login challenge, redirecting the user agent to the
    /// primary provider.
    async fn challenge(&self, redirect_uri: &str) -> Result<(), AuthFailure>;

    /// Signs out of the given scheme. Signing out of a scheme that holds
    /// no session must be a no-op, not an error.
    async fn sign_out(
        &self,
        scheme: SignOutScheme,
        redirect_uri: Option<&str>,
    ) -> Result<(), AuthFailure>;
}

/// Login/logout entry points for one principal's session.
pub struct SessionLifecycle {
    gateway: Arc<dyn IdentityGateway>,
    monitor: Mutex<RenewalMonitor>,
    post_logout_redirect_uri: String,
}

impl SessionLifecycle {
    /// Creates a lifecycle over the host's identity gateway.
    #[must_use]
    pub fn new(gateway: Arc<dyn IdentityGateway>, options: &ProviderOptions) -> Self {
        Self {
            gateway,
            monitor: Mutex::new(RenewalMonitor::new()),
            post_logout_redirect_uri: options.post_logout_redirect_uri.clone(),
        }
    }

    /// Starts the login flow by challenging against the primary
    /// provider. No local state changes.
    pub async fn login(&self) -> Result<(), AuthFailure> {
        self.gateway.challenge("/").await
    }

    /// Called once the middleware has established a ticket. Starts the
    /// read-only monitor when the ticket carries a refresh token.
    pub fn session_established(&self, principal: &str, refresh_token: Option<&str>) {
        if refresh_token.is_some_and(|t| !t.is_empty()) {
            self.monitor
                .lock()
                .expect("monitor lock poisoned")
                .start(principal, DEFAULT_MONITOR_INTERVAL);
        }
    }

    /// Logs out: stops the monitor, then signs out of the local session
    /// and the primary provider. Idempotent; gateway failures are logged
    /// and swallowed so a half-gone session can always be torn down.
    pub async fn logout(&self) {
        self.monitor
            .lock()
            .expect("monitor lock poisoned")
            .stop();

        if let Err(failure) = self.gateway.sign_out(SignOutScheme::Local, None).await {
            tracing::error!(%failure, "local sign-out failed");
        }

        tracing::warn!(
            redirect_uri = %self.post_logout_redirect_uri,
            "redirecting to identity provider to sign out"
        );

        if let Err(failure) = self
            .gateway
            .sign_out(
                SignOutScheme::Provider,
                Some(&self.post_logout_redirect_uri),
            )
            .await
        {
            tracing::error!(%failure, "provider sign-out failed");
        }
    }

    /// Returns true while the monitor heartbeat is running.
    #[must_use]
    pub fn monitor_running(&self) -> bool {
        self.monitor
            .lock()
            .expect("monitor lock poisoned")
            .is_running()
    }
}
