//! Three-step secondary login sequence.
//!
//! One orchestration run executes strictly in order: resolve the module
//! configuration, authenticate the user's credentials, exchange the
//! primary-provider token. Each step is attempted exactly once and gates
//! the next; the first failure ends the run with nothing. Configuration
//! is re-resolved on every invocation, so a caller wanting retries simply
//! re-invokes the whole sequence.

use crate::client::SecondaryAuthClient;
use crate::wire::SecondaryIdentity;
use gatewarden_core::HttpTransport;
use gatewarden_session::ProviderOptions;
use std::sync::Arc;
use tracing::instrument;

/// Drives the three-step login against the secondary provider.
pub struct SecondaryOrchestrator {
    client: SecondaryAuthClient,
    module_name: String,
    client_id: String,
    issuer: String,
}

impl SecondaryOrchestrator {
    /// Creates an orchestrator for the configured secondary integration.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, options: &ProviderOptions) -> Self {
        Self {
            client: SecondaryAuthClient::new(transport, options),
            module_name: options.secondary.module_name.clone(),
            client_id: options.client_id.clone(),
            issuer: options.issuer.clone(),
        }
    }

    /// Runs the full authentication sequence once.
    ///
    /// Returns the identity issued by the credential login (step 2), or
    /// `None` if step 1 or step 2 failed. The token exchange (step 3) is
    /// an advisory confirmation: its failure is logged as an error but
    /// does not change the result.
    #[instrument(skip(self, password, provider_access_token))]
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
        provider_access_token: &str,
    ) -> Option<SecondaryIdentity> {
        tracing::info!("initiating secondary authentication sequence");

        let module_config = self.client.resolve_module_config(&self.module_name).await;
        let Some(api_key) = module_config.as_ref().and_then(|config| config.api_key()) else {
            tracing::error!(
                "authentication failed: no api key in module configuration, cannot proceed"
            );
            return None;
        };

        let Some(identity) = self
            .client
            .login_with_credentials(email, password, api_key)
            .await
        else {
            tracing::error!("authentication failed: secondary login returned no tokens");
            return None;
        };

        if identity.token.is_empty() {
            tracing::error!("authentication failed: secondary login returned an empty token");
            return None;
        }

        // Advisory step: the run's result is the step-2 identity whether
        // or not the exchange succeeds.
        let exchange = self
            .client
            .exchange_provider_token(provider_access_token, &self.client_id, &self.issuer, api_key)
            .await;
        if exchange.is_none() {
            tracing::error!("provider token exchange failed after successful secondary login");
        }

        Some(identity)
    }
}
