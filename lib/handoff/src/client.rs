//! Stateless client for the secondary provider's three endpoints.
//!
//! Every operation follows the same boundary contract: transport
//! failures, non-2xx replies, and malformed bodies are logged here and
//! surface to callers only as `None`. The client holds no session state;
//! it never touches the token store.

use crate::wire::{decode_auth_config, AppValidationResponse, ModuleAuthConfig, SecondaryIdentity};
use gatewarden_core::{AuthFailure, HttpTransport};
use gatewarden_session::ProviderOptions;
use std::sync::Arc;
use tracing::instrument;

/// Client over the secondary provider's app-validation, credential-login,
/// and token-exchange endpoints.
pub struct SecondaryAuthClient {
    transport: Arc<dyn HttpTransport>,
    api_base_url: String,
    application_code: String,
    redirect_url: String,
}

impl SecondaryAuthClient {
    /// Creates a client for the configured secondary provider.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, options: &ProviderOptions) -> Self {
        Self {
            transport,
            api_base_url: options.secondary.api_base_url.clone(),
            application_code: options.secondary.application_code.clone(),
            redirect_url: options.redirect_uri.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.api_base_url.trim_end_matches('/'))
    }

    /// Resolves the authentication profile for one integration module
    /// from the application catalog.
    ///
    /// Absent on any failure: unreachable endpoint, non-2xx reply, a
    /// catalog without configurations or without an `AuthConfig` entry,
    /// an undecodable nested document, or no module with a matching name
    /// (case-insensitive).
    #[instrument(skip(self))]
    pub async fn resolve_module_config(&self, module_name: &str) -> Option<ModuleAuthConfig> {
        let url = self.endpoint(&format!(
            "api/validate/app?value={}",
            self.application_code
        ));
        tracing::info!(%url, "validating application");

        match self.try_resolve(&url, module_name).await {
            Ok(found) => found,
            Err(failure) => {
                tracing::error!(%failure, "app validation failed");
                None
            }
        }
    }

    async fn try_resolve(
        &self,
        url: &str,
        module_name: &str,
    ) -> Result<Option<ModuleAuthConfig>, AuthFailure> {
        let reply = self.transport.get(url).await?;
        if !reply.is_success() {
            return Err(AuthFailure::Protocol {
                status: reply.status,
            });
        }

        let envelope: AppValidationResponse =
            serde_json::from_str(&reply.body).map_err(|e| AuthFailure::MalformedResponse {
                reason: format!("app validation body did not parse: {e}"),
            })?;

        let Some(entries) = envelope.configurations else {
            tracing::warn!("app validation succeeded but returned no configurations");
            return Ok(None);
        };

        let Some(container) = entries.iter().find(|entry| entry.key == "AuthConfig") else {
            tracing::warn!("AuthConfig not found in configurations");
            return Ok(None);
        };

        let modules = decode_auth_config(&container.value)?;

        let found = modules
            .into_iter()
            .find(|config| config.module.eq_ignore_ascii_case(module_name));

        match &found {
            Some(_) => tracing::info!(module = module_name, "found AuthConfig for module"),
            None => tracing::warn!(module = module_name, "no AuthConfig for module"),
        }

        Ok(found)
    }

    /// Logs the user in against the secondary provider with email and
    /// password.
    ///
    /// A 2xx reply alone is not success: `token`, `refreshToken`, and
    /// the nested account id must all be present, or the login counts as
    /// failed.
    #[instrument(skip(self, password, api_key))]
    pub async fn login_with_credentials(
        &self,
        email: &str,
        password: &str,
        api_key: &str,
    ) -> Option<SecondaryIdentity> {
        let url = self.endpoint("api/auth/email");
        tracing::info!(email, %url, "attempting secondary login");

        let payload = serde_json::json!({
            "apiKey": api_key,
            "emailAddress": email,
            "password": password,
        });

        let reply = match self.transport.post_json(&url, &payload).await {
            Ok(reply) => reply,
            Err(failure) => {
                tracing::error!(%failure, "secondary login request failed");
                return None;
            }
        };

        if !reply.is_success() {
            tracing::error!(
                status = reply.status,
                body = %reply.body,
                "secondary login failed"
            );
            return None;
        }

        let Ok(body) = serde_json::from_str::<serde_json::Value>(&reply.body) else {
            tracing::error!("secondary login returned 2xx with an unparseable body");
            return None;
        };

        let token = body.get("token").and_then(serde_json::Value::as_str);
        let refresh_token = body.get("refreshToken").and_then(serde_json::Value::as_str);
        let person_id = body
            .get("account")
            .and_then(|account| account.get("PersonId"))
            .and_then(serde_json::Value::as_i64);

        match (token, refresh_token, person_id) {
            (Some(token), Some(refresh_token), Some(person_id)) => Some(SecondaryIdentity {
                token: token.to_string(),
                refresh_token: refresh_token.to_string(),
                account_id: person_id.to_string(),
            }),
            _ => {
                tracing::error!("secondary login returned 2xx but missing tokens or account id");
                None
            }
        }
    }

    /// Exchanges the primary-provider access token for a secondary
    /// session.
    ///
    /// Success is any 2xx with a parseable body; the returned document
    /// is informational only.
    #[instrument(skip(self, access_token, api_key))]
    pub async fn exchange_provider_token(
        &self,
        access_token: &str,
        client_id: &str,
        issuer: &str,
        api_key: &str,
    ) -> Option<serde_json::Value> {
        let url = self.endpoint("api/auth/cidaas");
        tracing::info!("attempting provider token exchange");

        let payload = serde_json::json!({
            "apiKey": api_key,
            "access_token": access_token,
            "clientId": client_id,
            "redirectUrl": self.redirect_url,
            "issuer": issuer,
        });

        let reply = match self.transport.post_json(&url, &payload).await {
            Ok(reply) => reply,
            Err(failure) => {
                tracing::error!(%failure, "token exchange request failed");
                return None;
            }
        };

        if !reply.is_success() {
            tracing::error!(
                status = reply.status,
                body = %reply.body,
                "token exchange failed"
            );
            return None;
        }

        match serde_json::from_str(&reply.body) {
            Ok(document) => {
                tracing::info!("token exchange succeeded");
                Some(document)
            }
            Err(e) => {
                tracing::error!(error = %e, "token exchange returned 2xx with an unparseable body");
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use gatewarden_core::HttpReply;
    use gatewarden_session::{ProviderOptions, SecondaryOptions};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Transport that replays scripted replies and records every call.
    #[derive(Default)]
    pub(crate) struct MockTransport {
        replies: Mutex<VecDeque<Result<HttpReply, AuthFailure>>>,
        calls: Mutex<Vec<String>>,
    }

    impl MockTransport {
        pub(crate) fn reply(self, status: u16, body: &str) -> Self {
            self.replies.lock().unwrap().push_back(Ok(HttpReply {
                status,
                body: body.to_string(),
            }));
            self
        }

        pub(crate) fn fail(self, failure: AuthFailure) -> Self {
            self.replies.lock().unwrap().push_back(Err(failure));
            self
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn next_reply(&self, description: String) -> Result<HttpReply, AuthFailure> {
            self.calls.lock().unwrap().push(description);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected network call")
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn get(&self, url: &str) -> Result<HttpReply, AuthFailure> {
            self.next_reply(format!("GET {url}"))
        }

        async fn get_bearer(&self, url: &str, _token: &str) -> Result<HttpReply, AuthFailure> {
            self.next_reply(format!("GET(bearer) {url}"))
        }

        async fn post_json(
            &self,
            url: &str,
            body: &serde_json::Value,
        ) -> Result<HttpReply, AuthFailure> {
            self.next_reply(format!("POST {url} {body}"))
        }

        async fn post_form(
            &self,
            url: &str,
            _fields: &[(&str, &str)],
        ) -> Result<HttpReply, AuthFailure> {
            self.next_reply(format!("POST(form) {url}"))
        }
    }

    pub(crate) fn options() -> ProviderOptions {
        ProviderOptions {
            issuer: "https://id.example.com".to_string(),
            client_id: "client-123".to_string(),
            redirect_uri: "https://app.example.com/callback".to_string(),
            post_logout_redirect_uri: "https://app.example.com/".to_string(),
            discovery_url: "https://id.example.com/.well-known/openid-configuration".to_string(),
            scopes: vec!["openid".to_string()],
            secondary: SecondaryOptions {
                environment: "production".to_string(),
                europe: false,
                application_code: "APP1".to_string(),
                module_name: "Portal".to_string(),
                api_base_url: "https://legacy.example.com".to_string(),
            },
        }
    }

    pub(crate) fn catalog_body() -> String {
        serde_json::json!({
            "Code": "APP1",
            "Name": "Portal App",
            "Configurations": [
                {"_id": 1, "Key": "Theme", "Value": {"color": "blue"}},
                {"_id": 2, "Key": "AuthConfig", "Value": [
                    {"Module": "Portal", "Cidaas": {"apiKey": "key-1"}},
                    {"Module": "Backoffice", "Cidaas": {"apiKey": "key-2"}}
                ]}
            ]
        })
        .to_string()
    }

    fn client(transport: MockTransport) -> (SecondaryAuthClient, Arc<MockTransport>) {
        let transport = Arc::new(transport);
        (
            SecondaryAuthClient::new(transport.clone(), &options()),
            transport,
        )
    }

    #[tokio::test]
    async fn resolve_finds_module_case_insensitively() {
        let (client, transport) = client(MockTransport::default().reply(200, &catalog_body()));

        let config = client.resolve_module_config("portal").await.expect("found");

        assert_eq!(config.module, "Portal");
        assert_eq!(config.api_key(), Some("key-1"));
        assert_eq!(
            transport.calls(),
            ["GET https://legacy.example.com/api/validate/app?value=APP1"]
        );
    }

    #[tokio::test]
    async fn resolve_ignores_non_auth_config_entries() {
        let body = serde_json::json!({
            "Configurations": [
                {"_id": 1, "Key": "Branding", "Value": [{"Module": "Portal"}]},
                {"_id": 2, "Key": "AuthConfig", "Value": [{"Module": "Portal", "Cidaas": {"apiKey": "real"}}]}
            ]
        })
        .to_string();
        let (client, _) = client(MockTransport::default().reply(200, &body));

        let config = client.resolve_module_config("Portal").await.expect("found");
        assert_eq!(config.api_key(), Some("real"));
    }

    #[tokio::test]
    async fn resolve_uses_first_auth_config_entry() {
        let body = serde_json::json!({
            "Configurations": [
                {"_id": 1, "Key": "AuthConfig", "Value": [{"Module": "Portal", "Cidaas": {"apiKey": "first"}}]},
                {"_id": 2, "Key": "AuthConfig", "Value": [{"Module": "Portal", "Cidaas": {"apiKey": "second"}}]}
            ]
        })
        .to_string();
        let (client, _) = client(MockTransport::default().reply(200, &body));

        let config = client.resolve_module_config("Portal").await.expect("found");
        assert_eq!(config.api_key(), Some("first"));
    }

    #[tokio::test]
    async fn resolve_without_auth_config_key_is_absent() {
        let body = serde_json::json!({
            "Configurations": [{"_id": 1, "Key": "Theme", "Value": {}}]
        })
        .to_string();
        let (client, _) = client(MockTransport::default().reply(200, &body));

        assert!(client.resolve_module_config("Portal").await.is_none());
    }

    #[tokio::test]
    async fn resolve_without_configurations_is_absent() {
        let (client, _) = client(MockTransport::default().reply(200, r#"{"Code":"APP1"}"#));
        assert!(client.resolve_module_config("Portal").await.is_none());
    }

    #[tokio::test]
    async fn resolve_unknown_module_is_absent() {
        let (client, _) = client(MockTransport::default().reply(200, &catalog_body()));
        assert!(client.resolve_module_config("Warehouse").await.is_none());
    }

    #[tokio::test]
    async fn resolve_non_2xx_is_absent() {
        let (client, _) = client(MockTransport::default().reply(503, "unavailable"));
        assert!(client.resolve_module_config("Portal").await.is_none());
    }

    #[tokio::test]
    async fn resolve_transport_failure_is_absent() {
        let (client, _) = client(MockTransport::default().fail(AuthFailure::Transport {
            reason: "dns".to_string(),
        }));
        assert!(client.resolve_module_config("Portal").await.is_none());
    }

    #[tokio::test]
    async fn login_success_returns_identity() {
        let body = r#"{"token":"t","refreshToken":"r","account":{"PersonId":42}}"#;
        let (client, transport) = client(MockTransport::default().reply(200, body));

        let identity = client
            .login_with_credentials("alice@example.com", "pw", "key-1")
            .await
            .expect("identity");

        assert_eq!(identity.token, "t");
        assert_eq!(identity.refresh_token, "r");
        assert_eq!(identity.account_id, "42");

        let calls = transport.calls();
        assert!(calls[0].starts_with("POST https://legacy.example.com/api/auth/email"));
        assert!(calls[0].contains("\"emailAddress\":\"alice@example.com\""));
        assert!(calls[0].contains("\"apiKey\":\"key-1\""));
    }

    #[tokio::test]
    async fn login_2xx_missing_account_is_failure() {
        let body = r#"{"token":"t","refreshToken":"r"}"#;
        let (client, _) = client(MockTransport::default().reply(200, body));

        assert!(client
            .login_with_credentials("alice@example.com", "pw", "k")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn login_2xx_missing_token_is_failure() {
        let body = r#"{"refreshToken":"r","account":{"PersonId":42}}"#;
        let (client, _) = client(MockTransport::default().reply(200, body));

        assert!(client
            .login_with_credentials("alice@example.com", "pw", "k")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn login_non_2xx_is_failure() {
        let (client, _) = client(MockTransport::default().reply(401, r#"{"error":"bad"}"#));
        assert!(client
            .login_with_credentials("alice@example.com", "pw", "k")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn exchange_success_returns_document() {
        let (client, transport) =
            client(MockTransport::default().reply(200, r#"{"message":"ok","token":"t"}"#));

        let document = client
            .exchange_provider_token("primary-at", "client-123", "https://id.example.com", "k")
            .await
            .expect("document");

        assert_eq!(document["message"], "ok");

        let calls = transport.calls();
        assert!(calls[0].starts_with("POST https://legacy.example.com/api/auth/cidaas"));
        assert!(calls[0].contains("\"access_token\":\"primary-at\""));
        assert!(calls[0].contains("\"redirectUrl\":\"https://app.example.com/callback\""));
        assert!(calls[0].contains("\"issuer\":\"https://id.example.com\""));
    }

    #[tokio::test]
    async fn exchange_non_2xx_is_absent() {
        let (client, _) = client(MockTransport::default().reply(500, "boom"));
        assert!(client
            .exchange_provider_token("at", "c", "i", "k")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn exchange_unparseable_body_is_absent() {
        let (client, _) = client(MockTransport::default().reply(200, "not json"));
        assert!(client
            .exchange_provider_token("at", "c", "i", "k")
            .await
            .is_none());
    }
}
