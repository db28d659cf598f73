//! Userinfo endpoint helper.
//!
//! Fetches the primary provider's userinfo document for an access token
//! and flattens it into a claim map. Failures follow the same boundary
//! contract as everything else: logged, and an empty map returned.

use gatewarden_core::HttpTransport;
use std::collections::HashMap;
use std::sync::Arc;

/// Flat claim map from the userinfo endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInfo(HashMap<String, String>);

impl UserInfo {
    /// Fetches userinfo from `{issuer}/users-srv/userinfo` with the
    /// given access token. Any failure yields an empty map.
    pub async fn fetch(
        transport: Arc<dyn HttpTransport>,
        issuer: &str,
        access_token: &str,
    ) -> Self {
        let endpoint = format!("{}/users-srv/userinfo", issuer.trim_end_matches('/'));

        let reply = match transport.get_bearer(&endpoint, access_token).await {
            Ok(reply) => reply,
            Err(failure) => {
                tracing::error!(%failure, "userinfo request failed");
                return Self::default();
            }
        };

        if !reply.is_success() {
            tracing::error!(
                status = reply.status,
                "userinfo failed, token might be expired"
            );
            return Self::default();
        }

        match serde_json::from_str::<serde_json::Value>(&reply.body) {
            Ok(serde_json::Value::Object(map)) => Self(
                map.into_iter()
                    .map(|(name, value)| {
                        let value = match value {
                            serde_json::Value::String(s) => s,
                            other => other.to_string(),
                        };
                        (name, value)
                    })
                    .collect(),
            ),
            Ok(_) | Err(_) => {
                tracing::error!("userinfo response was not a JSON object");
                Self::default()
            }
        }
    }

    /// Returns a claim by name.
    #[must_use]
    pub fn claim(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// The user's display name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.claim("name")
    }

    /// The provider-side account status.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.claim("user_status")
    }

    /// When the account was last accessed.
    #[must_use]
    pub fn last_accessed(&self) -> Option<&str> {
        self.claim("last_accessed_at")
    }

    /// Returns true when no claims were retrieved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
