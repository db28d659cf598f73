//! Wire models for the secondary provider's API.
//!
//! Field names are bit-exact contracts with the backend, including the
//! `redirecUri` misspelling and the space in `"Portal Authentication"`.
//! The `AuthConfig` catalog entry is double-encoded: the envelope carries
//! it as an opaque JSON value that needs a second decode pass of its own
//! (see [`decode_auth_config`]).

use gatewarden_core::AuthFailure;
use serde::{Deserialize, Serialize};

/// Envelope returned by the application validation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AppValidationResponse {
    #[serde(rename = "Code", default)]
    pub code: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Logo", default)]
    pub logo: String,
    #[serde(rename = "Database", default)]
    pub database: String,
    #[serde(rename = "Configurations")]
    pub configurations: Option<Vec<ConfigurationEntry>>,
}

/// One key/value entry of the application's configuration catalog.
///
/// `Value` stays opaque here; entries keyed `"AuthConfig"` carry a nested
/// document decoded separately.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigurationEntry {
    #[serde(rename = "_id", default)]
    pub id: i64,
    #[serde(rename = "Key", default)]
    pub key: String,
    #[serde(rename = "Value", default)]
    pub value: serde_json::Value,
}

/// Per-module authentication profile from the `AuthConfig` document.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleAuthConfig {
    #[serde(rename = "Module", default)]
    pub module: String,
    #[serde(rename = "HostName", default)]
    pub host_name: String,
    #[serde(rename = "Cidaas")]
    pub provider: Option<ProviderModuleConfig>,
    #[serde(rename = "Portal Authentication")]
    pub portal_authentication: Option<PortalAuthentication>,
}

impl ModuleAuthConfig {
    /// The module's API key, if configured and non-blank.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.provider
            .as_ref()
            .and_then(|p| p.api_key.as_deref())
            .filter(|key| !key.trim().is_empty())
    }
}

/// Primary-provider settings embedded in a module profile.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderModuleConfig {
    #[serde(rename = "clientId", default)]
    pub client_id: String,
    #[serde(rename = "authority", default)]
    pub authority: String,
    #[serde(rename = "apiKey")]
    pub api_key: Option<String>,
    // The backend really does spell it this way.
    #[serde(rename = "redirecUri", default)]
    pub redirect_uri: String,
}

/// Which login mechanisms a module's portal enables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortalAuthentication {
    #[serde(rename = "Email", default)]
    pub email: bool,
    #[serde(rename = "Mobile", default)]
    pub mobile: bool,
    #[serde(rename = "GoogleAuth", default)]
    pub google_auth: bool,
    #[serde(rename = "OpenIAmAuth", default)]
    pub open_iam_auth: bool,
    #[serde(rename = "FacebookAuth", default)]
    pub facebook_auth: bool,
    #[serde(rename = "Cidaas", default)]
    pub provider: bool,
}

/// Result of a successful credential login against the secondary
/// provider. Immutable; handed to the caller once per orchestration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryIdentity {
    pub token: String,
    pub refresh_token: String,
    pub account_id: String,
}

/// Fully-typed view of the token exchange response, for hosts that want
/// more than the raw document.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeReceipt {
    #[serde(rename = "message", default)]
    pub message: String,
    #[serde(rename = "token", default)]
    pub token: String,
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: String,
    #[serde(rename = "access_token", default)]
    pub provider_access_token: String,
    #[serde(rename = "account")]
    pub account: Option<AccountInfo>,
    #[serde(rename = "applicationId", default)]
    pub application_id: String,
}

impl ExchangeReceipt {
    /// The account holder's first name, when the exchange returned one.
    #[must_use]
    pub fn account_first_name(&self) -> Option<&str> {
        self.account.as_ref().map(|a| a.first_name.as_str())
    }

    /// The account holder's email address.
    #[must_use]
    pub fn account_email(&self) -> Option<&str> {
        self.account.as_ref().map(|a| a.email_address.as_str())
    }

    /// The account's person id as a string, empty when absent.
    #[must_use]
    pub fn account_person_id(&self) -> String {
        self.account
            .as_ref()
            .map(|a| a.person_id.to_string())
            .unwrap_or_default()
    }
}

/// Account details nested in login and exchange responses.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountInfo {
    #[serde(rename = "PersonId", default)]
    pub person_id: i64,
    #[serde(rename = "UserId", default)]
    pub user_id: i64,
    #[serde(rename = "EmailAddress", default)]
    pub email_address: String,
    #[serde(rename = "FirstName", default)]
    pub first_name: String,
    #[serde(rename = "LastName", default)]
    pub last_name: String,
}

/// Second decode stage for an `AuthConfig` catalog value.
///
/// The envelope hands the module list over as an opaque value. Usually
/// it is already a JSON array; some catalog versions carry it as a JSON
/// string that needs its own parse pass first.
pub fn decode_auth_config(
    value: &serde_json::Value,
) -> Result<Vec<ModuleAuthConfig>, AuthFailure> {
    let document = match value {
        serde_json::Value::String(raw) => {
            serde_json::from_str(raw).map_err(|e| AuthFailure::MalformedResponse {
                reason: format!("AuthConfig value is a string but not JSON: {e}"),
            })?
        }
        other => other.clone(),
    };

    serde_json::from_value(document).map_err(|e| AuthFailure::MalformedResponse {
        reason: format!("AuthConfig value is not a module list: {e}"),
    })
}
