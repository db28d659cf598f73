//! Provider configuration.
//!
//! Options are loaded from the environment via the `config` crate and
//! validated once at startup. Validation fails fast: the broker refuses
//! to start with a blank required field or an unusable scope list.

use crate::error::OptionsError;
use serde::Deserialize;

/// Configuration for the primary OIDC provider and the optional
/// secondary-provider integration.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderOptions {
    /// Issuer URL of the primary provider.
    pub issuer: String,
    /// OAuth2 client id registered with the primary provider.
    pub client_id: String,
    /// Redirect URI for the authorization callback.
    pub redirect_uri: String,
    /// Where the user agent lands after provider sign-out.
    pub post_logout_redirect_uri: String,
    /// Discovery document URL of the primary provider.
    pub discovery_url: String,
    /// Scopes requested on login. Must be non-empty; "openid" is
    /// recommended but not enforced.
    pub scopes: Vec<String>,
    /// Secondary-provider integration settings.
    #[serde(default)]
    pub secondary: SecondaryOptions,
}

/// Settings for the legacy secondary-provider integration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecondaryOptions {
    /// Deployment environment label of the secondary provider.
    pub environment: String,
    /// Whether the European region endpoints apply.
    #[serde(default)]
    pub europe: bool,
    /// Application code used to resolve the module catalog.
    pub application_code: String,
    /// Name of the integration module whose credentials apply.
    pub module_name: String,
    /// Base URL of the secondary provider's API.
    pub api_base_url: String,
}

fn require(field: &'static str, value: &str) -> Result<(), OptionsError> {
    if value.trim().is_empty() {
        return Err(OptionsError::BlankField { field });
    }
    Ok(())
}

impl ProviderOptions {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Validates the options, rejecting startup on any blank required
    /// field or unusable scope list.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure encountered.
    pub fn validate(&self) -> gatewarden_core::Result<(), OptionsError> {
        require("issuer", &self.issuer)?;
        require("client_id", &self.client_id)?;
        require("redirect_uri", &self.redirect_uri)?;
        require("post_logout_redirect_uri", &self.post_logout_redirect_uri)?;
        require("discovery_url", &self.discovery_url)?;

        if self.scopes.is_empty() {
            return Err(OptionsError::EmptyScopes.into());
        }
        if self.scopes.iter().any(|s| s.trim().is_empty()) {
            return Err(OptionsError::BlankScope.into());
        }
        if !self.scopes.iter().any(|s| s.eq_ignore_ascii_case("openid")) {
            tracing::warn!("the 'openid' scope is recommended but was not configured");
        }

        require("secondary.environment", &self.secondary.environment)?;
        require("secondary.application_code", &self.secondary.application_code)?;
        require("secondary.module_name", &self.secondary.module_name)?;
        require("secondary.api_base_url", &self.secondary.api_base_url)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_options() -> ProviderOptions {
        ProviderOptions {
            issuer: "https://id.example.com".to_string(),
            client_id: "client-123".to_string(),
            redirect_uri: "https://app.example.com/callback".to_string(),
            post_logout_redirect_uri: "https://app.example.com/".to_string(),
            discovery_url: "https://id.example.com/.well-known/openid-configuration".to_string(),
            scopes: vec!["openid".to_string(), "profile".to_string()],
            secondary: SecondaryOptions {
                environment: "production".to_string(),
                europe: false,
                application_code: "APP1".to_string(),
                module_name: "Portal".to_string(),
                api_base_url: "https://legacy.example.com".to_string(),
            },
        }
    }

    #[test]
    fn valid_options_pass() {
        assert!(valid_options().validate().is_ok());
    }

    #[test]
    fn blank_issuer_rejected() {
        let mut options = valid_options();
        options.issuer = "   ".to_string();
        assert!(options.validate().is_err());
    }

    #[test]
    fn blank_client_id_rejected() {
        let mut options = valid_options();
        options.client_id = String::new();
        assert!(options.validate().is_err());
    }

    #[test]
    fn empty_scopes_rejected() {
        let mut options = valid_options();
        options.scopes.clear();
        assert!(options.validate().is_err());
    }

    #[test]
    fn blank_scope_entry_rejected() {
        let mut options = valid_options();
        options.scopes.push(" ".to_string());
        assert!(options.validate().is_err());
    }

    #[test]
    fn missing_openid_scope_is_not_fatal() {
        let mut options = valid_options();
        options.scopes = vec!["profile".to_string()];
        assert!(options.validate().is_ok());
    }

    #[test]
    fn blank_secondary_fields_rejected() {
        let mut options = valid_options();
        options.secondary.module_name = String::new();
        assert!(options.validate().is_err());

        let mut options = valid_options();
        options.secondary.api_base_url = "  ".to_string();
        assert!(options.validate().is_err());
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let json = r#"{
            "issuer": "https://id.example.com",
            "client_id": "client-123",
            "redirect_uri": "https://app.example.com/callback",
            "post_logout_redirect_uri": "https://app.example.com/",
            "discovery_url": "https://id.example.com/.well-known/openid-configuration",
            "scopes": ["openid"],
            "secondary": {
                "environment": "production",
                "application_code": "APP1",
                "module_name": "Portal",
                "api_base_url": "https://legacy.example.com"
            }
        }"#;

        let options: ProviderOptions = serde_json::from_str(json).expect("deserialize");
        assert!(!options.secondary.europe);
        assert!(options.validate().is_ok());
    }
}
