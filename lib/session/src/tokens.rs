//! Token storage seam.
//!
//! The host's session persistence layer (typically a cookie) owns the
//! tokens. This crate only reads them and proposes replacements through
//! `TokenStore`; the `replace` operation is atomic so a session can never
//! be observed with a half-updated token set.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Well-known token names, matching the names under which the OIDC
/// middleware saves provider tokens.
pub const ACCESS_TOKEN: &str = "access_token";
pub const REFRESH_TOKEN: &str = "refresh_token";
pub const ID_TOKEN: &str = "id_token";
pub const EXPIRES_AT: &str = "expires_at";

/// A complete replacement for the session's token triple.
///
/// `expires_at` is an RFC 3339 timestamp exactly as derived from the
/// provider's `expires_in`; it is never inferred from anything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: String,
}

/// Seam to the session persistence layer.
///
/// Implementations map onto whatever the host framework provides (cookie
/// authentication properties, a server-side session row). The renewal
/// guard takes `&mut dyn TokenStore`, so within one request there is
/// exactly one writer.
pub trait TokenStore: Send {
    /// Returns the named token, if present.
    fn token(&self, name: &str) -> Option<String>;

    /// Replaces the access token, refresh token, and expiry together.
    ///
    /// Implementations must apply all three or none, and must flag the
    /// session as needing to be rewritten by the caller.
    fn replace(&mut self, tokens: &TokenSet);

    /// Rejects the session, forcing re-authentication on the next
    /// protected request.
    fn reject(&mut self);

    /// Returns true once the session has been rejected.
    fn is_rejected(&self) -> bool;

    /// Returns true once a replacement has been applied and the session
    /// must be persisted again by the caller.
    fn should_renew(&self) -> bool;

    /// Returns the stored access token.
    fn access_token(&self) -> Option<String> {
        self.token(ACCESS_TOKEN)
    }

    /// Returns the stored refresh token.
    fn refresh_token(&self) -> Option<String> {
        self.token(REFRESH_TOKEN)
    }

    /// Returns the stored ID token.
    fn id_token(&self) -> Option<String> {
        self.token(ID_TOKEN)
    }

    /// Returns the stored access-token expiry.
    fn expires_at(&self) -> Option<String> {
        self.token(EXPIRES_AT)
    }
}

/// In-process token store for hosts without framework-managed token
/// properties, and for tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryTokenStore {
    tokens: HashMap<String, String>,
    rejected: bool,
    renew: bool,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with the given token triple.
    #[must_use]
    pub fn with_tokens(access_token: &str, refresh_token: &str, expires_at: &str) -> Self {
        let mut store = Self::new();
        store.set(ACCESS_TOKEN, access_token);
        store.set(REFRESH_TOKEN, refresh_token);
        store.set(EXPIRES_AT, expires_at);
        store
    }

    /// Sets a single named token.
    pub fn set(&mut self, name: &str, value: &str) {
        self.tokens.insert(name.to_string(), value.to_string());
    }

    /// Removes a single named token.
    pub fn remove(&mut self, name: &str) {
        self.tokens.remove(name);
    }
}

impl TokenStore for MemoryTokenStore {
    fn token(&self, name: &str) -> Option<String> {
        self.tokens.get(name).cloned()
    }

    fn replace(&mut self, tokens: &TokenSet) {
        self.tokens
            .insert(ACCESS_TOKEN.to_string(), tokens.access_token.clone());
        self.tokens
            .insert(REFRESH_TOKEN.to_string(), tokens.refresh_token.clone());
        self.tokens
            .insert(EXPIRES_AT.to_string(), tokens.expires_at.clone());
        self.renew = true;
    }

    fn reject(&mut self) {
        self.rejected = true;
    }

    fn is_rejected(&self) -> bool {
        self.rejected
    }

    fn should_renew(&self) -> bool {
        self.renew
    }
}
