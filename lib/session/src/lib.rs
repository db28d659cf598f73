//! Session token lifecycle for the gatewarden auth broker.
//!
//! This crate keeps a browser session's primary-provider tokens valid
//! transparently:
//! - `RenewalGuard` decides per request whether the access token is still
//!   fresh and, when it is not, refreshes it or rejects the session
//! - `TokenStore` is the seam to the host's session persistence (the
//!   cookie); the guard only reads and proposes atomic replacements
//! - `RenewalMonitor` is an optional read-only heartbeat per principal
//! - `SessionLifecycle` drives login challenge and two-scheme logout
//!
//! The per-request path is the only writer of session state. The monitor
//! never mutates anything, so two writers can never race on the same
//! cookie.
//!
//! # Example
//!
//! ```no_run
//! use gatewarden_core::ReqwestTransport;
//! use gatewarden_session::{MemoryTokenStore, ProviderOptions, RenewalGuard};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let options = ProviderOptions::from_env().expect("configuration");
//! options.validate().expect("valid configuration");
//!
//! let transport = Arc::new(ReqwestTransport::new().expect("transport"));
//! let guard = RenewalGuard::new(transport, &options);
//!
//! let mut store = MemoryTokenStore::new();
//! let _outcome = guard.validate_session(&mut store).await;
//! # }
//! ```

pub mod error;
pub mod lifecycle;
pub mod monitor;
pub mod options;
pub mod renewal;
pub mod tokens;
pub mod userinfo;

pub use error::OptionsError;
pub use lifecycle::{IdentityGateway, SessionLifecycle, SignOutScheme};
pub use monitor::RenewalMonitor;
pub use options::{ProviderOptions, SecondaryOptions};
pub use renewal::{RenewalDecision, RenewalGuard, RenewalOutcome, EXPIRATION_BUFFER_SECONDS};
pub use tokens::{MemoryTokenStore, TokenSet, TokenStore};
pub use userinfo::UserInfo;
