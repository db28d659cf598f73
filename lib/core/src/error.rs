//! Failure taxonomy for external-call boundaries.
//!
//! Every network interaction in the broker is classified into one of the
//! `AuthFailure` variants at the boundary where it happened. The variants
//! carry just enough detail for logging; callers act on the category, not
//! the payload.

use rootcause::Report;
use std::fmt;

/// A Result type alias using rootcause's Report for error handling.
///
/// Used at construction seams (transport setup, options validation) where
/// a caller may want layered context. Operational paths convert failures
/// to absence or rejection instead of returning them.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

/// Classified failure from an external call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    /// Network or connection-level failure before a response arrived.
    Transport { reason: String },
    /// The collaborator answered with a non-2xx status.
    Protocol { status: u16 },
    /// A 2xx response whose body could not be parsed or was missing a
    /// required field.
    MalformedResponse { reason: String },
    /// A required module or credential key was absent from configuration.
    ConfigurationMissing { what: String },
    /// The session cannot be renewed (no or expired refresh token).
    SessionInvalid { reason: String },
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { reason } => {
                write!(f, "transport failure: {reason}")
            }
            Self::Protocol { status } => {
                write!(f, "unexpected status code {status}")
            }
            Self::MalformedResponse { reason } => {
                write!(f, "malformed response: {reason}")
            }
            Self::ConfigurationMissing { what } => {
                write!(f, "missing configuration: {what}")
            }
            Self::SessionInvalid { reason } => {
                write!(f, "session invalid: {reason}")
            }
        }
    }
}

impl std::error::Error for AuthFailure {}
