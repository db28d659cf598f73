//! Error types for the session crate.
//!
//! Renewal failures never surface as errors: the guard's only externally
//! visible failure action is session rejection. The errors here cover
//! fail-fast configuration validation at startup.

use std::fmt;

/// Errors from options validation.
///
/// Any of these rejects startup; the broker refuses to run with a
/// partially-specified provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    /// A required field is empty or blank.
    BlankField { field: &'static str },
    /// The scope list is empty.
    EmptyScopes,
    /// A scope entry is blank.
    BlankScope,
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlankField { field } => {
                write!(f, "required option '{field}' must not be blank")
            }
            Self::EmptyScopes => {
                write!(f, "at least one scope is required")
            }
            Self::BlankScope => {
                write!(f, "scopes must not contain blank entries")
            }
        }
    }
}

impl std::error::Error for OptionsError {}
