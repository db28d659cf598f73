//! Shared foundation for the gatewarden auth broker.
//!
//! This crate provides:
//! - The failure taxonomy used at every external-call boundary
//!   (`AuthFailure`)
//! - The HTTP transport seam (`HttpTransport`) and its long-lived
//!   reqwest-backed implementation (`ReqwestTransport`)
//!
//! Failures from collaborators never propagate past the boundary that
//! produced them: callers convert them to absence (`None`) or to session
//! rejection and log the cause.

pub mod error;
pub mod transport;

pub use error::{AuthFailure, Result};
pub use transport::{HttpReply, HttpTransport, ReqwestTransport};
