//! Secondary-provider handoff for the gatewarden auth broker.
//!
//! After a primary-provider (OIDC) login completes, a host may chain a
//! second-factor exchange against a legacy identity backend that issues
//! its own session tokens for the same user. The sequence is three
//! steps, each gated on the previous one:
//!
//! 1. resolve the integration module's credentials from the backend's
//!    application catalog
//! 2. authenticate the user's credentials against the backend
//! 3. exchange the primary-provider access token for a backend session
//!
//! `SecondaryAuthClient` wraps the three endpoints statelessly;
//! `SecondaryOrchestrator` runs the sequence with fail-fast
//! short-circuiting. A failed orchestration yields `None`, which callers
//! must treat as "secondary integration unavailable" without aborting
//! the primary session.

pub mod client;
pub mod orchestrator;
pub mod wire;

pub use client::SecondaryAuthClient;
pub use orchestrator::SecondaryOrchestrator;
pub use wire::{
    AccountInfo, AppValidationResponse, ConfigurationEntry, ExchangeReceipt, ModuleAuthConfig,
    PortalAuthentication, ProviderModuleConfig, SecondaryIdentity,
};
