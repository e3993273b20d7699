//! Declarative client for the Okta admin API.
//!
//! A small, fixed vocabulary of actions (create, update, delete, list,
//! activate, deactivate, assign/remove relationships) over apps, groups and
//! users is mapped to correctly shaped requests, and every response is
//! normalized into one [`Outcome`] envelope.
//!
//! - [`resource`] - registry, request builder, response interpreter, dispatch
//! - [`okta`] - API token, HTTP transport and organization-bound client
//! - [`batch`] - YAML task files
//! - [`config`] - persisted settings

pub mod batch;
pub mod config;
pub mod error;
pub mod okta;
pub mod resource;

pub use error::{OktaError, TransportError, ValidationError};
pub use okta::auth::ApiKey;
pub use okta::client::OktaClient;
pub use resource::{Action, AppVariant, Invocation, Outcome, ParameterSet, ResourceKind};

/// Version injected at compile time via OKTACTL_VERSION env var (set by CI/CD),
/// or the crate version for local builds.
pub const VERSION: &str = match option_env!("OKTACTL_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};
