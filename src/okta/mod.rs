//! Okta API interaction module
//!
//! This module provides the plumbing between the resource layer and the
//! Okta admin API: the API token, the HTTP transport and the client that
//! ties them to an organization.
//!
//! # Module Structure
//!
//! - [`auth`] - API token handling (`SSWS` scheme, redaction)
//! - [`client`] - Organization-bound client that sends request descriptors
//! - [`http`] - Transport trait and the reqwest implementation
//!
//! # Example
//!
//! ```ignore
//! use oktactl::okta::{auth::ApiKey, client::OktaClient};
//! use oktactl::resource::{Action, Invocation, ParameterSet, ResourceKind};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = OktaClient::for_organization("acme", "okta.com", ApiKey::new("00abc"), None)?;
//!     let invocation = Invocation::new(ResourceKind::Group, Action::List, ParameterSet::new());
//!     let outcome = client.invoke(&invocation).await?;
//!     println!("{}", outcome.status);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
