//! Resource abstraction layer
//!
//! This module provides a data-driven approach to the Okta admin surface.
//! Action definitions are loaded from JSON files at compile time, so the
//! methods, paths, parameters and status conventions of every resource live
//! in one place instead of being repeated per action.
//!
//! # Architecture
//!
//! - [`registry`] - Loads and caches action definitions from embedded JSON
//! - [`params`] - Caller-supplied parameters with presence semantics
//! - [`builder`] - Pure mapping from action + parameters to a request descriptor
//! - [`interpreter`] - Success/failure decision and result normalization
//! - [`dispatch`] - Runs an invocation, including multi-step sequences
//!
//! # Resource Definitions
//!
//! Resources are defined in JSON files under `src/resources/`:
//! - `apps.json` - Actions shared by every application
//! - `apps_saml.json` - SAML 2.0 application create/update
//! - `apps_swa.json` - SWA application create/update
//! - `groups.json` - Groups and group membership
//! - `users.json` - Users and user lifecycle
//!
//! # Example
//!
//! ```ignore
//! use oktactl::resource::{build, lookup, Action, ParameterSet, ResourceKind};
//!
//! let spec = lookup(ResourceKind::Group, Action::List)?;
//! let request = build(spec, &ParameterSet::new().with("limit", 200i64))?;
//! assert_eq!(request.path_and_query(), "/groups/?limit=200");
//! ```

pub mod builder;
pub mod dispatch;
pub mod interpreter;
pub mod params;
pub mod registry;

pub use builder::{build, RequestDescriptor};
pub use dispatch::{run, Invocation, Plan};
pub use interpreter::{interpret, Outcome, ResponseBody};
pub use params::{ParamType, ParamValue, ParameterSet};
pub use registry::{lookup, supported_actions, Action, ActionSpec, AppVariant, ResourceKind};
