//! Resource Registry - Load action definitions from JSON
//!
//! This module loads every resource/action definition from embedded JSON
//! files and provides lookup functions for the rest of the crate. The
//! registry is the single source of truth for methods, paths, parameters,
//! defaults, body shapes and expected status codes.

use crate::error::ValidationError;
use crate::okta::http::HttpMethod;
use crate::resource::params::ParamType;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Embedded resource JSON files (compiled into the binary)
const RESOURCE_FILES: &[&str] = &[
    include_str!("../resources/apps.json"),
    include_str!("../resources/apps_saml.json"),
    include_str!("../resources/apps_swa.json"),
    include_str!("../resources/groups.json"),
    include_str!("../resources/users.json"),
];

/// Application flavours sharing the `/apps` endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppVariant {
    Saml,
    Swa,
    Generic,
}

/// Kind of resource an invocation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Application(AppVariant),
    Group,
    User,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Application(AppVariant::Generic),
        ResourceKind::Application(AppVariant::Saml),
        ResourceKind::Application(AppVariant::Swa),
        ResourceKind::Group,
        ResourceKind::User,
    ];

    /// Key of this kind in the registry files
    pub fn key(&self) -> &'static str {
        match self {
            ResourceKind::Application(AppVariant::Generic) => "apps",
            ResourceKind::Application(AppVariant::Saml) => "saml-apps",
            ResourceKind::Application(AppVariant::Swa) => "swa-apps",
            ResourceKind::Group => "groups",
            ResourceKind::User => "users",
        }
    }

    /// Collection path under `/api/v1`
    pub fn base_path(&self) -> &'static str {
        match self {
            ResourceKind::Application(_) => "/apps",
            ResourceKind::Group => "/groups",
            ResourceKind::User => "/users",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ResourceKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "apps" | "app" => Ok(ResourceKind::Application(AppVariant::Generic)),
            "saml-apps" | "apps-saml" | "saml" => Ok(ResourceKind::Application(AppVariant::Saml)),
            "swa-apps" | "apps-swa" | "swa" => Ok(ResourceKind::Application(AppVariant::Swa)),
            "groups" | "group" => Ok(ResourceKind::Group),
            "users" | "user" => Ok(ResourceKind::User),
            _ => Err(ValidationError::UnknownResource(s.to_string())),
        }
    }
}

/// Named operation a resource kind may support
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Update,
    Delete,
    List,
    Activate,
    Deactivate,
    AssignUser,
    RemoveUser,
    AssignGroup,
    RemoveGroup,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::List => "list",
            Action::Activate => "activate",
            Action::Deactivate => "deactivate",
            Action::AssignUser => "assign_user",
            Action::RemoveUser => "remove_user",
            Action::AssignGroup => "assign_group",
            Action::RemoveGroup => "remove_group",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "create" => Ok(Action::Create),
            "update" => Ok(Action::Update),
            "delete" => Ok(Action::Delete),
            "list" => Ok(Action::List),
            "activate" => Ok(Action::Activate),
            "deactivate" => Ok(Action::Deactivate),
            // groups used to call it add_user
            "assign_user" | "add_user" => Ok(Action::AssignUser),
            "remove_user" => Ok(Action::RemoveUser),
            "assign_group" | "add_group" => Ok(Action::AssignGroup),
            "remove_group" => Ok(Action::RemoveGroup),
            _ => Err(ValidationError::UnknownAction(s.to_string())),
        }
    }
}

/// Where a parameter ends up in the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    /// Interpolated into the path template
    Path,
    /// Rendered into the query string
    Query,
    /// Placed into the JSON body at `key` (a JSON pointer)
    #[default]
    Body,
    /// Consumed by the body shape's own builder (SWA credentials)
    Shape,
}

/// Parameter definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    #[serde(rename = "type", default)]
    pub ty: ParamType,
    #[serde(default)]
    pub location: ParamLocation,
    /// Query key or body pointer; defaults to the name
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub description: String,
}

impl ParamSpec {
    pub fn wire_key(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.name)
    }

    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|a| a == name)
    }
}

/// Request body layout for an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyShape {
    /// No body is sent
    #[default]
    None,
    /// SAML 2.0 application
    SamlApp,
    /// Secure Web Authentication application
    SwaApp,
    /// `{profile: {...}}`
    Profile,
    /// User with credentials and group memberships
    UserCreate,
    /// Only the supplied fields, merged into a fetched object
    Patch,
    /// Patch plus the SWA credential scheme rules
    SwaPatch,
}

/// Status codes that count as success for an action
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExpectedOutcome {
    pub codes: Vec<u16>,
}

impl ExpectedOutcome {
    pub fn accepts(&self, status: u16) -> bool {
        self.codes.contains(&status)
    }
}

/// Action definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ActionSpec {
    pub method: HttpMethod,
    /// Path template relative to the kind's base path, e.g. `/{id}/groups/{group_id}`
    pub path: String,
    #[serde(default)]
    pub params: Vec<ParamSpec>,
    /// Shared parameter groups appended to `params` at load time
    #[serde(default)]
    include: Vec<String>,
    /// Whether parameter defaults are filled in (never on read-modify-write updates)
    #[serde(default = "default_true")]
    pub apply_defaults: bool,
    #[serde(default)]
    pub body: BodyShape,
    pub expect: ExpectedOutcome,
    /// GET the current object and merge the body into it before sending
    #[serde(default)]
    pub requires_prior_fetch: bool,
    /// Action that must succeed on the same resource before this one is sent
    #[serde(default)]
    pub precede_with: Option<Action>,
    #[serde(default)]
    pub description: String,

    /// Filled in at load time
    #[serde(skip)]
    pub kind: Option<ResourceKind>,
    #[serde(skip)]
    pub action: Option<Action>,
}

fn default_true() -> bool {
    true
}

impl ActionSpec {
    /// Collection path for this action's resource kind
    pub fn base_path(&self) -> &'static str {
        self.kind.map(|k| k.base_path()).unwrap_or("")
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind.map(|k| k.key()).unwrap_or("unknown")
    }

    pub fn action_name(&self) -> &'static str {
        self.action.map(|a| a.as_str()).unwrap_or("unknown")
    }

    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.answers_to(name))
    }
}

/// Resource definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDef {
    pub display_name: String,
    /// Another resource whose actions this one inherits
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub actions: BTreeMap<Action, ActionSpec>,
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ResourceConfig {
    #[serde(default)]
    pub param_sets: HashMap<String, Vec<ParamSpec>>,
    #[serde(default)]
    pub resources: HashMap<String, ResourceDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<ResourceConfig> = OnceLock::new();

/// Get the resource registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static ResourceConfig {
    REGISTRY.get_or_init(|| {
        let mut merged = ResourceConfig::default();

        for content in RESOURCE_FILES {
            let partial: ResourceConfig = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded resource JSON: {}", e));
            merged.param_sets.extend(partial.param_sets);
            merged.resources.extend(partial.resources);
        }

        resolve(merged)
    })
}

/// Expand `extends` and `include`, and stamp kind/action onto every spec
fn resolve(mut config: ResourceConfig) -> ResourceConfig {
    let snapshot = config.resources.clone();

    for (key, def) in config.resources.iter_mut() {
        if let Some(parent) = def.extends.as_deref() {
            let parent_def = snapshot
                .get(parent)
                .unwrap_or_else(|| panic!("Resource '{}' extends unknown '{}'", key, parent));
            for (action, spec) in &parent_def.actions {
                def.actions.entry(*action).or_insert_with(|| spec.clone());
            }
        }

        let kind = key.parse::<ResourceKind>().ok();
        for (action, spec) in def.actions.iter_mut() {
            for set in std::mem::take(&mut spec.include) {
                let params = config
                    .param_sets
                    .get(&set)
                    .unwrap_or_else(|| panic!("Unknown param set '{}' in '{}'", set, key));
                spec.params.extend(params.iter().cloned());
            }
            spec.kind = kind;
            spec.action = Some(*action);
        }
    }

    config
}

/// Look up how to perform `action` on `kind`
pub fn lookup(kind: ResourceKind, action: Action) -> Result<&'static ActionSpec, ValidationError> {
    get_registry()
        .resources
        .get(kind.key())
        .and_then(|def| def.actions.get(&action))
        .ok_or_else(|| ValidationError::UnsupportedAction {
            kind: kind.key().to_string(),
            action: action.to_string(),
        })
}

/// Get a resource definition by kind
pub fn get_resource(kind: ResourceKind) -> Option<&'static ResourceDef> {
    get_registry().resources.get(kind.key())
}

/// Actions supported by a kind, in declaration order of [`Action`]
pub fn supported_actions(kind: ResourceKind) -> Vec<Action> {
    get_resource(kind)
        .map(|def| def.actions.keys().copied().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAML: ResourceKind = ResourceKind::Application(AppVariant::Saml);
    const SWA: ResourceKind = ResourceKind::Application(AppVariant::Swa);
    const APPS: ResourceKind = ResourceKind::Application(AppVariant::Generic);

    #[test]
    fn test_registry_loads_successfully() {
        let registry = get_registry();
        for kind in ResourceKind::ALL {
            assert!(
                registry.resources.contains_key(kind.key()),
                "Registry should define {}",
                kind
            );
        }
    }

    #[test]
    fn test_every_spec_is_stamped() {
        for kind in ResourceKind::ALL {
            for action in supported_actions(kind) {
                let spec = lookup(kind, action).unwrap();
                assert_eq!(spec.kind, Some(kind));
                assert_eq!(spec.action, Some(action));
                assert!(!spec.expect.codes.is_empty(), "{kind} {action} needs codes");
                assert!(spec.include.is_empty());
            }
        }
    }

    #[test]
    fn test_action_sets_per_kind() {
        assert_eq!(
            supported_actions(ResourceKind::Group),
            vec![
                Action::Create,
                Action::Update,
                Action::Delete,
                Action::List,
                Action::AssignUser,
                Action::RemoveUser
            ]
        );
        assert_eq!(
            supported_actions(ResourceKind::User),
            vec![
                Action::Create,
                Action::Update,
                Action::Delete,
                Action::List,
                Action::Activate,
                Action::Deactivate
            ]
        );
        assert!(!supported_actions(APPS).contains(&Action::Create));
        assert!(supported_actions(SAML).contains(&Action::Create));
        assert!(supported_actions(SAML).contains(&Action::AssignGroup));
        assert!(supported_actions(SWA).contains(&Action::Update));
    }

    #[test]
    fn test_unsupported_action_is_an_error() {
        let err = lookup(ResourceKind::Group, Action::Activate).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnsupportedAction {
                kind: "groups".to_string(),
                action: "activate".to_string()
            }
        );
    }

    #[test]
    fn test_delete_sequencing_flags() {
        assert_eq!(lookup(ResourceKind::User, Action::Delete).unwrap().precede_with, Some(Action::Deactivate));
        assert_eq!(lookup(APPS, Action::Delete).unwrap().precede_with, Some(Action::Deactivate));
        assert_eq!(lookup(SWA, Action::Delete).unwrap().precede_with, Some(Action::Deactivate));
        assert_eq!(lookup(ResourceKind::Group, Action::Delete).unwrap().precede_with, None);
    }

    #[test]
    fn test_prior_fetch_flags() {
        assert!(lookup(SAML, Action::Update).unwrap().requires_prior_fetch);
        assert!(lookup(SWA, Action::Update).unwrap().requires_prior_fetch);
        assert!(lookup(ResourceKind::Group, Action::Update).unwrap().requires_prior_fetch);
        assert!(!lookup(ResourceKind::User, Action::Update).unwrap().requires_prior_fetch);
        assert!(!lookup(SAML, Action::Update).unwrap().apply_defaults);
    }

    #[test]
    fn test_expected_codes_follow_backend_conventions() {
        assert!(lookup(APPS, Action::AssignUser).unwrap().expect.accepts(200));
        assert!(lookup(APPS, Action::RemoveUser).unwrap().expect.accepts(204));
        assert!(lookup(ResourceKind::Group, Action::AssignUser).unwrap().expect.accepts(204));
        assert!(lookup(ResourceKind::User, Action::Delete).unwrap().expect.accepts(204));
        assert!(!lookup(ResourceKind::User, Action::Delete).unwrap().expect.accepts(200));
    }

    #[test]
    fn test_saml_includes_sign_on_params() {
        let spec = lookup(SAML, Action::Create).unwrap();
        let acs = spec.param("ssoAcsUrl").expect("alias should resolve");
        assert_eq!(acs.name, "sso_acs_url");
        assert_eq!(acs.wire_key(), "/settings/signOn/ssoAcsUrl");
        assert!(spec.param("default_relay_state").unwrap().default.is_none());
    }

    #[test]
    fn test_kind_and_action_parsing() {
        assert_eq!("saml_apps".parse::<ResourceKind>().unwrap(), SAML);
        assert_eq!("Groups".parse::<ResourceKind>().unwrap(), ResourceKind::Group);
        assert!("widgets".parse::<ResourceKind>().is_err());
        assert_eq!("add_user".parse::<Action>().unwrap(), Action::AssignUser);
        assert_eq!("assign-group".parse::<Action>().unwrap(), Action::AssignGroup);
        assert!("explode".parse::<Action>().is_err());
    }
}
