//! Request Builder
//!
//! Turns an [`ActionSpec`] plus the caller's [`ParameterSet`] into a
//! [`RequestDescriptor`]. This is a pure function of its inputs: no I/O, no
//! clock, no randomness. The same spec and parameters always produce the
//! same descriptor.

use super::params::{ParamValue, ParameterSet};
use super::registry::{ActionSpec, BodyShape, ParamLocation};
use crate::error::ValidationError;
use crate::okta::http::HttpMethod;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Template Okta fills in for SWA apps without shared credentials
const SWA_USERNAME_TEMPLATE: &str = "${source.login}";

/// A request described as plain data, relative to the organization's API root
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    /// Absolute path under `/api/v1`, e.g. `/apps/A1/users/U1`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestDescriptor {
    /// Path with the encoded query string appended
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }

        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{}", self.path, query)
    }

    /// GET of the same resource, used to read current state before a write
    pub fn prior_fetch(&self) -> RequestDescriptor {
        RequestDescriptor {
            method: HttpMethod::Get,
            path: self.path.clone(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Same request with a different body
    pub fn with_body(self, body: Value) -> RequestDescriptor {
        RequestDescriptor {
            body: Some(body),
            ..self
        }
    }
}

/// Parameters after alias resolution, type coercion and defaulting
pub type ResolvedParams = BTreeMap<String, ParamValue>;

/// Build the request for one action
pub fn build(spec: &ActionSpec, params: &ParameterSet) -> Result<RequestDescriptor, ValidationError> {
    let values = resolve_params(spec, params)?;

    let path = format!(
        "{}{}",
        spec.base_path(),
        interpolate(&spec.path, &values)?
    );

    let query = spec
        .params
        .iter()
        .filter(|p| p.location == ParamLocation::Query)
        .filter_map(|p| values.get(&p.name).map(|v| (p.wire_key().to_string(), v.render())))
        .collect();

    let body = build_body(spec, &values)?;

    Ok(RequestDescriptor {
        method: spec.method,
        path,
        query,
        body,
    })
}

/// Validate the supplied parameters against the spec.
///
/// Unknown names are rejected, aliases map to their canonical name (the
/// canonical spelling wins if both are given), values are coerced to the
/// declared type, defaults are filled in when the action allows it, and
/// required parameters are checked last.
pub fn resolve_params(
    spec: &ActionSpec,
    params: &ParameterSet,
) -> Result<ResolvedParams, ValidationError> {
    let mut values = ResolvedParams::new();

    for (name, value) in params.iter() {
        let param = spec.param(name).ok_or_else(|| ValidationError::UnknownParameter {
            kind: spec.kind_name().to_string(),
            action: spec.action_name().to_string(),
            name: name.to_string(),
        })?;

        if name != param.name && params.contains(&param.name) {
            continue;
        }

        let coerced = value
            .coerce(param.ty)
            .ok_or_else(|| ValidationError::InvalidValue {
                name: param.name.clone(),
                expected: param.ty.to_string(),
            })?;
        values.insert(param.name.clone(), coerced);
    }

    if spec.apply_defaults {
        for param in &spec.params {
            if let Some(default) = &param.default {
                values.entry(param.name.clone()).or_insert_with(|| {
                    let value = ParamValue::from_json(default.clone());
                    value.coerce(param.ty).unwrap_or(value)
                });
            }
        }
    }

    if let Some(missing) = spec
        .params
        .iter()
        .find(|p| p.required && !values.contains_key(&p.name))
    {
        return Err(ValidationError::MissingParameter(missing.name.clone()));
    }

    Ok(values)
}

/// Substitute `{name}` placeholders with encoded parameter values
fn interpolate(template: &str, values: &ResolvedParams) -> Result<String, ValidationError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return Ok(out);
        };

        let name = &after[..end];
        let rendered = values
            .get(name)
            .map(ParamValue::render)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ValidationError::MissingParameter(name.to_string()))?;
        out.push_str(&urlencoding::encode(&rendered));

        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

fn build_body(spec: &ActionSpec, values: &ResolvedParams) -> Result<Option<Value>, ValidationError> {
    let mut body = match spec.body {
        BodyShape::None => return Ok(None),
        BodyShape::SamlApp => app_skeleton("SAML_2_0"),
        BodyShape::SwaApp => app_skeleton("AUTO_LOGIN"),
        BodyShape::Profile => json!({ "profile": {} }),
        BodyShape::UserCreate => json!({
            "profile": {},
            "credentials": { "password": {} },
            "groupIds": []
        }),
        BodyShape::Patch | BodyShape::SwaPatch => Value::Object(Map::new()),
    };

    for param in spec.params.iter().filter(|p| p.location == ParamLocation::Body) {
        if let Some(value) = values.get(&param.name) {
            set_pointer(&mut body, param.wire_key(), value.to_json());
        }
    }

    if spec.body == BodyShape::SwaPatch {
        if let Some(credentials) = swa_credentials(values)? {
            set_pointer(&mut body, "/credentials", credentials);
        }
    }

    Ok(Some(body))
}

/// Fixed parts of every app Okta expects on create
fn app_skeleton(sign_on_mode: &str) -> Value {
    json!({
        "signOnMode": sign_on_mode,
        "features": [],
        "visibility": {
            "autoSubmitToolbar": false,
            "hide": { "iOS": false, "web": false }
        },
        "settings": { "signOn": {} }
    })
}

/// Credentials block for an SWA app.
///
/// `username` and `password` travel together and both need a `scheme`.
/// A scheme on its own switches the app to the built-in login template.
fn swa_credentials(values: &ResolvedParams) -> Result<Option<Value>, ValidationError> {
    let text = |name: &str| values.get(name).map(ParamValue::render);

    match (text("scheme"), text("username"), text("password")) {
        (None, None, None) => Ok(None),
        (Some(scheme), Some(user_name), Some(password)) => Ok(Some(json!({
            "scheme": scheme,
            "userName": user_name,
            "password": { "value": password }
        }))),
        (Some(scheme), None, None) => Ok(Some(json!({
            "scheme": scheme,
            "userNameTemplate": {
                "template": SWA_USERNAME_TEMPLATE,
                "type": "BUILT_IN"
            }
        }))),
        (None, _, _) => Err(ValidationError::IncompleteCredentials(
            "username and password require a scheme".to_string(),
        )),
        (Some(_), Some(_), None) => Err(ValidationError::IncompleteCredentials(
            "username given without password".to_string(),
        )),
        (Some(_), None, Some(_)) => Err(ValidationError::IncompleteCredentials(
            "password given without username".to_string(),
        )),
    }
}

/// Set `value` at a JSON pointer, creating intermediate objects on the way
pub(crate) fn set_pointer(root: &mut Value, pointer: &str, value: Value) {
    let tokens: Vec<String> = pointer
        .split('/')
        .skip(1)
        .map(|t| t.replace("~1", "/").replace("~0", "~"))
        .collect();

    let Some((last, parents)) = tokens.split_last() else {
        *root = value;
        return;
    };

    let mut current = root;
    for token in parents {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        current = match current {
            Value::Object(map) => map
                .entry(token.clone())
                .or_insert_with(|| Value::Object(Map::new())),
            _ => unreachable!("converted to object above"),
        };
    }

    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Value::Object(map) = current {
        map.insert(last.clone(), value);
    }
}
