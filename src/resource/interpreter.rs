//! Response Interpreter
//!
//! Decides success or failure for a single response and normalizes it into
//! an [`Outcome`]. Also holds the read-modify-write helpers: turning the
//! prior GET into a base object and merging the caller's changes into it.

use super::registry::ActionSpec;
use crate::error::{OktaError, TransportError};
use crate::okta::http::TransportResponse;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Parsed response body, or the explicit marker for "nothing usable"
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// No body, a blank body, or a body that was not valid JSON
    Empty,
    Json(Value),
}

impl ResponseBody {
    pub fn is_empty(&self) -> bool {
        matches!(self, ResponseBody::Empty)
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Empty => None,
        }
    }
}

// The empty marker shows up as "" in the result envelope.
impl Serialize for ResponseBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ResponseBody::Empty => serializer.serialize_str(""),
            ResponseBody::Json(value) => value.serialize(serializer),
        }
    }
}

/// Result envelope returned for every successful invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub json: ResponseBody,
    pub status: u16,
    pub msg: String,
    pub url: String,
}

/// Parse a response body leniently. Anything that is not JSON becomes
/// [`ResponseBody::Empty`].
pub fn parse_body(body: Option<&[u8]>) -> ResponseBody {
    let Some(bytes) = body else {
        return ResponseBody::Empty;
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return ResponseBody::Empty;
    }

    match serde_json::from_slice(bytes) {
        Ok(value) => ResponseBody::Json(value),
        Err(e) => {
            tracing::debug!("Ignoring unparseable response body: {}", e);
            ResponseBody::Empty
        }
    }
}

/// Judge one response against the action's expected outcome
pub fn interpret(
    spec: &ActionSpec,
    response: &TransportResponse,
    url: &str,
) -> Result<Outcome, OktaError> {
    if !spec.expect.accepts(response.status) {
        return Err(OktaError::Api {
            status: response.status,
            reason: response.reason.clone(),
            url: url.to_string(),
        });
    }

    // An empty body on an accepted status is the empty marker
    let json = parse_body(response.body.as_deref());

    Ok(Outcome {
        json,
        status: response.status,
        msg: response.reason.clone(),
        url: url.to_string(),
    })
}

/// Base object for a read-modify-write update.
///
/// A failed, non-200 or non-object fetch yields an empty object and the
/// update proceeds with only the caller's fields.
pub fn prior_fetch_base(result: Result<TransportResponse, TransportError>) -> Value {
    let empty = || Value::Object(Map::new());

    match result {
        Ok(response) if response.status == 200 => match parse_body(response.body.as_deref()) {
            ResponseBody::Json(value @ Value::Object(_)) => value,
            _ => {
                tracing::warn!("Prior fetch returned no usable object; merging into an empty base");
                empty()
            }
        },
        Ok(response) => {
            tracing::warn!(
                "Prior fetch failed with {} {}; merging into an empty base",
                response.status,
                response.reason
            );
            empty()
        }
        Err(e) => {
            tracing::warn!("Prior fetch failed: {}; merging into an empty base", e);
            empty()
        }
    }
}

/// Deep-merge `patch` into `base`. Objects merge key by key; every other
/// value in `patch` replaces what is in `base`.
pub fn merge(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, patch_value) in patch_map {
                match base_map.get_mut(key) {
                    Some(existing) if existing.is_object() && patch_value.is_object() => {
                        merge(existing, patch_value)
                    }
                    _ => {
                        base_map.insert(key.clone(), patch_value.clone());
                    }
                }
            }
        }
        (base, patch) => *base = patch.clone(),
    }
}

/// Owned form of [`merge`]
pub fn merged_body(mut base: Value, patch: &Value) -> Value {
    merge(&mut base, patch);
    base
}
