//! Invocation parameters
//!
//! A [`ParameterSet`] records only what the caller supplied. A field that is
//! absent here never reaches the outgoing body, which is how Okta tells
//! "leave unchanged" apart from "clear".

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Parameter names whose values are masked in debug output
const REDACTED_PARAMS: &[&str] = &["password", "api_key"];

/// Declared type of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    #[default]
    String,
    Bool,
    Int,
    Json,
    List,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamType::String => "string",
            ParamType::Bool => "bool",
            ParamType::Int => "int",
            ParamType::Json => "json",
            ParamType::List => "list",
        };
        f.write_str(name)
    }
}

/// A single supplied value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Bool(bool),
    Int(i64),
    List(Vec<String>),
    Json(Value),
}

impl ParamValue {
    /// Convert a loosely typed JSON value (YAML task files, registry defaults)
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::String(s) => ParamValue::Str(s),
            Value::Bool(b) => ParamValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ParamValue::Int(i),
                None => ParamValue::Json(Value::Number(n)),
            },
            Value::Array(items) if items.iter().all(Value::is_string) => ParamValue::List(
                items
                    .into_iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            ),
            other => ParamValue::Json(other),
        }
    }

    /// Coerce to the declared type, or `None` when the value cannot be one
    pub fn coerce(&self, ty: ParamType) -> Option<ParamValue> {
        match (ty, self) {
            (ParamType::String, ParamValue::Str(_)) => Some(self.clone()),
            (ParamType::String, ParamValue::Int(i)) => Some(ParamValue::Str(i.to_string())),
            (ParamType::String, ParamValue::Bool(b)) => Some(ParamValue::Str(b.to_string())),

            (ParamType::Bool, ParamValue::Bool(_)) => Some(self.clone()),
            (ParamType::Bool, ParamValue::Str(s)) => parse_bool(s).map(ParamValue::Bool),

            (ParamType::Int, ParamValue::Int(_)) => Some(self.clone()),
            (ParamType::Int, ParamValue::Str(s)) => s.trim().parse().ok().map(ParamValue::Int),

            (ParamType::List, ParamValue::List(_)) => Some(self.clone()),
            (ParamType::List, ParamValue::Str(s)) => Some(ParamValue::List(
                s.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),

            (ParamType::Json, ParamValue::Json(_)) => Some(self.clone()),
            (ParamType::Json, ParamValue::List(items)) => Some(ParamValue::Json(Value::Array(
                items.iter().cloned().map(Value::String).collect(),
            ))),
            (ParamType::Json, ParamValue::Str(s)) => {
                serde_json::from_str(s).ok().map(ParamValue::Json)
            }

            _ => None,
        }
    }

    /// JSON form used inside request bodies
    pub fn to_json(&self) -> Value {
        match self {
            ParamValue::Str(s) => Value::String(s.clone()),
            ParamValue::Bool(b) => Value::Bool(*b),
            ParamValue::Int(i) => Value::from(*i),
            ParamValue::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            ParamValue::Json(v) => v.clone(),
        }
    }

    /// Text form used in paths and query strings
    pub fn render(&self) -> String {
        match self {
            ParamValue::Str(s) => s.clone(),
            ParamValue::Bool(b) => b.to_string(),
            ParamValue::Int(i) => i.to_string(),
            ParamValue::List(items) => items.join(","),
            ParamValue::Json(v) => v.to_string(),
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        ParamValue::List(value)
    }
}

/// Caller-supplied values for one invocation, keyed by parameter name
#[derive(Clone, Default, PartialEq)]
pub struct ParameterSet {
    values: BTreeMap<String, ParamValue>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<ParamValue>) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parse `key=value` pairs as given on the command line
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), ParamValue::Str(v.into())))
            .collect();
        Self { values }
    }

    /// Build from a JSON object, e.g. the `params` map of a task file
    pub fn from_json_map(map: Map<String, Value>) -> Self {
        let values = map
            .into_iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k, ParamValue::from_json(v)))
            .collect();
        Self { values }
    }
}

impl fmt::Debug for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in &self.values {
            if REDACTED_PARAMS.contains(&name.as_str()) {
                map.entry(name, &"***");
            } else {
                map.entry(name, value);
            }
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bool_coercion_from_strings() {
        let value = ParamValue::from("false");
        assert_eq!(value.coerce(ParamType::Bool), Some(ParamValue::Bool(false)));
        assert_eq!(
            ParamValue::from("yes").coerce(ParamType::Bool),
            Some(ParamValue::Bool(true))
        );
        assert_eq!(ParamValue::from("maybe").coerce(ParamType::Bool), None);
    }

    #[test]
    fn test_int_coercion() {
        assert_eq!(
            ParamValue::from("200").coerce(ParamType::Int),
            Some(ParamValue::Int(200))
        );
        assert_eq!(ParamValue::from("two").coerce(ParamType::Int), None);
        assert_eq!(ParamValue::Bool(true).coerce(ParamType::Int), None);
    }

    #[test]
    fn test_list_coercion_splits_commas() {
        let value = ParamValue::from("g1, g2,,g3");
        assert_eq!(
            value.coerce(ParamType::List),
            Some(ParamValue::List(vec![
                "g1".to_string(),
                "g2".to_string(),
                "g3".to_string()
            ]))
        );
    }

    #[test]
    fn test_json_coercion_parses_strings() {
        let value = ParamValue::from(r#"[{"name":"email","values":["user.email"]}]"#);
        let coerced = value.coerce(ParamType::Json).unwrap();
        assert_eq!(
            coerced.to_json(),
            json!([{"name": "email", "values": ["user.email"]}])
        );
        assert_eq!(ParamValue::from("{not json").coerce(ParamType::Json), None);
    }

    #[test]
    fn test_empty_string_stays_a_value() {
        let value = ParamValue::from("");
        assert_eq!(value.coerce(ParamType::String), Some(ParamValue::Str(String::new())));
        assert_eq!(value.to_json(), json!(""));
    }

    #[test]
    fn test_from_json_map_skips_nulls() {
        let map = json!({"id": "U1", "limit": 5, "group_ids": ["a", "b"], "email": null});
        let params = ParameterSet::from_json_map(map.as_object().unwrap().clone());
        assert_eq!(params.len(), 3);
        assert_eq!(params.get("limit"), Some(&ParamValue::Int(5)));
        assert_eq!(
            params.get("group_ids"),
            Some(&ParamValue::List(vec!["a".to_string(), "b".to_string()]))
        );
        assert!(!params.contains("email"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let params = ParameterSet::new()
            .with("login", "jane@example.com")
            .with("password", "hunter2");
        let debug = format!("{:?}", params);
        assert!(debug.contains("jane@example.com"));
        assert!(!debug.contains("hunter2"));
    }
}
