//! Request parameters.
//!
//! Parameters are a key-ordered, key-unique mapping of scalar values. They
//! become the query string of a GET and the form body of everything else.

use indexmap::IndexMap;
use indexmap::map::Iter;
use serde::Serialize;

use crate::error::Error;

/// A single scalar parameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    String(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Number(value.into())
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

/// Ordered parameter mapping sent with a request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Params(IndexMap<String, ParamValue>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a value, replacing (in place) any previous value for `key`.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Option<ParamValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, String, ParamValue> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a String, &'a ParamValue);
    type IntoIter = Iter<'a, String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Convert loosely-typed JSON into params.
///
/// Only a JSON object is accepted. `null` members are dropped, the same way
/// an unset form field is never sent; arrays and nested objects are rejected.
impl TryFrom<serde_json::Value> for Params {
    type Error = Error;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        let serde_json::Value::Object(map) = value else {
            return Err(Error::invalid(format!(
                "params must be a mapping, got {}",
                json_kind(&value)
            )));
        };

        let mut params = Self::new();
        for (key, value) in map {
            let value = match value {
                serde_json::Value::Null => continue,
                serde_json::Value::String(s) => ParamValue::String(s),
                serde_json::Value::Number(n) => ParamValue::Number(n),
                serde_json::Value::Bool(b) => ParamValue::Bool(b),
                other => {
                    return Err(Error::invalid(format!(
                        "param '{key}' must be a scalar, got {}",
                        json_kind(&other)
                    )));
                }
            };
            params.insert(key, value);
        }
        Ok(params)
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn keeps_insertion_order_and_unique_keys() {
        let mut params = Params::new().with("b", 1_u64).with("a", "x");
        params.insert("b", 2_u64);

        let keys: Vec<&str> = params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["b", "a"]);
        assert_eq!(params.get("b"), Some(&ParamValue::from(2_u64)));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn converts_json_object() {
        let params = Params::try_from(json!({
            "location_id": 5,
            "name": "box1",
            "backup": true,
            "note": null,
        }))
        .unwrap();

        assert_eq!(params.len(), 3);
        assert_eq!(params.get("name"), Some(&ParamValue::from("box1")));
        assert_eq!(params.get("location_id").map(ToString::to_string).as_deref(), Some("5"));
        assert!(params.get("note").is_none());
    }

    #[test]
    fn rejects_non_mapping() {
        for value in [json!([1, 2]), json!("text"), json!(3), json!(null)] {
            let err = Params::try_from(value).unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)), "got: {err:?}");
        }
    }

    #[test]
    fn rejects_nested_values() {
        let err = Params::try_from(json!({ "ips": ["127.0.0.1"] })).unwrap_err();
        assert!(err.to_string().contains("ips"), "got: {err}");
    }
}
