//! Normalized response bodies.

use serde::{Deserialize, Serialize};

/// Deepest array/object nesting accepted as JSON; deeper bodies stay `Raw`.
pub const MAX_JSON_DEPTH: usize = 512;

/// A successful response, in one of its two possible shapes.
///
/// The API usually answers with JSON, but not always; callers have to
/// discriminate. An error-shaped JSON payload is still `Structured`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ApiResult {
    /// The body parsed as JSON (any JSON value, `null` included).
    Structured(serde_json::Value),
    /// The body did not parse as JSON and is returned unchanged.
    Raw(String),
}

impl ApiResult {
    /// Normalize a response body: JSON if it parses within
    /// [`MAX_JSON_DEPTH`] levels, the original text otherwise.
    pub fn from_body(body: String) -> Self {
        match parse_json(&body) {
            Some(value) => Self::Structured(value),
            None => Self::Raw(body),
        }
    }

    /// Normalize raw body bytes. Invalid UTF-8 cannot be JSON; such a body
    /// is kept as `Raw` with the bad sequences replaced by U+FFFD.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match std::str::from_utf8(bytes) {
            Ok(text) => Self::from_body(text.to_owned()),
            Err(_) => Self::Raw(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }

    pub fn as_structured(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Structured(value) => Some(value),
            Self::Raw(_) => None,
        }
    }

    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Self::Raw(text) => Some(text),
            Self::Structured(_) => None,
        }
    }

    /// Unwrap the structured value, handing the raw text back on failure.
    pub fn into_structured(self) -> Result<serde_json::Value, String> {
        match self {
            Self::Structured(value) => Ok(value),
            Self::Raw(text) => Err(text),
        }
    }
}

/// serde_json's own recursion limit (128) is lifted once the body is known
/// to stay within [`MAX_JSON_DEPTH`].
fn parse_json(body: &str) -> Option<serde_json::Value> {
    if nesting_depth(body) > MAX_JSON_DEPTH {
        return None;
    }
    let mut de = serde_json::Deserializer::from_str(body);
    de.disable_recursion_limit();
    let value = serde_json::Value::deserialize(&mut de).ok()?;
    de.end().ok()?;
    Some(value)
}

/// Maximum bracket nesting outside string literals.
fn nesting_depth(body: &str) -> usize {
    let (mut depth, mut max) = (0_usize, 0_usize);
    let (mut in_string, mut escaped) = (false, false);
    for b in body.bytes() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'[' | b'{' => {
                depth += 1;
                max = max.max(depth);
            }
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    max
}
