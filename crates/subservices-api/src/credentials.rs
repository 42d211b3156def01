// API credentials: the bearer token plus the API root it is valid for.

use std::fmt;

use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Root of every API path. Paths passed to the dispatcher are appended to it
/// verbatim.
pub const DEFAULT_BASE_URL: &str = "https://sub.services/api/v1/";

/// Token and base URL for a sub.services account.
///
/// Immutable once built. `Display` and `Debug` render the host and a
/// redacted token, never the secret itself.
#[derive(Clone)]
pub struct Credentials {
    token: SecretString,
    base_url: String,
}

impl Credentials {
    /// Credentials against the production API root.
    ///
    /// Fails with [`Error::InvalidArgument`] for an empty token, or one that
    /// cannot travel in an `Authorization` header.
    pub fn new(token: impl Into<String>) -> Result<Self, Error> {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    /// Credentials against a different API root (staging, mock servers).
    ///
    /// The base URL is used as a plain string prefix, so it should end with
    /// a `/`.
    pub fn with_base_url(
        token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, Error> {
        let token = token.into();
        if token.is_empty() {
            return Err(Error::invalid("API token must not be empty"));
        }
        if HeaderValue::from_str(&bearer(&token)).is_err() {
            return Err(Error::invalid(
                "API token contains characters not allowed in an HTTP header",
            ));
        }

        Ok(Self {
            token: SecretString::from(token),
            base_url: base_url.into(),
        })
    }

    /// The API token.
    pub fn token(&self) -> &SecretString {
        &self.token
    }

    /// The API root all request paths are appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `Bearer <token>`, the value of every Authorization credential sent.
    pub(crate) fn bearer(&self) -> String {
        bearer(self.token.expose_secret())
    }

    /// The bearer value as a sensitive header, hidden from `Debug` output.
    pub(crate) fn bearer_header(&self) -> Result<HeaderValue, Error> {
        let mut value = HeaderValue::from_str(&self.bearer())
            .map_err(|e| Error::invalid(format!("invalid Authorization header value: {e}")))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Host: {}], [Token: ****].", self.base_url)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
