use thiserror::Error;

/// Top-level error type for the `subservices-api` crate.
///
/// The remote API never produces a distinct error kind here: an error-shaped
/// JSON payload with a 2xx status is still a successful
/// [`ApiResult::Structured`](crate::ApiResult::Structured).
#[derive(Debug, Error)]
pub enum Error {
    // ── Input ───────────────────────────────────────────────────────
    /// Malformed input, rejected before any I/O (empty token, non-mapping
    /// params, unsupported HTTP method).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// `base_url + path` did not form a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout,
    /// body read failure).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status code.
    #[error("HTTP {status} from server")]
    Status { status: u16, body: String },

    /// TLS setup or HTTP client construction failed.
    #[error("TLS error: {0}")]
    Tls(String),
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Returns `true` for failures raised by the transport layer:
    /// network errors and non-2xx responses.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }

    /// Returns `true` if the request timed out.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }

    /// Returns `true` if the server rejected the token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }

    /// The HTTP status code, if the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_count_as_transport() {
        let err = Error::Status {
            status: 404,
            body: "missing".into(),
        };
        assert!(err.is_transport());
        assert!(err.is_not_found());
        assert!(!err.is_unauthorized());
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn invalid_argument_is_not_transport() {
        let err = Error::invalid("unsupported method");
        assert!(!err.is_transport());
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "Invalid argument: unsupported method");
    }
}
