//! CLI error types with miette diagnostics.
//!
//! Maps `subservices_api::Error` variants into user-facing errors with
//! actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the API")]
    #[diagnostic(
        code(subservices::connection_failed),
        help("Check your network connection. The API root in use is {base_url}")
    )]
    ConnectionFailed {
        base_url: String,
        #[source]
        source: subservices_api::Error,
    },

    #[error("Request timed out")]
    #[diagnostic(
        code(subservices::timeout),
        help("Increase the timeout with --timeout or check the API status.")
    )]
    Timeout,

    #[error("TLS setup failed: {0}")]
    #[diagnostic(code(subservices::tls))]
    Tls(String),

    // ── Authentication ───────────────────────────────────────────────
    #[error("No API token configured for profile '{profile}'")]
    #[diagnostic(
        code(subservices::no_token),
        help(
            "Configure a token with: subservices config init\n\
             Or set the SUBSERVICES_TOKEN environment variable."
        )
    )]
    NoToken { profile: String },

    #[error("The API rejected the token (HTTP {status})")]
    #[diagnostic(
        code(subservices::unauthorized),
        help("Check the token of the active profile: subservices config show")
    )]
    Unauthorized { status: u16, body: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Not found (HTTP 404)")]
    #[diagnostic(
        code(subservices::not_found),
        help("Check the IDs used. Run: subservices instances list")
    )]
    NotFound { body: String },

    #[error("API request failed with HTTP {status}")]
    #[diagnostic(code(subservices::http_status), help("Response body: {body}"))]
    Http { status: u16, body: String },

    #[error("HTTP transport error")]
    #[diagnostic(code(subservices::transport))]
    Transport(#[source] subservices_api::Error),

    // ── Validation ───────────────────────────────────────────────────
    #[error("{0}")]
    #[diagnostic(code(subservices::invalid_argument))]
    InvalidArgument(String),

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(subservices::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(subservices::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: subservices config init --profile {name}"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(subservices::config))]
    Config(Box<figment::Error>),

    #[error("Failed to serialize configuration: {0}")]
    #[diagnostic(code(subservices::config_write))]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("System keyring error: {0}")]
    #[diagnostic(
        code(subservices::keyring),
        help("Store the token in the config file instead: subservices config init --token <TOKEN>")
    )]
    Keyring(String),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(subservices::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(subservices::json))]
    Json(#[from] serde_json::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Tls(_) => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::NoToken { .. } | Self::Unauthorized { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::InvalidArgument(_)
            | Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Map a library error, naming the API root for connection failures.
    pub fn from_api(err: subservices_api::Error, base_url: &str) -> Self {
        use subservices_api::Error as ApiError;

        match err {
            ApiError::InvalidArgument(message) => Self::InvalidArgument(message),
            ApiError::InvalidUrl(e) => Self::Validation {
                field: "base_url".into(),
                reason: e.to_string(),
            },
            ApiError::Status { status: 404, body } => Self::NotFound { body },
            ApiError::Status {
                status: status @ (401 | 403),
                body,
            } => Self::Unauthorized { status, body },
            ApiError::Status { status, body } => Self::Http { status, body },
            ApiError::Tls(message) => Self::Tls(message),
            ApiError::Transport(e) if e.is_timeout() => Self::Timeout,
            ApiError::Transport(e) if e.is_connect() => Self::ConnectionFailed {
                base_url: base_url.to_owned(),
                source: ApiError::Transport(e),
            },
            ApiError::Transport(e) => Self::Transport(ApiError::Transport(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(err: subservices_api::Error) -> CliError {
        CliError::from_api(err, subservices_api::DEFAULT_BASE_URL)
    }

    #[test]
    fn status_errors_map_to_exit_codes() {
        let not_found = map(subservices_api::Error::Status {
            status: 404,
            body: String::new(),
        });
        assert_eq!(not_found.exit_code(), exit_code::NOT_FOUND);

        let unauthorized = map(subservices_api::Error::Status {
            status: 401,
            body: String::new(),
        });
        assert_eq!(unauthorized.exit_code(), exit_code::AUTH);

        let server = map(subservices_api::Error::Status {
            status: 502,
            body: "bad gateway".into(),
        });
        assert!(matches!(server, CliError::Http { status: 502, .. }));
        assert_eq!(server.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn invalid_argument_is_a_usage_error() {
        let err = map(subservices_api::Error::InvalidArgument(
            "unsupported HTTP method 'PATCH'".into(),
        ));
        assert_eq!(err.exit_code(), exit_code::USAGE);
        assert_eq!(err.to_string(), "unsupported HTTP method 'PATCH'");
    }
}
