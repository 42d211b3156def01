// Transport configuration for building the reqwest::Client used by the
// dispatcher, plus the wire-compatibility switch for authentication.
//
// The defaults reproduce what the sub.services API has always been called
// with: 120 second timeout, redirects followed, certificate verification off.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Fixed request budget for every call made through one transport.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const USER_AGENT: &str = concat!("subservices-rs/", env!("CARGO_PKG_VERSION"));

/// TLS verification mode.
#[derive(Debug, Clone)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate. The historical default for this API.
    DangerAcceptInvalid,
}

/// How the bearer token and content headers are placed on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestStyle {
    /// Wire format the API has been called with so far.
    ///
    /// `Authorization` is added to the params of every request, so it lands
    /// in the query string for GET and in the form body otherwise.
    /// POST/PUT/DELETE also send it as a header, together with
    /// `Content-Type: application/json` over a form-encoded body.
    #[default]
    Legacy,
    /// `Authorization` travels only as a header, on every method, and the
    /// form body keeps its own content type.
    HeaderAuth,
}

/// Transport configuration for building the HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    pub request_style: RequestStyle,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::DangerAcceptInvalid,
            timeout: DEFAULT_TIMEOUT,
            request_style: RequestStyle::Legacy,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    pub fn with_tls(mut self, tls: TlsMode) -> Self {
        self.tls = tls;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_request_style(mut self, style: RequestStyle) -> Self {
        self.request_style = style;
        self
    }
}
