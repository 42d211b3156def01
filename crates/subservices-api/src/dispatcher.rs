// Request dispatcher
//
// Turns a (path, method, params) triple into an HTTP call against the API
// root and normalizes the answer into an `ApiResult`. Every resource handler
// goes through here; nothing else touches `reqwest` directly.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{debug, trace};
use url::Url;

use crate::credentials::Credentials;
use crate::error::Error;
use crate::params::Params;
use crate::response::ApiResult;
use crate::transport::{RequestStyle, TransportConfig};

/// Param key the bearer token is injected under in [`RequestStyle::Legacy`].
pub const AUTHORIZATION_PARAM: &str = "Authorization";

fn application_json() -> HeaderValue {
    HeaderValue::from_static("application/json")
}

// ── Method ───────────────────────────────────────────────────────────

/// The HTTP methods the API accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses an upper-case method name. Anything other than exactly GET, POST,
/// PUT or DELETE is an [`Error::InvalidArgument`].
impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            _ => Err(Error::invalid(format!("unsupported HTTP method '{s}'"))),
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
        }
    }
}

// ── Dispatcher ───────────────────────────────────────────────────────

/// Builds, sends and normalizes API requests.
///
/// Holds the HTTP client and a shared handle on the [`Credentials`]; cheap to
/// share behind an `Arc` between resource handlers.
pub struct RequestDispatcher {
    http: reqwest::Client,
    credentials: Arc<Credentials>,
    style: RequestStyle,
}

impl RequestDispatcher {
    /// Create a dispatcher with a client built from `transport`.
    pub fn new(credentials: Arc<Credentials>, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            credentials,
            style: transport.request_style,
        })
    }

    /// Create a dispatcher around a pre-configured `reqwest::Client`.
    ///
    /// Timeout, TLS and redirect policy are whatever the client was built
    /// with.
    pub fn with_client(
        http: reqwest::Client,
        credentials: Arc<Credentials>,
        style: RequestStyle,
    ) -> Self {
        Self {
            http,
            credentials,
            style,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn request_style(&self) -> RequestStyle {
        self.style
    }

    // ── Verbs ────────────────────────────────────────────────────────

    /// `GET {base}{path}` with `params` as the query string.
    pub async fn get(&self, path: &str, params: Params) -> Result<ApiResult, Error> {
        self.send(Method::Get, path, params).await
    }

    /// `POST {base}{path}` with `params` as a form body.
    pub async fn post(&self, path: &str, params: Params) -> Result<ApiResult, Error> {
        self.send(Method::Post, path, params).await
    }

    /// `PUT {base}{path}` with `params` as a form body.
    pub async fn put(&self, path: &str, params: Params) -> Result<ApiResult, Error> {
        self.send(Method::Put, path, params).await
    }

    /// `DELETE {base}{path}` with `params` as a form body.
    pub async fn delete(&self, path: &str, params: Params) -> Result<ApiResult, Error> {
        self.send(Method::Delete, path, params).await
    }

    /// Dispatch with a method given by name.
    ///
    /// Fails with [`Error::InvalidArgument`] before any I/O if `method` is
    /// not one of GET, POST, PUT, DELETE.
    pub async fn request(
        &self,
        path: &str,
        params: Params,
        method: &str,
    ) -> Result<ApiResult, Error> {
        let method = method.parse::<Method>()?;
        self.send(method, path, params).await
    }

    /// Send one request and normalize its response.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        params: Params,
    ) -> Result<ApiResult, Error> {
        let request = self.build(method, path, params)?;

        debug!(%method, path, "sending request");
        let resp = request.send().await.map_err(transport_error)?;

        Self::process_response(resp).await
    }

    // ── Request construction ─────────────────────────────────────────

    /// Plain concatenation of the API root and `path`. The caller owns the
    /// path format; no escaping beyond URL parsing happens here.
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        let full = format!("{}{}", self.credentials.base_url(), path);
        Ok(Url::parse(&full)?)
    }

    /// Build the outgoing request without sending it.
    pub fn build(
        &self,
        method: Method,
        path: &str,
        mut params: Params,
    ) -> Result<reqwest::RequestBuilder, Error> {
        let url = self.url(path)?;
        let bearer = self.credentials.bearer_header()?;

        if self.style == RequestStyle::Legacy {
            params.insert(AUTHORIZATION_PARAM, self.credentials.bearer());
        }
        trace!(%method, path, params = params.len(), style = ?self.style, "building request");

        let builder = self.http.request(method.into(), url);

        let builder = match (method, self.style) {
            (Method::Get, RequestStyle::Legacy) => builder.query(&params),
            (Method::Get, RequestStyle::HeaderAuth) => {
                builder.query(&params).header(AUTHORIZATION, bearer)
            }
            (_, style) => {
                let mut headers = HeaderMap::new();
                headers.insert(ACCEPT, application_json());
                headers.insert(AUTHORIZATION, bearer);
                if style == RequestStyle::Legacy {
                    headers.insert(CONTENT_TYPE, application_json());
                }
                // `headers` replaces what `form` set, so the legacy
                // Content-Type wins over the urlencoded one.
                builder.form(&params).headers(headers)
            }
        };

        Ok(builder)
    }

    // ── Response normalization ───────────────────────────────────────

    /// Read the body bytes; non-2xx becomes [`Error::Status`], anything
    /// else is normalized by [`ApiResult::from_bytes`]. No charset
    /// transcoding happens.
    async fn process_response(resp: reqwest::Response) -> Result<ApiResult, Error> {
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(transport_error)?;
        debug!(status = status.as_u16(), bytes = bytes.len(), "received response");

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        Ok(ApiResult::from_bytes(&bytes))
    }
}

/// Strip the query string from the URL a transport error carries: under
/// [`RequestStyle::Legacy`] it holds the bearer token.
fn transport_error(mut err: reqwest::Error) -> Error {
    if let Some(url) = err.url_mut() {
        url.set_query(None);
    }
    Error::Transport(err)
}
