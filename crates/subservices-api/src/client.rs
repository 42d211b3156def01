// Client facade
//
// Owns the credentials and the dispatcher, and hands out resource handlers.
// Handlers are created on first access and then reused for the lifetime of
// the facade.

use std::sync::{Arc, OnceLock};

use secrecy::SecretString;

use crate::credentials::Credentials;
use crate::dispatcher::RequestDispatcher;
use crate::error::Error;
use crate::instance::Instance;
use crate::params::Params;
use crate::response::ApiResult;
use crate::transport::{RequestStyle, TransportConfig};

/// Entry point for the sub.services API.
///
/// ```rust,ignore
/// let api = SubServices::new("my-token")?;
/// let instances = api.instance().list().await?;
/// api.instance().whitelist().add_entry(42, "203.0.113.7").await?;
/// ```
pub struct SubServices {
    credentials: Arc<Credentials>,
    dispatcher: Arc<RequestDispatcher>,
    instance: OnceLock<Instance>,
}

impl SubServices {
    /// Client for the production API with the default transport.
    pub fn new(token: impl Into<String>) -> Result<Self, Error> {
        Self::with_config(Credentials::new(token)?, &TransportConfig::default())
    }

    /// Client with explicit credentials and transport settings.
    pub fn with_config(credentials: Credentials, transport: &TransportConfig) -> Result<Self, Error> {
        let credentials = Arc::new(credentials);
        let dispatcher = RequestDispatcher::new(Arc::clone(&credentials), transport)?;
        Ok(Self::from_parts(credentials, dispatcher))
    }

    /// Client around a pre-configured `reqwest::Client`.
    pub fn with_client(
        credentials: Credentials,
        http: reqwest::Client,
        style: RequestStyle,
    ) -> Self {
        let credentials = Arc::new(credentials);
        let dispatcher = RequestDispatcher::with_client(http, Arc::clone(&credentials), style);
        Self::from_parts(credentials, dispatcher)
    }

    fn from_parts(credentials: Arc<Credentials>, dispatcher: RequestDispatcher) -> Self {
        Self {
            credentials,
            dispatcher: Arc::new(dispatcher),
            instance: OnceLock::new(),
        }
    }

    /// The API token this client authenticates with.
    pub fn token(&self) -> &SecretString {
        self.credentials.token()
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn dispatcher(&self) -> &RequestDispatcher {
        &self.dispatcher
    }

    // ── Handlers ─────────────────────────────────────────────────────

    /// Instance handler, built on first access.
    pub fn instance(&self) -> &Instance {
        self.instance
            .get_or_init(|| Instance::new(Arc::clone(&self.dispatcher)))
    }

    // ── Generic requests ─────────────────────────────────────────────

    pub async fn get(&self, path: &str, params: Params) -> Result<ApiResult, Error> {
        self.dispatcher.get(path, params).await
    }

    pub async fn post(&self, path: &str, params: Params) -> Result<ApiResult, Error> {
        self.dispatcher.post(path, params).await
    }

    pub async fn put(&self, path: &str, params: Params) -> Result<ApiResult, Error> {
        self.dispatcher.put(path, params).await
    }

    pub async fn delete(&self, path: &str, params: Params) -> Result<ApiResult, Error> {
        self.dispatcher.delete(path, params).await
    }

    /// Request with a method given by name; see [`RequestDispatcher::request`].
    pub async fn request(
        &self,
        path: &str,
        params: Params,
        method: &str,
    ) -> Result<ApiResult, Error> {
        self.dispatcher.request(path, params, method).await
    }
}
