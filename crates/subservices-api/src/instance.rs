// Instance endpoints
//
// Lifecycle operations on a single instance (show, start, stop, restart,
// password reset) plus listing and ordering. Every method is a fixed
// path + params pair handed to the dispatcher.

use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::dispatcher::RequestDispatcher;
use crate::error::Error;
use crate::params::Params;
use crate::response::ApiResult;
use crate::whitelist::Whitelist;

/// Handler for `instance/...` and `order/instance`.
pub struct Instance {
    dispatcher: Arc<RequestDispatcher>,
    whitelist: OnceLock<Whitelist>,
}

impl Instance {
    pub fn new(dispatcher: Arc<RequestDispatcher>) -> Self {
        Self {
            dispatcher,
            whitelist: OnceLock::new(),
        }
    }

    /// The whitelist handler, built on first access and reused afterwards.
    pub fn whitelist(&self) -> &Whitelist {
        self.whitelist
            .get_or_init(|| Whitelist::new(Arc::clone(&self.dispatcher)))
    }

    /// List all instances on the account.
    ///
    /// `GET instance/list`
    pub async fn list(&self) -> Result<ApiResult, Error> {
        debug!("listing instances");
        self.dispatcher.get("instance/list", Params::new()).await
    }

    /// Detailed information about one instance.
    ///
    /// `GET instance/{id}/show`
    pub async fn show(&self, id: u64) -> Result<ApiResult, Error> {
        self.dispatcher
            .get(&format!("instance/{id}/show"), Params::new())
            .await
    }

    /// `POST instance/{id}/start`
    pub async fn start(&self, id: u64) -> Result<ApiResult, Error> {
        self.action(id, "start").await
    }

    /// `POST instance/{id}/stop`
    pub async fn stop(&self, id: u64) -> Result<ApiResult, Error> {
        self.action(id, "stop").await
    }

    /// `POST instance/{id}/restart`
    pub async fn restart(&self, id: u64) -> Result<ApiResult, Error> {
        self.action(id, "restart").await
    }

    /// `POST instance/{id}/reset-password`
    pub async fn reset_password(&self, id: u64) -> Result<ApiResult, Error> {
        self.action(id, "reset-password").await
    }

    /// Order a new instance at a location.
    ///
    /// `POST order/instance` with `location_id` and `name`
    pub async fn order(&self, location_id: u64, name: &str) -> Result<ApiResult, Error> {
        debug!(location_id, name, "ordering instance");
        let params = Params::new()
            .with("location_id", location_id)
            .with("name", name);
        self.dispatcher.post("order/instance", params).await
    }

    async fn action(&self, id: u64, action: &str) -> Result<ApiResult, Error> {
        debug!(id, action, "instance action");
        self.dispatcher
            .post(&format!("instance/{id}/{action}"), Params::new())
            .await
    }
}
