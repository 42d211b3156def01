// Instance whitelist endpoints
//
// Per-instance list of IP addresses allowed to reach the instance.

use std::sync::Arc;

use tracing::debug;

use crate::dispatcher::RequestDispatcher;
use crate::error::Error;
use crate::params::Params;
use crate::response::ApiResult;

/// Handler for `instance/{id}/whitelist[/...]`.
pub struct Whitelist {
    dispatcher: Arc<RequestDispatcher>,
}

impl Whitelist {
    pub fn new(dispatcher: Arc<RequestDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// `GET instance/{id}/whitelist`
    pub async fn list(&self, id: u64) -> Result<ApiResult, Error> {
        self.dispatcher
            .get(&format!("instance/{id}/whitelist"), Params::new())
            .await
    }

    /// Allow an IP address (e.g. `127.0.0.1`) on the instance.
    ///
    /// `POST instance/{id}/whitelist` with `ip_address`
    pub async fn add_entry(&self, id: u64, ip_address: &str) -> Result<ApiResult, Error> {
        debug!(id, ip_address, "adding whitelist entry");
        self.dispatcher
            .post(
                &format!("instance/{id}/whitelist"),
                Params::new().with("ip_address", ip_address),
            )
            .await
    }

    /// Remove whitelist entry `whitelist_id`.
    ///
    /// `DELETE instance/{id}/whitelist/{whitelist_id}` with `ip_address`
    pub async fn delete_entry(
        &self,
        id: u64,
        whitelist_id: u64,
        ip_address: &str,
    ) -> Result<ApiResult, Error> {
        debug!(id, whitelist_id, ip_address, "deleting whitelist entry");
        self.dispatcher
            .delete(
                &format!("instance/{id}/whitelist/{whitelist_id}"),
                Params::new().with("ip_address", ip_address),
            )
            .await
    }
}
