// Account-level endpoints
//
// Not scoped to an instance, so they live directly on the facade.

use crate::client::SubServices;
use crate::error::Error;
use crate::params::Params;
use crate::response::ApiResult;

impl SubServices {
    /// All locations instances can be ordered in.
    ///
    /// `GET location/list`
    pub async fn location_list(&self) -> Result<ApiResult, Error> {
        self.dispatcher().get("location/list", Params::new()).await
    }

    /// The account the token belongs to.
    ///
    /// `GET user`
    pub async fn user(&self) -> Result<ApiResult, Error> {
        self.dispatcher().get("user", Params::new()).await
    }
}
