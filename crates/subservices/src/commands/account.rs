//! Account-level lookups: locations and the current user.

use crate::error::CliError;

use super::Ctx;

pub async fn locations(ctx: &Ctx<'_>) -> Result<(), CliError> {
    ctx.emit(ctx.api.location_list().await)
}

pub async fn user(ctx: &Ctx<'_>) -> Result<(), CliError> {
    ctx.emit(ctx.api.user().await)
}
