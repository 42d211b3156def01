//! Command dispatch: bridges CLI args -> API calls -> output formatting.

pub mod account;
pub mod config_cmd;
pub mod instances;
pub mod request;
pub mod util;
pub mod whitelist;

use subservices_api::{ApiResult, SubServices};

use crate::cli::{Command, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

/// Everything an API-bound handler needs.
pub struct Ctx<'a> {
    pub api: &'a SubServices,
    pub global: &'a GlobalOpts,
    pub format: OutputFormat,
}

impl Ctx<'_> {
    /// Render a call's outcome, or map its failure against the active API root.
    pub fn emit(&self, result: Result<ApiResult, subservices_api::Error>) -> Result<(), CliError> {
        let result = result.map_err(|e| CliError::from_api(e, self.api.credentials().base_url()))?;
        let out = output::render_result(self.format, &result);
        output::print_output(&out, self.global.quiet);
        Ok(())
    }
}

/// Dispatch an API-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Ctx<'_>) -> Result<(), CliError> {
    match cmd {
        Command::Instances(args) => instances::handle(ctx, args).await,
        Command::Whitelist(args) => whitelist::handle(ctx, args).await,
        Command::Locations => account::locations(ctx).await,
        Command::User => account::user(ctx).await,
        Command::Request(args) => request::handle(ctx, args).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
