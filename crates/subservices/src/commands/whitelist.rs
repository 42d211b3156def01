//! Whitelist command handlers.

use crate::cli::{WhitelistArgs, WhitelistCommand};
use crate::error::CliError;

use super::{Ctx, util};

pub async fn handle(ctx: &Ctx<'_>, args: WhitelistArgs) -> Result<(), CliError> {
    let whitelist = ctx.api.instance().whitelist();

    let result = match args.command {
        WhitelistCommand::List { instance } => whitelist.list(instance).await,
        WhitelistCommand::Add { instance, ip } => whitelist.add_entry(instance, &ip).await,
        WhitelistCommand::Delete {
            instance,
            entry,
            ip,
        } => {
            let prompt = format!("Remove {ip} (entry {entry}) from instance {instance}?");
            if !util::confirm("whitelist delete", &prompt, ctx.global.yes)? {
                return Ok(());
            }
            whitelist.delete_entry(instance, entry, &ip).await
        }
    };

    ctx.emit(result)
}
