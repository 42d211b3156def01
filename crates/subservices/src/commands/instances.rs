//! Instance command handlers.

use crate::cli::{InstancesArgs, InstancesCommand};
use crate::error::CliError;

use super::{Ctx, util};

pub async fn handle(ctx: &Ctx<'_>, args: InstancesArgs) -> Result<(), CliError> {
    let instance = ctx.api.instance();
    let yes = ctx.global.yes;

    let result = match args.command {
        InstancesCommand::List => instance.list().await,
        InstancesCommand::Show { id } => instance.show(id).await,
        InstancesCommand::Start { id } => instance.start(id).await,
        InstancesCommand::Stop { id } => {
            if !util::confirm("instances stop", &format!("Stop instance {id}?"), yes)? {
                return Ok(());
            }
            instance.stop(id).await
        }
        InstancesCommand::Restart { id } => {
            if !util::confirm("instances restart", &format!("Restart instance {id}?"), yes)? {
                return Ok(());
            }
            instance.restart(id).await
        }
        InstancesCommand::ResetPassword { id } => {
            let prompt = format!("Reset the root password of instance {id}?");
            if !util::confirm("instances reset-password", &prompt, yes)? {
                return Ok(());
            }
            instance.reset_password(id).await
        }
        InstancesCommand::Order { location, name } => instance.order(location, &name).await,
    };

    ctx.emit(result)
}
