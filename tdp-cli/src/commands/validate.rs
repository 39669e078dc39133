//! `tdp validate` command - Check patch files against the database.

use crate::cli::ValidateArgs;
use crate::commands::Context;
use crate::error::CliResult;
use crate::output::success;

/// Run the validate command
pub async fn run(ctx: &Context, args: ValidateArgs) -> CliResult<()> {
    let engine = ctx.engine(&args.patches).await?;

    if args.compatible {
        engine.validate_compatible().await?;
        success("Database is compatible with the patch files");
    } else {
        engine.validate_upgradable().await?;
        success("Database can be upgraded");
    }

    Ok(())
}
