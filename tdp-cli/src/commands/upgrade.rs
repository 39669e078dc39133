//! `tdp upgrade` command - Apply all pending patches.

use crate::cli::PatchArgs;
use crate::commands::Context;
use crate::error::CliResult;
use crate::output::{self, success};

/// Run the upgrade command
pub async fn run(ctx: &Context, args: PatchArgs) -> CliResult<()> {
    let engine = ctx.engine(&args).await?;
    let report = engine.upgrade().await?;

    for name in &report.applied {
        output::list_item(name);
    }
    success(&report.summary());

    Ok(())
}
