//! `tdp rename` command - Relabel applied patches whose files were renamed.

use crate::cli::RenameArgs;
use crate::commands::Context;
use crate::error::CliResult;
use crate::output::{self, success};

/// Run the rename command
pub async fn run(ctx: &Context, args: RenameArgs) -> CliResult<()> {
    let engine = ctx.engine(&args.patches).await?;

    let plan = if args.dry_run {
        engine.plan_rename().await?
    } else {
        engine.rename().await?
    };

    if args.json {
        return output::json(&plan);
    }

    for (old_name, new_name) in plan.iter() {
        output::list_item(&format!("{} → {}", old_name, new_name));
    }

    if plan.is_empty() {
        success(&plan.summary());
    } else if args.dry_run {
        output::info(&format!("{} (dry run)", plan.summary()));
    } else {
        success(&format!("Renamed {} patch record(s)", plan.len()));
    }

    Ok(())
}
