//! `tdp plan` command - List patches that need to be applied.

use crate::cli::PlanArgs;
use crate::commands::Context;
use crate::error::CliResult;
use crate::output::{self, success};

/// Run the plan command
pub async fn run(ctx: &Context, args: PlanArgs) -> CliResult<()> {
    let engine = ctx.engine(&args.patches).await?;
    let plan = engine.plan().await?;

    if args.json {
        return output::json(&plan);
    }

    if plan.is_empty() {
        success("Database is up to date");
        return Ok(());
    }

    output::section(&format!("{} patch(es) to apply:", plan.len()));
    for (i, patch) in plan.iter().enumerate() {
        output::numbered_item(i + 1, &patch.to_string());
    }

    Ok(())
}
