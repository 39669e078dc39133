//! `tdp status` command - Show the state of every configured patch.

use tdp_migrate::{PatchState, PatchStatus};

use crate::cli::StatusArgs;
use crate::commands::Context;
use crate::error::CliResult;
use crate::output::{self, style_error, style_notice, style_pending, style_success};

/// Run the status command
pub async fn run(ctx: &Context, args: StatusArgs) -> CliResult<()> {
    let engine = ctx.engine(&args.patches).await?;
    let report = engine.status().await?;

    if args.json {
        return output::json(&report);
    }

    output::header("Patch Status");

    for status in &report.patches {
        output::list_item(&format!(
            "{:<40} {:<9} {}",
            status.name,
            status.kind.to_string(),
            describe(status)
        ));
    }

    if !report.unconfigured.is_empty() {
        output::newline();
        output::section("Applied but not configured:");
        for name in &report.unconfigured {
            output::list_item(&style_error(name));
        }
    }

    output::newline();
    output::dim(&report.summary());

    Ok(())
}

fn describe(status: &PatchStatus) -> String {
    let label = status.state.label();
    match &status.state {
        PatchState::UpToDate => style_success(label),
        PatchState::NeedsApply => style_pending(label),
        PatchState::Mismatched { .. } | PatchState::Ambiguous => style_error(label),
        PatchState::RenameCandidate { from } => {
            style_notice(&format!("{} (from {})", label, from))
        }
    }
}
