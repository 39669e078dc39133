//! `tdp retrofit` command - Record configured patches without running them.

use crate::cli::RetrofitArgs;
use crate::commands::Context;
use crate::error::CliResult;
use crate::output::{self, success, warn};

/// Run the retrofit command
pub async fn run(ctx: &Context, args: RetrofitArgs) -> CliResult<()> {
    let engine = ctx.engine(&args.patches).await?;

    if !args.force {
        warn("This erases the patch history and records every configured patch as applied.");
        if !output::confirm(&format!(
            "Retrofit {} patch(es)?",
            engine.patches().len()
        )) {
            output::info("Retrofit cancelled");
            return Ok(());
        }
    }

    let count = engine.retrofit().await?;
    success(&format!("Registered {} patch(es) without running them", count));

    Ok(())
}
