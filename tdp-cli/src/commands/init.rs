//! `tdp init` command - Create the patch history table.

use std::path::Path;

use crate::commands::Context;
use crate::config::CONFIG_FILE_NAME;
use crate::error::CliResult;
use crate::output::{self, info, success};

/// Run the init command
pub async fn run(ctx: &Context) -> CliResult<()> {
    let store = ctx.store().await?;

    output::kv("Database", &store.config().path.display());
    output::kv("Table", store.table());
    success("Patch history table is ready");

    if ctx.config_file().is_none() {
        let path = Path::new(CONFIG_FILE_NAME);
        ctx.starter_config().save(path)?;
        success(&format!("Created {}", CONFIG_FILE_NAME));
        info("Add patch directories under [patches] paths");
    }

    Ok(())
}
