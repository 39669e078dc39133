//! CLI command implementations.

pub mod context;
pub mod init;
pub mod plan;
pub mod rename;
pub mod retrofit;
pub mod status;
pub mod upgrade;
pub mod validate;
pub mod version;

pub use context::Context;

use crate::cli::{Cli, Command};
use crate::error::CliResult;

/// Run the command selected on the command line
pub async fn run(cli: Cli) -> CliResult<()> {
    if let Command::Version = cli.command {
        return version::run().await;
    }

    let ctx = Context::from_cli(&cli)?;

    match cli.command {
        Command::Init => init::run(&ctx).await,
        Command::Plan(args) => plan::run(&ctx, args).await,
        Command::Upgrade(args) => upgrade::run(&ctx, args).await,
        Command::Validate(args) => validate::run(&ctx, args).await,
        Command::Retrofit(args) => retrofit::run(&ctx, args).await,
        Command::Rename(args) => rename::run(&ctx, args).await,
        Command::Status(args) => status::run(&ctx, args).await,
        Command::Version => version::run().await,
    }
}
