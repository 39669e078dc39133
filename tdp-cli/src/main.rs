//! tdp CLI - Command-line interface for the tiny database patcher.

use clap::Parser;

use tdp_cli::cli::Cli;
use tdp_cli::{commands, logging, output};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = commands::run(cli).await {
        output::error(&e.to_string());
        std::process::exit(e.exit_code());
    }
}
