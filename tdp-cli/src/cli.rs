//! CLI argument definitions using clap.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// tdp - Tiny Database Patcher
#[derive(Parser, Debug)]
#[command(name = "tdp")]
#[command(version)]
#[command(about = "tdp - Tiny Database Patcher", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Database URL (e.g. sqlite://app.db)
    #[arg(short, long, global = true, env = "TDP_DATABASE_URL")]
    pub database: Option<String>,

    /// Path to the configuration file (defaults to tdp.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the patch history table
    Init,

    /// List patches that need to be applied
    Plan(PlanArgs),

    /// Apply all pending patches
    Upgrade(PatchArgs),

    /// Check patch files against the database
    Validate(ValidateArgs),

    /// Record configured patches as applied without running them
    Retrofit(RetrofitArgs),

    /// Relabel applied patches whose files were renamed
    Rename(RenameArgs),

    /// Show the state of every configured patch
    Status(StatusArgs),

    /// Display version information
    Version,
}

// =============================================================================
// Shared Arguments
// =============================================================================

/// Patch sources shared by most commands
#[derive(Args, Debug, Default, Clone)]
pub struct PatchArgs {
    /// Patch files or directories (defaults to `patches.paths` from config)
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,
}

// =============================================================================
// Plan Command
// =============================================================================

/// Arguments for the `plan` command
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub patches: PatchArgs,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

// =============================================================================
// Validate Command
// =============================================================================

/// Arguments for the `validate` command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub patches: PatchArgs,

    /// Require every configured patch to be applied with its current content
    #[arg(long)]
    pub compatible: bool,
}

// =============================================================================
// Retrofit Command
// =============================================================================

/// Arguments for the `retrofit` command
#[derive(Args, Debug)]
pub struct RetrofitArgs {
    #[command(flatten)]
    pub patches: PatchArgs,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub force: bool,
}

// =============================================================================
// Rename Command
// =============================================================================

/// Arguments for the `rename` command
#[derive(Args, Debug)]
pub struct RenameArgs {
    #[command(flatten)]
    pub patches: PatchArgs,

    /// Show the renames without applying them
    #[arg(long)]
    pub dry_run: bool,

    /// Print the renames as JSON
    #[arg(long)]
    pub json: bool,
}

// =============================================================================
// Status Command
// =============================================================================

/// Arguments for the `status` command
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub patches: PatchArgs,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}
