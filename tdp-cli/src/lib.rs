//! tdp CLI - Command-line interface for the tiny database patcher.
//!
//! This crate provides the `tdp` tool, which applies permanent and volatile
//! SQL patches to a SQLite database and keeps the patch history consistent
//! with the patch files.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
