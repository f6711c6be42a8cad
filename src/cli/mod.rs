//! Command-line interface for `qms`.
//!
//! This module provides the CLI parsing and command routing using clap.

pub mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::config::Config;
use crate::logging;

/// `qms` - Quality management service.
#[derive(Parser, Debug)]
#[command(name = "qms")]
#[command(
    author,
    version,
    about = "Quality management service: defects, issues and tasks over a REST API",
    long_about = None,
    after_help = "Data lives in memory only and is lost on restart."
)]
pub struct Cli {
    /// Config file (defaults to ./qms.yaml when present)
    #[arg(long, global = true, env = "QMS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the API server
    Serve(ServeArgs),

    /// Mint a bearer token for an existing user
    Token(TokenArgs),

    /// Show version information
    Version(VersionArgs),
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Address to listen on (overrides config and environment)
    #[arg(long)]
    pub bind: Option<String>,

    /// Start with an empty store instead of the demo data
    #[arg(long)]
    pub no_seed: bool,
}

#[derive(Args, Debug)]
pub struct TokenArgs {
    /// Username to issue the token for
    pub username: String,

    /// Look the user up in an empty store instead of the demo data
    #[arg(long)]
    pub no_seed: bool,
}

#[derive(Args, Debug, Default)]
pub struct VersionArgs {
    /// Print only the version number
    #[arg(long)]
    pub short: bool,
}

/// Run the CLI.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or the command fails.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Version(ref args) = cli.command {
        commands::version::execute(args);
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    logging::init_logging(cli.verbose, cli.quiet, cli.json_logs || config.log.json)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    match cli.command {
        Commands::Serve(ref args) => commands::serve::execute(args, config),
        Commands::Token(ref args) => commands::token::execute(args, &config),
        Commands::Version(_) => Ok(()),
    }
}
