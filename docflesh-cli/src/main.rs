//! docflesh — keep shared config files in sync across documentation sites.
//!
//! # Usage
//!
//! ```text
//! docflesh [--config <path>] [-v…] check [--json]
//! docflesh sync [--dry-run] [--no-commit]
//! docflesh diff [<repo>]
//! docflesh list [--files]
//! docflesh generate-siteinfo [<dir>]
//! docflesh update-deps
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;

use commands::{
    check::CheckArgs, diff::DiffArgs, generate_siteinfo::GenerateSiteinfoArgs, list::ListArgs,
    sync::SyncArgs, update_deps::UpdateDepsArgs,
};
use docflesh_core::config::default_config_path;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "docflesh",
    version,
    about = "Sync shared configuration files into a fleet of documentation repositories",
    long_about = None,
)]
struct Cli {
    /// Path to config.yaml [default: ~/.config/doc-flesh/config.yaml]
    #[arg(long, global = true, env = "DOCFLESH_CONFIG")]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check that every managed repository is safe to sync.
    Check(CheckArgs),

    /// Render templates, copy static files, then commit and push.
    Sync(SyncArgs),

    /// Show unified diffs of what sync would write.
    Diff(DiffArgs),

    /// List managed repositories and their resolved manifests.
    List(ListArgs),

    /// Interactively create or update siteinfo.json.
    GenerateSiteinfo(GenerateSiteinfoArgs),

    /// Run `uv lock --upgrade` in every managed repository.
    UpdateDeps(UpdateDepsArgs),
}

/// `--config` / `$DOCFLESH_CONFIG`, else the default under the home directory.
fn config_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => default_config_path().context("no --config given and no default location"),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_env("RUST_LOG")
        .format_timestamp(None)
        .init();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Check(args) => args.run(&config_path(cli.config)?),
        Commands::Sync(args) => args.run(&config_path(cli.config)?),
        Commands::Diff(args) => args.run(&config_path(cli.config)?),
        Commands::List(args) => args.run(&config_path(cli.config)?),
        Commands::GenerateSiteinfo(args) => args.run(),
        Commands::UpdateDeps(args) => args.run(&config_path(cli.config)?),
    }
}
