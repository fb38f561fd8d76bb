//! Subcommand implementations and the helpers they share.

pub mod check;
pub mod diff;
pub mod generate_siteinfo;
pub mod list;
pub mod sync;
pub mod update_deps;

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use docflesh_core::{load_config_at, LoadedConfig};
use docflesh_git::{GitRepo, SafetyReport};

/// Load and resolve the configuration, with a hint when it is missing.
pub(crate) fn load(config: &Path) -> Result<LoadedConfig> {
    load_config_at(config).with_context(|| format!("failed to load {}", config.display()))
}

/// One git handle per managed repository, in configuration order.
pub(crate) fn open_repos(loaded: &LoadedConfig) -> Vec<GitRepo> {
    loaded
        .repos
        .iter()
        .map(|r| GitRepo::with_settings(&r.local_path, &loaded.settings))
        .collect()
}

/// One line per repository; unsafe ones carry the failing check.
pub(crate) fn print_safety(report: &SafetyReport) {
    for check in &report.checks {
        if check.is_safe() {
            println!("{} {}", "✓".green().bold(), check.path.display());
        } else {
            println!(
                "{} {}: {}",
                "✗".red().bold(),
                check.path.display(),
                check.reason()
            );
        }
    }
}
