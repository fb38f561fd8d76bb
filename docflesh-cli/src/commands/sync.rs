//! `docflesh sync` — gate, render, copy, then commit and push.

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use docflesh_git::GitRepo;
use docflesh_sync::{sync, RepoOutcome, RepoSyncResult, SyncError, SyncOptions, WriteResult};

use super::{load, print_safety};

/// Arguments for `docflesh sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Write into a temporary directory instead of the repositories. Git is not touched.
    #[arg(long)]
    pub dry_run: bool,

    /// Stage the files but do not commit or push.
    #[arg(long)]
    pub no_commit: bool,
}

impl SyncArgs {
    pub fn run(self, config: &Path) -> Result<()> {
        let loaded = load(config)?;
        let settings = &loaded.settings;
        let options = SyncOptions {
            dry_run: self.dry_run,
            no_commit: self.no_commit,
            ..SyncOptions::from_settings(settings)
        };

        let report = match sync(&loaded.repos, &loaded.layout, settings, &options, |p: &Path| {
            GitRepo::with_settings(p, settings)
        }) {
            Ok(report) => report,
            Err(SyncError::Unsafe { report }) => {
                print_safety(&report);
                bail!("aborting sync: not every repository is safe; nothing was written");
            }
            Err(err) => return Err(err).context("sync aborted before writing"),
        };

        print_safety(&report.safety);
        if let Some(sandbox) = &report.sandbox {
            println!("[dry-run] output written to {}", sandbox.display());
        }
        for result in &report.repos {
            print_result(result, self.dry_run);
        }

        let failed = report.failures().count();
        if failed > 0 {
            bail!("sync failed for {failed} of {} repositories", report.repos.len());
        }
        println!("🎉 Sync complete.");
        Ok(())
    }
}

fn print_result(result: &RepoSyncResult, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let written = result.written_count();
    let unchanged = result.writes.len() - written;

    match &result.outcome {
        Ok(outcome) => {
            let status = match outcome {
                RepoOutcome::DryRun => "rendered".normal(),
                RepoOutcome::Staged => "staged".yellow(),
                RepoOutcome::NothingToCommit => "nothing to commit".bright_black(),
                RepoOutcome::Pushed => "pushed".green(),
            };
            println!(
                "{prefix}{} {} ({written} written, {unchanged} unchanged) {status}",
                "✓".green().bold(),
                result.local_path.display(),
            );
        }
        Err(err) => {
            println!(
                "{prefix}{} {}: {err}",
                "✗".red().bold(),
                result.local_path.display()
            );
        }
    }

    for w in &result.writes {
        match w {
            WriteResult::Written { path } => println!("  ✎  {}", path.display()),
            WriteResult::Unchanged { path } => println!("  ·  {}", path.display()),
        }
    }
}
