//! `docflesh check` — run the safety gate without writing anything.

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use docflesh_git::{check_all, SafetyReport, Verdict};
use docflesh_sync::pipeline::placeholder_repos;

use super::{load, open_repos, print_safety};

/// Arguments for `docflesh check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct CheckReportJson {
    all_safe: bool,
    repos: Vec<RepoCheckJson>,
}

#[derive(Serialize)]
struct RepoCheckJson {
    path: String,
    safe: bool,
    /// `{"verdict": "...", ...}` fields; absent when inspection failed.
    #[serde(flatten)]
    verdict: Option<Verdict>,
    reason: String,
}

impl CheckArgs {
    pub fn run(self, config: &Path) -> Result<()> {
        let loaded = load(config)?;
        let repos = open_repos(&loaded);
        let report = check_all(&repos, &loaded.settings.primary_branch);

        if self.json {
            print_json(&report)?;
        } else {
            for path in placeholder_repos(&loaded.repos) {
                println!(
                    "{} {}: no siteinfo.json, sync will refuse to render templates",
                    "!".yellow().bold(),
                    path.display()
                );
            }
            print_safety(&report);
        }

        let unsafe_count = report.unsafe_checks().count();
        if unsafe_count > 0 {
            bail!(
                "{unsafe_count} of {} repositories are not safe to sync",
                report.checks.len()
            );
        }
        if !self.json {
            println!();
            println!("✅ All repos are clean and safe for automation.");
        }
        Ok(())
    }
}

fn print_json(report: &SafetyReport) -> Result<()> {
    let payload = CheckReportJson {
        all_safe: report.all_safe(),
        repos: report
            .checks
            .iter()
            .map(|check| RepoCheckJson {
                path: check.path.display().to_string(),
                safe: check.is_safe(),
                verdict: check.outcome.as_ref().ok().cloned(),
                reason: check.reason(),
            })
            .collect(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize check JSON")?
    );
    Ok(())
}
