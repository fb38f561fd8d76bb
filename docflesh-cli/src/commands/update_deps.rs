//! `docflesh update-deps` — refresh `uv.lock` in every managed repository.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use docflesh_git::check_all;
use docflesh_sync::upgrade_lockfiles;

use super::{load, open_repos, print_safety};

/// Arguments for `docflesh update-deps`.
#[derive(Args, Debug)]
pub struct UpdateDepsArgs {}

impl UpdateDepsArgs {
    pub fn run(self, config: &Path) -> Result<()> {
        let loaded = load(config)?;
        let report = check_all(&open_repos(&loaded), &loaded.settings.primary_branch);
        if !report.all_safe() {
            print_safety(&report);
            bail!("aborting update-deps: not every repository is safe");
        }

        let dirs: Vec<PathBuf> = loaded.repos.iter().map(|r| r.local_path.clone()).collect();
        let upgraded = upgrade_lockfiles(&dirs).context("lockfile upgrade failed")?;
        println!("✅ Upgraded lockfiles in {upgraded} repositories.");
        Ok(())
    }
}
