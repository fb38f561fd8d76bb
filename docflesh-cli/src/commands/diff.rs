//! `docflesh diff [<repo>]` — show unified diffs for what sync would write.

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use docflesh_renderer::TemplateEngine;
use docflesh_sync::diff_repo;

use super::load;

/// Arguments for `docflesh diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Only this repository (directory name or full path).
    pub repo: Option<String>,
}

impl DiffArgs {
    pub fn run(self, config: &Path) -> Result<()> {
        let loaded = load(config)?;
        // Configured paths are canonical; match a path argument the same way.
        let wanted_path = self.repo.as_deref().and_then(|w| Path::new(w).canonicalize().ok());
        let repos: Vec<_> = loaded
            .repos
            .iter()
            .filter(|r| match &self.repo {
                Some(wanted) => {
                    r.repo_name() == *wanted || wanted_path.as_ref() == Some(&r.local_path)
                }
                None => true,
            })
            .collect();
        if repos.is_empty() {
            if let Some(wanted) = &self.repo {
                bail!("'{wanted}' is not a managed repository");
            }
            println!("No managed repositories.");
            return Ok(());
        }

        let engine = TemplateEngine::new(&loaded.layout.templates_dir())
            .context("failed to load templates")?;
        let static_dir = loaded.layout.static_dir();

        for repo in repos {
            let result = diff_repo(repo, &engine, &static_dir)
                .with_context(|| format!("diff failed for {}", repo.local_path.display()))?;

            if result.diffs.is_empty() {
                println!("No differences for {}.", result.local_path.display());
                continue;
            }
            println!("{}", result.local_path.display().to_string().bold());
            for diff in result.diffs {
                print!("{}", diff.unified_diff);
                if !diff.unified_diff.ends_with('\n') {
                    println!();
                }
            }
        }

        Ok(())
    }
}
