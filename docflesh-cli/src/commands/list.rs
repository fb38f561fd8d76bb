//! `docflesh list` — managed repositories and their resolved manifests.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use docflesh_core::{MetadataSource, ResolvedRepoConfig};

use super::load;

/// Arguments for `docflesh list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Also print every manifest path per repository.
    #[arg(long)]
    pub files: bool,
}

#[derive(Tabled)]
struct RepoRow {
    #[tabled(rename = "repo")]
    name: String,
    #[tabled(rename = "path")]
    path: String,
    #[tabled(rename = "templates")]
    templates: usize,
    #[tabled(rename = "static")]
    statics: usize,
    #[tabled(rename = "flags")]
    flags: String,
    #[tabled(rename = "siteinfo")]
    siteinfo: String,
}

impl From<&ResolvedRepoConfig> for RepoRow {
    fn from(repo: &ResolvedRepoConfig) -> Self {
        let mut flags = Vec::new();
        if repo.flags.site_uses_mathjax {
            flags.push("mathjax");
        }
        if repo.flags.site_uses_precommit {
            flags.push("precommit");
        }
        let siteinfo = match repo.siteinfo_source {
            MetadataSource::Found => repo.siteinfo.category.to_string(),
            MetadataSource::Defaulted => "missing".to_string(),
        };
        Self {
            name: repo.repo_name(),
            path: repo.local_path.display().to_string(),
            templates: repo.template_files.len(),
            statics: repo.static_files.len(),
            flags: if flags.is_empty() { "-".to_string() } else { flags.join(", ") },
            siteinfo,
        }
    }
}

impl ListArgs {
    pub fn run(self, config: &Path) -> Result<()> {
        let loaded = load(config)?;
        if loaded.repos.is_empty() {
            println!("No managed repositories in {}.", config.display());
            return Ok(());
        }

        let mut table = Table::new(loaded.repos.iter().map(RepoRow::from));
        table.with(Style::rounded());
        println!("{table}");

        if self.files {
            for repo in &loaded.repos {
                println!();
                println!("{}", repo.repo_name().bold());
                for path in &repo.template_files {
                    println!("  {} {}", "T".cyan(), path.display());
                }
                for path in &repo.static_files {
                    println!("  {} {}", "S".magenta(), path.display());
                }
            }
        }
        Ok(())
    }
}
