//! `docflesh generate-siteinfo [<dir>]` — interactive `siteinfo.json` editor.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use docflesh_core::{siteinfo, SiteCategory, SiteMetadata};

const DEFAULT_SITE_NAME: &str = "My Site";
const EXAMPLE_RELATED_REPO: &str = "[Example](https://example.com)";

/// Arguments for `docflesh generate-siteinfo`.
#[derive(Args, Debug)]
pub struct GenerateSiteinfoArgs {
    /// Repository root to write `siteinfo.json` into.
    #[arg(default_value = ".")]
    pub dir: PathBuf,
}

impl GenerateSiteinfoArgs {
    pub fn run(self) -> Result<()> {
        if !self.dir.is_dir() {
            bail!("{} is not a directory", self.dir.display());
        }
        // "." has no file name, and the slug default comes from it.
        let dir = self
            .dir
            .canonicalize()
            .with_context(|| format!("failed to resolve {}", self.dir.display()))?;
        let draft = siteinfo::draft_at(&dir)?;
        let info = prompt(draft)?;

        println!();
        println!("{}", serde_json::to_string_pretty(&info)?);
        println!();

        let theme = ColorfulTheme::default();
        let write = Confirm::with_theme(&theme)
            .with_prompt(format!("Write {}?", siteinfo::siteinfo_path(&dir).display()))
            .default(true)
            .interact()?;
        if !write {
            println!("Nothing written.");
            return Ok(());
        }

        let path = siteinfo::save_at(&dir, &info)?;
        println!("{} wrote {}", "✓".green().bold(), path.display());
        Ok(())
    }
}

fn prompt(draft: SiteMetadata) -> Result<SiteMetadata> {
    let theme = ColorfulTheme::default();

    let site_name_default = if draft.site_name.is_empty() {
        DEFAULT_SITE_NAME.to_string()
    } else {
        draft.site_name
    };
    let site_name: String = Input::with_theme(&theme)
        .with_prompt("Site name")
        .default(site_name_default)
        .interact_text()?;

    let site_name_slug: String = Input::with_theme(&theme)
        .with_prompt("Site name slug (used in the site URL)")
        .default(draft.site_name_slug)
        .interact_text()?;

    let categories = SiteCategory::all();
    let current = categories
        .iter()
        .position(|c| *c == draft.category)
        .unwrap_or(0);
    let picked = Select::with_theme(&theme)
        .with_prompt("Category")
        .items(categories)
        .default(current)
        .interact()?;

    let site_uses_mathjax = Confirm::with_theme(&theme)
        .with_prompt("Does the site use MathJax?")
        .default(draft.site_uses_mathjax)
        .interact()?;

    let site_uses_precommit = Confirm::with_theme(&theme)
        .with_prompt("Does the site use pre-commit?")
        .default(draft.site_uses_precommit)
        .interact()?;

    let related_default = match draft.related_repo.as_deref() {
        Some(link) if !link.is_empty() => link.to_string(),
        _ => EXAMPLE_RELATED_REPO.to_string(),
    };
    let related_repo: String = Input::with_theme(&theme)
        .with_prompt("Related repository (Markdown link, empty for none)")
        .default(related_default)
        .allow_empty(true)
        .validate_with(|input: &String| candidate_with_link(input).validate())
        .interact_text()?;

    let info = SiteMetadata {
        site_name,
        site_name_slug,
        category: categories[picked],
        related_repo: Some(related_repo),
        site_uses_mathjax,
        site_uses_precommit,
    };
    info.validate().map_err(anyhow::Error::msg)?;
    Ok(info)
}

/// Only `related_repo` is checked; everything else is free text.
fn candidate_with_link(link: &str) -> SiteMetadata {
    SiteMetadata {
        related_repo: Some(link.to_string()),
        ..SiteMetadata::placeholder()
    }
}
