//! Sync pipeline shared by `docflesh sync` and its dry-run mode.
//!
//! ```text
//! CHECK_ALL ─ unsafe ─▶ abort, nothing written
//!     │ safe
//!     ▼
//! [dry-run: relocate into sandbox]
//!     ▼  per repository
//! RENDER ▶ COPY_STATIC ▶ [dry-run: stop] ▶ STAGE ▶ [no-commit: stop] ▶ COMMIT ▶ PUSH
//! ```
//!
//! Once the gate passes, a failure in one repository is recorded in its
//! [`RepoSyncResult`] and the remaining repositories still run.

use std::path::{Path, PathBuf};

use docflesh_core::{ConfigLayout, MetadataSource, ResolvedRepoConfig, Settings};
use docflesh_git::{check_all, CommitOutcome, RepoHandle, SafetyReport};
use docflesh_renderer::{TemplateEngine, TemplateVariables};

use crate::error::SyncError;
use crate::sandbox::Sandbox;
use crate::writer::{copy_file, write_text, WriteResult};

/// Knobs for one [`sync`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Write into a sandbox instead of the repositories; no git mutation.
    pub dry_run: bool,
    /// Stage manifest files but do not commit or push.
    pub no_commit: bool,
    pub commit_message: String,
    /// Sandbox root for dry runs. `None` creates a fresh temp directory.
    pub sandbox: Option<PathBuf>,
}

impl SyncOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            dry_run: false,
            no_commit: false,
            commit_message: settings.commit_message.clone(),
            sandbox: None,
        }
    }
}

/// How far a repository got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoOutcome {
    /// Files written into the sandbox only.
    DryRun,
    /// Manifest files staged, commit skipped on request.
    Staged,
    /// Index already matched `HEAD`; nothing committed or pushed.
    NothingToCommit,
    Pushed,
}

/// Per-repository record.
#[derive(Debug)]
pub struct RepoSyncResult {
    /// Configured location of the repository.
    pub local_path: PathBuf,
    /// Where files were written (the sandbox copy in dry-run mode).
    pub target_path: PathBuf,
    pub writes: Vec<WriteResult>,
    pub outcome: Result<RepoOutcome, SyncError>,
}

impl RepoSyncResult {
    pub fn is_failure(&self) -> bool {
        self.outcome.is_err()
    }

    pub fn written_count(&self) -> usize {
        self.writes.iter().filter(|w| w.is_written()).count()
    }
}

/// Result of a whole run, repositories in configuration order.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// The gate verdicts that allowed the run, all safe.
    pub safety: SafetyReport,
    pub sandbox: Option<PathBuf>,
    pub repos: Vec<RepoSyncResult>,
}

impl SyncReport {
    pub fn has_failures(&self) -> bool {
        self.repos.iter().any(RepoSyncResult::is_failure)
    }

    pub fn failures(&self) -> impl Iterator<Item = &RepoSyncResult> {
        self.repos.iter().filter(|r| r.is_failure())
    }
}

/// Repositories that would render templates from placeholder metadata.
pub fn placeholder_repos(repos: &[ResolvedRepoConfig]) -> Vec<PathBuf> {
    repos
        .iter()
        .filter(|r| r.siteinfo_source == MetadataSource::Defaulted && !r.template_files.is_empty())
        .map(|r| r.local_path.clone())
        .collect()
}

/// Gate, then render, copy, stage, commit and push every repository.
///
/// `open` builds the handle for a repository path; the CLI passes
/// `GitRepo::with_settings`, tests pass fakes.
///
/// Returns `Err` only when nothing was written: an unsafe repository,
/// placeholder metadata, a broken template directory or an unusable sandbox.
pub fn sync<H, F>(
    repos: &[ResolvedRepoConfig],
    layout: &ConfigLayout,
    settings: &Settings,
    options: &SyncOptions,
    open: F,
) -> Result<SyncReport, SyncError>
where
    H: RepoHandle,
    F: Fn(&Path) -> H,
{
    let handles: Vec<H> = repos.iter().map(|r| open(&r.local_path)).collect();
    let safety = check_all(&handles, &settings.primary_branch);
    if !safety.all_safe() {
        return Err(SyncError::Unsafe { report: safety });
    }
    tracing::info!("all {} repositories passed the safety gate", safety.checks.len());

    let placeholders = placeholder_repos(repos);
    if !placeholders.is_empty() {
        return Err(SyncError::PlaceholderMetadata { repos: placeholders });
    }

    let engine = TemplateEngine::new(&layout.templates_dir())?;
    let static_dir = layout.static_dir();

    let (targets, sandbox) = if options.dry_run {
        let sandbox = match &options.sandbox {
            Some(root) => Sandbox::at(root),
            None => Sandbox::create()?,
        };
        tracing::info!("dry run: writing into {}", sandbox.root().display());
        (sandbox.relocate(repos)?, Some(sandbox.root().to_path_buf()))
    } else {
        (repos.to_vec(), None)
    };

    let mut results = Vec::with_capacity(repos.len());
    for ((original, target), handle) in repos.iter().zip(&targets).zip(&handles) {
        let mut writes = Vec::new();
        let outcome = sync_one(target, handle, &engine, &static_dir, options, &mut writes);
        match &outcome {
            Ok(o) => tracing::info!("{}: {o:?}", original.local_path.display()),
            Err(e) => tracing::error!("{}: {e}", original.local_path.display()),
        }
        results.push(RepoSyncResult {
            local_path: original.local_path.clone(),
            target_path: target.local_path.clone(),
            writes,
            outcome,
        });
    }

    Ok(SyncReport {
        safety,
        sandbox,
        repos: results,
    })
}

fn sync_one<H: RepoHandle>(
    repo: &ResolvedRepoConfig,
    handle: &H,
    engine: &TemplateEngine,
    static_dir: &Path,
    options: &SyncOptions,
    writes: &mut Vec<WriteResult>,
) -> Result<RepoOutcome, SyncError> {
    render_templates(repo, engine, writes)?;
    copy_static_files(repo, static_dir, writes)?;
    if options.dry_run {
        return Ok(RepoOutcome::DryRun);
    }

    handle.stage(&repo.manifest_paths())?;
    if options.no_commit {
        return Ok(RepoOutcome::Staged);
    }

    match handle.commit(&options.commit_message)? {
        CommitOutcome::NothingToCommit => Ok(RepoOutcome::NothingToCommit),
        CommitOutcome::Committed => {
            handle.push()?;
            Ok(RepoOutcome::Pushed)
        }
    }
}

/// Render every template of `repo` into its working tree.
pub fn render_templates(
    repo: &ResolvedRepoConfig,
    engine: &TemplateEngine,
    writes: &mut Vec<WriteResult>,
) -> Result<(), SyncError> {
    let vars = TemplateVariables::from_config(repo);
    for (rel, content) in engine.render_manifest(repo, &vars)? {
        writes.push(write_text(&repo.local_path.join(rel), &content)?);
    }
    Ok(())
}

/// Copy every static file of `repo` from `static_dir` into its working tree.
pub fn copy_static_files(
    repo: &ResolvedRepoConfig,
    static_dir: &Path,
    writes: &mut Vec<WriteResult>,
) -> Result<(), SyncError> {
    for rel in &repo.static_files {
        writes.push(copy_file(&static_dir.join(rel), &repo.local_path.join(rel))?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docflesh_core::{Feature, SiteMetadata};

    fn repo(path: &str, templates: &[&str], source: MetadataSource) -> ResolvedRepoConfig {
        let merged = Feature {
            template_files: templates.iter().map(PathBuf::from).collect(),
            ..Feature::default()
        };
        ResolvedRepoConfig::new(PathBuf::from(path), merged, SiteMetadata::placeholder(), source)
    }

    #[test]
    fn placeholder_only_matters_with_templates() {
        let repos = vec![
            repo("/code/a", &["mkdocs.yaml"], MetadataSource::Defaulted),
            repo("/code/b", &[], MetadataSource::Defaulted),
            repo("/code/c", &["mkdocs.yaml"], MetadataSource::Found),
        ];
        assert_eq!(placeholder_repos(&repos), vec![PathBuf::from("/code/a")]);
    }

    #[test]
    fn options_take_commit_message_from_settings() {
        let settings = Settings {
            commit_message: "chore: sync".to_string(),
            ..Settings::default()
        };
        let opts = SyncOptions::from_settings(&settings);
        assert_eq!(opts.commit_message, "chore: sync");
        assert!(!opts.dry_run && !opts.no_commit);
    }
}
