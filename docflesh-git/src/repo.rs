//! Repository handles.
//!
//! [`RepoHandle`] is the narrow interface the safety checker and the sync
//! pipeline need. [`GitRepo`] implements it with the system `git` binary,
//! which picks up the user's SSH keys, credential helpers and `~/.gitconfig`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde::Serialize;

use docflesh_core::Settings;

use crate::error::GitError;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A multi-step git operation left unfinished in the working copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GitOperation {
    Rebase,
    Merge,
    CherryPick,
}

impl GitOperation {
    /// Marker entries inside the git directory, checked in this order.
    const MARKERS: &'static [(&'static str, GitOperation)] = &[
        ("rebase-merge", GitOperation::Rebase),
        ("rebase-apply", GitOperation::Rebase),
        ("MERGE_HEAD", GitOperation::Merge),
        ("CHERRY_PICK_HEAD", GitOperation::CherryPick),
    ];

    /// First operation whose marker exists under `git_dir`.
    pub fn detect(git_dir: &Path) -> Option<GitOperation> {
        Self::MARKERS
            .iter()
            .find(|(marker, _)| git_dir.join(marker).exists())
            .map(|(_, op)| *op)
    }
}

impl fmt::Display for GitOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GitOperation::Rebase => "rebase",
            GitOperation::Merge => "merge",
            GitOperation::CherryPick => "cherry-pick",
        })
    }
}

/// Result of [`RepoHandle::commit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitOutcome {
    Committed,
    /// The index matched `HEAD`; no commit was created.
    NothingToCommit,
}

/// Operations on one working copy.
///
/// Inspection methods are read-only apart from [`fetch_upstream`], which only
/// updates remote-tracking refs.
///
/// [`fetch_upstream`]: RepoHandle::fetch_upstream
pub trait RepoHandle {
    fn path(&self) -> &Path;

    fn exists(&self) -> bool {
        self.path().exists()
    }

    fn is_detached_head(&self) -> Result<bool, GitError>;
    fn active_branch_name(&self) -> Result<String, GitError>;
    fn is_bare(&self) -> Result<bool, GitError>;

    /// Modified tracked files or staged changes. Untracked files do not count.
    fn is_dirty(&self) -> Result<bool, GitError>;

    fn in_progress_operation(&self) -> Result<Option<GitOperation>, GitError>;
    fn fetch_upstream(&self) -> Result<(), GitError>;
    fn local_tip_commit(&self) -> Result<String, GitError>;
    fn remote_tip_commit(&self) -> Result<String, GitError>;

    /// Stage exactly `paths` (relative to the repository root).
    fn stage(&self, paths: &[PathBuf]) -> Result<(), GitError>;

    /// Commit the index. Never creates an empty commit.
    fn commit(&self, message: &str) -> Result<CommitOutcome, GitError>;

    fn push(&self) -> Result<(), GitError>;
}

// ---------------------------------------------------------------------------
// GitRepo
// ---------------------------------------------------------------------------

/// [`RepoHandle`] backed by `git` subprocesses run inside the working copy.
#[derive(Debug, Clone)]
pub struct GitRepo {
    path: PathBuf,
    remote: String,
    branch: String,
}

impl GitRepo {
    pub fn new(path: impl Into<PathBuf>, remote: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            remote: remote.into(),
            branch: branch.into(),
        }
    }

    /// Handle using the remote and primary branch from `settings`.
    pub fn with_settings(path: impl Into<PathBuf>, settings: &Settings) -> Self {
        Self::new(path, settings.remote.clone(), settings.primary_branch.clone())
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.args(args)
            .current_dir(&self.path)
            .env("GIT_TERMINAL_PROMPT", "0");
        // Keep git from discovering an enclosing repository.
        if let Some(parent) = self.path.parent() {
            cmd.env("GIT_CEILING_DIRECTORIES", parent);
        }
        cmd
    }

    /// Run `git args…` and return the raw output regardless of exit status.
    fn run_raw(&self, args: &[&str]) -> Result<Output, GitError> {
        tracing::debug!("git {} ({})", args.join(" "), self.path.display());
        self.command(args).output().map_err(|source| GitError::Spawn {
            command: args.join(" "),
            path: self.path.clone(),
            source,
        })
    }

    /// Run `git args…`, require success, return trimmed stdout.
    fn run(&self, args: &[&str]) -> Result<String, GitError> {
        let output = self.run_raw(args)?;
        if !output.status.success() {
            return Err(self.failed(args, &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn failed(&self, args: &[&str], output: &Output) -> GitError {
        GitError::Command {
            command: args.join(" "),
            path: self.path.clone(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }

    fn git_dir(&self) -> Result<PathBuf, GitError> {
        self.run(&["rev-parse", "--absolute-git-dir"]).map(PathBuf::from)
    }
}

impl RepoHandle for GitRepo {
    fn path(&self) -> &Path {
        &self.path
    }

    fn is_detached_head(&self) -> Result<bool, GitError> {
        let args = ["symbolic-ref", "-q", "HEAD"];
        let output = self.run_raw(&args)?;
        // 0: HEAD names a branch, 1: HEAD is a bare commit id.
        match output.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(self.failed(&args, &output)),
        }
    }

    fn active_branch_name(&self) -> Result<String, GitError> {
        self.run(&["symbolic-ref", "--short", "HEAD"])
    }

    fn is_bare(&self) -> Result<bool, GitError> {
        let args = ["rev-parse", "--is-bare-repository"];
        match self.run(&args)?.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(GitError::UnexpectedOutput {
                command: args.join(" "),
                path: self.path.clone(),
                output: other.to_string(),
            }),
        }
    }

    fn is_dirty(&self) -> Result<bool, GitError> {
        // Inspection must not refresh `.git/index` behind the user's back.
        let status = self.run(&[
            "--no-optional-locks",
            "status",
            "--porcelain",
            "--untracked-files=no",
        ])?;
        Ok(!status.is_empty())
    }

    fn in_progress_operation(&self) -> Result<Option<GitOperation>, GitError> {
        Ok(GitOperation::detect(&self.git_dir()?))
    }

    fn fetch_upstream(&self) -> Result<(), GitError> {
        self.run(&["fetch", "--quiet", self.remote.as_str()])?;
        Ok(())
    }

    fn local_tip_commit(&self) -> Result<String, GitError> {
        self.run(&["rev-parse", "--verify", "HEAD"])
    }

    fn remote_tip_commit(&self) -> Result<String, GitError> {
        let tracking = format!("refs/remotes/{}/{}", self.remote, self.branch);
        self.run(&["rev-parse", "--verify", tracking.as_str()])
    }

    fn stage(&self, paths: &[PathBuf]) -> Result<(), GitError> {
        if paths.is_empty() {
            return Ok(());
        }
        let owned: Vec<String> = paths.iter().map(|p| p.to_string_lossy().into_owned()).collect();
        let mut args = vec!["add", "--"];
        args.extend(owned.iter().map(String::as_str));
        self.run(&args)?;
        tracing::debug!("staged {} file(s) in {}", paths.len(), self.path.display());
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<CommitOutcome, GitError> {
        let args = ["diff", "--cached", "--quiet"];
        let output = self.run_raw(&args)?;
        match output.status.code() {
            Some(0) => {
                tracing::info!("nothing to commit in {}", self.path.display());
                return Ok(CommitOutcome::NothingToCommit);
            }
            Some(1) => {}
            _ => return Err(self.failed(&args, &output)),
        }
        self.run(&["commit", "--no-verify", "--quiet", "-m", message])?;
        tracing::info!("committed in {}: {message}", self.path.display());
        Ok(CommitOutcome::Committed)
    }

    fn push(&self) -> Result<(), GitError> {
        self.run(&["push", "--quiet", self.remote.as_str(), self.branch.as_str()])?;
        tracing::info!("pushed {} to {}", self.branch, self.remote);
        Ok(())
    }
}
