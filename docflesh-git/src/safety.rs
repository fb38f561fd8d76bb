//! Safety gate: may a working copy be rewritten and auto-committed?
//!
//! Checks run in a fixed order and the first failure decides the verdict, so
//! every unsafe repository gets exactly one reason:
//!
//! 1. the path exists
//! 2. HEAD is attached to a branch
//! 3. that branch is the primary branch
//! 4. the repository is not bare
//! 5. no tracked modifications and nothing staged
//! 6. no merge, rebase or cherry-pick in progress
//! 7. after a fetch, local tip equals the remote-tracking tip

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::GitError;
use crate::repo::{GitOperation, RepoHandle};

/// Outcome of inspecting one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Safe,
    Missing,
    DetachedHead,
    WrongBranch { branch: String, expected: String },
    Bare,
    Dirty,
    OperationInProgress { operation: GitOperation },
    OutOfSync { local: String, remote: String },
}

impl Verdict {
    pub fn is_safe(&self) -> bool {
        matches!(self, Verdict::Safe)
    }
}

fn short(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Safe => write!(f, "clean and safe for automation"),
            Verdict::Missing => write!(f, "repository does not exist"),
            Verdict::DetachedHead => write!(f, "repository is in detached HEAD state"),
            Verdict::WrongBranch { branch, expected } => {
                write!(f, "on branch '{branch}', not '{expected}'")
            }
            Verdict::Bare => write!(f, "repository is bare"),
            Verdict::Dirty => write!(f, "repository has uncommitted changes"),
            Verdict::OperationInProgress { operation } => write!(f, "a {operation} is in progress"),
            Verdict::OutOfSync { local, remote } => write!(
                f,
                "local branch ({}) does not match remote ({})",
                short(local),
                short(remote)
            ),
        }
    }
}

/// Run the ordered checks against `repo`.
///
/// An `Err` means git itself failed while inspecting; callers treat it as
/// unsafe.
pub fn is_safe<H: RepoHandle + ?Sized>(repo: &H, primary_branch: &str) -> Result<Verdict, GitError> {
    if !repo.exists() {
        return Ok(Verdict::Missing);
    }
    if repo.is_detached_head()? {
        return Ok(Verdict::DetachedHead);
    }
    let branch = repo.active_branch_name()?;
    if branch != primary_branch {
        return Ok(Verdict::WrongBranch {
            branch,
            expected: primary_branch.to_string(),
        });
    }
    if repo.is_bare()? {
        return Ok(Verdict::Bare);
    }
    if repo.is_dirty()? {
        return Ok(Verdict::Dirty);
    }
    if let Some(operation) = repo.in_progress_operation()? {
        return Ok(Verdict::OperationInProgress { operation });
    }
    repo.fetch_upstream()?;
    let local = repo.local_tip_commit()?;
    let remote = repo.remote_tip_commit()?;
    if local != remote {
        return Ok(Verdict::OutOfSync { local, remote });
    }
    Ok(Verdict::Safe)
}

// ---------------------------------------------------------------------------
// Batch report
// ---------------------------------------------------------------------------

/// One entry of a [`SafetyReport`].
#[derive(Debug)]
pub struct RepoCheck {
    pub path: PathBuf,
    pub outcome: Result<Verdict, GitError>,
}

impl RepoCheck {
    pub fn is_safe(&self) -> bool {
        matches!(&self.outcome, Ok(v) if v.is_safe())
    }

    /// Human-readable reason, for safe and unsafe outcomes alike.
    pub fn reason(&self) -> String {
        match &self.outcome {
            Ok(verdict) => verdict.to_string(),
            Err(err) => format!("inspection failed: {}", err.summary()),
        }
    }
}

/// Verdicts for a whole batch, in input order.
#[derive(Debug, Default)]
pub struct SafetyReport {
    pub checks: Vec<RepoCheck>,
}

impl SafetyReport {
    /// True only when every repository is safe. An empty batch is safe.
    pub fn all_safe(&self) -> bool {
        self.checks.iter().all(RepoCheck::is_safe)
    }

    pub fn unsafe_checks(&self) -> impl Iterator<Item = &RepoCheck> {
        self.checks.iter().filter(|c| !c.is_safe())
    }
}

impl fmt::Display for SafetyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bad: Vec<String> = self
            .unsafe_checks()
            .map(|c| format!("{}: {}", c.path.display(), c.reason()))
            .collect();
        if bad.is_empty() {
            write!(f, "all {} repositories are safe", self.checks.len())
        } else {
            write!(f, "{}", bad.join("; "))
        }
    }
}

/// Inspect every repository, including those after the first failure.
pub fn check_all<H: RepoHandle>(repos: &[H], primary_branch: &str) -> SafetyReport {
    let checks = repos
        .iter()
        .map(|repo| {
            tracing::info!("checking {}", repo.path().display());
            let outcome = is_safe(repo, primary_branch);
            match &outcome {
                Ok(Verdict::Safe) => tracing::debug!("{} is safe", repo.path().display()),
                Ok(verdict) => tracing::warn!("{} is not safe: {verdict}", repo.path().display()),
                Err(err) => tracing::error!("{}: {err}", repo.path().display()),
            }
            RepoCheck {
                path: repo.path().to_path_buf(),
                outcome,
            }
        })
        .collect();
    SafetyReport { checks }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
