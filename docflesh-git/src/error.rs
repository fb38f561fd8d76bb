//! Error types for docflesh-git.

use std::path::PathBuf;

use thiserror::Error;

/// Failures while driving the `git` binary.
#[derive(Debug, Error)]
pub enum GitError {
    /// `git` could not be started at all (not installed, not on `PATH`, ...).
    #[error("failed to run `git {command}` in {path}: {source}")]
    Spawn {
        command: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `git` ran and exited unsuccessfully.
    #[error("`git {command}` failed in {path}: {stderr}")]
    Command {
        command: String,
        path: PathBuf,
        stderr: String,
    },

    /// `git` succeeded but printed something we cannot interpret.
    #[error("unexpected output from `git {command}` in {path}: {output:?}")]
    UnexpectedOutput {
        command: String,
        path: PathBuf,
        output: String,
    },
}

impl GitError {
    /// Short form for single-line reports.
    pub fn summary(&self) -> String {
        match self {
            GitError::Spawn { command, source, .. } => format!("cannot run git {command}: {source}"),
            GitError::Command { command, stderr, .. } => {
                let first = stderr.lines().next().unwrap_or("").trim();
                format!("git {command} failed: {first}")
            }
            GitError::UnexpectedOutput { command, .. } => format!("unexpected output from git {command}"),
        }
    }
}
