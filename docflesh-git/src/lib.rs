//! # docflesh-git
//!
//! Repository handles over the system `git` binary and the safety gate that
//! decides whether a working copy may be rewritten and auto-committed.

pub mod error;
pub mod repo;
pub mod safety;

pub use error::GitError;
pub use repo::{CommitOutcome, GitOperation, GitRepo, RepoHandle};
pub use safety::{check_all, is_safe, RepoCheck, SafetyReport, Verdict};
