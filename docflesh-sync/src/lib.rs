//! # docflesh-sync
//!
//! Content-gated atomic writer and the sync pipeline.
//!
//! Call [`sync`] to gate every managed repository on the safety checker and
//! then render, copy, stage, commit and push. [`diff_repo`] previews the same
//! writes, [`upgrade_lockfiles`] refreshes Python lock files.

pub mod diff;
pub mod error;
pub mod lockfile;
pub mod pipeline;
pub mod sandbox;
pub mod writer;

pub use diff::{diff_repo, FileDiff, RepoDiff};
pub use error::SyncError;
pub use lockfile::{upgrade_lockfiles, upgrade_lockfiles_with};
pub use pipeline::{sync, RepoOutcome, RepoSyncResult, SyncOptions, SyncReport};
pub use sandbox::Sandbox;
pub use writer::{copy_file, write_text, WriteResult};
