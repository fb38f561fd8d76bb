//! Dry-run sandbox: a scratch directory that stands in for every managed
//! repository so rendered output can be inspected without touching git.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use docflesh_core::ResolvedRepoConfig;

use crate::error::{io_err, SyncError};

/// Root directory receiving one subdirectory per relocated repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sandbox {
    root: PathBuf,
}

impl Sandbox {
    /// Fresh directory under the system temp dir. It is kept after the run.
    pub fn create() -> Result<Self, SyncError> {
        let dir = tempfile::Builder::new()
            .prefix("docflesh-dry-run-")
            .tempdir()
            .map_err(|e| io_err(std::env::temp_dir(), e))?;
        Ok(Self { root: dir.keep() })
    }

    /// Use an existing directory as sandbox root.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Copies of `repos` rooted at `<sandbox>/<repo dir name>`.
    ///
    /// Repeated names get `-2`, `-3`, ... so two repositories never share a
    /// target. Each target is a direct child of the sandbox root, whatever
    /// shape `local_path` has. Target directories are created.
    pub fn relocate(&self, repos: &[ResolvedRepoConfig]) -> Result<Vec<ResolvedRepoConfig>, SyncError> {
        let mut taken = HashSet::new();
        let mut relocated = Vec::with_capacity(repos.len());
        for repo in repos {
            let base = repo.repo_name();
            let mut name = base.clone();
            let mut n = 2;
            while !taken.insert(name.clone()) {
                name = format!("{base}-{n}");
                n += 1;
            }
            let target = self.root.join(&name);
            std::fs::create_dir_all(&target).map_err(|e| io_err(&target, e))?;
            tracing::debug!("{} -> {}", repo.local_path.display(), target.display());
            relocated.push(repo.with_local_path(target));
        }
        Ok(relocated)
    }
}
