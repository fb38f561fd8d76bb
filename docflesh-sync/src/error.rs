//! Error types for docflesh-sync.

use std::path::PathBuf;

use thiserror::Error;

use docflesh_core::ConfigError;
use docflesh_git::{GitError, SafetyReport};
use docflesh_renderer::RenderError;

/// All errors that can arise from sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from the rendering engine.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("git error: {0}")]
    Git(#[from] GitError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The safety gate rejected at least one repository; nothing was written.
    #[error("safety check failed: {report}")]
    Unsafe { report: SafetyReport },

    /// Repositories without `siteinfo.json` that would render templates.
    #[error("siteinfo.json missing for repositories with templates: {}", display_paths(.repos))]
    PlaceholderMetadata { repos: Vec<PathBuf> },

    /// A manifest static file has no source under the static directory.
    #[error("static file not found: {path}")]
    StaticNotFound { path: PathBuf },

    /// The lock upgrade tool is not installed.
    #[error("'{program}' command not found; please install it")]
    ToolNotFound { program: String },

    /// The lock upgrade tool exited unsuccessfully.
    #[error("'{program} lock --upgrade' failed in {path} ({status})")]
    LockUpgrade {
        program: String,
        path: PathBuf,
        status: String,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
