//! Python lock file upgrades for `docflesh update-deps`.

use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Command;

use crate::error::SyncError;

/// Tool run in every repository.
pub const UV_PROGRAM: &str = "uv";

/// Run `<program> lock --upgrade` in each directory, in order.
///
/// Stops at the first failure, whether the tool exits non-zero or cannot be
/// found. Returns the number of directories upgraded.
pub fn upgrade_lockfiles_with<P: AsRef<OsStr>>(program: P, dirs: &[PathBuf]) -> Result<usize, SyncError> {
    let program = program.as_ref();
    let name = program.to_string_lossy().into_owned();
    for (done, dir) in dirs.iter().enumerate() {
        tracing::info!("upgrading lock file in {}", dir.display());
        let status = match Command::new(program)
            .args(["lock", "--upgrade"])
            .current_dir(dir)
            .status()
        {
            Ok(status) => status,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::error!("'{name}' command not found after {done} repositories");
                return Err(SyncError::ToolNotFound { program: name });
            }
            Err(e) => {
                return Err(SyncError::Io {
                    path: dir.clone(),
                    source: e,
                })
            }
        };
        if !status.success() {
            return Err(SyncError::LockUpgrade {
                program: name,
                path: dir.clone(),
                status: status.to_string(),
            });
        }
    }
    Ok(dirs.len())
}

/// [`upgrade_lockfiles_with`] using `uv` from `PATH`.
pub fn upgrade_lockfiles(dirs: &[PathBuf]) -> Result<usize, SyncError> {
    upgrade_lockfiles_with(UV_PROGRAM, dirs)
}
