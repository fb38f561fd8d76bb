//! Content-gated atomic writer.
//!
//! ## `write_file` protocol
//!
//! 1. Normalise CRLF to LF (text outputs only).
//! 2. SHA-256 hash the new content and the file currently on disk.
//! 3. Identical hashes: leave the file alone, report `Unchanged`.
//! 4. Make an existing destination writable again.
//! 5. Write to `<path>.docflesh.tmp`, then rename onto the final path.
//! 6. Mark the result read-only so hand edits in managed repos stand out.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{io_err, SyncError};

// ---------------------------------------------------------------------------
// Write result
// ---------------------------------------------------------------------------

/// What happened to one manifest output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// New or changed content reached disk.
    Written { path: PathBuf },
    /// File was skipped; content on disk already matches.
    Unchanged { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path } | WriteResult::Unchanged { path } => path,
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, WriteResult::Written { .. })
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Write rendered text to `path`.
pub fn write_text(path: &Path, content: &str) -> Result<WriteResult, SyncError> {
    let normalized = normalize_line_endings(content);
    write_file(path, normalized.as_bytes())
}

/// Copy `src` to `dest` byte for byte.
pub fn copy_file(src: &Path, dest: &Path) -> Result<WriteResult, SyncError> {
    let bytes = match std::fs::read(src) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(SyncError::StaticNotFound {
                path: src.to_path_buf(),
            })
        }
        Err(e) => return Err(io_err(src, e)),
    };
    write_file(dest, &bytes)
}

pub(crate) fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

fn write_file(path: &Path, bytes: &[u8]) -> Result<WriteResult, SyncError> {
    let tmp = PathBuf::from(format!("{}.docflesh.tmp", path.display()));
    write_file_with_tmp(path, bytes, &tmp)
}

fn write_file_with_tmp(path: &Path, bytes: &[u8], tmp: &Path) -> Result<WriteResult, SyncError> {
    let existing = match std::fs::read(path) {
        Ok(existing) => Some(existing),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => return Err(io_err(path, e)),
    };

    if let Some(existing) = &existing {
        if sha256_hex(existing) == sha256_hex(bytes) {
            tracing::debug!("{} already up to date", path.display());
            set_read_only(path)?;
            return Ok(WriteResult::Unchanged {
                path: path.to_path_buf(),
            });
        }
        set_writable(path)?;
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    if let Some(tmp_parent) = tmp.parent() {
        std::fs::create_dir_all(tmp_parent).map_err(|e| io_err(tmp_parent, e))?;
    }
    std::fs::write(tmp, bytes).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }
    set_read_only(path)?;

    tracing::info!("updated {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

fn set_read_only(path: &Path) -> Result<(), SyncError> {
    let mut perms = std::fs::metadata(path).map_err(|e| io_err(path, e))?.permissions();
    if perms.readonly() {
        return Ok(());
    }
    perms.set_readonly(true);
    std::fs::set_permissions(path, perms).map_err(|e| io_err(path, e))
}

#[cfg(unix)]
fn set_writable(path: &Path) -> Result<(), SyncError> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path).map_err(|e| io_err(path, e))?.permissions();
    perms.set_mode(perms.mode() | 0o200);
    std::fs::set_permissions(path, perms).map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
#[allow(clippy::permissions_set_readonly_false)]
fn set_writable(path: &Path) -> Result<(), SyncError> {
    let mut perms = std::fs::metadata(path).map_err(|e| io_err(path, e))?.permissions();
    perms.set_readonly(false);
    std::fs::set_permissions(path, perms).map_err(|e| io_err(path, e))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn first_write_returns_written() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mkdocs.yaml");
        let result = write_text(&path, "site_name: x\n").unwrap();
        assert!(result.is_written());
        assert_eq!(fs::read_to_string(&path).unwrap(), "site_name: x\n");
    }

    #[test]
    fn output_is_read_only() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mkdocs.yaml");
        write_text(&path, "a").unwrap();
        assert!(fs::metadata(&path).unwrap().permissions().readonly());
    }

    #[test]
    fn read_only_output_can_be_overwritten() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mkdocs.yaml");
        write_text(&path, "v1").unwrap();
        let result = write_text(&path, "v2").unwrap();
        assert!(result.is_written());
        assert_eq!(fs::read_to_string(&path).unwrap(), "v2");
        assert!(fs::metadata(&path).unwrap().permissions().readonly());
    }

    #[test]
    fn same_content_is_unchanged_and_keeps_mtime() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("file.md");
        write_text(&path, "same content").unwrap();
        let old = FileTime::from_unix_time(1_000_000_000, 0);
        filetime::set_file_mtime(&path, old).unwrap();

        let result = write_text(&path, "same content").unwrap();
        assert_eq!(result, WriteResult::Unchanged { path: path.clone() });
        let mtime = FileTime::from_last_modification_time(&fs::metadata(&path).unwrap());
        assert_eq!(mtime, old, "unchanged file must not be rewritten");
    }

    #[test]
    fn crlf_and_lf_content_share_the_same_hash() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("normalize.md");
        assert!(write_text(&path, "line1\r\nline2\r\n").unwrap().is_written());
        assert!(!write_text(&path, "line1\nline2\n").unwrap().is_written());
        assert_eq!(fs::read_to_string(&path).unwrap(), "line1\nline2\n");
    }

    #[test]
    fn creates_parent_directories_and_cleans_tmp() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".github").join("workflows").join("deploy.yaml");
        write_text(&path, "on: push\n").unwrap();
        assert!(path.exists());
        let tmp_path = PathBuf::from(format!("{}.docflesh.tmp", path.display()));
        assert!(!tmp_path.exists(), ".docflesh.tmp must be cleaned up");
    }

    #[test]
    fn copy_preserves_bytes() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("logo.png");
        let bytes = [0x89u8, b'P', b'N', b'G', b'\r', b'\n', 0x00, 0xff];
        fs::write(&src, bytes).unwrap();
        let dest = tmp.path().join("repo").join("docs").join("logo.png");
        assert!(copy_file(&src, &dest).unwrap().is_written());
        assert_eq!(fs::read(&dest).unwrap(), bytes);
        assert!(!copy_file(&src, &dest).unwrap().is_written());
    }

    #[test]
    fn copy_of_missing_source_is_static_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = copy_file(&tmp.path().join("nope.js"), &tmp.path().join("out.js")).unwrap_err();
        assert!(matches!(err, SyncError::StaticNotFound { .. }), "got: {err}");
    }

    #[test]
    fn sha256_is_hex_encoded() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    #[cfg(unix)]
    fn rename_failure_leaves_original_and_cleans_tmp() {
        use std::os::unix::fs::PermissionsExt;

        let root = TempDir::new().unwrap();
        let readonly_dir = root.path().join("readonly");
        fs::create_dir_all(&readonly_dir).unwrap();
        let path = readonly_dir.join("file.md");
        fs::write(&path, "original").unwrap();

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o555);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        let tmp_dir = TempDir::new().unwrap();
        let tmp_path = tmp_dir.path().join("file.md.docflesh.tmp");
        let result = write_file_with_tmp(&path, b"new content", &tmp_path);

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        // Running as root bypasses directory permissions.
        if result.is_err() {
            assert_eq!(fs::read_to_string(&path).unwrap(), "original");
            assert!(!tmp_path.exists(), ".docflesh.tmp should be cleaned up");
        }
    }
}
