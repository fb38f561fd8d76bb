//! Unified diffs for `docflesh diff`: what `sync` would change, without
//! writing anything.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use similar::TextDiff;

use docflesh_core::ResolvedRepoConfig;
use docflesh_renderer::{TemplateEngine, TemplateVariables};

use crate::error::{io_err, SyncError};
use crate::writer::normalize_line_endings;

/// A single file diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    /// Manifest-relative path.
    pub path: PathBuf,
    pub unified_diff: String,
}

/// Diff result for a repository. Empty `diffs` means in sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoDiff {
    pub local_path: PathBuf,
    pub diffs: Vec<FileDiff>,
}

/// Compare rendered templates and static sources with what is on disk.
pub fn diff_repo(
    repo: &ResolvedRepoConfig,
    engine: &TemplateEngine,
    static_dir: &Path,
) -> Result<RepoDiff, SyncError> {
    let mut diffs = Vec::new();

    let vars = TemplateVariables::from_config(repo);
    for (rel, rendered) in engine.render_manifest(repo, &vars)? {
        let rendered = normalize_line_endings(&rendered).into_bytes();
        let existing = read_existing_or_empty(&repo.local_path.join(&rel))?;
        let existing = match String::from_utf8(existing) {
            Ok(text) => normalize_line_endings(&text).into_bytes(),
            Err(raw) => raw.into_bytes(),
        };
        if let Some(d) = file_diff(&rel, &existing, &rendered) {
            diffs.push(d);
        }
    }

    for rel in &repo.static_files {
        let src = static_dir.join(rel);
        let wanted = match std::fs::read(&src) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SyncError::StaticNotFound { path: src })
            }
            Err(e) => return Err(io_err(&src, e)),
        };
        let existing = read_existing_or_empty(&repo.local_path.join(rel))?;
        if let Some(d) = file_diff(rel, &existing, &wanted) {
            diffs.push(d);
        }
    }

    Ok(RepoDiff {
        local_path: repo.local_path.clone(),
        diffs,
    })
}

fn file_diff(rel: &Path, existing: &[u8], wanted: &[u8]) -> Option<FileDiff> {
    if existing == wanted {
        return None;
    }
    let old_header = format!("a/{}", rel.display());
    let new_header = format!("b/{}", rel.display());
    let unified = match (std::str::from_utf8(existing), std::str::from_utf8(wanted)) {
        (Ok(old), Ok(new)) => TextDiff::from_lines(old, new)
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string(),
        _ => format!("Binary files {old_header} and {new_header} differ\n"),
    };
    Some(FileDiff {
        path: rel.to_path_buf(),
        unified_diff: unified,
    })
}

fn read_existing_or_empty(path: &Path) -> Result<Vec<u8>, SyncError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        Err(err) => Err(io_err(path, err)),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use docflesh_core::{Feature, MetadataSource, SiteCategory, SiteMetadata};
    use tempfile::TempDir;

    use super::*;

    fn setup() -> (TempDir, ResolvedRepoConfig, TemplateEngine) {
        let tmp = TempDir::new().expect("tmp");
        let repo_dir = tmp.path().join("site");
        fs::create_dir_all(&repo_dir).unwrap();
        fs::create_dir_all(tmp.path().join("static/docs")).unwrap();
        fs::write(tmp.path().join("static/docs/mathjax.js"), "window.MathJax = {};\n").unwrap();

        let merged = Feature {
            template_files: [PathBuf::from("mkdocs.yaml")].into_iter().collect(),
            static_files: [PathBuf::from("docs/mathjax.js")].into_iter().collect(),
            ..Feature::default()
        };
        let info = SiteMetadata {
            site_name: "Geometry".to_string(),
            site_name_slug: "geometry".to_string(),
            category: SiteCategory::LearningTools,
            related_repo: None,
            site_uses_mathjax: false,
            site_uses_precommit: false,
        };
        let repo = ResolvedRepoConfig::new(repo_dir, merged, info, MetadataSource::Found);
        let engine = TemplateEngine::from_raw([("mkdocs.yaml", "site_name: {{ site_name }}\n")]).unwrap();
        (tmp, repo, engine)
    }

    #[test]
    fn missing_files_show_as_additions() {
        let (tmp, repo, engine) = setup();
        let diff = diff_repo(&repo, &engine, &tmp.path().join("static")).expect("diff");
        assert_eq!(diff.diffs.len(), 2);
        let mkdocs = &diff.diffs[0];
        assert!(mkdocs.unified_diff.contains("--- a/mkdocs.yaml"));
        assert!(mkdocs.unified_diff.contains("+site_name: Geometry"));
        assert!(!repo.local_path.join("mkdocs.yaml").exists(), "diff must not write");
    }

    #[test]
    fn in_sync_repo_has_no_diffs() {
        let (tmp, repo, engine) = setup();
        fs::write(repo.local_path.join("mkdocs.yaml"), "site_name: Geometry\r\n").unwrap();
        fs::create_dir_all(repo.local_path.join("docs")).unwrap();
        fs::write(repo.local_path.join("docs/mathjax.js"), "window.MathJax = {};\n").unwrap();
        let diff = diff_repo(&repo, &engine, &tmp.path().join("static")).unwrap();
        assert!(diff.diffs.is_empty(), "unexpected diffs: {:?}", diff.diffs);
    }

    #[test]
    fn local_edit_produces_hunk() {
        let (tmp, repo, engine) = setup();
        fs::write(repo.local_path.join("mkdocs.yaml"), "site_name: Hand edited\n").unwrap();
        let diff = diff_repo(&repo, &engine, &tmp.path().join("static")).unwrap();
        let mkdocs = diff.diffs.iter().find(|d| d.path == Path::new("mkdocs.yaml")).unwrap();
        assert!(mkdocs.unified_diff.contains("@@"));
        assert!(mkdocs.unified_diff.contains("-site_name: Hand edited"));
    }

    #[test]
    fn binary_difference_is_summarised() {
        let d = file_diff(Path::new("logo.png"), &[0xff, 0x00], &[0xfe]).unwrap();
        assert_eq!(d.unified_diff, "Binary files a/logo.png and b/logo.png differ\n");
    }
}
