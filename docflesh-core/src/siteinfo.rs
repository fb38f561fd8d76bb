//! Per-repository `siteinfo.json` handling.
//!
//! Loading distinguishes three outcomes that callers must treat differently:
//! a valid file, an absent file (placeholder substituted), and a present but
//! malformed file (configuration error).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{io_err, ConfigError};
use crate::types::{MetadataSource, SiteCategory, SiteMetadata};

/// File name looked up in every managed repository root.
pub const SITEINFO_FILE: &str = "siteinfo.json";

/// Outcome of [`load_at`].
#[derive(Debug)]
pub enum SiteInfoLoad {
    /// The file exists and passed validation.
    Found(SiteMetadata),
    /// The file does not exist; carries [`SiteMetadata::placeholder`].
    DefaultedMissing(SiteMetadata),
    /// The file exists but could not be read, parsed or validated.
    Invalid(ConfigError),
}

impl SiteInfoLoad {
    /// Collapse into a `Result`, keeping track of whether the value was defaulted.
    pub fn into_result(self) -> Result<(SiteMetadata, MetadataSource), ConfigError> {
        match self {
            SiteInfoLoad::Found(info) => Ok((info, MetadataSource::Found)),
            SiteInfoLoad::DefaultedMissing(info) => Ok((info, MetadataSource::Defaulted)),
            SiteInfoLoad::Invalid(err) => Err(err),
        }
    }
}

/// `<repo_dir>/siteinfo.json`. Pure, no I/O.
pub fn siteinfo_path(repo_dir: &Path) -> PathBuf {
    repo_dir.join(SITEINFO_FILE)
}

/// Load and validate `<repo_dir>/siteinfo.json`.
pub fn load_at(repo_dir: &Path) -> SiteInfoLoad {
    let path = siteinfo_path(repo_dir);
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!("no {SITEINFO_FILE} in {}, using defaults", repo_dir.display());
            return SiteInfoLoad::DefaultedMissing(SiteMetadata::placeholder());
        }
        Err(e) => return SiteInfoLoad::Invalid(io_err(&path, e)),
    };

    let info: SiteMetadata = match serde_json::from_str(&contents) {
        Ok(info) => info,
        Err(e) => {
            return SiteInfoLoad::Invalid(ConfigError::InvalidSiteInfo {
                path,
                reason: e.to_string(),
            })
        }
    };
    match info.validate() {
        Ok(()) => SiteInfoLoad::Found(info),
        Err(reason) => SiteInfoLoad::Invalid(ConfigError::InvalidSiteInfo { path, reason }),
    }
}

/// Starting values for the interactive siteinfo generator.
///
/// Reads whatever is present in `<dir>/siteinfo.json` without validating it,
/// filling missing fields with defaults. The slug defaults to the directory
/// name, which is usually the repository name used in the site URL.
pub fn draft_at(dir: &Path) -> Result<SiteMetadata, ConfigError> {
    let path = siteinfo_path(dir);
    let default_slug = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let existing: Map<String, Value> = match std::fs::read_to_string(&path) {
        Ok(contents) => match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Err(ConfigError::InvalidSiteInfo {
                    path,
                    reason: "expected a JSON object".to_string(),
                })
            }
            Err(e) => {
                return Err(ConfigError::InvalidSiteInfo {
                    path,
                    reason: e.to_string(),
                })
            }
        },
        Err(e) if e.kind() == ErrorKind::NotFound => Map::new(),
        Err(e) => return Err(io_err(&path, e)),
    };

    let text = |key: &str| existing.get(key).and_then(Value::as_str).map(str::to_string);
    let flag = |key: &str| existing.get(key).and_then(Value::as_bool).unwrap_or(false);

    let category = existing
        .get("category")
        .cloned()
        .and_then(|v| serde_json::from_value::<SiteCategory>(v).ok())
        .unwrap_or(SiteCategory::LearningTools);

    Ok(SiteMetadata {
        site_name: text("site_name").unwrap_or_default(),
        site_name_slug: text("site_name_slug").unwrap_or(default_slug),
        category,
        related_repo: Some(text("related_repo").unwrap_or_default()),
        site_uses_mathjax: flag("site_uses_mathjax"),
        site_uses_precommit: flag("site_uses_precommit"),
    })
}

/// Validate and write `info` to `<dir>/siteinfo.json` (pretty JSON).
pub fn save_at(dir: &Path, info: &SiteMetadata) -> Result<PathBuf, ConfigError> {
    let path = siteinfo_path(dir);
    info.validate().map_err(|reason| ConfigError::InvalidSiteInfo {
        path: path.clone(),
        reason,
    })?;
    let json = serde_json::to_string_pretty(info)?;
    std::fs::write(&path, json).map_err(|e| io_err(&path, e))?;
    Ok(path)
}
