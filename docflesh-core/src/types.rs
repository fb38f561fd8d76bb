//! Domain types for docflesh configuration.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! Every entity that is read from disk has a `validate` function that runs
//! once, right after deserialization.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed feature name, e.g. `"mathjax"` → `features/mathjax.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureName(pub String);

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for FeatureName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for FeatureName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Top-level configuration
// ---------------------------------------------------------------------------

/// One entry of the `ManagedRepos` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedRepoEntry {
    /// Path to the repository working copy.
    pub local_path: PathBuf,
    #[serde(default)]
    pub features: Vec<FeatureName>,
}

/// Git policy and commit settings shared by every managed repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub primary_branch: String,
    pub remote: String,
    pub commit_message: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            primary_branch: "main".to_string(),
            remote: "origin".to_string(),
            commit_message: "Auto-sync config files by doc-flesh".to_string(),
        }
    }
}

/// The `config.yaml` document.
///
/// Unknown top-level keys are ignored so that a `Files:` block can be used
/// purely for YAML anchors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(rename = "ManagedRepos", default)]
    pub managed_repos: Vec<ManagedRepoEntry>,
    #[serde(rename = "Settings", default)]
    pub settings: Settings,
}

// ---------------------------------------------------------------------------
// Features
// ---------------------------------------------------------------------------

/// Boolean toggles a feature can switch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureFlags {
    pub site_uses_mathjax: bool,
    pub site_uses_precommit: bool,
}

impl FeatureFlags {
    /// Field-wise OR. A flag that is on in either side stays on.
    pub fn merge(self, other: FeatureFlags) -> FeatureFlags {
        FeatureFlags {
            site_uses_mathjax: self.site_uses_mathjax || other.site_uses_mathjax,
            site_uses_precommit: self.site_uses_precommit || other.site_uses_precommit,
        }
    }
}

/// A named, reusable bundle of files to render, files to copy and flags.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Feature {
    /// Template paths, relative to both the templates dir and the repo root.
    #[serde(default, alias = "jinja_files")]
    pub template_files: BTreeSet<PathBuf>,
    /// Static paths, relative to both the static dir and the repo root.
    #[serde(default)]
    pub static_files: BTreeSet<PathBuf>,
    #[serde(default)]
    pub flags: FeatureFlags,
}

impl Feature {
    /// Union of files, OR of flags. Associative and commutative, with
    /// `Feature::default()` as identity.
    pub fn merge(mut self, other: &Feature) -> Feature {
        self.template_files.extend(other.template_files.iter().cloned());
        self.static_files.extend(other.static_files.iter().cloned());
        self.flags = self.flags.merge(other.flags);
        self
    }

    /// Every path must be relative and stay inside the repository root.
    pub fn validate(&self) -> Result<(), String> {
        for path in self.template_files.iter().chain(self.static_files.iter()) {
            validate_manifest_path(path)?;
        }
        Ok(())
    }

    /// Drop `.` components so `./mkdocs.yaml` and `mkdocs.yaml` are one entry.
    pub fn normalized(self) -> Feature {
        fn strip(paths: BTreeSet<PathBuf>) -> BTreeSet<PathBuf> {
            paths
                .into_iter()
                .map(|p| p.components().filter(|c| *c != Component::CurDir).collect())
                .collect()
        }
        Feature {
            template_files: strip(self.template_files),
            static_files: strip(self.static_files),
            flags: self.flags,
        }
    }
}

fn validate_manifest_path(path: &Path) -> Result<(), String> {
    if path.as_os_str().is_empty() {
        return Err("empty file path".to_string());
    }
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => {
                return Err(format!("'{}' escapes the repository root", path.display()))
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(format!("'{}' must be a relative path", path.display()))
            }
        }
    }
    if !path.components().any(|c| matches!(c, Component::Normal(_))) {
        return Err(format!("'{}' does not name a file", path.display()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Site metadata
// ---------------------------------------------------------------------------

/// Closed set of site categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SiteCategory {
    #[serde(rename = "Learning tools")]
    LearningTools,
    #[serde(rename = "Study materials")]
    StudyMaterials,
    #[serde(rename = "Templates")]
    Templates,
    #[serde(rename = "Inactive")]
    Inactive,
}

impl SiteCategory {
    /// All categories in display order.
    pub fn all() -> &'static [SiteCategory] {
        &[
            SiteCategory::LearningTools,
            SiteCategory::StudyMaterials,
            SiteCategory::Templates,
            SiteCategory::Inactive,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SiteCategory::LearningTools => "Learning tools",
            SiteCategory::StudyMaterials => "Study materials",
            SiteCategory::Templates => "Templates",
            SiteCategory::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for SiteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contents of a repository's `siteinfo.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteMetadata {
    pub site_name: String,
    pub site_name_slug: String,
    pub category: SiteCategory,
    /// Markdown link of the form `[text](url)`; empty or absent means none.
    #[serde(default)]
    pub related_repo: Option<String>,
    #[serde(default)]
    pub site_uses_mathjax: bool,
    #[serde(default)]
    pub site_uses_precommit: bool,
}

impl SiteMetadata {
    /// Stand-in used when a repository has no `siteinfo.json`.
    pub fn placeholder() -> Self {
        Self {
            site_name: String::new(),
            site_name_slug: String::new(),
            category: SiteCategory::Inactive,
            related_repo: None,
            site_uses_mathjax: false,
            site_uses_precommit: false,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(link) = self.related_repo.as_deref() {
            if !link.is_empty() && !markdown_link_re().is_match(link) {
                return Err(format!(
                    "related_repo must be a Markdown link like [text](url), got '{link}'"
                ));
            }
        }
        Ok(())
    }

    /// `related_repo` with `None` flattened to the empty string.
    pub fn related_repo_or_empty(&self) -> &str {
        self.related_repo.as_deref().unwrap_or("")
    }
}

fn markdown_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[[^\[\]]+\]\([^()\s]+\)$").expect("static regex"))
}

/// Where a [`ResolvedRepoConfig`]'s metadata came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataSource {
    /// Parsed from the repository's `siteinfo.json`.
    Found,
    /// The file was absent and the placeholder was substituted.
    Defaulted,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Effective configuration for one managed repository.
///
/// File lists are sorted and deduplicated. The value is never mutated after
/// construction; [`ResolvedRepoConfig::with_local_path`] returns a copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRepoConfig {
    pub local_path: PathBuf,
    pub template_files: Vec<PathBuf>,
    pub static_files: Vec<PathBuf>,
    pub flags: FeatureFlags,
    pub siteinfo: SiteMetadata,
    pub siteinfo_source: MetadataSource,
}

impl ResolvedRepoConfig {
    /// Build from a merged feature plus metadata.
    pub fn new(
        local_path: PathBuf,
        merged: Feature,
        siteinfo: SiteMetadata,
        siteinfo_source: MetadataSource,
    ) -> Self {
        Self {
            local_path,
            template_files: merged.template_files.into_iter().collect(),
            static_files: merged.static_files.into_iter().collect(),
            flags: merged.flags,
            siteinfo,
            siteinfo_source,
        }
    }

    /// Last normal component of `local_path`, used for display and sandboxing.
    ///
    /// Always a single path component; `"repo"` when the path has none
    /// (`/`, `..`).
    pub fn repo_name(&self) -> String {
        self.local_path
            .components()
            .rev()
            .find_map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .unwrap_or_else(|| "repo".to_string())
    }

    /// Same configuration rooted somewhere else (dry-run sandbox).
    pub fn with_local_path(&self, local_path: PathBuf) -> Self {
        Self {
            local_path,
            ..self.clone()
        }
    }

    /// Every manifest path (templates then static files), relative to the repo root.
    pub fn manifest_paths(&self) -> Vec<PathBuf> {
        self.template_files
            .iter()
            .chain(self.static_files.iter())
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.template_files.is_empty() && self.static_files.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
