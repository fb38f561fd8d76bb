//! Top-level configuration loading.
//!
//! # Storage layout
//!
//! ```text
//! ~/.config/doc-flesh/
//!   config.yaml            (ManagedRepos + optional Settings)
//!   features/<name>.yaml   (one file per feature)
//!   templates/...          (Tera templates, addressed by manifest path)
//!   static/...             (copied verbatim, addressed by manifest path)
//! ```
//!
//! Loaders take the config file path explicitly (`*_at`). Only the binary
//! asks for the default under the home directory, through
//! [`default_config_path`].

use std::path::{Path, PathBuf};

use crate::error::{io_err, ConfigError};
use crate::features::{resolve, FeatureDir};
use crate::types::{ConfigFile, ResolvedRepoConfig, Settings};

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// Locations derived from the config file's directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLayout {
    config_file: PathBuf,
    root: PathBuf,
}

impl ConfigLayout {
    pub fn from_config_file(config_file: impl Into<PathBuf>) -> Self {
        let config_file = config_file.into();
        let root = config_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self { config_file, root }
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn features_dir(&self) -> PathBuf {
        self.root.join("features")
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.root.join("templates")
    }

    pub fn static_dir(&self) -> PathBuf {
        self.root.join("static")
    }
}

/// `<home>/.config/doc-flesh/config.yaml`. Pure, no I/O.
pub fn default_config_path_at(home: &Path) -> PathBuf {
    home.join(".config").join("doc-flesh").join("config.yaml")
}

/// `default_config_path_at` convenience wrapper.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    Ok(default_config_path_at(&home()?))
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Everything a run needs: where things live, shared settings, and one
/// resolved configuration per managed repository (in declaration order).
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub layout: ConfigLayout,
    pub settings: Settings,
    pub repos: Vec<ResolvedRepoConfig>,
}

/// Parse `config.yaml` without resolving features.
///
/// `~` in `local_path` is expanded; relative paths are resolved against the
/// directory holding the config file. Returns `ConfigError::ConfigNotFound`
/// if absent, `ConfigError::Parse` (with path + line context) if malformed.
pub fn read_config_file_at(path: &Path) -> Result<ConfigFile, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let mut file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;

    let base = path.parent().unwrap_or(Path::new("."));
    let home = dirs::home_dir();
    for entry in &mut file.managed_repos {
        entry.local_path = expand_local_path(&entry.local_path, base, home.as_deref());
    }
    Ok(file)
}

/// Load `config.yaml`, check every declared path exists, and resolve each
/// managed repository.
///
/// Missing paths are collected and reported together before any feature is
/// loaded. Existing paths are canonicalized.
pub fn load_config_at(path: &Path) -> Result<LoadedConfig, ConfigError> {
    let layout = ConfigLayout::from_config_file(path);
    let file = read_config_file_at(path)?;

    let missing: Vec<PathBuf> = file
        .managed_repos
        .iter()
        .filter(|entry| !entry.local_path.exists())
        .map(|entry| entry.local_path.clone())
        .collect();
    if !missing.is_empty() {
        for p in &missing {
            tracing::error!("local path {} does not exist", p.display());
        }
        return Err(ConfigError::MissingLocalPaths { paths: missing });
    }

    // `..`, symlinks and relative segments would otherwise leak into repo names.
    let entries = file
        .managed_repos
        .into_iter()
        .map(|mut entry| {
            entry.local_path = std::fs::canonicalize(&entry.local_path)
                .map_err(|e| io_err(&entry.local_path, e))?;
            Ok(entry)
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    let mut features = FeatureDir::new(layout.features_dir());
    let repos = entries
        .iter()
        .map(|entry| resolve(entry, &mut features))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(LoadedConfig {
        layout,
        settings: file.settings,
        repos,
    })
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

fn expand_local_path(raw: &Path, base: &Path, home: Option<&Path>) -> PathBuf {
    let expanded = match (raw.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => raw.to_path_buf(),
    };
    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_path_is_under_dot_config() {
        let path = default_config_path_at(Path::new("/home/ada"));
        assert_eq!(path, PathBuf::from("/home/ada/.config/doc-flesh/config.yaml"));
    }

    #[test]
    fn layout_dirs_are_siblings_of_config_file() {
        let layout = ConfigLayout::from_config_file("/etc/df/config.yaml");
        assert_eq!(layout.features_dir(), PathBuf::from("/etc/df/features"));
        assert_eq!(layout.templates_dir(), PathBuf::from("/etc/df/templates"));
        assert_eq!(layout.static_dir(), PathBuf::from("/etc/df/static"));
    }

    #[test]
    fn tilde_and_relative_paths_are_expanded() {
        let base = Path::new("/etc/df");
        let home = Path::new("/home/ada");
        assert_eq!(
            expand_local_path(Path::new("~/Code/site"), base, Some(home)),
            PathBuf::from("/home/ada/Code/site")
        );
        assert_eq!(
            expand_local_path(Path::new("../sites/a"), base, Some(home)),
            PathBuf::from("/etc/df/../sites/a")
        );
        assert_eq!(
            expand_local_path(Path::new("/abs/site"), base, Some(home)),
            PathBuf::from("/abs/site")
        );
    }

    #[test]
    fn missing_config_file_returns_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = load_config_at(&tmp.path().join("config.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigNotFound { .. }));
    }

    #[test]
    fn parent_dir_local_path_is_canonicalized() {
        let tmp = TempDir::new().unwrap();
        let cfg_dir = tmp.path().join("site").join("config");
        std::fs::create_dir_all(&cfg_dir).unwrap();
        let path = cfg_dir.join("config.yaml");
        std::fs::write(&path, "ManagedRepos:\n  - local_path: ..\n").unwrap();

        let loaded = load_config_at(&path).unwrap();
        let local = &loaded.repos[0].local_path;
        assert_eq!(local, &tmp.path().join("site").canonicalize().unwrap());
        assert_eq!(loaded.repos[0].repo_name(), "site");
    }

    #[test]
    fn settings_default_when_omitted() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "ManagedRepos: []\n").unwrap();
        let file = read_config_file_at(&path).unwrap();
        assert_eq!(file.settings, Settings::default());
        assert_eq!(file.settings.primary_branch, "main");
        assert_eq!(file.settings.remote, "origin");
    }
}
