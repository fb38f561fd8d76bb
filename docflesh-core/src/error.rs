//! Error types for docflesh-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading and resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure, annotated with the path being read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load, with file path and serde_yaml line context.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// JSON serialization error (siteinfo write path).
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The top-level configuration file did not exist.
    #[error("config file not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// One or more declared `local_path` entries do not exist on disk.
    #[error("local paths do not exist: {}", display_paths(.paths))]
    MissingLocalPaths { paths: Vec<PathBuf> },

    /// A managed repository references a feature with no definition file.
    #[error("feature '{name}' is not defined (expected {path})")]
    FeatureNotFound { name: String, path: PathBuf },

    /// A feature definition parsed but failed validation.
    #[error("invalid feature '{name}': {reason}")]
    InvalidFeature { name: String, reason: String },

    /// The same path is declared both as a template and as a static file.
    #[error("{path} is both a template and a static file for {repo}")]
    ManifestConflict { repo: PathBuf, path: PathBuf },

    /// `siteinfo.json` exists but is malformed or fails validation.
    #[error("invalid siteinfo at {path}: {reason}")]
    InvalidSiteInfo { path: PathBuf, reason: String },

    /// `dirs::home_dir()` returned `None`, so `~/.config/doc-flesh/` cannot be located.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

/// Convenience constructor for [`ConfigError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_paths_are_all_listed() {
        let err = ConfigError::MissingLocalPaths {
            paths: vec![PathBuf::from("/code/a"), PathBuf::from("/code/b")],
        };
        let msg = err.to_string();
        assert!(msg.contains("/code/a"));
        assert!(msg.contains("/code/b"));
    }

    #[test]
    fn home_not_found_error_message() {
        assert!(ConfigError::HomeNotFound.to_string().contains("home directory"));
    }
}
