//! Feature loading and resolution.
//!
//! A managed repository lists feature names; each name maps to
//! `<config dir>/features/<name>.yaml`. Resolution folds the features in
//! listed order with [`Feature::merge`] and attaches the repository's
//! `siteinfo.json`.

use std::collections::BTreeMap;
use std::collections::hash_map::{self, HashMap};
use std::path::{Path, PathBuf};

use crate::error::{io_err, ConfigError};
use crate::siteinfo;
use crate::types::{Feature, FeatureName, ManagedRepoEntry, ResolvedRepoConfig};

/// Anything that can hand out feature definitions by name.
pub trait FeatureSource {
    /// Return the definition for `name`, or [`ConfigError::FeatureNotFound`].
    fn feature(&mut self, name: &FeatureName) -> Result<&Feature, ConfigError>;
}

/// Feature definitions on disk, parsed lazily and cached per name.
#[derive(Debug)]
pub struct FeatureDir {
    dir: PathBuf,
    cache: HashMap<FeatureName, Feature>,
}

impl FeatureDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: HashMap::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of distinct features parsed so far.
    pub fn loaded_count(&self) -> usize {
        self.cache.len()
    }
}

impl FeatureSource for FeatureDir {
    fn feature(&mut self, name: &FeatureName) -> Result<&Feature, ConfigError> {
        match self.cache.entry(name.clone()) {
            hash_map::Entry::Occupied(entry) => Ok(&*entry.into_mut()),
            hash_map::Entry::Vacant(entry) => {
                let feature = load_feature_at(&self.dir, name)?;
                Ok(&*entry.insert(feature))
            }
        }
    }
}

impl FeatureSource for BTreeMap<FeatureName, Feature> {
    fn feature(&mut self, name: &FeatureName) -> Result<&Feature, ConfigError> {
        self.get(name).ok_or_else(|| ConfigError::FeatureNotFound {
            name: name.0.clone(),
            path: PathBuf::from(format!("{name}.yaml")),
        })
    }
}

/// `<features_dir>/<name>.yaml`. Pure, no I/O.
pub fn feature_path_at(features_dir: &Path, name: &FeatureName) -> PathBuf {
    features_dir.join(format!("{}.yaml", name.0))
}

/// Parse and validate a single feature definition.
///
/// Returns `ConfigError::FeatureNotFound` if the file is absent and
/// `ConfigError::Parse` (with path + line context) if it is malformed.
pub fn load_feature_at(features_dir: &Path, name: &FeatureName) -> Result<Feature, ConfigError> {
    validate_feature_name(name)?;
    let path = feature_path_at(features_dir, name);
    if !path.exists() {
        return Err(ConfigError::FeatureNotFound {
            name: name.0.clone(),
            path,
        });
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    // An empty file is a feature that contributes nothing.
    let feature: Feature = if contents.trim().is_empty() {
        Feature::default()
    } else {
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })?
    };
    feature.validate().map_err(|reason| ConfigError::InvalidFeature {
        name: name.0.clone(),
        reason,
    })?;
    tracing::debug!("loaded feature '{name}'");
    Ok(feature.normalized())
}

fn validate_feature_name(name: &FeatureName) -> Result<(), ConfigError> {
    let n = name.0.as_str();
    if n.is_empty() || n.starts_with('.') || n.contains(['/', '\\']) {
        return Err(ConfigError::InvalidFeature {
            name: n.to_string(),
            reason: "feature names must be plain file stems".to_string(),
        });
    }
    Ok(())
}

/// Fold `names` (in order) into a single feature.
///
/// The result's flags are on iff at least one named feature switches them on.
pub fn merge_features<S: FeatureSource + ?Sized>(
    names: &[FeatureName],
    source: &mut S,
) -> Result<Feature, ConfigError> {
    let mut acc = Feature::default();
    for name in names {
        acc = acc.merge(source.feature(name)?);
    }
    Ok(acc)
}

/// Resolve a [`ManagedRepoEntry`] into its effective configuration.
///
/// Fails with `FeatureNotFound` for undefined features, `ManifestConflict`
/// when one path is both rendered and copied, and `InvalidSiteInfo` when the
/// repository's `siteinfo.json` is present but malformed. An absent
/// `siteinfo.json` is not an error.
pub fn resolve<S: FeatureSource + ?Sized>(
    entry: &ManagedRepoEntry,
    source: &mut S,
) -> Result<ResolvedRepoConfig, ConfigError> {
    let merged = merge_features(&entry.features, source)?;

    if let Some(path) = merged.template_files.intersection(&merged.static_files).next() {
        return Err(ConfigError::ManifestConflict {
            repo: entry.local_path.clone(),
            path: path.clone(),
        });
    }

    let (info, info_source) = siteinfo::load_at(&entry.local_path).into_result()?;
    Ok(ResolvedRepoConfig::new(
        entry.local_path.clone(),
        merged,
        info,
        info_source,
    ))
}
