//! docflesh core library — domain types, config loading, feature resolution.
//!
//! - [`types`] — newtypes and domain structs
//! - [`error`] — [`ConfigError`]
//! - [`features`] — feature store and resolver
//! - [`siteinfo`] — per-repository `siteinfo.json`
//! - [`config`] — `config.yaml` loading

pub mod config;
pub mod error;
pub mod features;
pub mod siteinfo;
pub mod types;

pub use config::{load_config_at, ConfigLayout, LoadedConfig};
pub use error::ConfigError;
pub use features::{resolve, FeatureDir, FeatureSource};
pub use siteinfo::SiteInfoLoad;
pub use types::{
    ConfigFile, Feature, FeatureFlags, FeatureName, ManagedRepoEntry, MetadataSource,
    ResolvedRepoConfig, Settings, SiteCategory, SiteMetadata,
};
