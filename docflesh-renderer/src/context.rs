//! Template context: serializable rendering payload built from [`ResolvedRepoConfig`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docflesh_core::ResolvedRepoConfig;

use crate::error::RenderError;

/// Variables visible to every template of a repository.
///
/// Site fields come from `siteinfo.json`; the two `site_uses_*` flags come
/// from the merged features, not from `siteinfo.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateVariables {
    pub site_name: String,
    pub site_name_slug: String,
    pub category: String,
    pub related_repo: String,
    pub site_uses_mathjax: bool,
    pub site_uses_precommit: bool,
    pub meta: MetaCtx,
}

/// Generator information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaCtx {
    pub docflesh_version: String,
    pub generated_at: DateTime<Utc>,
}

impl TemplateVariables {
    /// Build [`TemplateVariables`] from a resolved repository configuration.
    pub fn from_config(repo: &ResolvedRepoConfig) -> Self {
        let info = &repo.siteinfo;
        TemplateVariables {
            site_name: info.site_name.clone(),
            site_name_slug: info.site_name_slug.clone(),
            category: info.category.to_string(),
            related_repo: info.related_repo_or_empty().to_string(),
            site_uses_mathjax: repo.flags.site_uses_mathjax,
            site_uses_precommit: repo.flags.site_uses_precommit,
            meta: MetaCtx {
                docflesh_version: env!("CARGO_PKG_VERSION").to_string(),
                generated_at: Utc::now(),
            },
        }
    }

    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}
