//! Tera rendering engine over the shared templates directory.
//!
//! Every file under the templates directory is registered under its relative
//! path with `/` separators, so the manifest entry `docs/index.md` renders
//! `templates/docs/index.md`. Templates may `{% include %}` or `{% extends %}`
//! each other by that same id.

use std::path::{Path, PathBuf};

use tera::Tera;

use docflesh_core::ResolvedRepoConfig;

use crate::context::TemplateVariables;
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}

/// Template id for a manifest path: relative, `/`-separated.
pub fn template_id(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            std::path::Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn collect_template_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RenderError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            collect_template_files(&path, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn load_templates(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut files = Vec::new();
    collect_template_files(dir, &mut files)?;
    files.sort();
    let mut templates = Vec::with_capacity(files.len());
    for path in files {
        let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
        let name = template_id(rel);
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        templates.push((name, contents));
    }
    Ok(templates)
}

fn build_tera(templates: Vec<(String, String)>) -> Result<Tera, RenderError> {
    let mut tera = Tera::default();
    // Outputs are config files, not HTML.
    tera.autoescape_on(vec![]);
    tera.add_raw_templates(templates)?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Tera-based engine holding every template of the config directory.
///
/// Build once per run with [`TemplateEngine::new`] and reuse for every
/// repository.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Load every file under `templates_dir`. A missing directory yields an
    /// engine with no templates.
    pub fn new(templates_dir: &Path) -> Result<Self, RenderError> {
        let tera = build_tera(load_templates(templates_dir)?)?;
        Ok(TemplateEngine { tera })
    }

    /// Build from in-memory `(id, source)` pairs.
    pub fn from_raw<I, N, S>(templates: I) -> Result<Self, RenderError>
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: Into<String>,
    {
        let items = templates
            .into_iter()
            .map(|(n, s)| (n.into(), s.into()))
            .collect();
        Ok(TemplateEngine { tera: build_tera(items)? })
    }

    pub fn has_template(&self, id: &str) -> bool {
        self.tera.get_template_names().any(|name| name == id)
    }

    /// Render one template by id. Fails with `TemplateNotFound` for unknown ids.
    pub fn render(&self, id: &str, vars: &TemplateVariables) -> Result<String, RenderError> {
        if !self.has_template(id) {
            return Err(RenderError::TemplateNotFound { id: id.to_string() });
        }
        let ctx = vars.to_tera_context()?;
        Ok(self.tera.render(id, &ctx)?)
    }

    /// Render every template file of `repo`'s manifest.
    ///
    /// Returns `Vec<(relative_output_path, rendered_content)>` in manifest order.
    pub fn render_manifest(
        &self,
        repo: &ResolvedRepoConfig,
        vars: &TemplateVariables,
    ) -> Result<Vec<(PathBuf, String)>, RenderError> {
        let ctx = vars.to_tera_context()?;
        let mut results = Vec::with_capacity(repo.template_files.len());
        for rel in &repo.template_files {
            let id = template_id(rel);
            if !self.has_template(&id) {
                return Err(RenderError::TemplateNotFound { id });
            }
            let content = self.tera.render(&id, &ctx)?;
            results.push((rel.clone(), content));
        }
        Ok(results)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
