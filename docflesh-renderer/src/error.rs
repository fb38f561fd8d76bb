//! Error types for docflesh-renderer.

use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading or rendering the shared templates.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Syntax errors, undefined variables and other Tera failures.
    #[error("tera: {0}")]
    Tera(#[from] tera::Error),

    /// [`crate::TemplateVariables`] could not be turned into a Tera context.
    #[error("building template context: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A file under the templates directory could not be read.
    #[error("reading template {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    /// The manifest names a template that is not in the templates directory.
    #[error("template not found: {id}")]
    TemplateNotFound { id: String },
}
