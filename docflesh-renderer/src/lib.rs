//! # docflesh-renderer
//!
//! Tera-based engine that renders a repository's template files from its
//! resolved configuration.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use docflesh_renderer::{TemplateEngine, TemplateVariables};
//! use docflesh_core::ResolvedRepoConfig;
//!
//! fn render_all(templates: &Path, repo: &ResolvedRepoConfig) {
//!     if let Ok(engine) = TemplateEngine::new(templates) {
//!         let vars = TemplateVariables::from_config(repo);
//!         if let Ok(outputs) = engine.render_manifest(repo, &vars) {
//!             for (path, content) in outputs {
//!                 println!("{}: {} bytes", path.display(), content.len());
//!             }
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::TemplateVariables;
pub use engine::{template_id, TemplateEngine};
pub use error::RenderError;
