//! Workflow template catalog for the vLEI explorer.
//!
//! A template bundles a workflow document and a configuration with
//! descriptive metadata. This crate provides the built-in catalog, search and
//! tag filtering over it, validation of imported template files, and creation
//! of new templates from documents the user has loaded.

pub mod authoring;
pub mod catalog;
pub mod error;
pub mod validate;

pub use authoring::{TemplateExport, create_template, export_template, generate_template_id, template_export};
pub use catalog::TemplateCatalog;
pub use error::TemplateError;
pub use validate::{import_template_str, validate_template};
