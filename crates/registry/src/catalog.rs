//! Read-only catalog of workflow templates.
//!
//! The built-in templates are compiled into the binary. Additional templates
//! can be layered on from a directory of `*.json` files; those are validated
//! like any import and skipped with a warning when they do not pass.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};
use vlei_types::ExportedTemplate;

use crate::{TemplateError, import_template_str};

/// Built-in templates as `(file name, JSON text)`.
const EMBEDDED_TEMPLATES: &[(&str, &str)] = &[
    ("qvi-singlesig.json", include_str!("../templates/qvi-singlesig.json")),
    ("qvi-multisig.json", include_str!("../templates/qvi-multisig.json")),
    ("testing-revocation.json", include_str!("../templates/testing-revocation.json")),
    ("testing-aid-kli.json", include_str!("../templates/testing-aid-kli.json")),
    ("dev-multisig-non-delegated.json", include_str!("../templates/dev-multisig-non-delegated.json")),
];

#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: Vec<ExportedTemplate>,
}

impl TemplateCatalog {
    /// Loads the built-in templates.
    pub fn embedded() -> Result<Self, TemplateError> {
        let templates = EMBEDDED_TEMPLATES
            .iter()
            .map(|(file_name, text)| {
                debug!(target: "vlei_catalog", file_name, "loading embedded template");
                import_template_str(text)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { templates })
    }

    pub fn from_templates(templates: Vec<ExportedTemplate>) -> Self {
        Self { templates }
    }

    /// Appends every valid `*.json` template found directly under `dir`, in
    /// file name order. Invalid files and ids already in the catalog are skipped.
    pub fn with_directory(mut self, dir: &Path) -> Result<Self, TemplateError> {
        let entries = fs::read_dir(dir).map_err(|source| TemplateError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut paths: Vec<_> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|extension| extension.eq_ignore_ascii_case("json")))
            .collect();
        paths.sort();

        for path in paths {
            let loaded = fs::read_to_string(&path)
                .map_err(|source| TemplateError::Io {
                    path: path.clone(),
                    source,
                })
                .and_then(|text| import_template_str(&text));
            match loaded {
                Ok(template) if self.get(&template.id).is_some() => {
                    warn!(target: "vlei_catalog", path = %path.display(), id = %template.id, "duplicate template id; skipping");
                }
                Ok(template) => {
                    debug!(target: "vlei_catalog", path = %path.display(), id = %template.id, "loaded user template");
                    self.templates.push(template);
                }
                Err(error) => {
                    warn!(target: "vlei_catalog", path = %path.display(), error = %error, "skipping template file");
                }
            }
        }
        Ok(self)
    }

    pub fn all(&self) -> &[ExportedTemplate] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ExportedTemplate> {
        self.templates.iter().find(|template| template.id == id)
    }

    pub fn require(&self, id: &str) -> Result<&ExportedTemplate, TemplateError> {
        self.get(id).ok_or_else(|| TemplateError::NotFound { id: id.to_string() })
    }

    /// Case-insensitive substring match against name, description and each tag.
    /// An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<&ExportedTemplate> {
        self.templates.iter().filter(|template| matches_query(template, query)).collect()
    }

    /// Templates carrying at least one of `tags` (exact, case-sensitive).
    pub fn filter_by_tags<S: AsRef<str>>(&self, tags: &[S]) -> Vec<&ExportedTemplate> {
        self.templates.iter().filter(|template| matches_tags(template, tags)).collect()
    }

    /// Combined gallery filter: the query narrows first, then any selected tags.
    pub fn query<S: AsRef<str>>(&self, query: &str, tags: &[S]) -> Vec<&ExportedTemplate> {
        self.templates
            .iter()
            .filter(|template| matches_query(template, query) && (tags.is_empty() || matches_tags(template, tags)))
            .collect()
    }

    /// Distinct tags across the catalog, sorted.
    pub fn tags(&self) -> Vec<String> {
        self.templates
            .iter()
            .flat_map(|template| template.tags.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn matches_query(template: &ExportedTemplate, query: &str) -> bool {
    let query = query.to_lowercase();
    template.name.to_lowercase().contains(&query)
        || template.description.to_lowercase().contains(&query)
        || template.tags.iter().any(|tag| tag.to_lowercase().contains(&query))
}

fn matches_tags<S: AsRef<str>>(template: &ExportedTemplate, tags: &[S]) -> bool {
    tags.iter().any(|tag| template.has_tag(tag.as_ref()))
}
