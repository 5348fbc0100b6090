//! Saved workflow templates: a named (workflow, configuration) bundle plus metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Configuration, WorkflowDocument};

/// Template bundle as stored on disk and in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportedTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub author: String,
    pub version: String,
    pub created_date: DateTime<Utc>,
    pub workflow: WorkflowDocument,
    pub config: Configuration,
    pub tags: Vec<String>,
}

/// Descriptive metadata of a template without its documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateMetadata {
    pub id: String,
    pub name: String,
    pub description: String,
    pub author: String,
    pub version: String,
    pub created_date: DateTime<Utc>,
    pub tags: Vec<String>,
}

impl From<&ExportedTemplate> for TemplateMetadata {
    fn from(template: &ExportedTemplate) -> Self {
        Self {
            id: template.id.clone(),
            name: template.name.clone(),
            description: template.description.clone(),
            author: template.author.clone(),
            version: template.version.clone(),
            created_date: template.created_date,
            tags: template.tags.clone(),
        }
    }
}

impl ExportedTemplate {
    pub fn metadata(&self) -> TemplateMetadata {
        TemplateMetadata::from(self)
    }

    /// Case-sensitive exact tag membership.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|candidate| candidate == tag)
    }
}
