//! Creating templates from documents and serializing them for download.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use tracing::info;
use vlei_types::{Configuration, ExportedTemplate, WorkflowDocument};

use crate::TemplateError;

pub const TEMPLATE_VERSION: &str = "1.0.0";
pub const EXPORT_AUTHOR: &str = "VLEI Explorer User";
pub const EXPORT_TAGS: &[&str] = &["exported", "workflow", "config"];

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

static YAML_EXTENSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.(yaml|yml)$").expect("YAML extension regex should compile"));
static UNSAFE_NAME_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s/\\]+").expect("file name regex should compile"));
static LEADING_DOTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\.+").expect("leading dots regex should compile"));

/// `template_<unix millis>_<9 random base-36 characters>`.
pub fn generate_template_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("template_{}_{suffix}", Utc::now().timestamp_millis())
}

/// Builds a fresh template at version 1.0.0, dated now.
pub fn create_template(
    name: &str,
    description: &str,
    author: &str,
    workflow: WorkflowDocument,
    config: Configuration,
    tags: Vec<String>,
) -> ExportedTemplate {
    ExportedTemplate {
        id: generate_template_id(),
        name: name.to_string(),
        description: description.to_string(),
        author: author.to_string(),
        version: TEMPLATE_VERSION.to_string(),
        created_date: Utc::now(),
        workflow,
        config,
        tags,
    }
}

/// A template ready to be saved.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateExport {
    pub template: ExportedTemplate,
    pub file_name: String,
    pub json: String,
}

impl TemplateExport {
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, TemplateError> {
        fs::create_dir_all(dir).map_err(|source| TemplateError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.json).map_err(|source| TemplateError::Io {
            path: path.clone(),
            source,
        })?;
        info!(target: "vlei_catalog", path = %path.display(), id = %self.template.id, "wrote template");
        Ok(path)
    }
}

/// Packages the current documents as a template named after the workflow file.
pub fn export_template(
    workflow: &WorkflowDocument,
    config: &Configuration,
    workflow_file: &str,
    config_file: &str,
) -> Result<TemplateExport, TemplateError> {
    let base = YAML_EXTENSION.replace(workflow_file, "");
    let base = if base.is_empty() { "workflow" } else { &*base };
    let template = create_template(
        &format!("{base}-template"),
        &format!("Template exported from {workflow_file} and {config_file}"),
        EXPORT_AUTHOR,
        workflow.clone(),
        config.clone(),
        EXPORT_TAGS.iter().map(|tag| tag.to_string()).collect(),
    );
    let file_name = format!("{}.json", template.name);
    package(template, file_name)
}

/// Serializes an existing template under a file name derived from its name.
pub fn template_export(template: &ExportedTemplate) -> Result<TemplateExport, TemplateError> {
    let file_name = format!("{}.json", file_stem(&template.name));
    package(template.clone(), file_name)
}

/// Runs of whitespace and path separators become `_`, as do leading dots, so the
/// stem always names a plain file inside the target directory.
fn file_stem(name: &str) -> String {
    let stem = UNSAFE_NAME_RUN.replace_all(name.trim(), "_");
    let stem = LEADING_DOTS.replace(&stem, "_");
    if stem.is_empty() { "template".to_string() } else { stem.into_owned() }
}

fn package(template: ExportedTemplate, file_name: String) -> Result<TemplateExport, TemplateError> {
    let json = serde_json::to_string_pretty(&template).map_err(TemplateError::Serialize)?;
    Ok(TemplateExport { template, file_name, json })
}
