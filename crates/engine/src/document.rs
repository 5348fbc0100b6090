//! Document ingestion: text or files to the typed workflow and configuration models.
//!
//! The format is chosen from the file name: `.yaml`/`.yml` parse as YAML,
//! anything else as JSON. A workflow that parses but lacks `workflow.steps` is
//! still returned; [`require_steps`] reports the missing shape separately so
//! callers can keep it and derive an empty graph.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;
use vlei_types::{Configuration, WorkflowDocument};
use vlei_util::is_yaml_file_name;

/// Errors raised while reading, parsing or writing documents.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid YAML in {name}: {source}")]
    Yaml {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid JSON in {name}: {source}")]
    Json {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{name} has no workflow.steps mapping")]
    MissingSteps { name: String },
    #[error("failed to serialize {what}: {message}")]
    Serialize { what: &'static str, message: String },
}

impl DocumentError {
    /// True for errors caused by unparseable text rather than IO or shape.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Yaml { .. } | Self::Json { .. })
    }
}

fn parse_by_name<T: DeserializeOwned>(text: &str, file_name: &str) -> Result<T, DocumentError> {
    if is_yaml_file_name(file_name) {
        serde_yaml::from_str(text).map_err(|source| DocumentError::Yaml {
            name: file_name.to_string(),
            source,
        })
    } else {
        serde_json::from_str(text).map_err(|source| DocumentError::Json {
            name: file_name.to_string(),
            source,
        })
    }
}

pub fn parse_workflow_str(text: &str, file_name: &str) -> Result<WorkflowDocument, DocumentError> {
    parse_by_name(text, file_name)
}

pub fn parse_configuration_str(text: &str, file_name: &str) -> Result<Configuration, DocumentError> {
    parse_by_name(text, file_name)
}

/// Fails with [`DocumentError::MissingSteps`] when the workflow lacks `workflow.steps`.
pub fn require_steps(workflow: &WorkflowDocument, file_name: &str) -> Result<(), DocumentError> {
    if workflow.is_well_formed() {
        Ok(())
    } else {
        Err(DocumentError::MissingSteps {
            name: file_name.to_string(),
        })
    }
}

fn read_text(path: &Path) -> Result<(String, String), DocumentError> {
    let text = fs::read_to_string(path).map_err(|source| DocumentError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok((text, name))
}

/// Reads and parses a workflow file. The shape is not checked.
pub fn load_workflow_file(path: impl AsRef<Path>) -> Result<WorkflowDocument, DocumentError> {
    let (text, name) = read_text(path.as_ref())?;
    parse_workflow_str(&text, &name)
}

pub fn load_configuration_file(path: impl AsRef<Path>) -> Result<Configuration, DocumentError> {
    let (text, name) = read_text(path.as_ref())?;
    parse_configuration_str(&text, &name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        let yaml_text = "workflow:\n  steps:\n    s1:\n      type: create_aid\n";
        assert!(parse_workflow_str(yaml_text, "flow.yml").expect("yaml").is_well_formed());

        let error = parse_workflow_str(yaml_text, "flow.json").expect_err("yaml is not json");
        assert!(matches!(error, DocumentError::Json { .. }));
        assert!(error.is_parse_error());
    }

    #[test]
    fn missing_steps_parses_but_fails_shape_check() {
        let workflow = parse_workflow_str(r#"{"workflow": {}}"#, "flow.json").expect("parse");
        let error = require_steps(&workflow, "flow.json").expect_err("missing steps");
        assert_eq!(error.to_string(), "flow.json has no workflow.steps mapping");
        assert!(!error.is_parse_error());
    }

    #[test]
    fn loads_files_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"identifiers": {"A": {"name": "A"}}}"#).expect("write");

        let config = load_configuration_file(&path).expect("load");
        assert!(config.identifiers.contains_key("A"));

        let error = load_workflow_file(dir.path().join("absent.yaml")).expect_err("absent");
        assert!(matches!(error, DocumentError::Read { .. }));
    }
}
