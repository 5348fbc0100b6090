//! Document export: YAML workflow plus pretty JSON configuration.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;
use vlei_types::{Configuration, WorkflowDocument};
use vlei_util::document_base_name;

use crate::DocumentError;

/// Two serialized artifacts ready to be written or downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBundle {
    pub workflow_file_name: String,
    pub workflow_yaml: String,
    pub config_file_name: String,
    pub config_json: String,
}

/// Serializes both documents and names the artifacts after the original file names.
pub fn export_documents(
    workflow: &WorkflowDocument,
    config: &Configuration,
    workflow_file: &str,
    config_file: &str,
) -> Result<ExportBundle, DocumentError> {
    let workflow_yaml = serde_yaml::to_string(workflow).map_err(|error| DocumentError::Serialize {
        what: "workflow",
        message: error.to_string(),
    })?;
    let config_json = serde_json::to_string_pretty(config).map_err(|error| DocumentError::Serialize {
        what: "configuration",
        message: error.to_string(),
    })?;

    Ok(ExportBundle {
        workflow_file_name: format!("{}-workflow.yaml", document_base_name(workflow_file, "workflow")),
        workflow_yaml,
        config_file_name: format!("{}-config.json", document_base_name(config_file, "config")),
        config_json,
    })
}

impl ExportBundle {
    /// Writes both artifacts into `dir`, creating it when needed. Returns the written paths.
    pub fn write_to(&self, dir: &Path) -> Result<(PathBuf, PathBuf), DocumentError> {
        fs::create_dir_all(dir).map_err(|source| DocumentError::Write {
            path: dir.to_path_buf(),
            source,
        })?;
        let workflow_path = dir.join(&self.workflow_file_name);
        let config_path = dir.join(&self.config_file_name);
        for (path, contents) in [(&workflow_path, &self.workflow_yaml), (&config_path, &self.config_json)] {
            fs::write(path, contents).map_err(|source| DocumentError::Write {
                path: path.clone(),
                source,
            })?;
        }
        info!(target: "vlei_export", workflow = %workflow_path.display(), config = %config_path.display(), "exported documents");
        Ok((workflow_path, config_path))
    }
}
