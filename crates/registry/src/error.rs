use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to parse template file: {0}")]
    Parse(#[source] serde_json::Error),
    /// Every problem found, in field order.
    #[error("Invalid template: {}", .errors.join(", "))]
    Invalid { errors: Vec<String> },
    #[error("Template fields have the wrong shape: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("template '{id}' not found")]
    NotFound { id: String },
    #[error("failed to serialize template: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("template I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
