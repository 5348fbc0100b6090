//! Explorer session: the two uploaded documents and the graph derived from them.
//!
//! Either document may be uploaded first. Whenever both are present after an
//! upload the graph is derived again and replaced wholesale. A document that
//! fails to parse leaves the previous one (and the current graph) in place and
//! records a user-facing message.

use tracing::{info, warn};
use vlei_types::{Configuration, Graph, WorkflowDocument};

use crate::derive::{LayoutRng, derive_graph};
use crate::document::{DocumentError, parse_configuration_str, parse_workflow_str, require_steps};

pub const WORKFLOW_PARSE_MESSAGE: &str = "Error parsing workflow file";
pub const CONFIGURATION_PARSE_MESSAGE: &str = "Error parsing configuration file";
pub const WORKFLOW_SHAPE_MESSAGE: &str = "Workflow file has no workflow.steps mapping";

/// A parsed document together with the name it was uploaded under.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument<T> {
    pub file_name: String,
    pub document: T,
}

#[derive(Debug, Default)]
pub struct ExplorerSession {
    workflow: Option<LoadedDocument<WorkflowDocument>>,
    config: Option<LoadedDocument<Configuration>>,
    graph: Graph,
    error: Option<String>,
    rng: LayoutRng,
}

impl ExplorerSession {
    pub fn new(rng: LayoutRng) -> Self {
        Self {
            workflow: None,
            config: None,
            graph: Graph::default(),
            error: None,
            rng,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(LayoutRng::seeded(seed))
    }

    /// Parses and stores a workflow upload.
    ///
    /// A workflow without `workflow.steps` is kept (it derives an empty graph) but
    /// still reported as [`DocumentError::MissingSteps`].
    pub fn upload_workflow(&mut self, text: &str, file_name: &str) -> Result<(), DocumentError> {
        let document = match parse_workflow_str(text, file_name) {
            Ok(document) => document,
            Err(error) => {
                warn!(target: "vlei_session", file = file_name, error = %error, "workflow upload rejected");
                self.error = Some(WORKFLOW_PARSE_MESSAGE.to_string());
                return Err(error);
            }
        };
        let shape = require_steps(&document, file_name);

        self.workflow = Some(LoadedDocument {
            file_name: file_name.to_string(),
            document,
        });
        self.error = shape.as_ref().err().map(|_| WORKFLOW_SHAPE_MESSAGE.to_string());
        self.rederive();
        shape
    }

    pub fn upload_configuration(&mut self, text: &str, file_name: &str) -> Result<(), DocumentError> {
        let document = match parse_configuration_str(text, file_name) {
            Ok(document) => document,
            Err(error) => {
                warn!(target: "vlei_session", file = file_name, error = %error, "configuration upload rejected");
                self.error = Some(CONFIGURATION_PARSE_MESSAGE.to_string());
                return Err(error);
            }
        };

        self.config = Some(LoadedDocument {
            file_name: file_name.to_string(),
            document,
        });
        let malformed_workflow = self.workflow.as_ref().is_some_and(|loaded| !loaded.document.is_well_formed());
        self.error = malformed_workflow.then(|| WORKFLOW_SHAPE_MESSAGE.to_string());
        self.rederive();
        Ok(())
    }

    /// Drops both documents, the graph and any message.
    pub fn clear(&mut self) {
        self.workflow = None;
        self.config = None;
        self.graph = Graph::default();
        self.error = None;
    }

    fn rederive(&mut self) {
        if let (Some(workflow), Some(config)) = (&self.workflow, &self.config) {
            self.graph = derive_graph(&workflow.document, &config.document, &mut self.rng);
            info!(target: "vlei_session", nodes = self.graph.nodes.len(), edges = self.graph.edges.len(), "graph derived");
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn workflow(&self) -> Option<&LoadedDocument<WorkflowDocument>> {
        self.workflow.as_ref()
    }

    pub fn configuration(&self) -> Option<&LoadedDocument<Configuration>> {
        self.config.as_ref()
    }

    /// True once both documents have been uploaded.
    pub fn is_complete(&self) -> bool {
        self.workflow.is_some() && self.config.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORKFLOW: &str = "workflow:\n  steps:\n    S1:\n      type: issue_credential\n      issuer_aid: A\n      credential: c\n";
    const CONFIG: &str = r#"{"identifiers": {"A": {}}}"#;

    #[test]
    fn derives_only_when_both_documents_are_present() {
        let mut session = ExplorerSession::with_seed(1);
        session.upload_workflow(WORKFLOW, "flow.yaml").expect("workflow");
        assert!(session.graph().is_empty());
        assert!(!session.is_complete());

        session.upload_configuration(CONFIG, "config.json").expect("config");
        assert_eq!(session.graph().nodes.len(), 2);
        assert_eq!(session.graph().edges.len(), 1);
    }

    #[test]
    fn parse_failure_keeps_previous_document_and_graph() {
        let mut session = ExplorerSession::with_seed(1);
        session.upload_workflow(WORKFLOW, "flow.yaml").expect("workflow");
        session.upload_configuration(CONFIG, "config.json").expect("config");
        let before = session.graph().clone();

        assert!(session.upload_configuration("{ nope", "broken.json").is_err());
        assert_eq!(session.error(), Some(CONFIGURATION_PARSE_MESSAGE));
        assert_eq!(session.configuration().map(|loaded| loaded.file_name.as_str()), Some("config.json"));
        assert_eq!(session.graph(), &before);

        assert!(session.upload_workflow("workflow: [", "flow.yaml").is_err());
        assert_eq!(session.error(), Some(WORKFLOW_PARSE_MESSAGE));
    }

    #[test]
    fn workflow_without_steps_derives_empty_graph() {
        let mut session = ExplorerSession::with_seed(1);
        session.upload_configuration(CONFIG, "config.json").expect("config");
        let error = session.upload_workflow("workflow: {}\n", "flow.yaml").expect_err("missing steps");
        assert!(matches!(error, DocumentError::MissingSteps { .. }));
        assert_eq!(session.error(), Some(WORKFLOW_SHAPE_MESSAGE));
        assert!(session.graph().is_empty());
        assert!(session.is_complete());
    }

    #[test]
    fn clear_resets_everything() {
        let mut session = ExplorerSession::with_seed(1);
        session.upload_workflow(WORKFLOW, "flow.yaml").expect("workflow");
        session.upload_configuration(CONFIG, "config.json").expect("config");
        session.clear();
        assert!(session.graph().is_empty());
        assert!(session.workflow().is_none() && session.configuration().is_none());
        assert!(session.error().is_none());
    }
}
