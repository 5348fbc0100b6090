//! Workflow document schema.
//!
//! A workflow document has the shape `{ workflow: { steps: { <id>: <step> } } }`.
//! Steps carry no explicit edges; relationships are implied by field
//! references such as `issuer_aid` or `credential_source`. The step map keeps
//! insertion order so derived graphs list credentials in authoring order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::ExtensionMap;

pub mod step_type;

pub use step_type::StepType;

/// Top-level workflow document as authored on disk.
///
/// Both `workflow` and `workflow.steps` are optional at the type level so that a
/// malformed document can still be represented and reported instead of failing to
/// deserialize.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkflowDocument {
    /// The workflow body holding the step map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<WorkflowBody>,
    /// Unrecognised top-level fields.
    #[serde(flatten)]
    pub extensions: ExtensionMap,
}

/// Body of a workflow document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkflowBody {
    /// Steps keyed by their identifier, in authoring order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<IndexMap<String, WorkflowStep>>,
    /// Unrecognised body fields.
    #[serde(flatten)]
    pub extensions: ExtensionMap,
}

/// A single declarative workflow step.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkflowStep {
    /// Identifier repeated inside the step; the map key is authoritative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Step type tag (for example `issue_credential`).
    #[serde(rename = "type", default)]
    pub step_type: StepType,
    /// AID created or referenced by the step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aid: Option<String>,
    /// Agent that performs the step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    /// Free-form description surfaced in the UI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Identifier key of the issuing (or revoking) AID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_aid: Option<String>,
    /// Identifier key of the receiving AID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuee_aid: Option<String>,
    /// Credential name, or for revocations the step id of the revoked credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
    /// Step id or credential name this credential chains from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_source: Option<String>,
    /// Identifier key marked as a root of trust by `add_root_of_trust` steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rot_aid: Option<String>,
    /// Credential attributes supplied at issuance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<IndexMap<String, JsonValue>>,
    /// Unrecognised step fields.
    #[serde(flatten)]
    pub extensions: ExtensionMap,
}

impl WorkflowDocument {
    /// Builds a document from an already ordered step map.
    pub fn from_steps(steps: IndexMap<String, WorkflowStep>) -> Self {
        Self {
            workflow: Some(WorkflowBody {
                steps: Some(steps),
                extensions: ExtensionMap::new(),
            }),
            extensions: ExtensionMap::new(),
        }
    }

    /// Returns the step map when the document has the required shape.
    pub fn steps(&self) -> Option<&IndexMap<String, WorkflowStep>> {
        self.workflow.as_ref().and_then(|body| body.steps.as_ref())
    }

    /// Returns true when `workflow.steps` is present.
    pub fn is_well_formed(&self) -> bool {
        self.steps().is_some()
    }
}

impl WorkflowStep {
    /// Creates an otherwise empty step of the given type.
    pub fn new(id: impl Into<String>, step_type: StepType) -> Self {
        Self {
            id: Some(id.into()),
            step_type,
            ..Self::default()
        }
    }
}
