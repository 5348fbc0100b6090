//! Execution event contract shared with the external workflow runner.
//!
//! The runner answers a submission with a stream of JSON envelopes: any number of
//! progress envelopes `{ step, workflowState }` followed by exactly one terminal
//! envelope, either `{ type: "complete", result }` or `{ type: "error", error }`.
//! Step descriptors and state snapshots are opaque and passed through untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::{Configuration, WorkflowDocument};

/// Request body submitted to the runner.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RunSubmission {
    pub workflow: WorkflowDocument,
    pub config: Configuration,
}

/// One decoded wire envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunEnvelope {
    Terminal(TerminalEnvelope),
    Progress {
        step: JsonValue,
        #[serde(rename = "workflowState", default)]
        workflow_state: JsonValue,
    },
}

/// Terminal wire envelopes, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TerminalEnvelope {
    Complete {
        #[serde(default)]
        result: JsonValue,
    },
    Error {
        error: String,
    },
}

/// Event delivered to the caller of a run, stamped with the run identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    /// Progress reported by the runner.
    Step {
        run_id: String,
        index: usize,
        step: JsonValue,
        workflow_state: JsonValue,
    },
    /// Runner-reported successful completion.
    Completed { run_id: String, result: JsonValue },
    /// Runner-reported failure; `error` is the runner's text verbatim.
    Failed { run_id: String, error: String },
    /// The transport ended or failed before a terminal envelope arrived.
    TransportLost { run_id: String, message: String },
}

impl RunEvent {
    pub fn run_id(&self) -> &str {
        match self {
            RunEvent::Step { run_id, .. }
            | RunEvent::Completed { run_id, .. }
            | RunEvent::Failed { run_id, .. }
            | RunEvent::TransportLost { run_id, .. } => run_id,
        }
    }

    /// True for the last event of a run, whichever side ended it.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunEvent::Step { .. })
    }

    /// True only for terminal states reported by the runner itself.
    pub fn is_runner_terminal(&self) -> bool {
        matches!(self, RunEvent::Completed { .. } | RunEvent::Failed { .. })
    }
}
