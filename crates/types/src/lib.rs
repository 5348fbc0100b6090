//! Shared document and graph definitions for the vLEI explorer.
//!
//! Two loosely typed documents come in from the outside world: a workflow
//! definition and an environment configuration. Everything else in the
//! workspace is derived from those two, so the models here keep authoring
//! order (via `IndexMap`) and carry every field they do not understand in an
//! explicit extension map. Round-tripping a document through these types never
//! drops data.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

pub mod builder;
pub mod config;
pub mod execution;
pub mod graph;
pub mod template;
pub mod workflow;

pub use builder::{BuilderEdge, BuilderGraph, BuilderNode, BuilderNodeConfig, BuilderNodeType};
pub use config::{Agent, Configuration, Credential, Identifier, User};
pub use execution::{RunEnvelope, RunEvent, RunSubmission, TerminalEnvelope};
pub use graph::{Edge, EdgeKind, EdgeStyle, Graph, NodeData, NodeKind, NodePalette, NodeStyle, Position, ProcessedNode};
pub use template::{ExportedTemplate, TemplateMetadata};
pub use workflow::{StepType, WorkflowBody, WorkflowDocument, WorkflowStep};

/// Unrecognised fields attached to a document entity, preserved verbatim.
pub type ExtensionMap = IndexMap<String, JsonValue>;
