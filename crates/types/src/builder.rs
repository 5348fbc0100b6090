//! Interactive builder graph.
//!
//! The builder edits nodes whose attributes live in two free-form bags: `config`
//! for configuration-facing fields (AIDs, multisig membership, credential
//! definitions) and `workflow` for step-facing fields copied verbatim into the
//! exported workflow step.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::{EdgeKind, ExtensionMap, Position, StepType};

/// Builder node type. Each variant is the camel-case rendering of a step type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BuilderNodeType {
    CreateAid,
    CreateAidKli,
    IssueCredential,
    RevokeCredential,
    Other(String),
}

impl BuilderNodeType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::CreateAid => "createAid",
            Self::CreateAidKli => "createAidKli",
            Self::IssueCredential => "issueCredential",
            Self::RevokeCredential => "revokeCredential",
            Self::Other(tag) => tag,
        }
    }

    /// Workflow step type written for nodes of this type on export.
    pub fn step_type(&self) -> StepType {
        match self {
            Self::CreateAid => StepType::CreateAid,
            Self::CreateAidKli => StepType::CreateAidKli,
            Self::IssueCredential => StepType::IssueCredential,
            Self::RevokeCredential => StepType::RevokeCredential,
            Self::Other(tag) => StepType::from(tag.as_str()),
        }
    }

    /// Returns true for node types that define a configuration identifier.
    pub fn creates_identifier(&self) -> bool {
        matches!(self, Self::CreateAid | Self::CreateAidKli)
    }

    /// Display label derived from the camel-case tag (`issueCredential` becomes `Issue Credential`).
    pub fn default_label(&self) -> String {
        let mut label = String::new();
        for (index, character) in self.as_str().chars().enumerate() {
            if index == 0 {
                label.extend(character.to_uppercase());
            } else if character.is_uppercase() {
                label.push(' ');
                label.push(character);
            } else {
                label.push(character);
            }
        }
        label
    }
}

impl From<String> for BuilderNodeType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "createAid" => Self::CreateAid,
            "createAidKli" => Self::CreateAidKli,
            "issueCredential" => Self::IssueCredential,
            "revokeCredential" => Self::RevokeCredential,
            _ => Self::Other(tag),
        }
    }
}

impl From<BuilderNodeType> for String {
    fn from(node_type: BuilderNodeType) -> Self {
        match node_type {
            BuilderNodeType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl From<&StepType> for BuilderNodeType {
    fn from(step_type: &StepType) -> Self {
        match step_type {
            StepType::CreateAid => Self::CreateAid,
            StepType::CreateAidKli => Self::CreateAidKli,
            StepType::IssueCredential => Self::IssueCredential,
            StepType::RevokeCredential => Self::RevokeCredential,
            other => Self::Other(other.as_str().to_string()),
        }
    }
}

impl fmt::Display for BuilderNodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration-facing attributes of a builder node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuilderNodeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(default)]
    pub is_multisig: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<IndexMap<String, JsonValue>>,
    #[serde(flatten)]
    pub extensions: ExtensionMap,
}

/// A node on the builder canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderNode {
    pub id: String,
    pub node_type: BuilderNodeType,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub config: BuilderNodeConfig,
    /// Step fields copied into the exported workflow step.
    #[serde(default)]
    pub workflow: ExtensionMap,
}

/// An edge on the builder canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub edge_type: EdgeKind,
    #[serde(default)]
    pub data: ExtensionMap,
}

/// Mutable graph edited by the builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuilderGraph {
    #[serde(default)]
    pub nodes: Vec<BuilderNode>,
    #[serde(default)]
    pub edges: Vec<BuilderEdge>,
}

impl BuilderGraph {
    pub fn node(&self, id: &str) -> Option<&BuilderNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut BuilderNode> {
        self.nodes.iter_mut().find(|node| node.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&BuilderEdge> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    pub fn edge_mut(&mut self, id: &str) -> Option<&mut BuilderEdge> {
        self.edges.iter_mut().find(|edge| edge.id == id)
    }
}
