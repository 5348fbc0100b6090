//! Derived graph entities.
//!
//! Nodes and edges are recomputed in full from a workflow and configuration on
//! every upload or edit. Presentation hints are resolved once, when a node or
//! edge is constructed, from the closed [`NodePalette`] and [`EdgeKind`]
//! enumerations.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::{ExtensionMap, StepType};

/// Coarse node classification used for grouping and layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Aid,
    Multisig,
    Credential,
    Default,
}

impl NodeKind {
    /// Layout rows from top to bottom.
    pub const ROW_ORDER: [NodeKind; 4] = [NodeKind::Aid, NodeKind::Multisig, NodeKind::Credential, NodeKind::Default];

    /// Returns true for identifier-backed nodes (plain AIDs and multisig groups).
    pub fn is_identifier(self) -> bool {
        matches!(self, NodeKind::Aid | NodeKind::Multisig)
    }
}

/// 2D canvas coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Visual role of a node; each role maps to exactly one style record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodePalette {
    Aid,
    Multisig,
    IssuedCredential,
    RevokedCredential,
    Default,
}

/// Resolved node style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyle {
    pub background: String,
    pub color: String,
    pub border: String,
    pub border_radius: String,
    pub width: u32,
}

const NODE_WIDTH: u32 = 180;
const PLAIN_BORDER: &str = "2px solid rgba(0, 0, 0, 0.1)";
const ROOT_OF_TRUST_BORDER: &str = "2px solid #1890ff";

impl NodePalette {
    fn background(self) -> &'static str {
        match self {
            NodePalette::Aid => "#1890ff",
            NodePalette::Multisig => "#faad14",
            NodePalette::IssuedCredential => "#52c41a",
            NodePalette::RevokedCredential => "#ff4d4f",
            NodePalette::Default => "#d9d9d9",
        }
    }

    /// Resolves the style record, highlighting roots of trust with a stronger border.
    pub fn style(self, root_of_trust: bool) -> NodeStyle {
        let (border, border_radius) = if root_of_trust {
            (ROOT_OF_TRUST_BORDER, "8px")
        } else {
            (PLAIN_BORDER, "6px")
        };
        let color = if matches!(self, NodePalette::Default) { "#262626" } else { "white" };
        NodeStyle {
            background: self.background().to_string(),
            color: color.to_string(),
            border: border.to_string(),
            border_radius: border_radius.to_string(),
            width: NODE_WIDTH,
        }
    }
}

/// Rendering payload of a node: the union of everything a renderer may show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Human-readable node type (`AID`, `Multisig`) for identifier nodes.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_label: Option<String>,
    /// Originating workflow step type for credential nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_type: Option<StepType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegator: Option<String>,
    #[serde(rename = "agent-secret", default, skip_serializing_if = "Option::is_none")]
    pub agent_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<String>>,
    #[serde(default)]
    pub is_root_of_trust: bool,
    #[serde(default)]
    pub is_multisig: bool,
    #[serde(default)]
    pub is_member_of_multisig: bool,
    #[serde(rename = "aid", default, skip_serializing_if = "Option::is_none")]
    pub aid: Option<String>,
    #[serde(rename = "agent_name", default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    #[serde(rename = "issuer_aid", default, skip_serializing_if = "Option::is_none")]
    pub issuer_aid: Option<String>,
    #[serde(rename = "issuee_aid", default, skip_serializing_if = "Option::is_none")]
    pub issuee_aid: Option<String>,
    #[serde(rename = "credential", default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
    #[serde(rename = "credential_source", default, skip_serializing_if = "Option::is_none")]
    pub credential_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<IndexMap<String, JsonValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cred_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cred_schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cred_privacy: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cred_rules: Option<JsonValue>,
    pub style: NodeStyle,
    /// Step fields the derivation does not interpret, passed through for display.
    #[serde(flatten)]
    pub extensions: ExtensionMap,
}

impl NodeData {
    /// Creates a payload with only a label and a resolved style.
    pub fn new(label: impl Into<String>, palette: NodePalette) -> Self {
        Self {
            label: label.into(),
            description: None,
            type_label: None,
            step_type: None,
            delegator: None,
            agent_secret: None,
            members: None,
            is_root_of_trust: false,
            is_multisig: false,
            is_member_of_multisig: false,
            aid: None,
            agent_name: None,
            issuer_aid: None,
            issuee_aid: None,
            credential: None,
            credential_source: None,
            attributes: None,
            cred_type: None,
            cred_schema: None,
            cred_privacy: None,
            cred_rules: None,
            style: palette.style(false),
            extensions: ExtensionMap::new(),
        }
    }
}

/// A positioned, typed graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedNode {
    /// Identifier key for AID nodes, workflow step key for credential nodes.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Assigned by layout; meaningless before layout completes.
    #[serde(default)]
    pub position: Position,
    pub data: NodeData,
}

/// Relationship kind carried by an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeKind {
    MultisigMember,
    Delegation,
    CredentialIssuer,
    CredentialIssuee,
    CredentialSource,
    RevokedCredentialLink,
    #[default]
    Generic,
}

/// Resolved edge presentation hints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub stroke: String,
    pub stroke_width: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_dasharray: Option<String>,
    /// Path shape hint (`smoothstep` or `default`).
    pub path: String,
}

impl EdgeKind {
    fn id_prefix(self) -> &'static str {
        match self {
            EdgeKind::MultisigMember => "edge-multisig-member",
            EdgeKind::Delegation => "edge-delegation",
            EdgeKind::CredentialIssuer => "edge-issuer-credential",
            EdgeKind::CredentialIssuee => "edge-issuee-credential",
            EdgeKind::CredentialSource => "edge-source-credential",
            EdgeKind::RevokedCredentialLink => "edge-revoked-credential",
            EdgeKind::Generic => "edge",
        }
    }

    /// Deterministic edge identity for `(kind, source, target)`.
    pub fn edge_id(self, source: &str, target: &str) -> String {
        format!("{}-{}-{}", self.id_prefix(), source, target)
    }

    /// Presentation record for this kind.
    pub fn presentation(self) -> EdgeStyle {
        let (stroke, dash, path) = match self {
            EdgeKind::MultisigMember => ("#ff8800", None, "smoothstep"),
            EdgeKind::Delegation => ("#ff00ff", None, "smoothstep"),
            EdgeKind::CredentialIssuer => ("#ff0000", None, "default"),
            EdgeKind::CredentialIssuee => ("#00ff00", None, "default"),
            EdgeKind::CredentialSource => ("#0000ff", None, "default"),
            EdgeKind::RevokedCredentialLink => ("#ff4d4f", Some("5,5"), "default"),
            EdgeKind::Generic => ("#b1b1b7", None, "default"),
        };
        EdgeStyle {
            stroke: stroke.to_string(),
            stroke_width: 2,
            stroke_dasharray: dash.map(str::to_string),
            path: path.to_string(),
        }
    }

    /// Default label when the relationship does not depend on the step type.
    pub fn default_label(self) -> Option<&'static str> {
        match self {
            EdgeKind::MultisigMember => Some("Member"),
            EdgeKind::Delegation => Some("Delegation"),
            EdgeKind::CredentialIssuer => Some("Issues"),
            EdgeKind::CredentialIssuee => Some("Receives"),
            EdgeKind::CredentialSource => Some("Source"),
            EdgeKind::RevokedCredentialLink => Some("Revoked"),
            EdgeKind::Generic => None,
        }
    }
}

/// A typed relationship between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Pure function of `(kind, source, target)`.
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub style: EdgeStyle,
}

impl Edge {
    /// Builds an edge with its deterministic id and kind presentation.
    pub fn new(kind: EdgeKind, source: impl Into<String>, target: impl Into<String>, label: Option<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: kind.edge_id(&source, &target),
            label: label.or_else(|| kind.default_label().map(str::to_string)),
            style: kind.presentation(),
            source,
            target,
            kind,
        }
    }
}

/// Positioned nodes plus typed edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<ProcessedNode>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&ProcessedNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    /// Edges of one kind, in derivation order.
    pub fn edges_of(&self, kind: EdgeKind) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |edge| edge.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_identity_depends_only_on_kind_and_endpoints() {
        let first = Edge::new(EdgeKind::CredentialIssuer, "A", "S1", Some("Issues".into()));
        let second = Edge::new(EdgeKind::CredentialIssuer, "A", "S1", Some("Revokes".into()));
        assert_eq!(first.id, second.id);
        assert_eq!(first.id, "edge-issuer-credential-A-S1");
        assert_ne!(first.id, EdgeKind::CredentialIssuee.edge_id("A", "S1"));
    }

    #[test]
    fn revocation_link_is_dashed() {
        let style = EdgeKind::RevokedCredentialLink.presentation();
        assert_eq!(style.stroke_dasharray.as_deref(), Some("5,5"));
        assert!(EdgeKind::Delegation.presentation().stroke_dasharray.is_none());
    }

    #[test]
    fn node_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&NodeKind::Multisig).expect("serialize"), "\"multisig\"");
        assert_eq!(serde_json::to_string(&EdgeKind::RevokedCredentialLink).expect("serialize"), "\"revokedCredentialLink\"");
    }

    #[test]
    fn root_of_trust_changes_border_only() {
        let plain = NodePalette::Aid.style(false);
        let anchored = NodePalette::Aid.style(true);
        assert_eq!(plain.background, anchored.background);
        assert_ne!(plain.border, anchored.border);
    }
}
