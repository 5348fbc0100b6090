//! Builder graph to (workflow, configuration) documents.
//!
//! Nodes are exported first: every node becomes one workflow step, identifier
//! nodes add configuration identifiers and issuance nodes add configuration
//! credentials. Edges are applied afterwards and only ever refine identifiers
//! that the node pass created (delegators and multisig membership).

use std::collections::HashSet;

use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value as JsonValue, json};
use tracing::{debug, warn};
use vlei_types::{
    BuilderEdge, BuilderGraph, BuilderNode, BuilderNodeType, Configuration, Credential, EdgeKind, ExtensionMap, Identifier,
    WorkflowDocument, WorkflowStep,
};

pub mod edit;
pub mod lift;

pub use edit::{ConnectOutcome, NodeUpdate, add_node, connect, promote_target_to_multisig, remove_edge, remove_node, set_edge_kind, update_node};
pub use lift::graph_to_builder;

/// Schema written for credentials that do not name one.
pub const DEFAULT_SCHEMA: &str = "DEFAULT_SCHEMA";

/// Issuance type written for builder credentials.
pub const DEFAULT_CREDENTIAL_TYPE: &str = "direct";

/// Converts the builder graph into workflow and configuration documents.
pub fn to_documents(graph: &BuilderGraph) -> (WorkflowDocument, Configuration) {
    let mut steps = IndexMap::new();
    let mut config = Configuration::default();
    let mut defaulted_thresholds: HashSet<String> = HashSet::new();

    for node in &graph.nodes {
        steps.insert(node.id.clone(), step_from_node(node));

        match node.node_type {
            BuilderNodeType::CreateAid | BuilderNodeType::CreateAidKli => {
                if let Some(aid) = non_empty(node.config.aid.as_deref()) {
                    let (identifier, defaulted) = identifier_from_node(aid, node);
                    if defaulted {
                        defaulted_thresholds.insert(aid.to_string());
                    }
                    config.identifiers.insert(aid.to_string(), identifier);
                }
            }
            BuilderNodeType::IssueCredential => {
                if let Some(name) = non_empty(node.config.credential.as_deref()) {
                    config.credentials.insert(name.to_string(), credential_from_node(node));
                }
            }
            _ => {}
        }
    }

    for edge in &graph.edges {
        match edge.edge_type {
            EdgeKind::Delegation => apply_delegation(graph, edge, &mut config),
            EdgeKind::MultisigMember => apply_membership(graph, edge, &mut config, &mut defaulted_thresholds),
            _ => {}
        }
    }

    debug!(
        target: "vlei_builder",
        steps = steps.len(),
        identifiers = config.identifiers.len(),
        credentials = config.credentials.len(),
        "exported builder graph"
    );
    (WorkflowDocument::from_steps(steps), config)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn node_aid<'a>(graph: &'a BuilderGraph, node_id: &str) -> Option<&'a str> {
    graph.node(node_id).and_then(|node| non_empty(node.config.aid.as_deref()))
}

/// Builds the step for a node. `id` and `type` always come from the node itself.
fn step_from_node(node: &BuilderNode) -> WorkflowStep {
    let step_type = node.node_type.step_type();
    let mut fields: JsonMap<String, JsonValue> = node
        .workflow
        .iter()
        .filter(|(key, _)| key.as_str() != "id" && key.as_str() != "type")
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    fields.insert("id".to_string(), JsonValue::String(node.id.clone()));
    fields.insert("type".to_string(), JsonValue::String(step_type.as_str().to_string()));

    match serde_json::from_value::<WorkflowStep>(JsonValue::Object(fields)) {
        Ok(step) => step,
        Err(error) => {
            warn!(target: "vlei_builder", node = %node.id, error = %error, "step fields have unexpected shapes; keeping them as extensions");
            let mut step = WorkflowStep::new(node.id.clone(), step_type);
            step.extensions = node
                .workflow
                .iter()
                .filter(|(key, _)| key.as_str() != "id" && key.as_str() != "type")
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect::<ExtensionMap>();
            step
        }
    }
}

/// Returns the identifier and whether its threshold was defaulted.
fn identifier_from_node(aid: &str, node: &BuilderNode) -> (Identifier, bool) {
    let mut identifier = Identifier {
        name: Some(aid.to_string()),
        agent: Some(
            non_empty(node.config.agent.as_deref())
                .map(str::to_string)
                .unwrap_or_else(|| format!("{aid}-agent")),
        ),
        ..Identifier::default()
    };

    let mut defaulted = false;
    if node.config.is_multisig
        && let Some(members) = node.config.members.as_ref().filter(|members| !members.is_empty())
    {
        let mut unique: Vec<String> = Vec::with_capacity(members.len());
        for member in members {
            if !unique.contains(member) {
                unique.push(member.clone());
            }
        }
        identifier.threshold = Some(match &node.config.threshold {
            Some(threshold) if !threshold.is_null() => threshold.clone(),
            _ => {
                defaulted = true;
                json!(unique.len())
            }
        });
        identifier.identifiers = Some(unique);
    }
    (identifier, defaulted)
}

fn credential_from_node(node: &BuilderNode) -> Credential {
    Credential {
        credential_type: Some(DEFAULT_CREDENTIAL_TYPE.to_string()),
        schema: Some(
            non_empty(node.config.schema.as_deref())
                .unwrap_or(DEFAULT_SCHEMA)
                .to_string(),
        ),
        privacy: Some(node.config.privacy.unwrap_or(false)),
        attributes: Some(node.config.attributes.clone().unwrap_or_default()),
        ..Credential::default()
    }
}

fn apply_delegation(graph: &BuilderGraph, edge: &BuilderEdge, config: &mut Configuration) {
    let delegator = edge
        .data
        .get("delegator")
        .and_then(JsonValue::as_str)
        .and_then(|value| non_empty(Some(value)))
        .or_else(|| node_aid(graph, &edge.source));
    let Some(delegator) = delegator else {
        debug!(target: "vlei_builder", edge = %edge.id, "delegation edge names no delegator");
        return;
    };
    let Some(identifier) = node_aid(graph, &edge.target).and_then(|aid| config.identifiers.get_mut(aid)) else {
        debug!(target: "vlei_builder", edge = %edge.id, "delegation target has no identifier");
        return;
    };
    identifier.delegator = Some(delegator.to_string());
}

fn apply_membership(graph: &BuilderGraph, edge: &BuilderEdge, config: &mut Configuration, defaulted: &mut HashSet<String>) {
    let (Some(member), Some(group)) = (node_aid(graph, &edge.source), node_aid(graph, &edge.target)) else {
        debug!(target: "vlei_builder", edge = %edge.id, "membership edge endpoint has no aid");
        return;
    };
    let Some(identifier) = config.identifiers.get_mut(group) else {
        debug!(target: "vlei_builder", edge = %edge.id, group, "membership target has no identifier");
        return;
    };

    let members = identifier.identifiers.get_or_insert_with(Vec::new);
    if identifier.threshold.is_none() {
        identifier.threshold = Some(json!(1));
        defaulted.insert(group.to_string());
    }
    if !members.iter().any(|existing| existing == member) {
        members.push(member.to_string());
    }
    if defaulted.contains(group) {
        identifier.threshold = Some(json!(members.len()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vlei_types::{BuilderNodeConfig, Position, StepType};

    fn aid_node(id: &str, aid: &str) -> BuilderNode {
        BuilderNode {
            id: id.to_string(),
            node_type: BuilderNodeType::CreateAid,
            label: String::new(),
            position: Position::default(),
            config: BuilderNodeConfig {
                aid: Some(aid.to_string()),
                ..BuilderNodeConfig::default()
            },
            workflow: ExtensionMap::new(),
        }
    }

    fn edge(id: &str, source: &str, target: &str, kind: EdgeKind) -> BuilderEdge {
        BuilderEdge {
            id: id.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            edge_type: kind,
            data: ExtensionMap::new(),
        }
    }

    #[test]
    fn every_node_becomes_a_step_with_node_identity() {
        let mut node = aid_node("createAid_1", "gleif");
        node.workflow.insert("id".into(), json!("spoofed"));
        node.workflow.insert("type".into(), json!("issue_credential"));
        node.workflow.insert("agent_name".into(), json!("gleif-agent"));
        node.workflow.insert("timeout".into(), json!(30));
        let graph = BuilderGraph {
            nodes: vec![node],
            edges: Vec::new(),
        };

        let (workflow, config) = to_documents(&graph);
        let step = &workflow.steps().expect("steps")["createAid_1"];
        assert_eq!(step.id.as_deref(), Some("createAid_1"));
        assert_eq!(step.step_type, StepType::CreateAid);
        assert_eq!(step.agent_name.as_deref(), Some("gleif-agent"));
        assert_eq!(step.extensions["timeout"], json!(30));

        let identifier = &config.identifiers["gleif"];
        assert_eq!(identifier.name.as_deref(), Some("gleif"));
        assert_eq!(identifier.agent.as_deref(), Some("gleif-agent"));
        assert!(identifier.identifiers.is_none());
    }

    #[test]
    fn multisig_threshold_defaults_to_member_count() {
        let mut node = aid_node("m", "group");
        node.config.is_multisig = true;
        node.config.members = Some(vec!["a".into(), "b".into(), "a".into()]);
        let mut weighted = aid_node("w", "weighted");
        weighted.config.is_multisig = true;
        weighted.config.members = Some(vec!["a".into()]);
        weighted.config.threshold = Some(json!(["1/2", "1/2"]));

        let (_, config) = to_documents(&BuilderGraph {
            nodes: vec![node, weighted],
            edges: Vec::new(),
        });
        assert_eq!(config.identifiers["group"].identifiers, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(config.identifiers["group"].threshold, Some(json!(2)));
        assert_eq!(config.identifiers["weighted"].threshold, Some(json!(["1/2", "1/2"])));
    }

    #[test]
    fn issuance_nodes_define_credentials_with_defaults() {
        let mut node = aid_node("issueCredential_1", "unused");
        node.node_type = BuilderNodeType::IssueCredential;
        node.config.credential = Some("qvi_cred".into());
        let (workflow, config) = to_documents(&BuilderGraph {
            nodes: vec![node],
            edges: Vec::new(),
        });

        let credential = &config.credentials["qvi_cred"];
        assert_eq!(credential.credential_type.as_deref(), Some("direct"));
        assert_eq!(credential.schema.as_deref(), Some(DEFAULT_SCHEMA));
        assert_eq!(credential.privacy, Some(false));
        assert_eq!(credential.attributes, Some(IndexMap::new()));
        assert!(config.identifiers.is_empty());
        assert_eq!(workflow.steps().expect("steps")["issueCredential_1"].step_type, StepType::IssueCredential);
    }

    #[test]
    fn delegation_edge_sets_target_delegator() {
        let mut delegation = edge("d", "n1", "n2", EdgeKind::Delegation);
        delegation.data.insert("delegator".into(), json!("geda"));
        let fallback = edge("f", "n1", "n3", EdgeKind::Delegation);
        let graph = BuilderGraph {
            nodes: vec![aid_node("n1", "root"), aid_node("n2", "child"), aid_node("n3", "other")],
            edges: vec![delegation, fallback],
        };

        let (_, config) = to_documents(&graph);
        assert_eq!(config.identifiers["child"].delegator.as_deref(), Some("geda"));
        assert_eq!(config.identifiers["other"].delegator.as_deref(), Some("root"));
        assert!(config.identifiers["root"].delegator.is_none());
    }

    #[test]
    fn membership_edges_are_deduplicated() {
        let graph = BuilderGraph {
            nodes: vec![aid_node("n1", "a"), aid_node("n2", "b"), aid_node("n3", "group")],
            edges: vec![
                edge("e1", "n1", "n3", EdgeKind::MultisigMember),
                edge("e2", "n1", "n3", EdgeKind::MultisigMember),
                edge("e3", "n2", "n3", EdgeKind::MultisigMember),
            ],
        };

        let (_, config) = to_documents(&graph);
        let group = &config.identifiers["group"];
        assert_eq!(group.identifiers, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(group.threshold, Some(json!(2)));
        assert!(group.is_multisig());
    }

    #[test]
    fn explicit_threshold_survives_membership_edges() {
        let mut group = aid_node("n2", "group");
        group.config.is_multisig = true;
        group.config.members = Some(vec!["a".into()]);
        group.config.threshold = Some(json!(1));
        let graph = BuilderGraph {
            nodes: vec![aid_node("n1", "b"), group],
            edges: vec![edge("e", "n1", "n2", EdgeKind::MultisigMember)],
        };

        let (_, config) = to_documents(&graph);
        assert_eq!(config.identifiers["group"].identifiers, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(config.identifiers["group"].threshold, Some(json!(1)));
    }

    #[test]
    fn membership_edge_to_non_identifier_is_ignored() {
        let mut credential = aid_node("c", "ignored");
        credential.node_type = BuilderNodeType::IssueCredential;
        let graph = BuilderGraph {
            nodes: vec![aid_node("n1", "a"), credential],
            edges: vec![edge("e", "n1", "c", EdgeKind::MultisigMember)],
        };
        let (_, config) = to_documents(&graph);
        assert!(config.identifiers["a"].identifiers.is_none());
        assert!(!config.identifiers.contains_key("ignored"));
    }
}
