//! Lifts a derived graph into builder form for further editing.

use serde_json::{Value as JsonValue, json};
use vlei_types::{
    BuilderEdge, BuilderGraph, BuilderNode, BuilderNodeConfig, BuilderNodeType, Configuration, Edge, EdgeKind, ExtensionMap, Graph,
    NodeKind, ProcessedNode, StepType,
};

/// Converts derived nodes and edges into builder nodes and edges.
///
/// Identifier nodes become `createAid` nodes keyed by the identifier, credential
/// nodes keep their step id and step fields. Exporting the result with
/// [`super::to_documents`] and deriving again yields the same node ids and edge kinds.
pub fn graph_to_builder(graph: &Graph, config: &Configuration) -> BuilderGraph {
    BuilderGraph {
        nodes: graph.nodes.iter().map(|node| lift_node(node, config)).collect(),
        edges: graph.edges.iter().map(lift_edge).collect(),
    }
}

fn lift_node(node: &ProcessedNode, config: &Configuration) -> BuilderNode {
    match node.kind {
        NodeKind::Aid | NodeKind::Multisig => identifier_node(node, config),
        NodeKind::Credential | NodeKind::Default => step_node(node, config),
    }
}

fn identifier_node(node: &ProcessedNode, config: &Configuration) -> BuilderNode {
    let identifier = config.identifiers.get(&node.id);
    let agent = identifier.and_then(|identifier| identifier.agent.clone());

    let mut workflow = ExtensionMap::new();
    workflow.insert("aid".to_string(), JsonValue::String(node.id.clone()));
    if let Some(agent) = &agent {
        workflow.insert("agent_name".to_string(), JsonValue::String(agent.clone()));
    }

    BuilderNode {
        id: node.id.clone(),
        node_type: BuilderNodeType::CreateAid,
        label: node.data.label.clone(),
        position: node.position,
        config: BuilderNodeConfig {
            aid: Some(node.id.clone()),
            agent,
            is_multisig: node.kind == NodeKind::Multisig,
            members: identifier.and_then(|identifier| identifier.members()).map(<[String]>::to_vec),
            threshold: identifier.and_then(|identifier| identifier.threshold.clone()),
            ..BuilderNodeConfig::default()
        },
        workflow,
    }
}

fn step_node(node: &ProcessedNode, config: &Configuration) -> BuilderNode {
    let data = &node.data;
    let node_type = data
        .step_type
        .as_ref()
        .map(BuilderNodeType::from)
        .unwrap_or_else(|| BuilderNodeType::Other("default".to_string()));

    let mut workflow = ExtensionMap::new();
    let fields = [
        ("description", &data.description),
        ("aid", &data.aid),
        ("agent_name", &data.agent_name),
        ("issuer_aid", &data.issuer_aid),
        ("issuee_aid", &data.issuee_aid),
        ("credential", &data.credential),
        ("credential_source", &data.credential_source),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            workflow.insert(key.to_string(), JsonValue::String(value.clone()));
        }
    }
    if let Some(attributes) = &data.attributes {
        workflow.insert("attributes".to_string(), json!(attributes));
    }
    workflow.extend(data.extensions.iter().map(|(key, value)| (key.clone(), value.clone())));

    let mut builder_config = BuilderNodeConfig::default();
    if data.step_type == Some(StepType::IssueCredential)
        && let Some(name) = &data.credential
        && let Some(record) = config.credentials.get(name)
    {
        builder_config.credential = Some(name.clone());
        builder_config.schema = record.schema.clone();
        builder_config.privacy = record.privacy;
        builder_config.attributes = record.attributes.clone();
    }

    BuilderNode {
        id: node.id.clone(),
        node_type,
        label: data.label.clone(),
        position: node.position,
        config: builder_config,
        workflow,
    }
}

fn lift_edge(edge: &Edge) -> BuilderEdge {
    let mut data = ExtensionMap::new();
    if edge.kind == EdgeKind::Delegation {
        data.insert("delegator".to_string(), JsonValue::String(edge.source.clone()));
        data.insert("delegate".to_string(), JsonValue::String(edge.target.clone()));
    }
    BuilderEdge {
        id: edge.id.clone(),
        source: edge.source.clone(),
        target: edge.target.clone(),
        edge_type: edge.kind,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::derive_graph_seeded;
    use vlei_types::WorkflowDocument;

    #[test]
    fn lifts_identifiers_and_credentials() {
        let workflow: WorkflowDocument = serde_json::from_str(
            r#"{"workflow": {"steps": {
                "S1": {"type": "issue_credential", "issuer_aid": "A", "issuee_aid": "M", "credential": "cred1", "attributes": {"LEI": "x"}}
            }}}"#,
        )
        .expect("parse workflow");
        let config: Configuration = serde_json::from_str(
            r#"{
                "credentials": {"cred1": {"type": "direct", "schema": "S", "privacy": true}},
                "identifiers": {"A": {"agent": "agent-a", "delegator": "M"}, "M": {"identifiers": ["A"], "threshold": 1}}
            }"#,
        )
        .expect("parse config");

        let derived = derive_graph_seeded(&workflow, &config, 2);
        let builder = graph_to_builder(&derived, &config);

        let aid = builder.node("A").expect("A");
        assert_eq!(aid.node_type, BuilderNodeType::CreateAid);
        assert_eq!(aid.config.agent.as_deref(), Some("agent-a"));
        assert!(!aid.config.is_multisig);

        let group = builder.node("M").expect("M");
        assert!(group.config.is_multisig);
        assert_eq!(group.config.members, Some(vec!["A".to_string()]));
        assert_eq!(group.config.threshold, Some(json!(1)));

        let credential = builder.node("S1").expect("S1");
        assert_eq!(credential.node_type, BuilderNodeType::IssueCredential);
        assert_eq!(credential.config.credential.as_deref(), Some("cred1"));
        assert_eq!(credential.config.privacy, Some(true));
        assert_eq!(credential.workflow["issuer_aid"], json!("A"));
        assert_eq!(credential.workflow["attributes"], json!({"LEI": "x"}));

        let delegation = builder
            .edges
            .iter()
            .find(|edge| edge.edge_type == EdgeKind::Delegation)
            .expect("delegation edge");
        assert_eq!(delegation.data["delegator"], json!("M"));
    }
}
