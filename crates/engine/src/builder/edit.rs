//! Interactive edits on a builder graph.

use tracing::{debug, info};
use vlei_types::{BuilderEdge, BuilderGraph, BuilderNode, BuilderNodeConfig, BuilderNodeType, EdgeKind, ExtensionMap, Position};

/// Result of connecting two builder nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOutcome {
    /// Edge to open for property editing.
    pub edge_id: String,
    /// False when the connection already existed.
    pub created: bool,
    /// True when the target was promoted to a multisig group.
    pub promoted: bool,
}

/// Partial node update; absent fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeUpdate {
    pub label: Option<String>,
    pub position: Option<Position>,
    pub config: Option<BuilderNodeConfig>,
    /// Merged key by key into the node's workflow bag.
    pub workflow: Option<ExtensionMap>,
}

/// Connects `source` to `target` with a generic edge.
///
/// Connecting always runs [`promote_target_to_multisig`], whatever kind the
/// edge is later given. Returns `None` when an endpoint is missing or both are
/// the same node.
pub fn connect(graph: &mut BuilderGraph, source: &str, target: &str) -> Option<ConnectOutcome> {
    if source == target || graph.node(source).is_none() || graph.node(target).is_none() {
        debug!(target: "vlei_builder", source, target, "connect ignored");
        return None;
    }

    let edge_id = format!("{source}-{target}");
    let created = graph.edge(&edge_id).is_none();
    if created {
        graph.edges.push(BuilderEdge {
            id: edge_id.clone(),
            source: source.to_string(),
            target: target.to_string(),
            edge_type: EdgeKind::Generic,
            data: ExtensionMap::new(),
        });
    }
    let promoted = promote_target_to_multisig(graph, source, target);
    Some(ConnectOutcome {
        edge_id,
        created,
        promoted,
    })
}

/// Marks `target` as a multisig and adds the source's aid to its members.
///
/// Applies only when the source carries an aid. Members are never duplicated.
pub fn promote_target_to_multisig(graph: &mut BuilderGraph, source: &str, target: &str) -> bool {
    let Some(member) = graph.node(source).and_then(|node| node.config.aid.clone()).filter(|aid| !aid.trim().is_empty()) else {
        return false;
    };
    let Some(node) = graph.node_mut(target) else {
        return false;
    };

    node.config.is_multisig = true;
    let members = node.config.members.get_or_insert_with(Vec::new);
    if !members.contains(&member) {
        members.push(member.clone());
    }
    info!(target: "vlei_builder", member = %member, group = %node.id, "target promoted to multisig");
    true
}

/// Saves edge properties: sets the kind and merges `data` into the edge's bag.
///
/// Saving a `multisigMember` edge runs the same promotion as connecting.
pub fn set_edge_kind(graph: &mut BuilderGraph, edge_id: &str, kind: EdgeKind, data: ExtensionMap) -> bool {
    let Some(edge) = graph.edge_mut(edge_id) else {
        return false;
    };
    edge.edge_type = kind;
    edge.data.extend(data);
    let (source, target) = (edge.source.clone(), edge.target.clone());

    if kind == EdgeKind::MultisigMember {
        promote_target_to_multisig(graph, &source, &target);
    }
    true
}

/// Adds a node of `node_type` and returns its id (`<nodeType>_<n>`).
pub fn add_node(graph: &mut BuilderGraph, node_type: BuilderNodeType, position: Position) -> String {
    let mut counter = graph.nodes.len() + 1;
    let mut id = format!("{}_{}", node_type.as_str(), counter);
    while graph.node(&id).is_some() {
        counter += 1;
        id = format!("{}_{}", node_type.as_str(), counter);
    }

    graph.nodes.push(BuilderNode {
        id: id.clone(),
        label: node_type.default_label(),
        node_type,
        position,
        config: BuilderNodeConfig::default(),
        workflow: ExtensionMap::new(),
    });
    id
}

/// Removes a node together with every edge touching it.
pub fn remove_node(graph: &mut BuilderGraph, node_id: &str) -> bool {
    let before = graph.nodes.len();
    graph.nodes.retain(|node| node.id != node_id);
    if graph.nodes.len() == before {
        return false;
    }
    graph.edges.retain(|edge| edge.source != node_id && edge.target != node_id);
    true
}

pub fn remove_edge(graph: &mut BuilderGraph, edge_id: &str) -> bool {
    let before = graph.edges.len();
    graph.edges.retain(|edge| edge.id != edge_id);
    graph.edges.len() != before
}

pub fn update_node(graph: &mut BuilderGraph, node_id: &str, update: NodeUpdate) -> bool {
    let Some(node) = graph.node_mut(node_id) else {
        return false;
    };
    if let Some(label) = update.label {
        node.label = label;
    }
    if let Some(position) = update.position {
        node.position = position;
    }
    if let Some(config) = update.config {
        node.config = config;
    }
    if let Some(workflow) = update.workflow {
        node.workflow.extend(workflow);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn graph_with_aids() -> BuilderGraph {
        let mut graph = BuilderGraph::default();
        for aid in ["a", "b", "group"] {
            let id = add_node(&mut graph, BuilderNodeType::CreateAid, Position::default());
            let config = BuilderNodeConfig {
                aid: Some(aid.to_string()),
                ..BuilderNodeConfig::default()
            };
            update_node(
                &mut graph,
                &id,
                NodeUpdate {
                    config: Some(config),
                    ..NodeUpdate::default()
                },
            );
        }
        graph
    }

    #[test]
    fn add_node_uses_type_tag_and_unique_counter() {
        let mut graph = BuilderGraph::default();
        let first = add_node(&mut graph, BuilderNodeType::IssueCredential, Position::new(250.0, 250.0));
        let second = add_node(&mut graph, BuilderNodeType::IssueCredential, Position::new(250.0, 250.0));
        assert_eq!(first, "issueCredential_1");
        assert_eq!(second, "issueCredential_2");
        assert_eq!(graph.nodes[0].label, "Issue Credential");

        remove_node(&mut graph, &first);
        let third = add_node(&mut graph, BuilderNodeType::IssueCredential, Position::default());
        assert_eq!(third, "issueCredential_3");
    }

    #[test]
    fn connecting_aid_nodes_promotes_target() {
        let mut graph = graph_with_aids();
        let outcome = connect(&mut graph, "createAid_1", "createAid_3").expect("connected");
        assert_eq!(outcome.edge_id, "createAid_1-createAid_3");
        assert!(outcome.created && outcome.promoted);

        let again = connect(&mut graph, "createAid_1", "createAid_3").expect("connected");
        assert!(!again.created);
        assert_eq!(graph.edges.len(), 1);

        let target = graph.node("createAid_3").expect("target");
        assert!(target.config.is_multisig);
        assert_eq!(target.config.members, Some(vec!["a".to_string()]));
    }

    #[test]
    fn connect_rejects_missing_or_self_endpoints() {
        let mut graph = graph_with_aids();
        assert!(connect(&mut graph, "createAid_1", "createAid_1").is_none());
        assert!(connect(&mut graph, "createAid_1", "ghost").is_none());
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn source_without_aid_does_not_promote() {
        let mut graph = graph_with_aids();
        let credential = add_node(&mut graph, BuilderNodeType::IssueCredential, Position::default());
        let outcome = connect(&mut graph, &credential, "createAid_2").expect("connected");
        assert!(!outcome.promoted);
        assert!(!graph.node("createAid_2").expect("node").config.is_multisig);
    }

    #[test]
    fn saving_member_edge_promotes_once() {
        let mut graph = graph_with_aids();
        let outcome = connect(&mut graph, "createAid_2", "createAid_3").expect("connected");
        let mut data = ExtensionMap::new();
        data.insert("note".into(), json!("member"));
        assert!(set_edge_kind(&mut graph, &outcome.edge_id, EdgeKind::MultisigMember, data));

        let edge = graph.edge(&outcome.edge_id).expect("edge");
        assert_eq!(edge.edge_type, EdgeKind::MultisigMember);
        assert_eq!(edge.data["note"], json!("member"));
        assert_eq!(graph.node("createAid_3").expect("node").config.members, Some(vec!["b".to_string()]));
        assert!(!set_edge_kind(&mut graph, "missing", EdgeKind::Delegation, ExtensionMap::new()));
    }

    #[test]
    fn removing_a_node_drops_incident_edges() {
        let mut graph = graph_with_aids();
        connect(&mut graph, "createAid_1", "createAid_3");
        connect(&mut graph, "createAid_2", "createAid_3");
        assert!(remove_node(&mut graph, "createAid_1"));
        assert_eq!(graph.edges.len(), 1);
        assert!(remove_edge(&mut graph, "createAid_2-createAid_3"));
        assert!(!remove_edge(&mut graph, "createAid_2-createAid_3"));
        assert!(!remove_node(&mut graph, "createAid_1"));
    }
}
