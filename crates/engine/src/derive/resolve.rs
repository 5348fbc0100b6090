//! Cross-document resolvers.
//!
//! Each join between the workflow and the configuration lives in its own
//! function so every fallback can be exercised in isolation. Resolvers never
//! fail; a miss is `None`.

use indexmap::IndexMap;
use vlei_types::{Configuration, Credential, Identifier, NodeKind, ProcessedNode, WorkflowStep};

/// Follows identifier -> agent -> secret. Any missing hop yields `None`.
pub fn resolve_agent_secret<'a>(identifier: &Identifier, config: &'a Configuration) -> Option<&'a str> {
    let agent = config.agents.get(identifier.agent.as_deref()?)?;
    config.secrets.get(agent.secret.as_deref()?).map(String::as_str)
}

/// Maps each member key to the multisig identifiers listing it, in configuration order.
pub fn multisig_memberships(config: &Configuration) -> IndexMap<&str, Vec<&str>> {
    let mut memberships: IndexMap<&str, Vec<&str>> = IndexMap::new();
    for (multisig_key, identifier) in &config.identifiers {
        for member in identifier.members().unwrap_or_default() {
            let groups = memberships.entry(member.as_str()).or_default();
            if !groups.contains(&multisig_key.as_str()) {
                groups.push(multisig_key.as_str());
            }
        }
    }
    memberships
}

/// Configuration credential named by a step's `credential` field.
pub fn resolve_credential_record<'a>(step: &WorkflowStep, config: &'a Configuration) -> Option<&'a Credential> {
    config.credentials.get(step.credential.as_deref()?)
}

/// Identifier-backed node (plain AID or multisig) with the given key.
pub fn find_identifier_node<'a>(nodes: &'a [ProcessedNode], key: &str) -> Option<&'a ProcessedNode> {
    nodes.iter().find(|node| node.kind.is_identifier() && node.id == key)
}

/// Credential node whose id is the given step id.
pub fn find_node_by_id<'a>(nodes: &'a [ProcessedNode], step_id: &str) -> Option<&'a ProcessedNode> {
    nodes.iter().find(|node| node.kind == NodeKind::Credential && node.id == step_id)
}

/// First credential node, other than `exclude`, whose `credential` field equals `name`.
pub fn find_credential_by_name<'a>(nodes: &'a [ProcessedNode], name: &str, exclude: &str) -> Option<&'a ProcessedNode> {
    nodes.iter().find(|node| {
        node.kind == NodeKind::Credential && node.id != exclude && node.data.credential.as_deref() == Some(name)
    })
}

/// Resolves a reference first as a step id, then as a credential name.
///
/// `referrer` is the node doing the lookup; it never resolves to itself.
pub fn resolve_step_or_name<'a>(nodes: &'a [ProcessedNode], reference: &str, referrer: &str) -> Option<&'a ProcessedNode> {
    find_node_by_id(nodes, reference)
        .filter(|node| node.id != referrer)
        .or_else(|| find_credential_by_name(nodes, reference, referrer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vlei_types::{Agent, NodeData, NodePalette, Position};

    fn credential_node(id: &str, credential: Option<&str>) -> ProcessedNode {
        let mut data = NodeData::new(id, NodePalette::IssuedCredential);
        data.credential = credential.map(str::to_string);
        ProcessedNode {
            id: id.to_string(),
            kind: NodeKind::Credential,
            position: Position::default(),
            data,
        }
    }

    fn aid_node(id: &str) -> ProcessedNode {
        ProcessedNode {
            id: id.to_string(),
            kind: NodeKind::Aid,
            position: Position::default(),
            data: NodeData::new(id, NodePalette::Aid),
        }
    }

    #[test]
    fn agent_secret_requires_every_hop() {
        let mut config = Configuration::default();
        config.secrets.insert("s1".into(), "secret-value".into());
        config.agents.insert(
            "agent-1".into(),
            Agent {
                secret: Some("s1".into()),
                ..Agent::default()
            },
        );
        config.agents.insert(
            "agent-2".into(),
            Agent {
                secret: Some("missing".into()),
                ..Agent::default()
            },
        );

        let with_agent = |agent: Option<&str>| Identifier {
            agent: agent.map(str::to_string),
            ..Identifier::default()
        };
        assert_eq!(resolve_agent_secret(&with_agent(Some("agent-1")), &config), Some("secret-value"));
        assert_eq!(resolve_agent_secret(&with_agent(Some("agent-2")), &config), None);
        assert_eq!(resolve_agent_secret(&with_agent(Some("nobody")), &config), None);
        assert_eq!(resolve_agent_secret(&with_agent(None), &config), None);
    }

    #[test]
    fn memberships_list_every_group() {
        let config: Configuration = serde_json::from_str(
            r#"{"identifiers": {
                "A": {}, "B": {},
                "M1": {"identifiers": ["A", "B"]},
                "M2": {"identifiers": ["A", "A"]}
            }}"#,
        )
        .expect("parse");
        let memberships = multisig_memberships(&config);
        assert_eq!(memberships["A"], vec!["M1", "M2"]);
        assert_eq!(memberships["B"], vec!["M1"]);
        assert!(!memberships.contains_key("M1"));
    }

    #[test]
    fn id_match_wins_over_name_match() {
        let nodes = vec![credential_node("S1", Some("cred1")), credential_node("cred1", Some("other"))];
        let resolved = resolve_step_or_name(&nodes, "cred1", "S9").expect("resolved");
        assert_eq!(resolved.id, "cred1");
    }

    #[test]
    fn name_match_is_the_fallback() {
        let nodes = vec![credential_node("S1", Some("cred1")), credential_node("S2", Some("cred2"))];
        assert!(find_node_by_id(&nodes, "cred2").is_none());
        assert_eq!(resolve_step_or_name(&nodes, "cred2", "S9").map(|node| node.id.as_str()), Some("S2"));
        assert!(resolve_step_or_name(&nodes, "cred3", "S9").is_none());
    }

    #[test]
    fn referrer_never_resolves_to_itself() {
        let nodes = vec![credential_node("S1", Some("cred1")), credential_node("S2", Some("cred1"))];
        assert_eq!(find_credential_by_name(&nodes, "cred1", "S1").map(|node| node.id.as_str()), Some("S2"));
        assert!(resolve_step_or_name(&nodes[..1], "cred1", "S1").is_none());
        assert!(resolve_step_or_name(&nodes[..1], "S1", "S1").is_none());
    }

    #[test]
    fn id_lookups_ignore_non_credential_nodes() {
        let nodes = vec![aid_node("A"), credential_node("S1", None)];
        assert!(find_node_by_id(&nodes, "A").is_none());
        assert_eq!(find_identifier_node(&nodes, "A").map(|node| node.id.as_str()), Some("A"));
        assert!(find_identifier_node(&nodes, "S1").is_none());
    }
}
