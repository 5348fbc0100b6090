//! Edge derivation over positioned nodes.
//!
//! Edges are emitted in a fixed precedence: multisig membership, delegation,
//! then per credential node its issuer, issuee, provenance and revocation
//! links. An edge is emitted only when both endpoints resolve, and each id is
//! emitted at most once.

use std::collections::HashSet;

use tracing::debug;
use vlei_types::{Configuration, Edge, EdgeKind, NodeKind, ProcessedNode, StepType};

use super::resolve::{find_identifier_node, resolve_step_or_name};

struct EdgeSet {
    edges: Vec<Edge>,
    seen: HashSet<String>,
}

impl EdgeSet {
    fn push(&mut self, edge: Edge) {
        if self.seen.insert(edge.id.clone()) {
            self.edges.push(edge);
        } else {
            debug!(target: "vlei_derive", edge = %edge.id, "duplicate edge suppressed");
        }
    }
}

pub fn derive_edges(nodes: &[ProcessedNode], config: &Configuration) -> Vec<Edge> {
    let mut set = EdgeSet {
        edges: Vec::new(),
        seen: HashSet::new(),
    };
    membership_edges(nodes, config, &mut set);
    delegation_edges(nodes, config, &mut set);
    for node in nodes.iter().filter(|node| node.kind == NodeKind::Credential) {
        credential_edges(node, nodes, &mut set);
    }
    set.edges
}

fn membership_edges(nodes: &[ProcessedNode], config: &Configuration, set: &mut EdgeSet) {
    for (multisig_key, identifier) in &config.identifiers {
        let Some(members) = identifier.members() else { continue };
        let Some(group) = find_identifier_node(nodes, multisig_key) else {
            debug!(target: "vlei_derive", multisig = %multisig_key, "no node for multisig group");
            continue;
        };
        for member in members {
            match find_identifier_node(nodes, member) {
                Some(member_node) => set.push(Edge::new(EdgeKind::MultisigMember, &member_node.id, &group.id, None)),
                None => debug!(target: "vlei_derive", multisig = %multisig_key, member = %member, "no node for multisig member"),
            }
        }
    }
}

fn delegation_edges(nodes: &[ProcessedNode], config: &Configuration, set: &mut EdgeSet) {
    for (delegate_key, identifier) in &config.identifiers {
        let Some(delegator) = identifier.delegator.as_deref() else { continue };
        match (find_identifier_node(nodes, delegator), find_identifier_node(nodes, delegate_key)) {
            (Some(from), Some(to)) => set.push(Edge::new(EdgeKind::Delegation, &from.id, &to.id, None)),
            (from, to) => debug!(
                target: "vlei_derive",
                delegator,
                delegate = %delegate_key,
                delegator_found = from.is_some(),
                delegate_found = to.is_some(),
                "delegation endpoint missing"
            ),
        }
    }
}

fn credential_edges(node: &ProcessedNode, nodes: &[ProcessedNode], set: &mut EdgeSet) {
    let revocation = node.data.step_type == Some(StepType::RevokeCredential);

    if let Some(issuer) = node.data.issuer_aid.as_deref() {
        match find_identifier_node(nodes, issuer) {
            Some(from) => {
                let label = if revocation { "Revokes" } else { "Issues" };
                set.push(Edge::new(EdgeKind::CredentialIssuer, &from.id, &node.id, Some(label.to_string())));
            }
            None => debug!(target: "vlei_derive", step = %node.id, issuer, "issuer identifier not found"),
        }
    }

    if let Some(issuee) = node.data.issuee_aid.as_deref() {
        match find_identifier_node(nodes, issuee) {
            Some(from) => {
                let label = if revocation { "Revoked" } else { "Receives" };
                set.push(Edge::new(EdgeKind::CredentialIssuee, &from.id, &node.id, Some(label.to_string())));
            }
            None => debug!(target: "vlei_derive", step = %node.id, issuee, "issuee identifier not found"),
        }
    }

    if node.data.step_type == Some(StepType::IssueCredential)
        && let Some(source) = node.data.credential_source.as_deref()
    {
        match resolve_step_or_name(nodes, source, &node.id) {
            Some(from) => set.push(Edge::new(EdgeKind::CredentialSource, &from.id, &node.id, None)),
            None => debug!(target: "vlei_derive", step = %node.id, source, "credential source not found"),
        }
    }

    if revocation && let Some(revoked) = node.data.credential.as_deref() {
        match resolve_step_or_name(nodes, revoked, &node.id) {
            Some(from) => set.push(Edge::new(EdgeKind::RevokedCredentialLink, &from.id, &node.id, None)),
            None => debug!(target: "vlei_derive", step = %node.id, credential = revoked, "revoked credential not found"),
        }
    }
}
