//! Node extraction from configuration identifiers and credential steps.

use std::collections::BTreeSet;

use serde_json::Value as JsonValue;
use tracing::debug;
use vlei_types::{Configuration, NodeData, NodeKind, NodePalette, Position, ProcessedNode, StepType, WorkflowStep};

use super::FilteredSteps;
use super::resolve::{multisig_memberships, resolve_agent_secret, resolve_credential_record};

/// Serialized `NodeData` keys; step extensions with these names are not copied.
const RESERVED_DATA_KEYS: &[&str] = &[
    "label",
    "description",
    "type",
    "stepType",
    "delegator",
    "agent-secret",
    "members",
    "isRootOfTrust",
    "isMultisig",
    "isMemberOfMultisig",
    "aid",
    "agent_name",
    "issuer_aid",
    "issuee_aid",
    "credential",
    "credential_source",
    "attributes",
    "credType",
    "credSchema",
    "credPrivacy",
    "credRules",
    "style",
];

/// One node per configuration identifier: plain AIDs first, then multisig groups,
/// each in configuration order.
pub fn identifier_nodes(config: &Configuration, roots_of_trust: &BTreeSet<String>) -> Vec<ProcessedNode> {
    let memberships = multisig_memberships(config);
    let (multisig, plain): (Vec<_>, Vec<_>) = config.identifiers.iter().partition(|(_, identifier)| identifier.is_multisig());

    plain
        .into_iter()
        .chain(multisig)
        .map(|(key, identifier)| {
            let is_multisig = identifier.is_multisig();
            let root_of_trust = roots_of_trust.contains(key);
            let (kind, palette, description, type_label) = if is_multisig {
                (NodeKind::Multisig, NodePalette::Multisig, format!("Multisig AID: {key}"), "Multisig")
            } else {
                (NodeKind::Aid, NodePalette::Aid, format!("AID: {key}"), "AID")
            };

            let mut data = NodeData::new(identifier.name.clone().unwrap_or_else(|| key.clone()), palette);
            data.description = Some(description);
            data.type_label = Some(type_label.to_string());
            data.delegator = identifier.delegator.clone();
            data.agent_secret = resolve_agent_secret(identifier, config).map(str::to_string);
            data.members = identifier.members().map(<[String]>::to_vec);
            data.is_multisig = is_multisig;
            data.is_member_of_multisig = memberships.contains_key(key.as_str());
            data.is_root_of_trust = root_of_trust;
            data.style = palette.style(root_of_trust);

            ProcessedNode {
                id: key.clone(),
                kind,
                position: Position::default(),
                data,
            }
        })
        .collect()
}

/// One node per credential step, carrying the step's fields plus configuration lookups.
pub fn credential_nodes(filtered: &FilteredSteps<'_>, config: &Configuration) -> Vec<ProcessedNode> {
    filtered
        .credential_steps
        .iter()
        .filter_map(|(id, step)| credential_node(id, step, config))
        .collect()
}

fn credential_node(id: &str, step: &WorkflowStep, config: &Configuration) -> Option<ProcessedNode> {
    let shown = step.credential.as_deref().unwrap_or(id);
    let (label, palette) = match step.step_type {
        StepType::IssueCredential => (shown.to_string(), NodePalette::IssuedCredential),
        StepType::RevokeCredential => (format!("Revoked: {shown}"), NodePalette::RevokedCredential),
        _ => return None,
    };

    let mut data = NodeData::new(label, palette);
    data.step_type = Some(step.step_type.clone());
    data.description = step.description.clone();
    data.aid = step.aid.clone();
    data.agent_name = step.agent_name.clone();
    data.issuer_aid = step.issuer_aid.clone();
    data.issuee_aid = step.issuee_aid.clone();
    data.credential = step.credential.clone();
    data.credential_source = step.credential_source.clone();
    data.attributes = step.attributes.clone();
    if let Some(rot_aid) = &step.rot_aid {
        data.extensions.insert("rot_aid".to_string(), JsonValue::String(rot_aid.clone()));
    }
    for (key, value) in &step.extensions {
        if RESERVED_DATA_KEYS.contains(&key.as_str()) {
            debug!(target: "vlei_derive", step = id, key = %key, "step extension shadows a node field; skipped");
            continue;
        }
        data.extensions.insert(key.clone(), value.clone());
    }

    match resolve_credential_record(step, config) {
        Some(record) => {
            data.cred_type = record.credential_type.clone();
            data.cred_schema = record.schema.clone();
            data.cred_privacy = record.privacy;
            data.cred_rules = record.rules.clone();
        }
        None if step.step_type == StepType::IssueCredential => {
            debug!(target: "vlei_derive", step = id, credential = ?step.credential, "no configuration credential for step");
        }
        None => {}
    }

    Some(ProcessedNode {
        id: id.to_string(),
        kind: NodeKind::Credential,
        position: Position::default(),
        data,
    })
}
