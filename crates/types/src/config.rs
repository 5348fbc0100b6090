//! Environment configuration schema.
//!
//! The configuration lists the secrets, agents, identifiers (AIDs), and
//! credential definitions a workflow refers to. Identifiers with a member list
//! are multisig groups; an identifier with a `delegator` is anchored under
//! another identifier.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::ExtensionMap;

/// Environment configuration consumed alongside a workflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Configuration {
    /// Secret name to secret value.
    #[serde(default)]
    pub secrets: IndexMap<String, String>,
    /// Credential definitions keyed by credential name.
    #[serde(default)]
    pub credentials: IndexMap<String, Credential>,
    /// Agents keyed by agent name.
    #[serde(default)]
    pub agents: IndexMap<String, Agent>,
    /// Identifiers keyed by identifier key.
    #[serde(default)]
    pub identifiers: IndexMap<String, Identifier>,
    /// Users grouping identifiers under an alias.
    #[serde(default)]
    pub users: Vec<User>,
    /// Unrecognised top-level fields.
    #[serde(flatten)]
    pub extensions: ExtensionMap,
}

/// Credential definition referenced by issuance steps.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Credential {
    /// Issuance type (for example `direct`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub credential_type: Option<String>,
    /// Schema SAID or placeholder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Whether the credential is issued privately.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy: Option<bool>,
    /// Default credential attributes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<IndexMap<String, JsonValue>>,
    /// Edge block describing the source credential.
    #[serde(rename = "credSource", default, skip_serializing_if = "Option::is_none")]
    pub cred_source: Option<JsonValue>,
    /// Rules block attached to the credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<JsonValue>,
    /// Unrecognised credential fields.
    #[serde(flatten)]
    pub extensions: ExtensionMap,
}

/// Agent definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Agent {
    /// Name of the secret (in [`Configuration::secrets`]) this agent boots with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    /// Unrecognised agent fields.
    #[serde(flatten)]
    pub extensions: ExtensionMap,
}

/// Identifier (AID) record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Identifier {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Agent name (in [`Configuration::agents`]) that controls this identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    /// Identifier key of the delegator, when delegated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegator: Option<String>,
    /// Member identifier keys when this identifier is a multisig group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifiers: Option<Vec<String>>,
    /// Signing threshold for multisig groups (number or weighted list).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<JsonValue>,
    /// Unrecognised identifier fields.
    #[serde(flatten)]
    pub extensions: ExtensionMap,
}

/// User grouping a set of identifiers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// User role (for example `GLEIF` or `QVI`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
    /// Human-readable alias.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Identifier keys owned by this user.
    #[serde(default)]
    pub identifiers: Vec<String>,
    /// Unrecognised user fields.
    #[serde(flatten)]
    pub extensions: ExtensionMap,
}

impl Identifier {
    /// Returns the member list when this identifier is a multisig group.
    pub fn members(&self) -> Option<&[String]> {
        self.identifiers.as_deref().filter(|members| !members.is_empty())
    }

    /// Returns true when the identifier carries a non-empty member list.
    pub fn is_multisig(&self) -> bool {
        self.members().is_some()
    }
}

impl Configuration {
    /// Returns true when nothing at all is configured.
    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
            && self.credentials.is_empty()
            && self.agents.is_empty()
            && self.identifiers.is_empty()
            && self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "secrets": { "gleif1": "D_PbQb01zuzQgK-kDWjqy" },
        "credentials": {
            "gleif_to_qvi_vlei_cred": {
                "type": "direct",
                "schema": "EBfdlu8R27Fbx-ehrqwImnK-8Cm79sqbAQ4MmvEAYqao",
                "privacy": false,
                "attributes": { "LEI": "254900OPPU84GM83MG36" },
                "rules": { "usageDisclaimer": { "l": "Usage of a valid vLEI" } }
            }
        },
        "agents": { "gleif-agent-1": { "secret": "gleif1" } },
        "identifiers": {
            "gleif-aid-1": { "agent": "gleif-agent-1", "name": "gleif-aid-1" },
            "gleif-multisig": { "name": "gleif-multisig", "identifiers": ["gleif-aid-1"], "isith": ["1"] }
        },
        "users": [ { "type": "GLEIF", "alias": "gleif-user", "identifiers": ["gleif-aid-1"] } ]
    }"#;

    #[test]
    fn parses_sample_configuration() {
        let config: Configuration = serde_json::from_str(SAMPLE).expect("parse configuration");

        assert_eq!(config.secrets["gleif1"], "D_PbQb01zuzQgK-kDWjqy");
        assert_eq!(config.agents["gleif-agent-1"].secret.as_deref(), Some("gleif1"));
        assert!(config.identifiers["gleif-multisig"].is_multisig());
        assert!(!config.identifiers["gleif-aid-1"].is_multisig());
        assert_eq!(config.identifiers["gleif-multisig"].extensions["isith"], serde_json::json!(["1"]));
        assert!(config.credentials["gleif_to_qvi_vlei_cred"].rules.is_some());
        assert_eq!(config.users[0].user_type.as_deref(), Some("GLEIF"));
    }

    #[test]
    fn empty_member_list_is_not_multisig() {
        let identifier = Identifier {
            identifiers: Some(Vec::new()),
            ..Identifier::default()
        };
        assert!(!identifier.is_multisig());
    }
}
