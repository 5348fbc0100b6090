use std::fmt;

use serde::{Deserialize, Serialize};

/// Step type tag.
///
/// The set of tags is open-ended: the runner accepts step types this crate has
/// never heard of, so unknown tags are kept verbatim in [`StepType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StepType {
    CreateClient,
    CreateAid,
    CreateAidKli,
    CreateRegistry,
    IssueCredential,
    RevokeCredential,
    AddRootOfTrust,
    Other(String),
}

impl StepType {
    /// Returns the wire tag for this step type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::CreateClient => "create_client",
            Self::CreateAid => "create_aid",
            Self::CreateAidKli => "create_aid_kli",
            Self::CreateRegistry => "create_registry",
            Self::IssueCredential => "issue_credential",
            Self::RevokeCredential => "revoke_credential",
            Self::AddRootOfTrust => "add_root_of_trust",
            Self::Other(tag) => tag,
        }
    }

    /// Returns true for `issue_credential` and `revoke_credential`.
    pub fn is_credential(&self) -> bool {
        matches!(self, Self::IssueCredential | Self::RevokeCredential)
    }
}

impl Default for StepType {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for StepType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "create_client" => Self::CreateClient,
            "create_aid" => Self::CreateAid,
            "create_aid_kli" => Self::CreateAidKli,
            "create_registry" => Self::CreateRegistry,
            "issue_credential" => Self::IssueCredential,
            "revoke_credential" => Self::RevokeCredential,
            "add_root_of_trust" => Self::AddRootOfTrust,
            _ => Self::Other(tag),
        }
    }
}

impl From<&str> for StepType {
    fn from(tag: &str) -> Self {
        Self::from(tag.to_string())
    }
}

impl From<StepType> for String {
    fn from(step_type: StepType) -> Self {
        match step_type {
            StepType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
