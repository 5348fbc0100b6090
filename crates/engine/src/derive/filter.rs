//! Step filtering and root-of-trust collection.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use vlei_types::{StepType, WorkflowStep};

/// Steps relevant to graph rendering, in authoring order.
#[derive(Debug, Default)]
pub struct FilteredSteps<'a> {
    /// Credential steps (`issue_credential`, `revoke_credential`) keyed by step id.
    pub credential_steps: Vec<(&'a str, &'a WorkflowStep)>,
    /// Number of `create_aid` steps seen; they render through configuration identifiers.
    pub aid_steps: usize,
    /// Identifier keys named by `add_root_of_trust` steps.
    pub roots_of_trust: BTreeSet<String>,
}

/// Rendered step types. `create_aid` is selected but never becomes a node.
pub fn is_rendered(step_type: &StepType) -> bool {
    matches!(step_type, StepType::CreateAid | StepType::IssueCredential | StepType::RevokeCredential)
}

pub fn filter_steps(steps: &IndexMap<String, WorkflowStep>) -> FilteredSteps<'_> {
    let mut filtered = FilteredSteps::default();
    for (id, step) in steps {
        match &step.step_type {
            StepType::AddRootOfTrust => {
                if let Some(rot_aid) = step.rot_aid.as_deref().filter(|aid| !aid.is_empty()) {
                    filtered.roots_of_trust.insert(rot_aid.to_string());
                }
            }
            StepType::CreateAid => filtered.aid_steps += 1,
            step_type if is_rendered(step_type) => filtered.credential_steps.push((id.as_str(), step)),
            _ => {}
        }
    }
    filtered
}
