//! Graph derivation: (workflow, configuration) to positioned nodes and typed edges.
//!
//! Derivation is a pure, synchronous function over immutable inputs. It never
//! fails: a workflow without `workflow.steps` produces an empty graph, and any
//! cross-reference that cannot be resolved drops only the affected edge or
//! field. The only nondeterminism is layout jitter, which is drawn from the
//! caller-supplied [`LayoutRng`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};
use vlei_types::{Configuration, Graph, WorkflowDocument};

pub mod edges;
pub mod extract;
pub mod filter;
pub mod layout;
pub mod resolve;

pub use filter::{FilteredSteps, filter_steps};
pub use layout::{LayoutParams, assign_positions};

/// Seedable randomness source used for layout jitter.
#[derive(Debug, Clone)]
pub struct LayoutRng(StdRng);

impl LayoutRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    /// Uniform offset in `[-amplitude, amplitude)`; zero when `amplitude` is not positive.
    pub fn jitter(&mut self, amplitude: f64) -> f64 {
        if amplitude > 0.0 { self.0.gen_range(-amplitude..amplitude) } else { 0.0 }
    }
}

impl Default for LayoutRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

/// Derives the full graph for a workflow and configuration.
pub fn derive_graph(workflow: &WorkflowDocument, config: &Configuration, rng: &mut LayoutRng) -> Graph {
    let Some(steps) = workflow.steps() else {
        warn!(target: "vlei_derive", "workflow has no workflow.steps mapping; deriving an empty graph");
        return Graph::default();
    };

    let filtered = filter_steps(steps);
    let mut nodes = extract::identifier_nodes(config, &filtered.roots_of_trust);
    for node in extract::credential_nodes(&filtered, config) {
        if nodes.iter().any(|existing| existing.id == node.id) {
            warn!(target: "vlei_derive", step = %node.id, "step id collides with an identifier key; skipping step");
            continue;
        }
        nodes.push(node);
    }

    assign_positions(&mut nodes, &LayoutParams::default(), rng);
    let edges = edges::derive_edges(&nodes, config);

    debug!(
        target: "vlei_derive",
        nodes = nodes.len(),
        edges = edges.len(),
        steps = steps.len(),
        "derived graph"
    );
    Graph { nodes, edges }
}

/// Derives with a fixed layout seed, so positions are reproducible too.
pub fn derive_graph_seeded(workflow: &WorkflowDocument, config: &Configuration, seed: u64) -> Graph {
    derive_graph(workflow, config, &mut LayoutRng::seeded(seed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_stays_in_range_and_is_reproducible() {
        let mut first = LayoutRng::seeded(42);
        let mut second = LayoutRng::seeded(42);
        for _ in 0..100 {
            let value = first.jitter(5.0);
            assert!((-5.0..5.0).contains(&value));
            assert_eq!(value, second.jitter(5.0));
        }
        assert_eq!(first.jitter(0.0), 0.0);
    }

    #[test]
    fn malformed_workflow_yields_empty_graph() {
        let workflow: WorkflowDocument = serde_json::from_str(r#"{"workflow": {}}"#).expect("parse");
        let config: Configuration =
            serde_json::from_str(r#"{"identifiers": {"A": {"name": "A"}}}"#).expect("parse config");
        assert!(derive_graph_seeded(&workflow, &config, 1).is_empty());
        assert!(derive_graph_seeded(&WorkflowDocument::default(), &config, 1).is_empty());
    }
}
