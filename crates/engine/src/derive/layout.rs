//! Row layout with jitter and a bounded collision-repair pass.
//!
//! Nodes are grouped into fixed rows (`aid`, `multisig`, `credential`, then
//! any `default` nodes), each row centred on `x = 0`. Every node receives a
//! small random offset; when a placed node lands too close to an earlier one it
//! is re-jittered with a wider range a bounded number of times, after which the
//! overlap is accepted.

use tracing::debug;
use vlei_types::{NodeKind, Position, ProcessedNode};

use super::LayoutRng;

/// Spacing, node footprint and jitter amplitudes.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutParams {
    pub horizontal_spacing: f64,
    pub vertical_spacing: f64,
    pub node_width: f64,
    pub node_height: f64,
    pub safety_margin: f64,
    pub jitter: f64,
    pub retry_jitter: f64,
    pub max_attempts: usize,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            horizontal_spacing: 300.0,
            vertical_spacing: 800.0,
            node_width: 180.0,
            node_height: 100.0,
            safety_margin: 50.0,
            jitter: 5.0,
            retry_jitter: 25.0,
            max_attempts: 10,
        }
    }
}

impl LayoutParams {
    /// True when `candidate` sits inside the padded footprint of any placed position.
    pub fn collides(&self, candidate: Position, placed: &[Position]) -> bool {
        let reach_x = self.node_width / 2.0 + self.safety_margin;
        let reach_y = self.node_height / 2.0 + self.safety_margin;
        placed
            .iter()
            .any(|other| (candidate.x - other.x).abs() < reach_x && (candidate.y - other.y).abs() < reach_y)
    }
}

/// Assigns positions in place and reorders `nodes` into row order (stable within a row).
pub fn assign_positions(nodes: &mut Vec<ProcessedNode>, params: &LayoutParams, rng: &mut LayoutRng) {
    let mut remaining = std::mem::take(nodes);
    let mut placed: Vec<Position> = Vec::with_capacity(remaining.len());

    for (row_index, kind) in NodeKind::ROW_ORDER.iter().enumerate() {
        let (row, rest): (Vec<_>, Vec<_>) = remaining.into_iter().partition(|node| node.kind == *kind);
        remaining = rest;

        let total_width = row.len() as f64 * params.horizontal_spacing;
        let start_x = -total_width / 2.0 + params.horizontal_spacing / 2.0;
        let base_y = row_index as f64 * params.vertical_spacing;

        for (index, mut node) in row.into_iter().enumerate() {
            let base = Position::new(start_x + index as f64 * params.horizontal_spacing, base_y);
            let (position, attempts) = place_node(base, &placed, params, rng);
            if attempts == params.max_attempts && params.collides(position, &placed) {
                debug!(target: "vlei_derive", node = %node.id, "layout collision persists; accepting overlap");
            }

            node.position = position;
            placed.push(position);
            nodes.push(node);
        }
    }
}

/// Jitters `base`, then re-jitters while it collides with `placed`, at most
/// `max_attempts` times. Returns the position and the number of retries.
fn place_node(base: Position, placed: &[Position], params: &LayoutParams, rng: &mut LayoutRng) -> (Position, usize) {
    let mut position = Position::new(base.x + rng.jitter(params.jitter), base.y + rng.jitter(params.jitter));
    let mut attempts = 0;
    while params.collides(position, placed) && attempts < params.max_attempts {
        position = Position::new(base.x + rng.jitter(params.retry_jitter), base.y + rng.jitter(params.retry_jitter));
        attempts += 1;
    }
    (position, attempts)
}
