//! Flow results
//!
//! Gantree: L3_Flow → GFlow
//!
//! A flow is a correction set `g(u)` per measured node plus a depth `d`.
//! Outputs sit at depth 0 and measurement runs from the deepest layer
//! down, so every node in `g(u) ∪ Odd(g(u))` other than `u` has a
//! strictly smaller depth than `u`.

use mbqc_core::{MbqcResult, NodeId};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Search policy for [`crate::GFlowSolver::find_gflow`]
/// Gantree: FlowMode // MaximallyDelayed | Any
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FlowMode {
    /// Every node is corrected in the latest possible layer
    #[default]
    MaximallyDelayed,
    /// Greedy node-by-node search; any valid flow
    Any,
}

impl fmt::Display for FlowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowMode::MaximallyDelayed => write!(f, "maximally-delayed"),
            FlowMode::Any => write!(f, "any"),
        }
    }
}

/// Generalized flow `(g, d)`
/// Gantree: GFlow // 보정 집합 + 깊이
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GFlow {
    /// Correction set of every measured node
    pub correction: BTreeMap<NodeId, BTreeSet<NodeId>>,
    /// Depth of every node (outputs at 0)
    pub depth: BTreeMap<NodeId, usize>,
}

impl GFlow {
    /// Empty flow
    pub fn new() -> Self {
        Self::default()
    }

    /// True if no node needs correcting
    pub fn is_empty(&self) -> bool {
        self.correction.is_empty()
    }

    /// Correction set of `node`
    pub fn correction_set(&self, node: NodeId) -> Option<&BTreeSet<NodeId>> {
        self.correction.get(&node)
    }

    /// Depth of `node`
    pub fn depth_of(&self, node: NodeId) -> Option<usize> {
        self.depth.get(&node).copied()
    }

    /// Largest depth (0 for an empty flow)
    pub fn max_depth(&self) -> usize {
        self.depth.values().copied().max().unwrap_or(0)
    }

    /// Nodes grouped by depth; index 0 holds the outputs
    pub fn layers(&self) -> Vec<Vec<NodeId>> {
        let mut layers = vec![Vec::new(); self.max_depth() + 1];
        for (&n, &d) in &self.depth {
            layers[d].push(n);
        }
        layers
    }

    /// Measured nodes by descending depth, ties by ascending id
    /// Gantree: measurement_order() -> Vec<NodeId> // 측정 순서
    pub fn measurement_order(&self) -> Vec<NodeId> {
        let mut order: Vec<NodeId> = self.correction.keys().copied().collect();
        order.sort_by_key(|&n| (Reverse(self.depth.get(&n).copied().unwrap_or(0)), n));
        order
    }

    /// Nodes whose correction set contains `node`
    pub fn correctors_of(&self, node: NodeId) -> BTreeSet<NodeId> {
        self.correction
            .iter()
            .filter(|&(&u, g)| u != node && g.contains(&node))
            .map(|(&u, _)| u)
            .collect()
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> MbqcResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON
    pub fn from_json(json: &str) -> MbqcResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl fmt::Display for GFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "GFlow: {} layers", self.max_depth())?;
        for u in self.measurement_order() {
            let g = &self.correction[&u];
            writeln!(
                f,
                "  d={} g({}) = {:?}",
                self.depth.get(&u).copied().unwrap_or(0),
                u,
                g
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GFlow {
        let mut f = GFlow::new();
        f.correction.insert(0, BTreeSet::from([1]));
        f.correction.insert(1, BTreeSet::from([2]));
        f.correction.insert(3, BTreeSet::from([2]));
        f.depth.extend([(0, 2), (1, 1), (2, 0), (3, 1)]);
        f
    }

    #[test]
    fn test_measurement_order() {
        assert_eq!(sample().measurement_order(), vec![0, 1, 3]);
    }

    #[test]
    fn test_layers() {
        let layers = sample().layers();
        assert_eq!(layers, vec![vec![2], vec![1, 3], vec![0]]);
    }

    #[test]
    fn test_correctors_of() {
        assert_eq!(sample().correctors_of(2), BTreeSet::from([1, 3]));
    }

    #[test]
    fn test_json_roundtrip() {
        let f = sample();
        assert_eq!(GFlow::from_json(&f.to_json().unwrap()).unwrap(), f);
    }

    #[test]
    fn test_default_mode() {
        assert_eq!(FlowMode::default(), FlowMode::MaximallyDelayed);
    }
}
