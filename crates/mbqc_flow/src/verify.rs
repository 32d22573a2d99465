//! Flow verification
//!
//! Gantree: L3_Flow → Verifier

use crate::gflow::GFlow;
use mbqc_core::{GraphLike, MbqcError, MbqcResult, NodeId, OpenGraph, Plane};

fn violation(node: NodeId, reason: impl Into<String>) -> MbqcError {
    MbqcError::FlowViolation {
        node,
        reason: reason.into(),
    }
}

/// Check that `flow` is a gflow of `graph`
/// Gantree: verify_gflow(graph,flow) -> Result<()> // 평면 조건 + 순서
///
/// For every non-output `u` with `g = g(u)`:
/// - `g` holds graph nodes only and no inputs;
/// - every `v ∈ (g ∪ Odd(g)) \ {u}` has `d(v) < d(u)`;
/// - XY: `u ∉ g`, `u ∈ Odd(g)`; XZ: `u ∈ g`, `u ∈ Odd(g)`; YZ: `u ∈ g`,
///   `u ∉ Odd(g)`.
///
/// Outputs must not carry a correction set.
pub fn verify_gflow<G: GraphLike>(graph: &OpenGraph<G>, flow: &GFlow) -> MbqcResult<()> {
    for &u in flow.correction.keys() {
        if !graph.contains_node(u) {
            return Err(MbqcError::UnknownNode(u));
        }
        if graph.is_output(u) {
            return Err(violation(u, "output node has a correction set"));
        }
    }

    for u in graph.non_outputs() {
        let g = flow
            .correction_set(u)
            .ok_or_else(|| violation(u, "missing correction set"))?;
        let du = flow
            .depth_of(u)
            .ok_or_else(|| violation(u, "missing depth"))?;
        if graph.neighbors(u).is_empty() {
            return Err(violation(u, "isolated node cannot be corrected"));
        }

        let check_order = |v: NodeId| -> MbqcResult<()> {
            if v == u {
                return Ok(());
            }
            match flow.depth_of(v) {
                Some(dv) if dv < du => Ok(()),
                Some(dv) => Err(violation(
                    u,
                    format!("node {} at depth {} is not below depth {}", v, dv, du),
                )),
                None => Err(violation(u, format!("node {} has no depth", v))),
            }
        };

        for &v in g {
            if !graph.contains_node(v) {
                return Err(MbqcError::UnknownNode(v));
            }
            if graph.is_input(v) {
                return Err(violation(u, format!("correction set contains input {}", v)));
            }
            check_order(v)?;
        }
        let odd = graph.odd_neighborhood(g);
        for &w in &odd {
            check_order(w)?;
        }

        let in_g = g.contains(&u);
        let in_odd = odd.contains(&u);
        let ok = match graph.plane(u)? {
            Plane::XY => !in_g && in_odd,
            Plane::XZ => in_g && in_odd,
            Plane::YZ => in_g && !in_odd,
        };
        if !ok {
            return Err(violation(
                u,
                format!(
                    "plane condition fails (u in g: {}, u in Odd(g): {})",
                    in_g, in_odd
                ),
            ));
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn chain() -> OpenGraph {
        OpenGraph::from_edges_xy(&[(0, 1), (1, 2)], vec![0], vec![2]).unwrap()
    }

    fn chain_flow() -> GFlow {
        let mut f = GFlow::new();
        f.correction.insert(0, BTreeSet::from([1]));
        f.correction.insert(1, BTreeSet::from([2]));
        f.depth.extend([(0, 2), (1, 1), (2, 0)]);
        f
    }

    #[test]
    fn test_accepts_chain() {
        verify_gflow(&chain(), &chain_flow()).unwrap();
    }

    #[test]
    fn test_rejects_bad_order() {
        let mut f = chain_flow();
        f.depth.insert(0, 1);
        assert!(matches!(
            verify_gflow(&chain(), &f),
            Err(MbqcError::FlowViolation { node: 0, .. })
        ));
    }

    #[test]
    fn test_rejects_plane_condition() {
        let mut f = chain_flow();
        // {1,2}: Odd = {0,2} ^ {1} = {0,1,2}, 1 must not be in g for XY
        f.correction.insert(1, BTreeSet::from([1, 2]));
        assert!(verify_gflow(&chain(), &f).is_err());
    }

    #[test]
    fn test_rejects_missing_and_outputs() {
        let mut f = chain_flow();
        f.correction.remove(&0);
        assert!(verify_gflow(&chain(), &f).is_err());

        let mut f = chain_flow();
        f.correction.insert(2, BTreeSet::new());
        assert!(verify_gflow(&chain(), &f).is_err());
    }

    #[test]
    fn test_rejects_input_in_correction() {
        let og = OpenGraph::from_edges_xy(&[(0, 1), (1, 2), (0, 2)], vec![0], vec![2]).unwrap();
        let mut f = GFlow::new();
        f.correction.insert(1, BTreeSet::from([0]));
        f.correction.insert(0, BTreeSet::from([2]));
        f.depth.extend([(0, 2), (1, 1), (2, 0)]);
        let err = verify_gflow(&og, &f).unwrap_err();
        assert!(err.to_string().contains("input"));
    }
}
