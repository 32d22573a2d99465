//! # MBQC Pauli
//!
//! Pauli measurements carried out ahead of time on the graph state, with
//! the flow of the reduced pattern tracked along the way.
//!
//! ## Gantree Architecture
//!
//! ```text
//! mbqc_pauli // L5: Pauli preprocessing (완료)
//!     GraphState // 그래프 + VOP, 국소 보완 (완료)
//!     PauliPreprocessor // 파울리 노드 제거, 신호 치환 (완료)
//!     FlowStatus // 점진적 → 재계산 → 대체 → 없음 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use mbqc_core::PatternBuilder;
//! use mbqc_pauli::PauliPreprocessor;
//!
//! let wire = PatternBuilder::new(vec![0], vec![3])
//!     .j(0, 1, 0.3)
//!     .j(1, 2, 0.0)
//!     .j(2, 3, 0.7)
//!     .build();
//!
//! let red = PauliPreprocessor::new(true).perform_pauli_measurements(&wire).unwrap();
//! assert_eq!(red.removed, vec![1]);
//! assert!(red.pattern.measurement(1).is_none());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Decorated graph state (Gantree: L5_Pauli → GraphState)
pub mod graph_state;

/// Pauli preprocessing (Gantree: L5_Pauli → PauliPreprocessor)
pub mod preprocess;

// ============================================================================
// Re-exports
// ============================================================================

pub use graph_state::GraphState;
pub use preprocess::{FlowStatus, PauliPreprocessor, PauliReduction};

use mbqc_core::{MbqcResult, Pattern};

/// Reduce Pauli measurements, keeping the declared inputs
pub fn perform_pauli_measurements(pattern: &Pattern) -> MbqcResult<PauliReduction> {
    PauliPreprocessor::new(true).perform_pauli_measurements(pattern)
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use mbqc_core::{Angle, Clifford, NodeId, OpenGraph, PatternBuilder, Plane};
    use mbqc_flow::{find_gflow, verify_gflow, FlowMode};
    use mbqc_pattern::PatternGenerator;
    use mbqc_sim::{fidelity, random_state, StatevectorBackend};
    use num_complex::Complex64;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use std::collections::{BTreeMap, BTreeSet};

    /// Random graph: a path through all nodes plus extra edges
    fn random_open_graph(rng: &mut ChaCha8Rng, n: usize) -> OpenGraph {
        let mut edges: Vec<(NodeId, NodeId)> = (0..n - 1).map(|i| (i, i + 1)).collect();
        for _ in 0..n {
            let a = rng.gen_range(0..n);
            let b = rng.gen_range(0..n);
            if a != b && !edges.contains(&(a.min(b), a.max(b))) {
                edges.push((a.min(b), a.max(b)));
            }
        }
        let planes: BTreeMap<NodeId, Plane> = (1..n - 2)
            .map(|v| (v, *Plane::ALL.choose(rng).unwrap_or(&Plane::XY)))
            .chain(std::iter::once((0, Plane::XY)))
            .collect();
        OpenGraph::from_edges(&edges, vec![0], vec![n - 2, n - 1], planes).unwrap()
    }

    /// Generated patterns where most angles are Pauli angles
    fn pauli_heavy_patterns(seed: u64, count: usize) -> Vec<Pattern> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut out = Vec::new();
        while out.len() < count {
            let og = random_open_graph(&mut rng, 7);
            let Ok(flow) = find_gflow(&og, FlowMode::MaximallyDelayed) else {
                continue;
            };
            let angles: BTreeMap<NodeId, Angle> = og
                .non_outputs()
                .into_iter()
                .map(|v| {
                    let a = match rng.gen_range(0..5u8) {
                        0 => rng.gen_range(0.0..2.0),
                        k => 0.5 * f64::from(k - 1),
                    };
                    (v, a)
                })
                .collect();
            out.push(PatternGenerator::from_flow(&og, &flow, &angles).unwrap());
        }
        out
    }

    /// Two-qubit circuit with Pauli angles in the middle
    fn circuit() -> Pattern {
        PatternBuilder::new(vec![0, 1], vec![8, 9])
            .j(0, 2, 0.3)
            .j(1, 3, 0.5)
            .e(2, 3)
            .j(2, 4, 0.0)
            .j(3, 5, 1.0)
            .c(4, Clifford::S)
            .j(4, 6, 1.5)
            .j(5, 7, 0.8)
            .j(6, 8, 0.25)
            .j(7, 9, 0.5)
            .build()
    }

    fn outcome_records(nodes: &[NodeId]) -> Vec<BTreeMap<NodeId, u8>> {
        (0..1u32 << nodes.len())
            .map(|bits| {
                nodes
                    .iter()
                    .enumerate()
                    .map(|(i, &n)| (n, ((bits >> i) & 1) as u8))
                    .collect()
            })
            .collect()
    }

    /// Every branch of `candidate` reproduces the output of `reference`
    fn assert_equivalent(
        reference: &Pattern,
        candidate: &Pattern,
        input: Option<&[Complex64]>,
        candidate_input: Option<&[Complex64]>,
    ) {
        let expected = StatevectorBackend::new(3)
            .run(reference, input)
            .unwrap()
            .state;
        for forced in outcome_records(&candidate.measurement_order()) {
            let out = StatevectorBackend::new(0)
                .with_forced(forced)
                .run(candidate, candidate_input)
                .unwrap();
            approx::assert_relative_eq!(fidelity(&out.state, &expected), 1.0, epsilon = 1e-8);
        }
    }

    fn check_bookkeeping(source: &Pattern, red: &PauliReduction, leave_input: bool) {
        let inputs: BTreeSet<NodeId> = source.inputs().iter().copied().collect();
        let measured: BTreeSet<NodeId> = source.measurements().map(|m| m.node).collect();
        for &n in &red.removed {
            assert!(source.measurement(n).is_some_and(|m| m.basis().is_pauli()));
            assert!(red.pattern.measurement(n).is_none());
            assert!(red.signals.contains_key(&n));
        }
        // non-Pauli nodes are exactly the measured non-Pauli angles, minus kept inputs
        let non_pauli: BTreeSet<NodeId> = source
            .measurements()
            .filter(|m| !m.basis().is_pauli() && !(leave_input && inputs.contains(&m.node)))
            .map(|m| m.node)
            .collect();
        assert_eq!(red.non_pauli_nodes, non_pauli);
        // kept + removed covers every measured node once
        let kept: BTreeSet<NodeId> = red.pattern.measurements().map(|m| m.node).collect();
        let removed: BTreeSet<NodeId> = red.removed.iter().copied().collect();
        assert!(kept.is_disjoint(&removed));
        assert_eq!(&kept | &removed, measured);
        assert!(red.pattern.is_standard());
        if let Some(flow) = &red.flow {
            verify_gflow(&red.pattern.open_graph().unwrap(), flow).unwrap();
        }
        assert_eq!(red.flow.is_some(), red.flow_status.has_flow());
    }

    #[test]
    fn test_circuit_reduction_preserves_output() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let input = random_state(&mut rng, 2);
        let p = circuit();
        let red = perform_pauli_measurements(&p).unwrap();
        check_bookkeeping(&p, &red, true);
        assert_eq!(red.non_pauli_nodes, BTreeSet::from([5, 6]));
        assert_eq!(red.pattern.inputs(), p.inputs());
        assert_equivalent(&p, &red.pattern, Some(input.as_slice()), Some(input.as_slice()));
    }

    #[test]
    fn test_leave_input_keeps_inputs() {
        for p in std::iter::once(circuit()).chain(pauli_heavy_patterns(3, 6)) {
            let red = PauliPreprocessor::new(true)
                .perform_pauli_measurements(&p)
                .unwrap();
            check_bookkeeping(&p, &red, true);
            assert_eq!(red.pattern.inputs(), p.inputs());
            for i in p.inputs() {
                assert!(!red.removed.contains(i));
                assert_eq!(
                    red.pattern.measurement(*i).is_some(),
                    p.measurement(*i).is_some()
                );
            }
        }
    }

    #[test]
    fn test_reduction_preserves_generated() {
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        for p in pauli_heavy_patterns(19, 6) {
            let input = random_state(&mut rng, 1);
            let red = perform_pauli_measurements(&p).unwrap();
            check_bookkeeping(&p, &red, true);
            assert_equivalent(&p, &red.pattern, Some(input.as_slice()), Some(input.as_slice()));
        }
    }

    #[test]
    fn test_reduction_without_inputs() {
        for p in std::iter::once(circuit()).chain(pauli_heavy_patterns(27, 5)) {
            let red = PauliPreprocessor::new(false)
                .perform_pauli_measurements(&p)
                .unwrap();
            check_bookkeeping(&p, &red, false);
            assert!(red.pattern.inputs().is_empty());
            // inputs start in |+⟩ on both sides
            assert_equivalent(&p, &red.pattern, None, None);
        }
    }

    #[test]
    fn test_flow_tracked_for_generated() {
        let mut with_flow = 0;
        for p in pauli_heavy_patterns(33, 8) {
            let red = perform_pauli_measurements(&p).unwrap();
            check_bookkeeping(&p, &red, true);
            if red.flow_status.has_flow() {
                with_flow += 1;
            }
            assert_eq!(
                red.fallback_used,
                matches!(red.flow_status, FlowStatus::Fallback | FlowStatus::Absent)
            );
        }
        assert!(with_flow > 0);
    }

    #[test]
    fn test_cut_off_node_stays_deterministic() {
        let p = PatternBuilder::new(vec![0], vec![3])
            .j(0, 1, 0.0)
            .j(1, 2, 0.3)
            .j(2, 3, 0.6)
            .build();
        let red = PauliPreprocessor::new(false)
            .perform_pauli_measurements(&p)
            .unwrap();
        check_bookkeeping(&p, &red, false);
        // no flow, yet every branch gives the source output
        assert_eq!(red.flow_status, FlowStatus::Absent);
        assert_equivalent(&p, &red.pattern, None, None);
    }

    #[test]
    fn test_non_pauli_pattern_untouched() {
        let p = PatternBuilder::new(vec![0], vec![2])
            .j(0, 1, 0.3)
            .j(1, 2, 0.7)
            .build();
        let red = perform_pauli_measurements(&p).unwrap();
        assert!(red.removed.is_empty());
        assert_eq!(red.non_pauli_nodes, BTreeSet::from([1]));
        assert_eq!(red.flow_status, FlowStatus::Incremental);
        assert_eq!(
            red.pattern.measurement_order(),
            mbqc_pattern::standardize(&p).unwrap().measurement_order()
        );
    }
}
