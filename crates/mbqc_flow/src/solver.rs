//! Layered gflow search over GF(2)
//!
//! Gantree: L3_Flow → GFlowSolver
//!
//! Each layer builds one linear system whose rows are the still uncorrected
//! non-output nodes and whose columns are the correction candidates
//! (corrected nodes and outputs, inputs excluded). For a node `u` the
//! right-hand side encodes its plane:
//!
//! | plane | `u ∈ g(u)` | right-hand side       |
//! |-------|------------|-----------------------|
//! | XY    | no         | `e_u`                 |
//! | XZ    | yes        | `e_u ⊕ N(u)`          |
//! | YZ    | yes        | `N(u)`                |
//!
//! so that `Odd(g(u))` meets the uncorrected nodes in exactly `{u}` (XY, XZ)
//! or not at all (YZ).

use crate::gflow::{FlowMode, GFlow};
use mbqc_core::{GraphLike, MbqcError, MbqcResult, NodeId, OpenGraph, Plane};
use mbqc_linalg::{zeros, Gf2Matrix, Gf2Vec};
use std::collections::{BTreeMap, BTreeSet};

/// Gflow finder
/// Gantree: GFlowSolver // 층별 보정 집합 탐색
pub struct GFlowSolver;

/// One layer's system: matrix plus row/column labels
struct LayerSystem {
    matrix: Gf2Matrix,
    rows: Vec<NodeId>,
    cols: Vec<NodeId>,
}

impl LayerSystem {
    // 생성자
    fn build<G: GraphLike>(
        graph: &OpenGraph<G>,
        uncorrected: &BTreeSet<NodeId>,
        corrected: &BTreeSet<NodeId>,
    ) -> Self {
        let rows: Vec<NodeId> = uncorrected.iter().copied().collect();
        let cols: Vec<NodeId> = corrected
            .iter()
            .copied()
            .filter(|&c| !graph.is_input(c))
            .collect();
        let mut matrix = Gf2Matrix::new(rows.len(), cols.len());
        for (i, &r) in rows.iter().enumerate() {
            for (j, &c) in cols.iter().enumerate() {
                if graph.has_edge(r, c) {
                    matrix.set(i, j, true);
                }
            }
        }
        Self { matrix, rows, cols }
    }

    /// Right-hand side for `u`, or `None` when `u` can never be corrected
    fn rhs<G: GraphLike>(&self, graph: &OpenGraph<G>, u: NodeId) -> MbqcResult<Option<Gf2Vec>> {
        let plane = graph.plane(u)?;
        if !admissible(graph, u, plane) {
            return Ok(None);
        }
        let neighbors = graph.neighbors(u);
        let mut b = zeros(self.rows.len());
        for (i, r) in self.rows.iter().enumerate() {
            let self_bit = *r == u && plane != Plane::YZ;
            let nbr_bit = plane != Plane::XY && neighbors.contains(r);
            b.set(i, self_bit ^ nbr_bit);
        }
        Ok(Some(b))
    }

    /// Correction set from a solution vector
    fn correction_set(&self, u: NodeId, plane: Plane, x: &Gf2Vec) -> BTreeSet<NodeId> {
        let mut g: BTreeSet<NodeId> = x.iter_ones().map(|j| self.cols[j]).collect();
        if plane != Plane::XY {
            g.insert(u);
        }
        g
    }

    /// Solve for every node in `targets` with one elimination
    fn solve<G: GraphLike>(
        &self,
        graph: &OpenGraph<G>,
        targets: &[NodeId],
    ) -> MbqcResult<BTreeMap<NodeId, BTreeSet<NodeId>>> {
        let mut wanted = Vec::new();
        let mut rhs = Vec::new();
        for &u in targets {
            if let Some(b) = self.rhs(graph, u)? {
                wanted.push(u);
                rhs.push(b);
            }
        }
        let mut solved = BTreeMap::new();
        for (&u, x) in wanted.iter().zip(self.matrix.solve_many(&rhs)?) {
            if let Some(x) = x {
                solved.insert(u, self.correction_set(u, graph.plane(u)?, &x));
            }
        }
        Ok(solved)
    }
}

/// Inputs cannot sit in their own correction set, and an isolated node has
/// nothing to carry its correction.
fn admissible<G: GraphLike>(graph: &OpenGraph<G>, u: NodeId, plane: Plane) -> bool {
    if graph.neighbors(u).is_empty() {
        return false;
    }
    !(graph.is_input(u) && plane != Plane::XY)
}

impl GFlowSolver {
    // ========================================================================
    // Search
    // ========================================================================

    /// Find a gflow under `mode`
    /// Gantree: find_gflow(graph,mode) -> Result<GFlow> // 층별 탐색
    ///
    /// Fails with `NoFlowExists` listing the nodes left uncorrected when a
    /// pass makes no progress.
    pub fn find_gflow<G: GraphLike>(graph: &OpenGraph<G>, mode: FlowMode) -> MbqcResult<GFlow> {
        let flow = match mode {
            FlowMode::MaximallyDelayed => Self::find_layered(graph)?,
            FlowMode::Any => Self::find_greedy(graph)?,
        };
        log::info!(
            "gflow ({}) found: {} corrected nodes, {} layers",
            mode,
            flow.correction.len(),
            flow.max_depth()
        );
        Ok(flow)
    }

    /// Re-derive a flow on a modified graph, keeping the old depth order
    /// Gantree: refine_gflow(graph,previous) -> Result<GFlow> // 증분 재계산
    ///
    /// Non-output nodes are grouped by their previous depth and every group
    /// is solved in one elimination against the groups below it. Nodes the
    /// previous flow does not know about, or that cannot be corrected in
    /// their old position, fail with `NoFlowExists`.
    pub fn refine_gflow<G: GraphLike>(graph: &OpenGraph<G>, previous: &GFlow) -> MbqcResult<GFlow> {
        let (mut flow, mut corrected) = Self::seed(graph);
        let mut uncorrected: BTreeSet<NodeId> = graph.non_outputs().into_iter().collect();

        let missing: Vec<NodeId> = uncorrected
            .iter()
            .copied()
            .filter(|u| previous.depth_of(*u).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(MbqcError::NoFlowExists { unresolved: missing });
        }

        let mut groups: BTreeMap<usize, Vec<NodeId>> = BTreeMap::new();
        for &u in &uncorrected {
            groups
                .entry(previous.depth_of(u).unwrap_or(0))
                .or_default()
                .push(u);
        }

        for (layer, group) in (1..).zip(groups.into_values()) {
            let system = LayerSystem::build(graph, &uncorrected, &corrected);
            let solved = system.solve(graph, &group)?;
            let failed: Vec<NodeId> = group
                .iter()
                .copied()
                .filter(|u| !solved.contains_key(u))
                .collect();
            if !failed.is_empty() {
                log::debug!("refine: layer {} cannot keep {:?}", layer, failed);
                return Err(MbqcError::NoFlowExists { unresolved: failed });
            }
            Self::commit(&mut flow, &mut corrected, &mut uncorrected, solved, layer);
        }

        log::debug!("refine: reused {} layers", flow.max_depth());
        Ok(flow)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Outputs at depth 0 form the first candidate set
    fn seed<G: GraphLike>(graph: &OpenGraph<G>) -> (GFlow, BTreeSet<NodeId>) {
        let mut flow = GFlow::new();
        let mut corrected = BTreeSet::new();
        for &o in graph.outputs() {
            flow.depth.insert(o, 0);
            corrected.insert(o);
        }
        (flow, corrected)
    }

    fn commit(
        flow: &mut GFlow,
        corrected: &mut BTreeSet<NodeId>,
        uncorrected: &mut BTreeSet<NodeId>,
        solved: BTreeMap<NodeId, BTreeSet<NodeId>>,
        layer: usize,
    ) {
        for (u, g) in solved {
            flow.correction.insert(u, g);
            flow.depth.insert(u, layer);
            corrected.insert(u);
            uncorrected.remove(&u);
        }
    }

    /// Maximally delayed: every solvable node joins the current layer
    fn find_layered<G: GraphLike>(graph: &OpenGraph<G>) -> MbqcResult<GFlow> {
        let (mut flow, mut corrected) = Self::seed(graph);
        let mut uncorrected: BTreeSet<NodeId> = graph.non_outputs().into_iter().collect();
        let mut layer = 1;

        while !uncorrected.is_empty() {
            let system = LayerSystem::build(graph, &uncorrected, &corrected);
            let targets: Vec<NodeId> = uncorrected.iter().copied().collect();
            let solved = system.solve(graph, &targets)?;
            if solved.is_empty() {
                log::debug!("layer {}: no progress on {:?}", layer, targets);
                return Err(MbqcError::NoFlowExists {
                    unresolved: targets,
                });
            }
            log::debug!(
                "layer {}: corrected {:?}",
                layer,
                solved.keys().collect::<Vec<_>>()
            );
            Self::commit(&mut flow, &mut corrected, &mut uncorrected, solved, layer);
            layer += 1;
        }
        Ok(flow)
    }

    /// Greedy: a node becomes a candidate as soon as it is corrected
    fn find_greedy<G: GraphLike>(graph: &OpenGraph<G>) -> MbqcResult<GFlow> {
        let (mut flow, mut corrected) = Self::seed(graph);
        let mut uncorrected: BTreeSet<NodeId> = graph.non_outputs().into_iter().collect();
        let mut pass = 0;

        while !uncorrected.is_empty() {
            pass += 1;
            let mut progress = false;
            let snapshot: Vec<NodeId> = uncorrected.iter().copied().collect();
            for u in snapshot {
                let system = LayerSystem::build(graph, &uncorrected, &corrected);
                let solved = system.solve(graph, &[u])?;
                let Some(g) = solved.get(&u) else {
                    continue;
                };
                let mut reach = graph.odd_neighborhood(g);
                reach.extend(g.iter().copied());
                reach.remove(&u);
                let depth = 1 + reach
                    .iter()
                    .filter_map(|v| flow.depth_of(*v))
                    .max()
                    .unwrap_or(0);
                Self::commit(&mut flow, &mut corrected, &mut uncorrected, solved, depth);
                progress = true;
            }
            if !progress {
                let unresolved: Vec<NodeId> = uncorrected.into_iter().collect();
                log::debug!("greedy pass {}: no progress on {:?}", pass, unresolved);
                return Err(MbqcError::NoFlowExists { unresolved });
            }
        }
        Ok(flow)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::verify_gflow;

    fn chain() -> OpenGraph {
        OpenGraph::from_edges_xy(&[(0, 1), (1, 2)], vec![0], vec![2]).unwrap()
    }

    #[test]
    fn test_chain_flow() {
        let flow = GFlowSolver::find_gflow(&chain(), FlowMode::MaximallyDelayed).unwrap();
        assert_eq!(flow.correction_set(1), Some(&BTreeSet::from([2])));
        assert_eq!(flow.correction_set(0), Some(&BTreeSet::from([1])));
        assert_eq!(flow.depth_of(2), Some(0));
        assert_eq!(flow.depth_of(1), Some(1));
        assert_eq!(flow.depth_of(0), Some(2));
        verify_gflow(&chain(), &flow).unwrap();
    }

    #[test]
    fn test_isolated_node_has_no_flow() {
        for plane in Plane::ALL {
            let planes = BTreeMap::from([(0, Plane::XY), (1, Plane::XY), (3, plane)]);
            // node 3 has no edges
            let og = OpenGraph::from_edges(&[(0, 1), (1, 2)], vec![0], vec![2], planes).unwrap();
            let err = GFlowSolver::find_gflow(&og, FlowMode::MaximallyDelayed).unwrap_err();
            match err {
                MbqcError::NoFlowExists { unresolved } => assert_eq!(unresolved, vec![3]),
                other => panic!("unexpected error {other}"),
            }
            assert!(GFlowSolver::find_gflow(&og, FlowMode::Any).is_err());
        }
    }

    #[test]
    fn test_outputs_only() {
        let og = OpenGraph::from_edges_xy(&[(0, 1)], vec![], vec![0, 1]).unwrap();
        let flow = GFlowSolver::find_gflow(&og, FlowMode::MaximallyDelayed).unwrap();
        assert!(flow.is_empty());
        assert_eq!(flow.depth_of(0), Some(0));
    }

    #[test]
    fn test_yz_and_xz_planes() {
        // 0 - 1, node 0 measured in XZ / YZ
        for (plane, expected) in [(Plane::XZ, BTreeSet::from([0, 1])), (Plane::YZ, BTreeSet::from([0]))] {
            let planes = BTreeMap::from([(0, plane)]);
            let og = OpenGraph::from_edges(&[(0, 1)], vec![], vec![1], planes).unwrap();
            let flow = GFlowSolver::find_gflow(&og, FlowMode::MaximallyDelayed).unwrap();
            assert_eq!(flow.correction_set(0), Some(&expected));
            verify_gflow(&og, &flow).unwrap();
        }
    }

    #[test]
    fn test_input_in_yz_has_no_flow() {
        let planes = BTreeMap::from([(0, Plane::YZ)]);
        let og = OpenGraph::from_edges(&[(0, 1)], vec![0], vec![1], planes).unwrap();
        assert!(matches!(
            GFlowSolver::find_gflow(&og, FlowMode::MaximallyDelayed),
            Err(MbqcError::NoFlowExists { .. })
        ));
    }

    #[test]
    fn test_gflow_without_causal_flow() {
        // every output touches two or more measured nodes
        let og = OpenGraph::from_edges_xy(
            &[(0, 3), (0, 4), (1, 4), (1, 5), (2, 3), (2, 4), (2, 5)],
            vec![],
            vec![3, 4, 5],
        )
        .unwrap();
        let flow = GFlowSolver::find_gflow(&og, FlowMode::MaximallyDelayed).unwrap();
        verify_gflow(&og, &flow).unwrap();
        assert_eq!(flow.max_depth(), 1);
    }

    #[test]
    fn test_any_mode_is_valid() {
        let og = OpenGraph::from_edges_xy(
            &[(0, 1), (1, 2), (2, 3), (1, 4), (4, 5), (3, 5)],
            vec![0],
            vec![3, 5],
        )
        .unwrap();
        let flow = GFlowSolver::find_gflow(&og, FlowMode::Any).unwrap();
        verify_gflow(&og, &flow).unwrap();
        let delayed = GFlowSolver::find_gflow(&og, FlowMode::MaximallyDelayed).unwrap();
        assert!(delayed.max_depth() <= flow.max_depth());
    }

    #[test]
    fn test_refine_keeps_flow() {
        let og = chain();
        let flow = GFlowSolver::find_gflow(&og, FlowMode::MaximallyDelayed).unwrap();
        let refined = GFlowSolver::refine_gflow(&og, &flow).unwrap();
        assert_eq!(refined, flow);
    }

    #[test]
    fn test_refine_missing_node() {
        let og = chain();
        let err = GFlowSolver::refine_gflow(&og, &GFlow::new()).unwrap_err();
        assert!(err.is_recoverable());
    }
}
