//! Causal flow
//!
//! Gantree: L3_Flow → CausalFlow
//!
//! A causal flow assigns each measured node a single successor `f(u)`
//! adjacent to it. It exists only for graphs measured entirely in the XY
//! plane and, when found, is a gflow with `g(u) = {f(u)}`.

use crate::gflow::GFlow;
use mbqc_core::{GraphLike, MbqcError, MbqcResult, NodeId, OpenGraph, Plane};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Successor function plus depth
/// Gantree: CausalFlow // f + d
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CausalFlow {
    /// `f(u)` for every measured node
    pub successor: BTreeMap<NodeId, NodeId>,
    /// Depth of every node (outputs at 0)
    pub depth: BTreeMap<NodeId, usize>,
}

impl CausalFlow {
    /// Equivalent gflow
    pub fn into_gflow(self) -> GFlow {
        GFlow {
            correction: self
                .successor
                .into_iter()
                .map(|(u, v)| (u, BTreeSet::from([v])))
                .collect(),
            depth: self.depth,
        }
    }
}

/// Find a causal flow by peeling layers back from the outputs
/// Gantree: find_causal_flow(graph) -> Result<CausalFlow> // 인과 플로우
///
/// A corrector with exactly one unprocessed neighbour `u` becomes `f(u)`;
/// when two correctors claim the same node in a layer the smaller id wins.
/// Fails with `InvalidOperation` if a non-output is not in the XY plane and
/// with `NoFlowExists` when a layer makes no progress.
pub fn find_causal_flow<G: GraphLike>(graph: &OpenGraph<G>) -> MbqcResult<CausalFlow> {
    for (&n, &plane) in graph.planes() {
        if plane != Plane::XY {
            return Err(MbqcError::invalid(format!(
                "causal flow needs XY measurements, node {} is {}",
                n, plane
            )));
        }
    }

    let mut flow = CausalFlow::default();
    let mut processed: BTreeSet<NodeId> = graph.outputs().iter().copied().collect();
    let mut correctors: BTreeSet<NodeId> = processed
        .iter()
        .copied()
        .filter(|&o| !graph.is_input(o))
        .collect();
    for &o in graph.outputs() {
        flow.depth.insert(o, 0);
    }
    let total = graph.node_ids().len();
    let mut layer = 1;

    while processed.len() < total {
        let mut claimed: BTreeMap<NodeId, NodeId> = BTreeMap::new();
        for &v in &correctors {
            let mut open = graph
                .neighbors(v)
                .into_iter()
                .filter(|n| !processed.contains(n));
            if let (Some(u), None) = (open.next(), open.next()) {
                claimed.entry(u).or_insert(v);
            }
        }
        if claimed.is_empty() {
            let unresolved: Vec<NodeId> = graph
                .node_ids()
                .into_iter()
                .filter(|n| !processed.contains(n))
                .collect();
            log::debug!("causal flow: layer {} stuck on {:?}", layer, unresolved);
            return Err(MbqcError::NoFlowExists { unresolved });
        }
        for (&u, &v) in &claimed {
            flow.successor.insert(u, v);
            flow.depth.insert(u, layer);
            processed.insert(u);
            correctors.remove(&v);
        }
        correctors.extend(claimed.keys().copied().filter(|&u| !graph.is_input(u)));
        layer += 1;
    }

    log::info!("causal flow found: {} layers", layer - 1);
    Ok(flow)
}
