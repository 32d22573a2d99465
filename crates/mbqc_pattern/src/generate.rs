//! Pattern generation from a flow
//!
//! Gantree: L4_Pattern → PatternGenerator
//!
//! Every measured node `u` is corrected by `X` on `g(u)` and `Z` on
//! `Odd(g(u))`, so a node `v` reads the outcome of `u` in its s-domain when
//! `v ∈ g(u)` and in its t-domain when `v ∈ Odd(g(u))`.

use log::info;
use mbqc_core::{
    angles, Angle, Command, Domain, GraphLike, Measurement, MbqcError, MbqcResult, NodeId,
    OpenGraph, Pattern,
};
use mbqc_flow::{verify_gflow, GFlow};
use std::collections::{BTreeMap, BTreeSet};

/// Builds the canonical pattern of an open graph with a flow
/// Gantree: PatternGenerator // 플로우 → 표준 패턴
pub struct PatternGenerator;

impl PatternGenerator {
    /// Generate `N* E* M* (X|Z)*` for `graph` corrected by `flow`
    /// Gantree: from_flow(graph,flow,angles) -> Result<Pattern> // 도메인 계산
    ///
    /// `angles` must cover every measured node. The flow is checked with
    /// [`verify_gflow`] first.
    pub fn from_flow<G: GraphLike>(
        graph: &OpenGraph<G>,
        flow: &GFlow,
        angles: &BTreeMap<NodeId, Angle>,
    ) -> MbqcResult<Pattern> {
        verify_gflow(graph, flow)?;

        // 보정 도메인
        let mut s_domains: BTreeMap<NodeId, Domain> = BTreeMap::new();
        let mut t_domains: BTreeMap<NodeId, Domain> = BTreeMap::new();
        for (&u, g) in &flow.correction {
            for &v in g.iter().filter(|&&v| v != u) {
                s_domains.entry(v).or_default().toggle(u);
            }
            for &v in graph.odd_neighborhood(g).iter().filter(|&&v| v != u) {
                t_domains.entry(v).or_default().toggle(u);
            }
        }
        let mut take = |v: NodeId| {
            (
                s_domains.remove(&v).unwrap_or_default(),
                t_domains.remove(&v).unwrap_or_default(),
            )
        };

        let inputs: BTreeSet<NodeId> = graph.inputs().iter().copied().collect();
        let mut commands: Vec<Command> = graph
            .node_ids()
            .into_iter()
            .filter(|n| !inputs.contains(n))
            .map(Command::Prepare)
            .collect();
        commands.extend(graph.edges().into_iter().map(|(a, b)| Command::Entangle(a, b)));

        for u in flow.measurement_order() {
            let angle = angles.get(&u).copied().ok_or_else(|| {
                MbqcError::invalid(format!("no measurement angle for node {}", u))
            })?;
            let (s, t) = take(u);
            let m = Measurement::new(u, graph.plane(u)?, angles::normalize(angle)).with_domains(s, t);
            commands.push(Command::Measure(m));
        }
        for &o in graph.outputs() {
            let (s, t) = take(o);
            if !s.is_empty() {
                commands.push(Command::X(o, s));
            }
            if !t.is_empty() {
                commands.push(Command::Z(o, t));
            }
        }

        info!(
            "generated pattern with {} commands from a flow of depth {}",
            commands.len(),
            flow.max_depth()
        );
        Ok(Pattern::from_parts(
            graph.inputs().to_vec(),
            graph.outputs().to_vec(),
            commands,
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use mbqc_core::Plane;
    use mbqc_flow::{find_gflow, FlowMode};

    #[test]
    fn test_generate_chain() {
        let og = OpenGraph::from_edges_xy(&[(0, 1), (1, 2)], vec![0], vec![2]).unwrap();
        let flow = find_gflow(&og, FlowMode::MaximallyDelayed).unwrap();
        let angles = BTreeMap::from([(0, 0.1), (1, 0.2)]);
        let p = PatternGenerator::from_flow(&og, &flow, &angles).unwrap();
        assert!(p.validate().is_ok());
        assert!(p.is_standard());
        let m1 = p.measurement(1).unwrap();
        assert_eq!(m1.s_domain, Domain::single(0));
        assert!(m1.t_domain.is_empty());
        assert!(p.commands().contains(&Command::X(2, Domain::single(1))));
        assert!(p.commands().contains(&Command::Z(2, Domain::single(0))));
    }

    #[test]
    fn test_generate_plane_xz() {
        // g(0) = {0, 1}: 0 sits in its own correction set
        let planes = BTreeMap::from([(0, Plane::XZ)]);
        let og = OpenGraph::from_edges(&[(0, 1)], vec![], vec![1], planes).unwrap();
        let flow = find_gflow(&og, FlowMode::MaximallyDelayed).unwrap();
        let p = PatternGenerator::from_flow(&og, &flow, &BTreeMap::from([(0, 0.3)])).unwrap();
        assert!(p.measurement(0).unwrap().s_domain.is_empty());
        assert!(p.commands().contains(&Command::X(1, Domain::single(0))));
    }

    #[test]
    fn test_missing_angle() {
        let og = OpenGraph::from_edges_xy(&[(0, 1)], vec![0], vec![1]).unwrap();
        let flow = find_gflow(&og, FlowMode::MaximallyDelayed).unwrap();
        let err = PatternGenerator::from_flow(&og, &flow, &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, MbqcError::InvalidOperation(_)));
    }

    #[test]
    fn test_invalid_flow_rejected() {
        let og = OpenGraph::from_edges_xy(&[(0, 1), (1, 2)], vec![0], vec![2]).unwrap();
        let mut flow = find_gflow(&og, FlowMode::MaximallyDelayed).unwrap();
        flow.correction.insert(1, BTreeSet::from([0]));
        let angles = BTreeMap::from([(0, 0.0), (1, 0.0)]);
        assert!(PatternGenerator::from_flow(&og, &flow, &angles).is_err());
    }
}
