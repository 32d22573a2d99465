//! Pattern standardization
//!
//! Gantree: L4_Pattern → Standardizer
//!
//! Rewrites a pattern into `N* E* M* (X|Z|C)*` form. Corrections are folded
//! into the measurements, then measurements are ordered by the flow depth
//! of the resulting graph.

use crate::fold::FoldedPattern;
use log::{debug, info};
use mbqc_core::{Measurement, MbqcResult, NodeId, Pattern};
use mbqc_flow::{find_gflow, FlowMode, GFlow};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

/// How measurements are ordered in the standardized pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MeasurementOrder {
    /// Deepest flow layer first, ties by node id
    #[default]
    FlowDepth,
    /// Source order; no flow is computed
    Preserve,
}

/// Pattern standardizer
/// Gantree: Standardizer // 표준형 변환기
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Standardizer {
    mode: FlowMode,
    order: MeasurementOrder,
}

impl Standardizer {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Standardizer using flows found in `mode`
    pub fn new(mode: FlowMode) -> Self {
        Self {
            mode,
            order: MeasurementOrder::FlowDepth,
        }
    }

    /// Set the measurement order
    pub fn with_order(mut self, order: MeasurementOrder) -> Self {
        self.order = order;
        self
    }

    /// Keep the source measurement order
    pub fn preserving() -> Self {
        Self::default().with_order(MeasurementOrder::Preserve)
    }

    /// Flow search mode
    pub fn mode(&self) -> FlowMode {
        self.mode
    }

    /// Measurement order
    pub fn order(&self) -> MeasurementOrder {
        self.order
    }

    // ========================================================================
    // Standardization
    // ========================================================================

    /// Standardize `pattern`
    /// Gantree: standardize(P) -> Result<Pattern> // 접기 → 플로우 → 정렬
    ///
    /// Fails with `InconsistentPattern` on an invalid pattern or a Clifford
    /// that would cross an entanglement, and with `NoFlowExists` when
    /// ordering by flow depth and the folded graph has no gflow.
    pub fn standardize(&self, pattern: &Pattern) -> MbqcResult<Pattern> {
        let folded = FoldedPattern::fold(pattern)?;
        let measurements = match self.order {
            MeasurementOrder::Preserve => folded.measurements.clone(),
            MeasurementOrder::FlowDepth => {
                let flow = find_gflow(&folded.open_graph()?, self.mode)?;
                order_by_depth(folded.measurements.clone(), &flow)
            }
        };
        let out = folded.assemble(measurements);
        info!(
            "standardized pattern: {} commands -> {} commands",
            pattern.len(),
            out.len()
        );
        Ok(out)
    }

    /// Standardize with a flow computed by the caller
    ///
    /// Nodes missing from `flow.depth` are treated as depth 0.
    pub fn standardize_with_flow(&self, pattern: &Pattern, flow: &GFlow) -> MbqcResult<Pattern> {
        let folded = FoldedPattern::fold(pattern)?;
        let measurements = order_by_depth(folded.measurements.clone(), flow);
        Ok(folded.assemble(measurements))
    }
}

/// Order measurements by descending depth, respecting domain dependencies
fn order_by_depth(measurements: Vec<Measurement>, flow: &GFlow) -> Vec<Measurement> {
    debug!("ordering {} measurements by flow depth", measurements.len());
    topological_order(measurements, |_, m| {
        (Reverse(flow.depth_of(m.node).unwrap_or(0)), m.node)
    })
}

/// Kahn's algorithm over domain dependencies, smallest `key` first
/// Gantree: topological_order(M,key) -> Vec<M> // 우선순위 위상 정렬
///
/// Every domain entry must refer to a node measured earlier in
/// `measurements`, which makes the dependency graph acyclic.
pub(crate) fn topological_order<K, F>(measurements: Vec<Measurement>, key: F) -> Vec<Measurement>
where
    K: Ord + Clone,
    F: Fn(usize, &Measurement) -> K,
{
    let index: BTreeMap<NodeId, usize> = measurements
        .iter()
        .enumerate()
        .map(|(i, m)| (m.node, i))
        .collect();
    let keys: Vec<K> = measurements
        .iter()
        .enumerate()
        .map(|(i, m)| key(i, m))
        .collect();

    let mut indegree = vec![0usize; measurements.len()];
    let mut dependents = vec![Vec::new(); measurements.len()];
    for (i, m) in measurements.iter().enumerate() {
        let deps: BTreeSet<usize> = m
            .s_domain
            .iter()
            .chain(m.t_domain.iter())
            .filter_map(|n| index.get(n).copied())
            .collect();
        indegree[i] = deps.len();
        for d in deps {
            dependents[d].push(i);
        }
    }

    let mut ready: BinaryHeap<Reverse<(K, usize)>> = indegree
        .iter()
        .enumerate()
        .filter(|(_, &deg)| deg == 0)
        .map(|(i, _)| Reverse((keys[i].clone(), i)))
        .collect();
    let mut slots: Vec<Option<Measurement>> = measurements.into_iter().map(Some).collect();
    let mut out = Vec::with_capacity(slots.len());

    while let Some(Reverse((_, i))) = ready.pop() {
        if let Some(m) = slots[i].take() {
            out.push(m);
        }
        for &j in &dependents[i] {
            indegree[j] -= 1;
            if indegree[j] == 0 {
                ready.push(Reverse((keys[j].clone(), j)));
            }
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use mbqc_core::{Clifford, Command, Domain, MbqcError, PatternBuilder, Plane};

    fn wire() -> Pattern {
        PatternBuilder::new(vec![0], vec![2])
            .j(0, 1, 0.25)
            .j(1, 2, 0.5)
            .build()
    }

    #[test]
    fn test_standardize_wire() {
        let p = Standardizer::default().standardize(&wire()).unwrap();
        assert!(p.is_standard());
        let expected = vec![
            Command::Prepare(1),
            Command::Prepare(2),
            Command::Entangle(0, 1),
            Command::Entangle(1, 2),
            Command::Measure(Measurement::new(0, Plane::XY, 0.25)),
            Command::Measure(
                Measurement::new(1, Plane::XY, 0.5).with_domains(Domain::single(0), Domain::new()),
            ),
            Command::X(2, Domain::single(1)),
            Command::Z(2, Domain::single(0)),
        ];
        assert_eq!(p.commands(), expected.as_slice());
    }

    #[test]
    fn test_standardize_idempotent() {
        let s = Standardizer::default();
        let once = s.standardize(&wire()).unwrap();
        let twice = s.standardize(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_preserve_keeps_source_order() {
        // 2 is measured before 1 in the source
        let p = PatternBuilder::new(vec![], vec![0])
            .n(0)
            .n(1)
            .n(2)
            .e(0, 1)
            .e(1, 2)
            .m(2, Plane::XY, 0.0)
            .m(1, Plane::XY, 0.0)
            .build();
        let out = Standardizer::preserving().standardize(&p).unwrap();
        assert_eq!(out.measurement_order(), vec![2, 1]);
    }

    #[test]
    fn test_output_clifford_kept() {
        let p = PatternBuilder::new(vec![0], vec![1])
            .j(0, 1, 0.0)
            .c(1, Clifford::S)
            .build();
        let out = Standardizer::default().standardize(&p).unwrap();
        assert_eq!(
            out.commands().last(),
            Some(&Command::Clifford(1, Clifford::S))
        );
    }

    #[test]
    fn test_no_flow_surfaces() {
        // isolated measured node
        let p = PatternBuilder::new(vec![], vec![1])
            .n(0)
            .n(1)
            .m(0, Plane::XY, 0.0)
            .build();
        let err = Standardizer::default().standardize(&p).unwrap_err();
        assert!(err.is_recoverable());
        assert!(Standardizer::preserving().standardize(&p).is_ok());
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let p = PatternBuilder::new(vec![], vec![1]).n(1).e(1, 3).build();
        assert!(matches!(
            Standardizer::default().standardize(&p),
            Err(MbqcError::InconsistentPattern(_))
        ));
    }

    #[test]
    fn test_topological_order_respects_domains() {
        let ms = vec![
            Measurement::new(0, Plane::XY, 0.0),
            Measurement::new(1, Plane::XY, 0.0).with_domains(Domain::single(0), Domain::new()),
            Measurement::new(2, Plane::XY, 0.0),
        ];
        // prefer larger ids; 1 still waits for 0
        let order: Vec<NodeId> = topological_order(ms, |_, m| Reverse(m.node))
            .iter()
            .map(|m| m.node)
            .collect();
        assert_eq!(order, vec![2, 0, 1]);
    }
}
