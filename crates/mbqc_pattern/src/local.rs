//! Per-node pattern representation
//!
//! Gantree: L4_Pattern → LocalPattern
//!
//! Splits a pattern into one cluster per node: its preparation, its
//! entanglement partners, its measurement and (for outputs) the pending
//! corrections. Clusters are linked by the domains their measurements
//! read. Standardization and signal shifting then run per cluster, with
//! no flow search.

use crate::fold::FoldedPattern;
use crate::shift::{extract_signal, record_shift, substitute};
use crate::standardize::topological_order;
use log::debug;
use mbqc_core::{Command, Measurement, MbqcResult, NodeFrame, NodeId, Pattern, Signal};
use std::collections::{BTreeMap, BTreeSet};

/// Commands owned by a single node
/// Gantree: NodeCluster // N + E + M/보정
#[derive(Debug, Clone, PartialEq)]
pub struct NodeCluster {
    /// Node id
    pub node: NodeId,
    /// `N(node)` is part of the pattern (false for inputs)
    pub prepared: bool,
    /// Entanglement partners
    pub neighbors: BTreeSet<NodeId>,
    /// Measurement with folded domains
    pub measurement: Option<Measurement>,
    /// Pending corrections of an output
    pub frame: Option<NodeFrame>,
    /// Position of the measurement in the source pattern
    position: usize,
}

impl NodeCluster {
    fn new(node: NodeId, prepared: bool) -> Self {
        Self {
            node,
            prepared,
            neighbors: BTreeSet::new(),
            measurement: None,
            frame: None,
            position: usize::MAX,
        }
    }

    /// True if the node is measured
    pub fn is_measured(&self) -> bool {
        self.measurement.is_some()
    }

    /// Nodes the measurement reads
    pub fn dependencies(&self) -> BTreeSet<NodeId> {
        self.measurement
            .iter()
            .flat_map(|m| m.s_domain.iter().chain(m.t_domain.iter()))
            .copied()
            .collect()
    }
}

/// Pattern as per-node clusters plus their dependency graph
/// Gantree: LocalPattern // 노드별 클러스터 + 의존 그래프
#[derive(Debug, Clone)]
pub struct LocalPattern {
    name: Option<String>,
    inputs: Vec<NodeId>,
    outputs: Vec<NodeId>,
    prepare_order: Vec<NodeId>,
    clusters: BTreeMap<NodeId, NodeCluster>,
    dependents: BTreeMap<NodeId, BTreeSet<NodeId>>,
}

impl LocalPattern {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Decompose `pattern`
    /// Gantree: from_pattern(P) -> Result<LocalPattern> // 클러스터 분해
    pub fn from_pattern(pattern: &Pattern) -> MbqcResult<Self> {
        let folded = FoldedPattern::fold(pattern)?;

        let mut clusters: BTreeMap<NodeId, NodeCluster> = BTreeMap::new();
        for &n in &folded.inputs {
            clusters.insert(n, NodeCluster::new(n, false));
        }
        for &n in &folded.prepared {
            clusters.insert(n, NodeCluster::new(n, true));
        }
        for &(a, b) in &folded.edges {
            if let Some(c) = clusters.get_mut(&a) {
                c.neighbors.insert(b);
            }
            if let Some(c) = clusters.get_mut(&b) {
                c.neighbors.insert(a);
            }
        }
        for (position, m) in folded.measurements.iter().enumerate() {
            if let Some(c) = clusters.get_mut(&m.node) {
                c.measurement = Some(m.clone());
                c.position = position;
            }
        }
        for (n, frame) in &folded.output_frames {
            if let Some(c) = clusters.get_mut(n) {
                c.frame = Some(frame.clone());
            }
        }

        let mut local = Self {
            name: folded.name,
            inputs: folded.inputs,
            outputs: folded.outputs,
            prepare_order: folded.prepared,
            clusters,
            dependents: BTreeMap::new(),
        };
        local.rebuild_dependents();
        Ok(local)
    }

    fn rebuild_dependents(&mut self) {
        let mut dependents: BTreeMap<NodeId, BTreeSet<NodeId>> = BTreeMap::new();
        for c in self.clusters.values() {
            for d in c.dependencies() {
                dependents.entry(d).or_default().insert(c.node);
            }
        }
        self.dependents = dependents;
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Cluster of `node`
    pub fn cluster(&self, node: NodeId) -> Option<&NodeCluster> {
        self.clusters.get(&node)
    }

    /// All clusters by node id
    pub fn clusters(&self) -> impl Iterator<Item = &NodeCluster> {
        self.clusters.values()
    }

    /// Measured nodes whose measurement reads `node`
    pub fn dependents_of(&self, node: NodeId) -> BTreeSet<NodeId> {
        self.dependents.get(&node).cloned().unwrap_or_default()
    }

    /// Measurement order: dependencies first, ties by source position
    pub fn measurement_order(&self) -> Vec<NodeId> {
        self.ordered_measurements().iter().map(|m| m.node).collect()
    }

    fn ordered_measurements(&self) -> Vec<Measurement> {
        let mut measured: Vec<&NodeCluster> =
            self.clusters.values().filter(|c| c.is_measured()).collect();
        measured.sort_by_key(|c| c.position);
        let positions: BTreeMap<NodeId, usize> =
            measured.iter().map(|c| (c.node, c.position)).collect();
        let ms = measured
            .into_iter()
            .filter_map(|c| c.measurement.clone())
            .collect();
        topological_order(ms, |_, m| positions.get(&m.node).copied().unwrap_or(usize::MAX))
    }

    // ========================================================================
    // Transformations
    // ========================================================================

    /// Shift signals cluster by cluster
    /// Gantree: shift() // 클러스터별 신호 전파
    pub fn shift(&mut self) {
        let mut subst: BTreeMap<NodeId, Signal> = BTreeMap::new();
        for node in self.measurement_order() {
            let Some(m) = self
                .clusters
                .get_mut(&node)
                .and_then(|c| c.measurement.as_mut())
            else {
                continue;
            };
            m.s_domain = substitute(&m.s_domain, &subst);
            m.t_domain = substitute(&m.t_domain, &subst);
            let signal = extract_signal(m);
            record_shift(&mut subst, node, signal);
        }
        for c in self.clusters.values_mut() {
            if let Some(frame) = c.frame.as_mut() {
                frame.x = substitute(&frame.x, &subst);
                frame.z = substitute(&frame.z, &subst);
            }
        }
        debug!("local shift: {} signals moved", subst.len());
        self.rebuild_dependents();
    }

    /// Reassemble a standard pattern
    /// Gantree: into_pattern() -> Pattern // N* E* M* 보정
    pub fn into_pattern(self) -> Pattern {
        let mut commands: Vec<Command> = self
            .prepare_order
            .iter()
            .map(|&n| Command::Prepare(n))
            .collect();
        for c in self.clusters.values() {
            commands.extend(
                c.neighbors
                    .range(c.node + 1..)
                    .map(|&w| Command::Entangle(c.node, w)),
            );
        }
        commands.extend(self.ordered_measurements().into_iter().map(Command::Measure));
        for o in &self.outputs {
            if let Some(frame) = self.clusters.get(o).and_then(|c| c.frame.clone()) {
                commands.extend(frame.into_corrections(*o));
            }
        }
        let p = Pattern::from_parts(self.inputs, self.outputs, commands);
        match self.name {
            Some(n) => p.with_name(n),
            None => p,
        }
    }
}

/// Standardize and shift signals without a flow search
/// Gantree: standardize_local(P) -> Result<Pattern> // 분해 → 전파 → 재조립
pub fn standardize_local(pattern: &Pattern) -> MbqcResult<Pattern> {
    let mut local = LocalPattern::from_pattern(pattern)?;
    local.shift();
    Ok(local.into_pattern())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use mbqc_core::{Domain, PatternBuilder, Plane};

    fn circuit() -> Pattern {
        PatternBuilder::new(vec![0], vec![3])
            .j(0, 1, 0.1)
            .j(1, 2, 0.2)
            .j(2, 3, 0.3)
            .build()
    }

    #[test]
    fn test_clusters() {
        let lp = LocalPattern::from_pattern(&circuit()).unwrap();
        let c0 = lp.cluster(0).unwrap();
        assert!(!c0.prepared);
        assert_eq!(c0.neighbors, BTreeSet::from([1]));
        let c2 = lp.cluster(2).unwrap();
        // Z kicked from 1 through E(1,2) lands in the t-domain
        assert_eq!(c2.dependencies(), BTreeSet::from([0, 1]));
        assert!(lp.cluster(3).unwrap().frame.is_some());
        assert_eq!(lp.dependents_of(0), BTreeSet::from([1, 2]));
    }

    #[test]
    fn test_measurement_order_follows_source() {
        let lp = LocalPattern::from_pattern(&circuit()).unwrap();
        assert_eq!(lp.measurement_order(), vec![0, 1, 2]);
    }

    #[test]
    fn test_shift_clears_xy_t_domains() {
        let p = PatternBuilder::new(vec![0], vec![3])
            .n(1)
            .n(2)
            .n(3)
            .e(0, 1)
            .e(1, 2)
            .e(2, 3)
            .m(0, Plane::XY, 0.1)
            .m_adaptive(1, Plane::XY, 0.2, &[0], &[])
            .m_adaptive(2, Plane::XY, 0.3, &[1], &[0])
            .x(3, &[2])
            .z(3, &[1])
            .build();
        let mut lp = LocalPattern::from_pattern(&p).unwrap();
        lp.shift();
        let m2 = lp.cluster(2).unwrap().measurement.clone().unwrap();
        assert!(m2.t_domain.is_empty());
        // outcome of 2 now reads 2 ⊕ 0
        let frame = lp.cluster(3).unwrap().frame.clone().unwrap();
        assert_eq!(frame.x, [0, 2].into_iter().collect::<Domain>());
    }

    #[test]
    fn test_standardize_local_is_standard() {
        let out = standardize_local(&circuit()).unwrap();
        assert!(out.is_standard());
        assert_eq!(out.count(mbqc_core::CommandKind::Measure), 3);
        assert_eq!(standardize_local(&out).unwrap(), out);
    }
}
