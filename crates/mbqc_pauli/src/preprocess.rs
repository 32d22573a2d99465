//! Pauli preprocessing
//!
//! Gantree: L5_Pauli → PauliPreprocessor
//!
//! Measurements in a Pauli basis do not depend on any earlier outcome
//! except through a sign, so they can be carried out on the graph state
//! before the pattern runs. Each one removes a node, rewrites edges and
//! vertex operators, and leaves behind a signal that stands in for its
//! outcome in the commands that remain.

use crate::graph_state::GraphState;
use log::{debug, info, warn};
use mbqc_core::{
    Axis, Command, GraphLike, Measurement, MbqcError, MbqcResult, NodeFrame, NodeId, OpenGraph,
    Pattern, Signal,
};
use mbqc_flow::{find_gflow, refine_gflow, FlowMode, GFlow};
use mbqc_pattern::Standardizer;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// How the flow of the reduced pattern was obtained
/// Gantree: FlowStatus // Incremental | Recomputed | Fallback | Absent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowStatus {
    /// Refined from the flow of the source pattern
    Incremental,
    /// Searched again in maximally delayed mode
    Recomputed,
    /// Only the greedy search found one
    Fallback,
    /// The reduced pattern has no flow
    ///
    /// Also reported when a reduction leaves a measured node with no edges
    /// (an X measurement on a leaf cuts off its neighbour). Such a node
    /// never has a correction set, even if the pattern stays deterministic.
    Absent,
}

impl FlowStatus {
    /// True if a flow is available
    pub fn has_flow(&self) -> bool {
        !matches!(self, FlowStatus::Absent)
    }
}

impl fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowStatus::Incremental => write!(f, "incremental"),
            FlowStatus::Recomputed => write!(f, "recomputed"),
            FlowStatus::Fallback => write!(f, "fallback"),
            FlowStatus::Absent => write!(f, "absent"),
        }
    }
}

/// Result of [`PauliPreprocessor::perform_pauli_measurements`]
/// Gantree: PauliReduction // 축소 패턴 + 신호 + 플로우 상태
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauliReduction {
    /// Pattern without the removed measurements
    pub pattern: Pattern,
    /// Measured nodes whose angle is not a Pauli angle
    pub non_pauli_nodes: BTreeSet<NodeId>,
    /// Pauli nodes kept because their reduction needs an input
    pub retained_pauli_nodes: BTreeSet<NodeId>,
    /// Removed nodes in the order they were measured
    pub removed: Vec<NodeId>,
    /// Outcome of every removed node, over the remaining outcomes
    pub signals: BTreeMap<NodeId, Signal>,
    /// Flow of the reduced pattern
    pub flow: Option<GFlow>,
    /// Where `flow` came from
    pub flow_status: FlowStatus,
    /// Set when the maximally delayed search did not succeed
    pub fallback_used: bool,
}

/// Removes Pauli measurements ahead of execution
/// Gantree: PauliPreprocessor // 파울리 측정 사전 처리
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauliPreprocessor {
    leave_input: bool,
}

impl Default for PauliPreprocessor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PauliPreprocessor {
    /// With `leave_input` the declared inputs are never measured; without
    /// it they are treated as `|+⟩` and the reduced pattern has no inputs
    pub fn new(leave_input: bool) -> Self {
        Self { leave_input }
    }

    /// Input handling
    pub fn leave_input(&self) -> bool {
        self.leave_input
    }

    /// Measure every Pauli node on the graph state
    /// Gantree: perform_pauli_measurements(P) -> Result<PauliReduction> // 축소 + 플로우
    pub fn perform_pauli_measurements(&self, pattern: &Pattern) -> MbqcResult<PauliReduction> {
        let standard = Standardizer::preserving().standardize(pattern)?;
        let source_flow =
            recoverable(find_gflow(&standard.open_graph()?, FlowMode::MaximallyDelayed))?;

        let kept_inputs: Vec<NodeId> = if self.leave_input {
            standard.inputs().to_vec()
        } else {
            Vec::new()
        };
        let mut gs = GraphState::new(standard.graph()?, &kept_inputs);

        let mut subst: BTreeMap<NodeId, Signal> = BTreeMap::new();
        let mut kept: Vec<Measurement> = Vec::new();
        let mut non_pauli_nodes = BTreeSet::new();
        let mut retained_pauli_nodes = BTreeSet::new();
        let mut removed = Vec::new();

        for m in standard.measurements() {
            if gs.is_input(m.node) {
                kept.push(m.clone());
                continue;
            }
            if m.basis().pauli().is_none() {
                non_pauli_nodes.insert(m.node);
                kept.push(m.clone());
                continue;
            }

            // constant byproducts rotate the basis, the rest only flip the sign
            let s = m.s_domain.substitute(&subst);
            let t = m.t_domain.substitute(&subst);
            let folded = NodeFrame::new().measure(m.node, m.basis(), &s, &t);
            let pauli = folded.basis().pauli().ok_or_else(|| {
                MbqcError::pattern(format!("node {} lost its Pauli basis", m.node))
            })?;
            if !gs.can_reduce(m.node, pauli) {
                debug!("node {}: {} kept next to inputs", m.node, pauli);
                retained_pauli_nodes.insert(m.node);
                kept.push(m.clone());
                continue;
            }

            let r = gs.measure_pauli(m.node, pauli)?;
            let flip = match pauli.axis {
                Axis::X => folded.t_domain,
                Axis::Z => folded.s_domain,
                Axis::Y => &folded.s_domain ^ &folded.t_domain,
            };
            let signal = Signal {
                constant: r == 1,
                domain: flip,
            };
            debug!("node {}: {} removed, outcome {}", m.node, pauli, signal);
            subst.insert(m.node, signal);
            removed.push(m.node);
        }

        let reduced = self.assemble(&standard, &gs, &kept, &subst)?;
        let (flow, flow_status) = resolve_flow(&reduced.open_graph()?, source_flow.as_ref())?;
        info!(
            "Pauli preprocessing: {} removed, {} retained, flow {}",
            removed.len(),
            retained_pauli_nodes.len(),
            flow_status
        );

        Ok(PauliReduction {
            pattern: reduced,
            non_pauli_nodes,
            retained_pauli_nodes,
            removed,
            signals: subst,
            flow,
            flow_status,
            fallback_used: matches!(flow_status, FlowStatus::Fallback | FlowStatus::Absent),
        })
    }

    /// Emit the remaining graph, measurements and output corrections
    fn assemble<G: GraphLike>(
        &self,
        standard: &Pattern,
        gs: &GraphState<G>,
        kept: &[Measurement],
        subst: &BTreeMap<NodeId, Signal>,
    ) -> MbqcResult<Pattern> {
        let inputs: Vec<NodeId> = if self.leave_input {
            standard.inputs().to_vec()
        } else {
            Vec::new()
        };

        let mut commands: Vec<Command> = standard
            .nodes()
            .into_iter()
            .filter(|&n| gs.contains_node(n) && !inputs.contains(&n))
            .map(Command::Prepare)
            .collect();
        commands.extend(
            gs.graph()
                .edges()
                .into_iter()
                .map(|(a, b)| Command::Entangle(a, b)),
        );

        for m in kept {
            let s = m.s_domain.substitute(subst);
            let t = m.t_domain.substitute(subst);
            let frame = NodeFrame::with_clifford(gs.vop(m.node));
            commands.push(Command::Measure(frame.measure(m.node, m.basis(), &s, &t)));
        }

        for &o in standard.outputs() {
            let mut frame = NodeFrame::with_clifford(gs.vop(o));
            for cmd in standard.commands().iter().filter(|c| c.targets() == [o]) {
                match cmd {
                    Command::X(_, d) => frame.apply_pauli(Axis::X, &d.substitute(subst)),
                    Command::Z(_, d) => frame.apply_pauli(Axis::Z, &d.substitute(subst)),
                    Command::Clifford(_, c) => frame.apply_clifford(c),
                    _ => {}
                }
            }
            commands.extend(frame.into_corrections(o));
        }

        let out = Pattern::from_parts(inputs, standard.outputs().to_vec(), commands);
        out.validate()?;
        Ok(match standard.name() {
            Some(n) => out.with_name(n),
            None => out,
        })
    }
}

/// A missing flow is `None`; any other error is surfaced
fn recoverable(result: MbqcResult<GFlow>) -> MbqcResult<Option<GFlow>> {
    match result {
        Ok(flow) => Ok(Some(flow)),
        Err(e) if e.is_recoverable() => {
            debug!("source pattern has no flow: {}", e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Find a flow for the reduced graph, cheapest strategy first
/// Gantree: resolve_flow(og,previous) -> Result<(Option<GFlow>,FlowStatus)> // 단계적 대체
fn resolve_flow(
    og: &OpenGraph,
    previous: Option<&GFlow>,
) -> MbqcResult<(Option<GFlow>, FlowStatus)> {
    if let Some(prev) = previous {
        match refine_gflow(og, prev) {
            Ok(flow) => return Ok((Some(flow), FlowStatus::Incremental)),
            Err(e) if e.is_recoverable() => debug!("refine failed: {}", e),
            Err(e) => return Err(e),
        }
    }
    match find_gflow(og, FlowMode::MaximallyDelayed) {
        Ok(flow) => return Ok((Some(flow), FlowStatus::Recomputed)),
        Err(e) if e.is_recoverable() => warn!("no maximally delayed flow: {}", e),
        Err(e) => return Err(e),
    }
    match find_gflow(og, FlowMode::Any) {
        Ok(flow) => {
            warn!("using a greedy flow for the reduced pattern");
            Ok((Some(flow), FlowStatus::Fallback))
        }
        Err(e) if e.is_recoverable() => {
            warn!("reduced pattern has no flow: {}", e);
            Ok((None, FlowStatus::Absent))
        }
        Err(e) => Err(e),
    }
}

// ============================================================================
// Tests
// ============================================================================
