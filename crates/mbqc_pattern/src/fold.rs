//! Byproduct folding
//!
//! Gantree: L4_Pattern → Fold
//!
//! Walks a pattern once and pushes every `X`, `Z` and `C` command to the
//! end: through `E` (an X on one end becomes a Z on the other) and into
//! `M` (byproducts become domains, Cliffords rotate the basis). What is left
//! is preparations, a set of edges, self-contained measurements and one
//! frame per output.

use mbqc_core::{
    Command, Domain, Measurement, MbqcError, MbqcResult, NodeFrame, NodeId, OpenGraph, Pattern,
    Plane, Signal,
};
use std::collections::{BTreeMap, BTreeSet};

/// Pattern with all byproducts moved to the outputs
/// Gantree: FoldedPattern // N + E 집합 + M + 출력 프레임
#[derive(Debug, Clone)]
pub(crate) struct FoldedPattern {
    pub name: Option<String>,
    pub inputs: Vec<NodeId>,
    pub outputs: Vec<NodeId>,
    /// Prepared nodes in first-appearance order
    pub prepared: Vec<NodeId>,
    /// Edges after toggling, as `(min, max)`
    pub edges: BTreeSet<(NodeId, NodeId)>,
    /// Measurements in source order
    pub measurements: Vec<Measurement>,
    pub output_frames: BTreeMap<NodeId, NodeFrame>,
}

fn frame_mut(frames: &mut BTreeMap<NodeId, NodeFrame>, node: NodeId) -> MbqcResult<&mut NodeFrame> {
    frames
        .get_mut(&node)
        .ok_or_else(|| MbqcError::pattern(format!("node {} is not live", node)))
}

impl FoldedPattern {
    /// Validate and fold
    /// Gantree: fold(pattern) -> Result<FoldedPattern> // 바이프로덕트 이동
    pub fn fold(pattern: &Pattern) -> MbqcResult<Self> {
        pattern.validate()?;

        let mut frames: BTreeMap<NodeId, NodeFrame> = pattern
            .inputs()
            .iter()
            .map(|&n| (n, NodeFrame::new()))
            .collect();
        let mut prepared = Vec::new();
        let mut edges = BTreeSet::new();
        let mut measurements = Vec::new();

        for cmd in pattern.commands() {
            match cmd {
                Command::Prepare(n) => {
                    prepared.push(*n);
                    frames.insert(*n, NodeFrame::new());
                }
                Command::Entangle(a, b) => {
                    let (a, b) = (*a, *b);
                    let kick_a = Self::kick(&frames, a)?;
                    let kick_b = Self::kick(&frames, b)?;
                    frame_mut(&mut frames, b)?.apply_z(&kick_a);
                    frame_mut(&mut frames, a)?.apply_z(&kick_b);
                    let key = (a.min(b), a.max(b));
                    if !edges.remove(&key) {
                        edges.insert(key);
                    }
                }
                Command::Measure(m) => {
                    let frame = frames
                        .remove(&m.node)
                        .ok_or_else(|| MbqcError::pattern(format!("node {} is not live", m.node)))?;
                    let s = Signal::from_domain(m.s_domain.clone());
                    let t = Signal::from_domain(m.t_domain.clone());
                    measurements.push(frame.measure(m.node, m.basis(), &s, &t));
                }
                Command::X(n, d) => frame_mut(&mut frames, *n)?.apply_x(d),
                Command::Z(n, d) => frame_mut(&mut frames, *n)?.apply_z(d),
                Command::Clifford(n, c) => frame_mut(&mut frames, *n)?.apply_clifford(c),
            }
        }

        Ok(Self {
            name: pattern.name().map(str::to_string),
            inputs: pattern.inputs().to_vec(),
            outputs: pattern.outputs().to_vec(),
            prepared,
            edges,
            measurements,
            output_frames: frames,
        })
    }

    /// Z domain `node`'s frame passes to an entanglement partner
    fn kick(frames: &BTreeMap<NodeId, NodeFrame>, node: NodeId) -> MbqcResult<Domain> {
        let frame = frames
            .get(&node)
            .ok_or_else(|| MbqcError::pattern(format!("node {} is not live", node)))?;
        if !frame.commutes_with_entangle() {
            return Err(MbqcError::pattern(format!(
                "Clifford {} on node {} cannot be moved through an entanglement",
                frame.clifford, node
            )));
        }
        Ok(frame.entangle_kick())
    }

    /// Resource graph with planes from the folded measurements
    pub fn open_graph(&self) -> MbqcResult<OpenGraph> {
        let planes: BTreeMap<NodeId, Plane> = self
            .measurements
            .iter()
            .map(|m| (m.node, m.plane))
            .collect();
        OpenGraph::from_edges(
            &self.edges.iter().copied().collect::<Vec<_>>(),
            self.inputs.clone(),
            self.outputs.clone(),
            planes,
        )
    }

    /// Output corrections in declared output order
    pub fn output_corrections(&self) -> Vec<Command> {
        self.outputs
            .iter()
            .filter_map(|o| self.output_frames.get(o).map(|f| (o, f)))
            .flat_map(|(&o, f)| f.clone().into_corrections(o))
            .collect()
    }

    /// Assemble `N* E* M* corrections` from the given measurement sequence
    pub fn assemble(&self, measurements: Vec<Measurement>) -> Pattern {
        let mut commands: Vec<Command> = self.prepared.iter().map(|&n| Command::Prepare(n)).collect();
        commands.extend(self.edges.iter().map(|&(a, b)| Command::Entangle(a, b)));
        commands.extend(measurements.into_iter().map(Command::Measure));
        commands.extend(self.output_corrections());
        let p = Pattern::from_parts(self.inputs.clone(), self.outputs.clone(), commands);
        match &self.name {
            Some(n) => p.with_name(n.clone()),
            None => p,
        }
    }
}
