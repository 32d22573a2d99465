//! Decorated graph state
//!
//! Gantree: L5_Pauli → GraphState
//!
//! The state is `∏ vop(v) · E_G · (|ψ⟩_inputs ⊗ |+⟩_rest)`: a graph state
//! with one vertex operator (a local Clifford) per node, applied after
//! the entanglement. Local complementation at a non-input `a` uses
//!
//! ```text
//! E_G = SXDG(a) · ∏_{b ∈ N(a)} S(b) · E_{τ_a(G)}
//! ```
//!
//! so it only rewrites edges and vertex operators.

use log::debug;
use mbqc_core::{
    AdjacencyGraph, Axis, Clifford, GraphLike, MbqcError, MbqcResult, NodeId, SignedAxis,
};
use std::collections::{BTreeMap, BTreeSet};

/// Graph state with vertex operators
/// Gantree: GraphState // 그래프 + VOP
#[derive(Debug, Clone, PartialEq)]
pub struct GraphState<G: GraphLike = AdjacencyGraph> {
    graph: G,
    vops: BTreeMap<NodeId, Clifford>,
    inputs: BTreeSet<NodeId>,
}

impl GraphState<AdjacencyGraph> {
    /// Build from nodes and edges
    pub fn from_edges(
        nodes: &[NodeId],
        edges: &[(NodeId, NodeId)],
        inputs: &[NodeId],
    ) -> MbqcResult<Self> {
        let mut graph = AdjacencyGraph::from_edges(edges)?;
        for &n in nodes.iter().chain(inputs) {
            graph.add_node(n);
        }
        Ok(Self::new(graph, inputs))
    }
}

impl<G: GraphLike> GraphState<G> {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Wrap a graph; every vertex operator starts as the identity
    pub fn new(graph: G, inputs: &[NodeId]) -> Self {
        Self {
            graph,
            vops: BTreeMap::new(),
            inputs: inputs.iter().copied().collect(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Backing graph
    pub fn graph(&self) -> &G {
        &self.graph
    }

    /// Vertex operator of `node`
    pub fn vop(&self, node: NodeId) -> Clifford {
        self.vops.get(&node).copied().unwrap_or_default()
    }

    /// True if `node` holds an input state instead of `|+⟩`
    pub fn is_input(&self, node: NodeId) -> bool {
        self.inputs.contains(&node)
    }

    /// Node membership
    pub fn contains_node(&self, node: NodeId) -> bool {
        self.graph.contains_node(node)
    }

    /// Neighbours of `node`
    pub fn neighbors(&self, node: NodeId) -> BTreeSet<NodeId> {
        self.graph.neighbors(node)
    }

    /// True if a Pauli measurement of `node` can be reduced
    ///
    /// Fails for inputs and for a node whose measured Pauli is X while all of
    /// its neighbours are inputs.
    pub fn can_reduce(&self, node: NodeId, pauli: SignedAxis) -> bool {
        if !self.contains_node(node) || self.is_input(node) {
            return false;
        }
        let q = self.vop(node).inverse().conjugate(pauli);
        let nbrs = self.neighbors(node);
        q.axis != Axis::X || nbrs.is_empty() || nbrs.iter().any(|&n| !self.is_input(n))
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Compose `clifford` before the vertex operator of `node`
    pub fn apply_before(&mut self, node: NodeId, clifford: &Clifford) {
        let v = self.vop(node).compose(clifford);
        self.vops.insert(node, v);
    }

    /// Local complementation keeping the state unchanged
    /// Gantree: local_complement(a) -> Result<()> // 간선 + VOP 갱신
    pub fn local_complement(&mut self, node: NodeId) -> MbqcResult<()> {
        if !self.contains_node(node) {
            return Err(MbqcError::UnknownNode(node));
        }
        if self.is_input(node) {
            return Err(MbqcError::invalid(format!(
                "local complementation at input node {}",
                node
            )));
        }
        self.graph.local_complement(node)?;
        self.apply_before(node, &Clifford::SXDG);
        for n in self.neighbors(node) {
            self.apply_before(n, &Clifford::S);
        }
        Ok(())
    }

    /// Measure `node` in a signed Pauli and remove it
    /// Gantree: measure_pauli(v,P) -> Result<u8> // X→Y→Z 환원
    ///
    /// `pauli` is read on the decorated state. The outcome is fixed to 0
    /// unless it is deterministic (an isolated node measured in ±X); the
    /// returned bit is the outcome used.
    pub fn measure_pauli(&mut self, node: NodeId, pauli: SignedAxis) -> MbqcResult<u8> {
        if !self.contains_node(node) {
            return Err(MbqcError::UnknownNode(node));
        }
        if self.is_input(node) {
            return Err(MbqcError::invalid(format!(
                "Pauli measurement of input node {}",
                node
            )));
        }

        loop {
            let q = self.vop(node).inverse().conjugate(pauli);
            match q.axis {
                Axis::Z => {
                    // Z outcome b leaves Z^b on every neighbour
                    if q.sign.is_minus() {
                        for n in self.neighbors(node) {
                            self.apply_before(n, &Clifford::Z);
                        }
                    }
                    self.remove(node);
                    return Ok(0);
                }
                Axis::Y => self.local_complement(node)?,
                Axis::X => {
                    let nbrs = self.neighbors(node);
                    if nbrs.is_empty() {
                        self.remove(node);
                        return Ok(u8::from(q.sign.is_minus()));
                    }
                    let w = nbrs
                        .into_iter()
                        .find(|&n| !self.is_input(n))
                        .ok_or_else(|| {
                            MbqcError::invalid(format!(
                                "X measurement of node {} needs a non-input neighbour",
                                node
                            ))
                        })?;
                    debug!("X on {}: complementing at neighbour {}", node, w);
                    self.local_complement(w)?;
                }
            }
        }
    }

    fn remove(&mut self, node: NodeId) {
        self.graph.remove_node(node);
        self.vops.remove(&node);
    }
}

// ============================================================================
// Tests
// ============================================================================
