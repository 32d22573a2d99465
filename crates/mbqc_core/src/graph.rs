//! Graph model
//!
//! Gantree: L1_Graph → GraphModel
//!
//! [`GraphLike`] is the only capability the flow and Pauli stages need;
//! [`AdjacencyGraph`] is the ordered adjacency-set backend and
//! [`OpenGraph`] adds the input/output boundary and measurement planes.

use crate::error::{MbqcError, MbqcResult};
use crate::types::{NodeId, Plane};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ============================================================================
// GraphLike
// ============================================================================

/// Simple undirected graph capability
/// Gantree: GraphLike // trait
///
/// All mutations are immediate. Query methods return owned, ordered
/// collections so results never depend on backend iteration order.
pub trait GraphLike {
    /// All node ids in ascending order
    fn node_ids(&self) -> Vec<NodeId>;

    /// Node membership
    fn contains_node(&self, node: NodeId) -> bool;

    /// Neighbours of `node` (empty for unknown nodes)
    fn neighbors(&self, node: NodeId) -> BTreeSet<NodeId>;

    /// Edge membership
    fn has_edge(&self, a: NodeId, b: NodeId) -> bool;

    /// Insert a node; returns false if it already existed
    fn add_node(&mut self, node: NodeId) -> bool;

    /// Remove a node and its incident edges; returns false if absent
    fn remove_node(&mut self, node: NodeId) -> bool;

    /// Insert an edge; returns false if it already existed
    fn add_edge(&mut self, a: NodeId, b: NodeId) -> MbqcResult<bool>;

    /// Remove an edge; returns false if absent
    fn remove_edge(&mut self, a: NodeId, b: NodeId) -> bool;

    /// Number of nodes
    fn num_nodes(&self) -> usize {
        self.node_ids().len()
    }

    /// Degree of `node`
    fn degree(&self, node: NodeId) -> usize {
        self.neighbors(node).len()
    }

    /// All edges `(a, b)` with `a < b`, ascending
    fn edges(&self) -> Vec<(NodeId, NodeId)> {
        let mut out = Vec::new();
        for a in self.node_ids() {
            for b in self.neighbors(a) {
                if a < b {
                    out.push((a, b));
                }
            }
        }
        out
    }

    /// Add the edge if absent, remove it otherwise
    fn toggle_edge(&mut self, a: NodeId, b: NodeId) -> MbqcResult<()> {
        if self.has_edge(a, b) {
            self.remove_edge(a, b);
        } else {
            self.add_edge(a, b)?;
        }
        Ok(())
    }

    /// Nodes adjacent to an odd number of nodes in `set`
    fn odd_neighborhood(&self, set: &BTreeSet<NodeId>) -> BTreeSet<NodeId> {
        let mut odd = BTreeSet::new();
        for &v in set {
            for w in self.neighbors(v) {
                if !odd.remove(&w) {
                    odd.insert(w);
                }
            }
        }
        odd
    }

    /// Complement the edges among the neighbours of `node`
    fn local_complement(&mut self, node: NodeId) -> MbqcResult<()> {
        if !self.contains_node(node) {
            return Err(MbqcError::UnknownNode(node));
        }
        let nbrs: Vec<NodeId> = self.neighbors(node).into_iter().collect();
        for (i, &a) in nbrs.iter().enumerate() {
            for &b in &nbrs[i + 1..] {
                self.toggle_edge(a, b)?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// AdjacencyGraph
// ============================================================================

/// Ordered adjacency-set graph
/// Gantree: AdjacencyGraph // BTreeMap 인접 집합
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjacencyGraph {
    adjacency: BTreeMap<NodeId, BTreeSet<NodeId>>,
}

impl AdjacencyGraph {
    /// Empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an edge list; endpoints are added as nodes
    pub fn from_edges(edges: &[(NodeId, NodeId)]) -> MbqcResult<Self> {
        let mut g = Self::new();
        for &(a, b) in edges {
            g.add_node(a);
            g.add_node(b);
            g.add_edge(a, b)?;
        }
        Ok(g)
    }

    /// Number of edges
    pub fn num_edges(&self) -> usize {
        self.adjacency.values().map(|s| s.len()).sum::<usize>() / 2
    }
}

impl GraphLike for AdjacencyGraph {
    fn node_ids(&self) -> Vec<NodeId> {
        self.adjacency.keys().copied().collect()
    }

    fn contains_node(&self, node: NodeId) -> bool {
        self.adjacency.contains_key(&node)
    }

    fn neighbors(&self, node: NodeId) -> BTreeSet<NodeId> {
        self.adjacency.get(&node).cloned().unwrap_or_default()
    }

    fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.adjacency.get(&a).is_some_and(|s| s.contains(&b))
    }

    fn add_node(&mut self, node: NodeId) -> bool {
        if self.adjacency.contains_key(&node) {
            return false;
        }
        self.adjacency.insert(node, BTreeSet::new());
        true
    }

    fn remove_node(&mut self, node: NodeId) -> bool {
        match self.adjacency.remove(&node) {
            Some(nbrs) => {
                for n in nbrs {
                    if let Some(s) = self.adjacency.get_mut(&n) {
                        s.remove(&node);
                    }
                }
                true
            }
            None => false,
        }
    }

    fn add_edge(&mut self, a: NodeId, b: NodeId) -> MbqcResult<bool> {
        if a == b {
            return Err(MbqcError::invalid(format!("self-loop on node {}", a)));
        }
        for n in [a, b] {
            if !self.adjacency.contains_key(&n) {
                return Err(MbqcError::UnknownNode(n));
            }
        }
        let fresh = self.adjacency.entry(a).or_default().insert(b);
        self.adjacency.entry(b).or_default().insert(a);
        Ok(fresh)
    }

    fn remove_edge(&mut self, a: NodeId, b: NodeId) -> bool {
        let removed = self.adjacency.get_mut(&a).is_some_and(|s| s.remove(&b));
        if let Some(s) = self.adjacency.get_mut(&b) {
            s.remove(&a);
        }
        removed
    }

    fn num_nodes(&self) -> usize {
        self.adjacency.len()
    }
}

// ============================================================================
// OpenGraph
// ============================================================================

/// Graph with input/output boundary and measurement planes
/// Gantree: OpenGraph // 그래프 + 경계 + 평면
///
/// Inputs and outputs are disjoint; every non-output node carries exactly
/// one plane and outputs carry none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenGraph<G: GraphLike = AdjacencyGraph> {
    graph: G,
    inputs: Vec<NodeId>,
    outputs: Vec<NodeId>,
    planes: BTreeMap<NodeId, Plane>,
}

impl OpenGraph<AdjacencyGraph> {
    /// Build from edges; nodes come from edges, boundary and planes
    pub fn from_edges(
        edges: &[(NodeId, NodeId)],
        inputs: Vec<NodeId>,
        outputs: Vec<NodeId>,
        planes: BTreeMap<NodeId, Plane>,
    ) -> MbqcResult<Self> {
        let mut graph = AdjacencyGraph::from_edges(edges)?;
        for &n in inputs.iter().chain(outputs.iter()).chain(planes.keys()) {
            graph.add_node(n);
        }
        Self::new(graph, inputs, outputs, planes)
    }

    /// Build with every non-output node in the XY plane
    pub fn from_edges_xy(
        edges: &[(NodeId, NodeId)],
        inputs: Vec<NodeId>,
        outputs: Vec<NodeId>,
    ) -> MbqcResult<Self> {
        let mut graph = AdjacencyGraph::from_edges(edges)?;
        for &n in inputs.iter().chain(outputs.iter()) {
            graph.add_node(n);
        }
        let out: BTreeSet<NodeId> = outputs.iter().copied().collect();
        let planes = graph
            .node_ids()
            .into_iter()
            .filter(|n| !out.contains(n))
            .map(|n| (n, Plane::XY))
            .collect();
        Self::new(graph, inputs, outputs, planes)
    }
}

impl<G: GraphLike> OpenGraph<G> {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create with validation
    /// Gantree: new(graph,I,O,planes) -> Result<Self> // 생성+검증
    pub fn new(
        graph: G,
        inputs: Vec<NodeId>,
        outputs: Vec<NodeId>,
        planes: BTreeMap<NodeId, Plane>,
    ) -> MbqcResult<Self> {
        let mut seen = BTreeSet::new();
        for &n in inputs.iter().chain(outputs.iter()) {
            if !graph.contains_node(n) {
                return Err(MbqcError::UnknownNode(n));
            }
            if !seen.insert(n) {
                return Err(MbqcError::invalid(format!(
                    "node {} listed twice in the boundary",
                    n
                )));
            }
        }
        let out: BTreeSet<NodeId> = outputs.iter().copied().collect();
        for &n in planes.keys() {
            if !graph.contains_node(n) {
                return Err(MbqcError::UnknownNode(n));
            }
            if out.contains(&n) {
                return Err(MbqcError::invalid(format!(
                    "output node {} cannot carry a measurement plane",
                    n
                )));
            }
        }
        for n in graph.node_ids() {
            if !out.contains(&n) && !planes.contains_key(&n) {
                return Err(MbqcError::invalid(format!(
                    "non-output node {} has no measurement plane",
                    n
                )));
            }
        }
        Ok(Self {
            graph,
            inputs,
            outputs,
            planes,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Backing graph
    pub fn graph(&self) -> &G {
        &self.graph
    }

    /// Declared inputs
    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    /// Declared outputs
    pub fn outputs(&self) -> &[NodeId] {
        &self.outputs
    }

    /// Plane labels of non-output nodes
    pub fn planes(&self) -> &BTreeMap<NodeId, Plane> {
        &self.planes
    }

    /// Input membership
    pub fn is_input(&self, node: NodeId) -> bool {
        self.inputs.contains(&node)
    }

    /// Output membership
    pub fn is_output(&self, node: NodeId) -> bool {
        self.outputs.contains(&node)
    }

    /// Node membership
    pub fn contains_node(&self, node: NodeId) -> bool {
        self.graph.contains_node(node)
    }

    /// All nodes, ascending
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.graph.node_ids()
    }

    /// Measured (non-output) nodes, ascending
    pub fn non_outputs(&self) -> Vec<NodeId> {
        self.planes.keys().copied().collect()
    }

    /// Neighbours of `node`
    pub fn neighbors(&self, node: NodeId) -> BTreeSet<NodeId> {
        self.graph.neighbors(node)
    }

    /// Edge membership
    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.graph.has_edge(a, b)
    }

    /// Edge list
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        self.graph.edges()
    }

    /// Odd neighbourhood of a node set
    pub fn odd_neighborhood(&self, set: &BTreeSet<NodeId>) -> BTreeSet<NodeId> {
        self.graph.odd_neighborhood(set)
    }

    /// Measurement plane of a non-output node
    /// Gantree: plane(v) -> Result<Plane> // 측정 평면
    pub fn plane(&self, node: NodeId) -> MbqcResult<Plane> {
        if !self.graph.contains_node(node) {
            return Err(MbqcError::UnknownNode(node));
        }
        self.planes.get(&node).copied().ok_or_else(|| {
            MbqcError::invalid(format!("output node {} has no measurement plane", node))
        })
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Relabel the plane of a non-output node
    pub fn set_plane(&mut self, node: NodeId, plane: Plane) -> MbqcResult<()> {
        if !self.graph.contains_node(node) {
            return Err(MbqcError::UnknownNode(node));
        }
        if self.is_output(node) {
            return Err(MbqcError::invalid(format!(
                "output node {} cannot carry a measurement plane",
                node
            )));
        }
        self.planes.insert(node, plane);
        Ok(())
    }

    /// Add an internal node measured in `plane`
    pub fn add_node(&mut self, node: NodeId, plane: Plane) -> MbqcResult<()> {
        if !self.graph.add_node(node) {
            return Err(MbqcError::invalid(format!("node {} already exists", node)));
        }
        self.planes.insert(node, plane);
        Ok(())
    }

    /// Remove an internal node and its edges
    /// Gantree: remove_node(v) -> Result<()> // 입출력 보호
    pub fn remove_node(&mut self, node: NodeId) -> MbqcResult<()> {
        if !self.graph.contains_node(node) {
            return Err(MbqcError::UnknownNode(node));
        }
        if self.is_input(node) || self.is_output(node) {
            return Err(MbqcError::invalid(format!(
                "cannot remove boundary node {}",
                node
            )));
        }
        self.graph.remove_node(node);
        self.planes.remove(&node);
        Ok(())
    }

    /// Insert an edge
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> MbqcResult<bool> {
        self.graph.add_edge(a, b)
    }

    /// Remove an edge
    pub fn remove_edge(&mut self, a: NodeId, b: NodeId) -> MbqcResult<bool> {
        for n in [a, b] {
            if !self.graph.contains_node(n) {
                return Err(MbqcError::UnknownNode(n));
            }
        }
        Ok(self.graph.remove_edge(a, b))
    }

    /// Toggle an edge
    pub fn toggle_edge(&mut self, a: NodeId, b: NodeId) -> MbqcResult<()> {
        self.graph.toggle_edge(a, b)
    }

    /// Local complementation with plane relabelling
    /// Gantree: local_complement(v) -> Result<()> // 국소 보완
    ///
    /// `v`: XY↔XZ, YZ fixed. Neighbours: XZ↔YZ, XY fixed. Preserves gflow
    /// existence for non-input `v`.
    pub fn local_complement(&mut self, node: NodeId) -> MbqcResult<()> {
        if self.is_input(node) {
            return Err(MbqcError::invalid(format!(
                "local complementation at input node {}",
                node
            )));
        }
        self.graph.local_complement(node)?;
        if let Some(p) = self.planes.get_mut(&node) {
            *p = match *p {
                Plane::XY => Plane::XZ,
                Plane::XZ => Plane::XY,
                Plane::YZ => Plane::YZ,
            };
        }
        for n in self.graph.neighbors(node) {
            if let Some(p) = self.planes.get_mut(&n) {
                *p = match *p {
                    Plane::XY => Plane::XY,
                    Plane::XZ => Plane::YZ,
                    Plane::YZ => Plane::XZ,
                };
            }
        }
        Ok(())
    }

    /// Pivot along the edge `uv`
    /// Gantree: pivot(u,v) -> Result<()> // LC(u)·LC(v)·LC(u)
    pub fn pivot(&mut self, u: NodeId, v: NodeId) -> MbqcResult<()> {
        if !self.graph.has_edge(u, v) {
            return Err(MbqcError::invalid(format!(
                "pivot needs an edge between {} and {}",
                u, v
            )));
        }
        self.local_complement(u)?;
        self.local_complement(v)?;
        self.local_complement(u)
    }
}

impl<G: GraphLike> fmt::Display for OpenGraph<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "OpenGraph: {} nodes, {} edges",
            self.graph.num_nodes(),
            self.graph.edges().len()
        )?;
        writeln!(f, "  inputs:  {:?}", self.inputs)?;
        writeln!(f, "  outputs: {:?}", self.outputs)?;
        for (n, p) in &self.planes {
            writeln!(f, "  {} -> {}", n, p)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
