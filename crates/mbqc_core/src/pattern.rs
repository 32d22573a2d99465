//! Measurement patterns
//!
//! Gantree: L2_Pattern → Pattern
//!
//! An ordered command sequence with declared inputs and outputs.

use crate::command::{Command, CommandKind, Measurement};
use crate::error::{MbqcError, MbqcResult};
use crate::graph::{AdjacencyGraph, GraphLike, OpenGraph};
use crate::types::{NodeId, Plane};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Lifecycle of a node while scanning a command sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeState {
    Live,
    Measured,
}

/// MBQC measurement pattern
/// Gantree: Pattern // 명령 시퀀스 + 입출력
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    /// Optional name
    name: Option<String>,

    /// Declared input nodes
    inputs: Vec<NodeId>,

    /// Declared output nodes (order fixes the output register)
    outputs: Vec<NodeId>,

    /// Commands in execution order
    commands: Vec<Command>,
}

impl Pattern {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Empty pattern with boundary
    pub fn new(inputs: Vec<NodeId>, outputs: Vec<NodeId>) -> Self {
        Self {
            name: None,
            inputs,
            outputs,
            commands: Vec::new(),
        }
    }

    /// Pattern from parts (not validated)
    pub fn from_parts(inputs: Vec<NodeId>, outputs: Vec<NodeId>, commands: Vec<Command>) -> Self {
        Self {
            name: None,
            inputs,
            outputs,
            commands,
        }
    }

    /// Set name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Declared inputs
    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    /// Declared outputs
    pub fn outputs(&self) -> &[NodeId] {
        &self.outputs
    }

    /// Commands
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Consume into commands
    pub fn into_commands(self) -> Vec<Command> {
        self.commands
    }

    /// Number of commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// True if there are no commands
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Append a command
    pub fn push(&mut self, cmd: Command) {
        self.commands.push(cmd);
    }

    /// Count commands of one kind
    pub fn count(&self, kind: CommandKind) -> usize {
        self.commands.iter().filter(|c| c.kind() == kind).count()
    }

    /// Nodes prepared by `N`, in command order
    pub fn prepared_nodes(&self) -> Vec<NodeId> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Prepare(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    /// Inputs followed by prepared nodes
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut out = self.inputs.clone();
        out.extend(self.prepared_nodes());
        out
    }

    /// Measurements in command order
    pub fn measurements(&self) -> impl Iterator<Item = &Measurement> {
        self.commands.iter().filter_map(|c| match c {
            Command::Measure(m) => Some(m),
            _ => None,
        })
    }

    /// Measured nodes in command order
    pub fn measurement_order(&self) -> Vec<NodeId> {
        self.measurements().map(|m| m.node).collect()
    }

    /// Measurement command of `node`
    pub fn measurement(&self, node: NodeId) -> Option<&Measurement> {
        self.measurements().find(|m| m.node == node)
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check the pattern invariants
    /// Gantree: validate() -> Result<()> // 불변식 검사
    ///
    /// Every referenced node must be a declared input or prepared earlier,
    /// domains may only read measured nodes, and every node ends up either
    /// measured exactly once or declared as output.
    pub fn validate(&self) -> MbqcResult<()> {
        let mut state: BTreeMap<NodeId, NodeState> = BTreeMap::new();
        for &n in &self.inputs {
            if state.insert(n, NodeState::Live).is_some() {
                return Err(MbqcError::pattern(format!("input {} declared twice", n)));
            }
        }
        let outputs: BTreeSet<NodeId> = self.outputs.iter().copied().collect();
        if outputs.len() != self.outputs.len() {
            return Err(MbqcError::pattern("output declared twice"));
        }
        if let Some(n) = self.inputs.iter().find(|n| outputs.contains(n)) {
            return Err(MbqcError::pattern(format!(
                "node {} is both input and output",
                n
            )));
        }

        for (idx, cmd) in self.commands.iter().enumerate() {
            let live = |n: NodeId, state: &BTreeMap<NodeId, NodeState>| -> MbqcResult<()> {
                match state.get(&n) {
                    Some(NodeState::Live) => Ok(()),
                    Some(NodeState::Measured) => Err(MbqcError::pattern(format!(
                        "command {} ({}) uses node {} after its measurement",
                        idx, cmd, n
                    ))),
                    None => Err(MbqcError::pattern(format!(
                        "command {} ({}) references unprepared node {}",
                        idx, cmd, n
                    ))),
                }
            };
            for d in cmd.domains() {
                for n in d {
                    if state.get(n) != Some(&NodeState::Measured) {
                        return Err(MbqcError::pattern(format!(
                            "command {} ({}) depends on node {} before it is measured",
                            idx, cmd, n
                        )));
                    }
                }
            }
            match cmd {
                Command::Prepare(n) => {
                    if state.insert(*n, NodeState::Live).is_some() {
                        return Err(MbqcError::pattern(format!(
                            "node {} prepared twice or prepared as input",
                            n
                        )));
                    }
                }
                Command::Entangle(a, b) => {
                    if a == b {
                        return Err(MbqcError::pattern(format!("self-entanglement on {}", a)));
                    }
                    live(*a, &state)?;
                    live(*b, &state)?;
                }
                Command::Measure(m) => {
                    live(m.node, &state)?;
                    if outputs.contains(&m.node) {
                        return Err(MbqcError::pattern(format!(
                            "output node {} is measured",
                            m.node
                        )));
                    }
                    if !m.angle.is_finite() {
                        return Err(MbqcError::pattern(format!(
                            "non-finite angle on node {}",
                            m.node
                        )));
                    }
                    state.insert(m.node, NodeState::Measured);
                }
                Command::X(n, _) | Command::Z(n, _) => live(*n, &state)?,
                Command::Clifford(n, c) => {
                    live(*n, &state)?;
                    if !c.is_valid() {
                        return Err(MbqcError::pattern(format!(
                            "malformed Clifford on node {}",
                            n
                        )));
                    }
                }
            }
        }

        for &o in &self.outputs {
            if state.get(&o) != Some(&NodeState::Live) {
                return Err(MbqcError::pattern(format!(
                    "output node {} is never prepared",
                    o
                )));
            }
        }
        for (n, s) in &state {
            if *s == NodeState::Live && !outputs.contains(n) {
                return Err(MbqcError::pattern(format!(
                    "node {} is neither measured nor an output",
                    n
                )));
            }
        }
        Ok(())
    }

    /// True if commands appear as `N* E* M* (X|Z|C)*` with corrections
    /// only on outputs
    pub fn is_standard(&self) -> bool {
        let rank = |c: &Command| match c {
            Command::Prepare(_) => 0,
            Command::Entangle(..) => 1,
            Command::Measure(_) => 2,
            _ => 3,
        };
        let ordered = self
            .commands
            .windows(2)
            .all(|w| rank(&w[0]) <= rank(&w[1]));
        let corrections_on_outputs = self
            .commands
            .iter()
            .filter(|c| c.is_correction())
            .all(|c| c.targets().iter().all(|n| self.outputs.contains(n)));
        ordered && corrections_on_outputs
    }

    // ========================================================================
    // Graph Views
    // ========================================================================

    /// Resource graph: all nodes, edges toggled by every `E`
    pub fn graph(&self) -> MbqcResult<AdjacencyGraph> {
        let mut g = AdjacencyGraph::new();
        for n in self.nodes() {
            g.add_node(n);
        }
        for cmd in &self.commands {
            if let Command::Entangle(a, b) = cmd {
                g.toggle_edge(*a, *b)?;
            }
        }
        Ok(g)
    }

    /// Open graph with planes read from the `M` commands
    pub fn open_graph(&self) -> MbqcResult<OpenGraph> {
        let planes: BTreeMap<NodeId, Plane> =
            self.measurements().map(|m| (m.node, m.plane)).collect();
        OpenGraph::new(
            self.graph()?,
            self.inputs.clone(),
            self.outputs.clone(),
            planes,
        )
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Serialize to JSON
    pub fn to_json(&self) -> MbqcResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON and validate
    pub fn from_json(json: &str) -> MbqcResult<Self> {
        let p: Pattern = serde_json::from_str(json)?;
        p.validate()?;
        Ok(p)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Pattern{}: inputs={:?} outputs={:?} ({} commands)",
            self.name
                .as_ref()
                .map(|n| format!(" '{}'", n))
                .unwrap_or_default(),
            self.inputs,
            self.outputs,
            self.commands.len()
        )?;
        for cmd in &self.commands {
            writeln!(f, "  {}", cmd)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
