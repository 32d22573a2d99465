//! Pattern builder
//!
//! Gantree: L2_Pattern → PatternBuilder
//!
//! Fluent construction of command sequences, including the circuit-style
//! `J(α)` gadget used to chain single-qubit rotations.

use crate::clifford::Clifford;
use crate::command::{Command, Measurement};
use crate::error::MbqcResult;
use crate::pattern::Pattern;
use crate::types::{Angle, NodeId, Plane};

/// Fluent pattern builder (consuming self pattern)
/// Gantree: PatternBuilder // 빌더 패턴
pub struct PatternBuilder {
    /// Pattern being built
    pattern: Pattern,
}

impl PatternBuilder {
    // ========================================================================
    // Constructor
    // ========================================================================

    /// Create a builder with boundary
    /// Gantree: new(I,O) -> Self // 생성자
    pub fn new(inputs: Vec<NodeId>, outputs: Vec<NodeId>) -> Self {
        Self {
            pattern: Pattern::new(inputs, outputs),
        }
    }

    /// Set the pattern name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.pattern = self.pattern.with_name(name);
        self
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// `N(node)`
    pub fn n(mut self, node: NodeId) -> Self {
        self.pattern.push(Command::Prepare(node));
        self
    }

    /// `E(a, b)`
    pub fn e(mut self, a: NodeId, b: NodeId) -> Self {
        self.pattern.push(Command::Entangle(a, b));
        self
    }

    /// `M(node)` without dependencies
    pub fn m(mut self, node: NodeId, plane: Plane, angle: Angle) -> Self {
        self.pattern.push(Command::measure(node, plane, angle));
        self
    }

    /// `M(node)` with s/t dependencies
    pub fn m_adaptive(
        mut self,
        node: NodeId,
        plane: Plane,
        angle: Angle,
        s_domain: &[NodeId],
        t_domain: &[NodeId],
    ) -> Self {
        let m = Measurement::new(node, plane, angle).with_domains(
            s_domain.iter().copied().collect(),
            t_domain.iter().copied().collect(),
        );
        self.pattern.push(Command::Measure(m));
        self
    }

    /// `X(node, domain)`
    pub fn x(mut self, node: NodeId, domain: &[NodeId]) -> Self {
        self.pattern
            .push(Command::X(node, domain.iter().copied().collect()));
        self
    }

    /// `Z(node, domain)`
    pub fn z(mut self, node: NodeId, domain: &[NodeId]) -> Self {
        self.pattern
            .push(Command::Z(node, domain.iter().copied().collect()));
        self
    }

    /// `C(node, clifford)`
    pub fn c(mut self, node: NodeId, clifford: Clifford) -> Self {
        self.pattern.push(Command::Clifford(node, clifford));
        self
    }

    // ========================================================================
    // Gadgets
    // ========================================================================

    /// `J(angle)` gadget moving the logical qubit from `from` to `to`
    /// Gantree: j(from,to,angle) -> Self // N E M X
    ///
    /// Appends `N(to) E(from,to) M(from, XY, angle) X(to, {from})`.
    pub fn j(self, from: NodeId, to: NodeId, angle: Angle) -> Self {
        self.n(to)
            .e(from, to)
            .m(from, Plane::XY, angle)
            .x(to, &[from])
    }

    /// Chain of `J` gadgets through `nodes`, one angle per hop
    pub fn j_chain(mut self, nodes: &[NodeId], angles: &[Angle]) -> Self {
        for (w, &a) in nodes.windows(2).zip(angles.iter()) {
            self = self.j(w[0], w[1], a);
        }
        self
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Finish without validation
    pub fn build(self) -> Pattern {
        self.pattern
    }

    /// Finish and validate
    pub fn build_validated(self) -> MbqcResult<Pattern> {
        self.pattern.validate()?;
        Ok(self.pattern)
    }

    /// Peek at the pattern
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }
}
