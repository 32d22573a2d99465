//! Byproduct frames
//!
//! Gantree: L1_Frame → NodeFrame
//!
//! A [`NodeFrame`] records the operator still pending on one qubit in the
//! normal form `W · X^x · Z^z` (Z first, then X, then the Clifford `W`).
//! Global phases, including outcome-dependent signs, are dropped.

use crate::clifford::Clifford;
use crate::command::{Command, Measurement};
use crate::measurement::MeasurementBasis;
use crate::signal::{Domain, Signal};
use crate::types::{Axis, NodeId, SignedAxis};
use serde::{Deserialize, Serialize};

/// Pending operator on a single node
/// Gantree: NodeFrame // W·X^x·Z^z
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeFrame {
    /// Clifford part `W`
    pub clifford: Clifford,
    /// X exponent
    pub x: Domain,
    /// Z exponent
    pub z: Domain,
}

impl NodeFrame {
    /// Identity frame
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame holding only a Clifford
    pub fn with_clifford(clifford: Clifford) -> Self {
        Self {
            clifford,
            ..Self::default()
        }
    }

    /// True if nothing is pending
    pub fn is_identity(&self) -> bool {
        self.clifford.is_identity() && self.x.is_empty() && self.z.is_empty()
    }

    /// Frame can be moved through a CZ without changing its form
    pub fn commutes_with_entangle(&self) -> bool {
        self.clifford.is_diagonal()
    }

    /// Apply `P^signal` after the pending operator
    /// Gantree: apply_pauli(axis,signal) // 바이프로덕트 흡수
    pub fn apply_pauli(&mut self, axis: Axis, signal: &Signal) {
        if signal.is_zero() {
            return;
        }
        // P W = W Q with Q = W† P W
        let q = self.clifford.inverse().conjugate(SignedAxis::plus(axis));
        if signal.constant {
            self.clifford = self.clifford.compose(&Clifford::pauli(q.axis));
        }
        if !signal.domain.is_empty() {
            if matches!(q.axis, Axis::X | Axis::Y) {
                self.x ^= &signal.domain;
            }
            if matches!(q.axis, Axis::Y | Axis::Z) {
                self.z ^= &signal.domain;
            }
        }
    }

    /// Apply `X^domain`
    pub fn apply_x(&mut self, domain: &Domain) {
        self.apply_pauli(Axis::X, &Signal::from_domain(domain.clone()));
    }

    /// Apply `Z^domain`
    pub fn apply_z(&mut self, domain: &Domain) {
        self.apply_pauli(Axis::Z, &Signal::from_domain(domain.clone()));
    }

    /// Apply a Clifford after the pending operator
    pub fn apply_clifford(&mut self, clifford: &Clifford) {
        self.clifford = clifford.compose(&self.clifford);
    }

    /// Push the frame through `E(self, partner)`; returns the Z domain the
    /// partner picks up. Requires [`NodeFrame::commutes_with_entangle`].
    pub fn entangle_kick(&self) -> Domain {
        self.x.clone()
    }

    /// Consume the frame into a measurement
    /// Gantree: measure(basis,s,t) -> Measurement // 측정 흡수
    ///
    /// `s` and `t` are the measurement's own dependencies, applied as
    /// `X^s Z^t` before the basis is read.
    pub fn measure(
        mut self,
        node: NodeId,
        basis: MeasurementBasis,
        s: &Signal,
        t: &Signal,
    ) -> Measurement {
        self.apply_pauli(Axis::Z, t);
        self.apply_pauli(Axis::X, s);
        let basis = basis.absorb(&self.clifford);
        Measurement::new(node, basis.plane, basis.angle).with_domains(self.x, self.z)
    }

    /// Emit the frame as output corrections `X`, `Z`, `C`
    pub fn into_corrections(self, node: NodeId) -> Vec<Command> {
        let mut out = Vec::new();
        if !self.x.is_empty() {
            out.push(Command::X(node, self.x));
        }
        if !self.z.is_empty() {
            out.push(Command::Z(node, self.z));
        }
        if !self.clifford.is_identity() {
            out.push(Command::Clifford(node, self.clifford));
        }
        out
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Plane;

    #[test]
    fn test_plain_byproducts() {
        let mut f = NodeFrame::new();
        f.apply_x(&Domain::single(1));
        f.apply_z(&Domain::single(0));
        f.apply_x(&Domain::single(1));
        assert!(f.x.is_empty());
        assert_eq!(f.z, Domain::single(0));
        assert!(f.clifford.is_identity());
    }

    #[test]
    fn test_byproduct_through_hadamard() {
        // X after H is H then Z
        let mut f = NodeFrame::with_clifford(Clifford::H);
        f.apply_x(&Domain::single(3));
        assert!(f.x.is_empty());
        assert_eq!(f.z, Domain::single(3));
    }

    #[test]
    fn test_constant_folds_into_clifford() {
        let mut f = NodeFrame::new();
        f.apply_pauli(Axis::Z, &Signal::constant(true));
        assert_eq!(f.clifford, Clifford::Z);
        f.apply_pauli(Axis::Z, &Signal::constant(true));
        assert!(f.is_identity());
    }

    #[test]
    fn test_measure_absorbs_frame() {
        // Z^t before an XY measurement becomes the t-domain
        let f = NodeFrame::new();
        let m = f.measure(
            0,
            MeasurementBasis::new(Plane::XY, 0.25),
            &Signal::zero(),
            &Signal::from_domain(Domain::single(5)),
        );
        assert_eq!(m.t_domain, Domain::single(5));
        assert!(m.s_domain.is_empty());

        // a pending Z flips the XY angle
        let f = NodeFrame::with_clifford(Clifford::Z);
        let m = f.measure(
            0,
            MeasurementBasis::new(Plane::XY, 0.25),
            &Signal::zero(),
            &Signal::zero(),
        );
        assert_eq!(m.plane, Plane::XY);
        assert!((m.angle - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_output_corrections() {
        let mut f = NodeFrame::new();
        f.apply_x(&Domain::single(1));
        f.apply_clifford(&Clifford::H);
        let cmds = f.into_corrections(4);
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[0], Command::X(4, Domain::single(1)));
        assert_eq!(cmds[1], Command::Clifford(4, Clifford::H));
    }
}
