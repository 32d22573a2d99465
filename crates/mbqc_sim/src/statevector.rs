//! Dense state vector keyed by node
//!
//! Gantree: L6_Sim → StateVector
//!
//! Bit `k` of an amplitude index is the qubit at position `k` of
//! [`StateVector::nodes`]. Newly prepared qubits take the highest position.

use crate::gates::{eigenvector, Mat2};
use mbqc_core::{limits, MbqcError, MbqcResult, MeasurementBasis, NodeId};
use num_complex::Complex64;
use rand::Rng;

/// Amplitudes plus the node order of their bits
/// Gantree: StateVector // 진폭 + 노드 순서
#[derive(Debug, Clone, PartialEq)]
pub struct StateVector {
    amps: Vec<Complex64>,
    nodes: Vec<NodeId>,
}

/// Insert bit `b` at position `k` of `j`
fn insert_bit(j: usize, k: usize, b: usize) -> usize {
    let low = j & ((1 << k) - 1);
    let high = (j >> k) << (k + 1);
    high | (b << k) | low
}

impl Default for StateVector {
    fn default() -> Self {
        Self {
            amps: vec![Complex64::new(1.0, 0.0)],
            nodes: Vec::new(),
        }
    }
}

impl StateVector {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Zero-qubit state
    pub fn new() -> Self {
        Self::default()
    }

    /// `|+⟩` on every node
    pub fn plus(nodes: &[NodeId]) -> MbqcResult<Self> {
        let mut sv = Self::new();
        for &n in nodes {
            sv.add_plus(n)?;
        }
        Ok(sv)
    }

    /// Wrap amplitudes; bit `k` belongs to `nodes[k]`
    pub fn from_amplitudes(nodes: Vec<NodeId>, amps: Vec<Complex64>) -> MbqcResult<Self> {
        if nodes.len() > limits::MAX_SIM_QUBITS {
            return Err(MbqcError::CapacityExceeded {
                requested: nodes.len(),
                max: limits::MAX_SIM_QUBITS,
            });
        }
        if amps.len() != 1 << nodes.len() {
            return Err(MbqcError::DimensionMismatch {
                context: "StateVector::from_amplitudes".into(),
                expected: 1 << nodes.len(),
                found: amps.len(),
            });
        }
        let mut sv = Self { amps, nodes };
        sv.normalize();
        Ok(sv)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Live qubits
    pub fn num_qubits(&self) -> usize {
        self.nodes.len()
    }

    /// Node of every bit position
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Raw amplitudes
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amps
    }

    fn position(&self, node: NodeId) -> MbqcResult<usize> {
        self.nodes
            .iter()
            .position(|&n| n == node)
            .ok_or(MbqcError::UnknownNode(node))
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Append `|+⟩` for `node`
    pub fn add_plus(&mut self, node: NodeId) -> MbqcResult<()> {
        if self.nodes.len() + 1 > limits::MAX_SIM_QUBITS {
            return Err(MbqcError::CapacityExceeded {
                requested: self.nodes.len() + 1,
                max: limits::MAX_SIM_QUBITS,
            });
        }
        let r = std::f64::consts::FRAC_1_SQRT_2;
        let half: Vec<Complex64> = self.amps.iter().map(|a| a * r).collect();
        self.amps = half.iter().chain(half.iter()).copied().collect();
        self.nodes.push(node);
        Ok(())
    }

    /// Apply a single-qubit matrix
    pub fn apply(&mut self, node: NodeId, m: &Mat2) -> MbqcResult<()> {
        let mask = 1 << self.position(node)?;
        for i in 0..self.amps.len() {
            if i & mask == 0 {
                let j = i | mask;
                let (a, b) = (self.amps[i], self.amps[j]);
                self.amps[i] = m[0][0] * a + m[0][1] * b;
                self.amps[j] = m[1][0] * a + m[1][1] * b;
            }
        }
        Ok(())
    }

    /// Controlled-Z
    pub fn cz(&mut self, a: NodeId, b: NodeId) -> MbqcResult<()> {
        let mask = (1 << self.position(a)?) | (1 << self.position(b)?);
        for (i, amp) in self.amps.iter_mut().enumerate() {
            if i & mask == mask {
                *amp = -*amp;
            }
        }
        Ok(())
    }

    /// Measure `node` in `basis` and remove it
    /// Gantree: measure(node,basis,forced) -> Result<u8> // 사영 + 제거
    ///
    /// A forced outcome whose probability vanishes is replaced by the other
    /// branch; the realized outcome is returned.
    pub fn measure<R: Rng>(
        &mut self,
        node: NodeId,
        basis: &MeasurementBasis,
        forced: Option<u8>,
        rng: &mut R,
    ) -> MbqcResult<u8> {
        let k = self.position(node)?;
        let v0 = eigenvector(basis.direction());
        let v1 = [-v0[1].conj(), v0[0].conj()];

        let project = |v: &[Complex64; 2]| -> (Vec<Complex64>, f64) {
            let half = self.amps.len() / 2;
            let out: Vec<Complex64> = (0..half)
                .map(|j| {
                    v[0].conj() * self.amps[insert_bit(j, k, 0)]
                        + v[1].conj() * self.amps[insert_bit(j, k, 1)]
                })
                .collect();
            let p = out.iter().map(|a| a.norm_sqr()).sum();
            (out, p)
        };
        let (out0, p0) = project(&v0);
        let (out1, p1) = project(&v1);

        let wanted = match forced {
            Some(bit) => bit & 1,
            None => u8::from(rng.gen::<f64>() * (p0 + p1) >= p0),
        };
        let outcome = match wanted {
            0 if p0 > 1e-12 => 0,
            1 if p1 > 1e-12 => 1,
            0 => 1,
            _ => 0,
        };

        self.amps = if outcome == 0 { out0 } else { out1 };
        self.nodes.remove(k);
        self.normalize();
        Ok(outcome)
    }

    /// Amplitudes with bit `k` belonging to `order[k]`
    pub fn reordered(&self, order: &[NodeId]) -> MbqcResult<Vec<Complex64>> {
        if order.len() != self.nodes.len() {
            return Err(MbqcError::DimensionMismatch {
                context: "StateVector::reordered".into(),
                expected: self.nodes.len(),
                found: order.len(),
            });
        }
        let mut target = Vec::with_capacity(self.nodes.len());
        for &n in &self.nodes {
            let p = order
                .iter()
                .position(|&o| o == n)
                .ok_or(MbqcError::UnknownNode(n))?;
            target.push(p);
        }
        let mut out = vec![Complex64::new(0.0, 0.0); self.amps.len()];
        for (i, amp) in self.amps.iter().enumerate() {
            let j = target
                .iter()
                .enumerate()
                .filter(|(bit, _)| i >> bit & 1 == 1)
                .fold(0, |acc, (_, &t)| acc | (1 << t));
            out[j] = *amp;
        }
        Ok(out)
    }

    fn normalize(&mut self) {
        let norm: f64 = self.amps.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt();
        if norm > 0.0 {
            for a in &mut self.amps {
                *a /= norm;
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
