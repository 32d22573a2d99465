//! Pattern executor
//!
//! Gantree: L6_Sim → StatevectorBackend
//!
//! Runs a pattern command by command on a [`StateVector`]. Used to check
//! that rewritten patterns act the same as their source.

use crate::gates::{clifford_matrix, pauli_matrix};
use crate::statevector::StateVector;
use mbqc_core::{Axis, Command, MbqcResult, NodeId, Pattern, SignedAxis};
use num_complex::Complex64;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

/// Result of one run
/// Gantree: SimResult // 출력 상태 + 측정 기록
#[derive(Debug, Clone)]
pub struct SimResult {
    /// Output amplitudes, bit `k` belongs to `outputs[k]`
    pub state: Vec<Complex64>,
    /// Declared outputs
    pub outputs: Vec<NodeId>,
    /// Realized outcome of every measurement
    pub outcomes: BTreeMap<NodeId, u8>,
}

/// Statevector executor with seeded sampling
/// Gantree: StatevectorBackend // 기준 실행기
pub struct StatevectorBackend {
    rng: ChaCha8Rng,
    forced: BTreeMap<NodeId, u8>,
}

impl StatevectorBackend {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create with a seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            forced: BTreeMap::new(),
        }
    }

    /// Force outcomes for the given nodes
    pub fn with_forced(mut self, outcomes: BTreeMap<NodeId, u8>) -> Self {
        self.forced = outcomes;
        self
    }

    /// Force one outcome
    pub fn force(&mut self, node: NodeId, outcome: u8) {
        self.forced.insert(node, outcome & 1);
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Run `pattern` on `input` (amplitudes over the declared inputs, bit
    /// `k` for `inputs[k]`); `None` means `|+⟩` on every input
    /// Gantree: run(pattern,input) -> Result<SimResult> // 명령 실행
    pub fn run(&mut self, pattern: &Pattern, input: Option<&[Complex64]>) -> MbqcResult<SimResult> {
        pattern.validate()?;
        let mut sv = match input {
            Some(amps) => StateVector::from_amplitudes(pattern.inputs().to_vec(), amps.to_vec())?,
            None => StateVector::plus(pattern.inputs())?,
        };
        let mut outcomes = BTreeMap::new();

        for cmd in pattern.commands() {
            match cmd {
                Command::Prepare(n) => sv.add_plus(*n)?,
                Command::Entangle(a, b) => sv.cz(*a, *b)?,
                Command::Measure(m) => {
                    if m.t_domain.parity(&outcomes) {
                        sv.apply(m.node, &pauli_matrix(SignedAxis::plus(Axis::Z)))?;
                    }
                    if m.s_domain.parity(&outcomes) {
                        sv.apply(m.node, &pauli_matrix(SignedAxis::plus(Axis::X)))?;
                    }
                    let forced = self.forced.get(&m.node).copied();
                    let r = sv.measure(m.node, &m.basis(), forced, &mut self.rng)?;
                    outcomes.insert(m.node, r);
                }
                Command::X(n, d) => {
                    if d.parity(&outcomes) {
                        sv.apply(*n, &pauli_matrix(SignedAxis::plus(Axis::X)))?;
                    }
                }
                Command::Z(n, d) => {
                    if d.parity(&outcomes) {
                        sv.apply(*n, &pauli_matrix(SignedAxis::plus(Axis::Z)))?;
                    }
                }
                Command::Clifford(n, c) => sv.apply(*n, &clifford_matrix(c))?,
            }
        }

        let state = sv.reordered(pattern.outputs())?;
        Ok(SimResult {
            state,
            outputs: pattern.outputs().to_vec(),
            outcomes,
        })
    }
}

/// `|⟨a|b⟩|` for normalized states; 0 when dimensions differ
/// Gantree: fidelity(a,b) -> f64 // 전역 위상 무시
pub fn fidelity(a: &[Complex64], b: &[Complex64]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }
    let na: f64 = a.iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt();
    let nb: f64 = b.iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    let overlap: Complex64 = a.iter().zip(b).map(|(x, y)| x.conj() * y).sum();
    overlap.norm() / (na * nb)
}

/// Random normalized state on `n` qubits
pub fn random_state<R: Rng>(rng: &mut R, n: usize) -> Vec<Complex64> {
    let amps: Vec<Complex64> = (0..1usize << n)
        .map(|_| Complex64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
        .collect();
    let norm = amps.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt();
    amps.into_iter().map(|a| a / norm).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates::mul;
    use mbqc_core::{Clifford, PatternBuilder};

    fn outcome_records(nodes: &[NodeId]) -> Vec<BTreeMap<NodeId, u8>> {
        (0..1u32 << nodes.len())
            .map(|bits| {
                nodes
                    .iter()
                    .enumerate()
                    .map(|(i, &n)| (n, ((bits >> i) & 1) as u8))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_j_zero_is_hadamard() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let input = random_state(&mut rng, 1);
        let p = PatternBuilder::new(vec![0], vec![1]).j(0, 1, 0.0).build();
        let h = clifford_matrix(&Clifford::H);
        let expected = vec![
            h[0][0] * input[0] + h[0][1] * input[1],
            h[1][0] * input[0] + h[1][1] * input[1],
        ];
        for forced in outcome_records(&[0]) {
            let mut backend = StatevectorBackend::new(0).with_forced(forced);
            let out = backend.run(&p, Some(&input)).unwrap();
            approx::assert_relative_eq!(fidelity(&out.state, &expected), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_wire_is_identity() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let input = random_state(&mut rng, 1);
        let p = PatternBuilder::new(vec![0], vec![2])
            .j(0, 1, 0.0)
            .j(1, 2, 0.0)
            .build();
        for forced in outcome_records(&[0, 1]) {
            let mut backend = StatevectorBackend::new(0).with_forced(forced);
            let out = backend.run(&p, Some(&input)).unwrap();
            approx::assert_relative_eq!(fidelity(&out.state, &input), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_xy_angle_convention() {
        // J(a) = H·Rz(-πa) up to phase
        let a = 0.3;
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let input = random_state(&mut rng, 1);
        let p = PatternBuilder::new(vec![0], vec![1]).j(0, 1, a).build();
        let phase = Complex64::from_polar(1.0, -std::f64::consts::PI * a);
        let rz = [
            [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
            [Complex64::new(0.0, 0.0), phase],
        ];
        let u = mul(&clifford_matrix(&Clifford::H), &rz);
        let expected = vec![
            u[0][0] * input[0] + u[0][1] * input[1],
            u[1][0] * input[0] + u[1][1] * input[1],
        ];
        let out = StatevectorBackend::new(9).run(&p, Some(&input)).unwrap();
        approx::assert_relative_eq!(fidelity(&out.state, &expected), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_output_order() {
        // 두 출력의 순서를 바꾸면 비트가 바뀐다
        let p = PatternBuilder::new(vec![], vec![0, 1])
            .n(0)
            .n(1)
            .c(1, Clifford::H)
            .build();
        let q = Pattern::from_parts(vec![], vec![1, 0], p.commands().to_vec());
        let a = StatevectorBackend::new(0).run(&p, None).unwrap();
        let b = StatevectorBackend::new(0).run(&q, None).unwrap();
        // node 1 is |0⟩: bit 1 clear in a, bit 0 clear in b
        approx::assert_relative_eq!(a.state[2].norm(), 0.0, epsilon = 1e-12);
        approx::assert_relative_eq!(b.state[1].norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let p = PatternBuilder::new(vec![], vec![1]).n(1).e(1, 2).build();
        assert!(StatevectorBackend::new(0).run(&p, None).is_err());
        let p = PatternBuilder::new(vec![0], vec![1]).j(0, 1, 0.0).build();
        let wrong = vec![Complex64::new(1.0, 0.0); 3];
        assert!(StatevectorBackend::new(0).run(&p, Some(&wrong)).is_err());
    }

    #[test]
    fn test_fidelity() {
        let a = vec![Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)];
        let b = vec![Complex64::new(0.0, 1.0), Complex64::new(0.0, 0.0)];
        approx::assert_relative_eq!(fidelity(&a, &b), 1.0);
        assert_eq!(fidelity(&a, &b[..1]), 0.0);
    }
}
