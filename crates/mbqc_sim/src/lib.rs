//! # MBQC Sim
//!
//! Reference statevector executor for small patterns.
//!
//! Used by the test suites to check that standardization, signal shifting,
//! Pauli reduction and space minimization leave the output state unchanged.
//! It is not a production backend.
//!
//! ## Gantree Architecture
//!
//! ```text
//! mbqc_sim // L6: Reference executor (완료)
//!     Gates // 2x2 행렬, 클리포드 행렬 (완료)
//!     StateVector // 노드별 진폭 (완료)
//!     StatevectorBackend // 패턴 실행 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use mbqc_core::PatternBuilder;
//! use mbqc_sim::{fidelity, random_state, StatevectorBackend};
//! use rand::SeedableRng;
//!
//! let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
//! let input = random_state(&mut rng, 1);
//! let wire = PatternBuilder::new(vec![0], vec![2]).j(0, 1, 0.0).j(1, 2, 0.0).build();
//!
//! let out = StatevectorBackend::new(1).run(&wire, Some(&input)).unwrap();
//! assert!((fidelity(&out.state, &input) - 1.0).abs() < 1e-9);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Single-qubit matrices (Gantree: L6_Sim → Gates)
pub mod gates;

/// State vector (Gantree: L6_Sim → StateVector)
pub mod statevector;

/// Pattern executor (Gantree: L6_Sim → StatevectorBackend)
pub mod backend;

pub use backend::{fidelity, random_state, SimResult, StatevectorBackend};
pub use gates::{clifford_matrix, pauli_matrix, Mat2};
pub use statevector::StateVector;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
