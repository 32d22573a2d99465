//! # MBQC Linalg
//!
//! Exact linear algebra over GF(2) for flow search.
//!
//! ## Gantree Architecture
//!
//! ```text
//! mbqc_linalg // L1: GF(2) kernel (완료)
//!     Gf2Matrix // 비트 행렬 (완료)
//!     Elimination // RREF, rank, 영공간, 해 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use mbqc_linalg::{from_bits, Gf2Matrix};
//!
//! let a = Gf2Matrix::from_rows(&[[1u8, 1, 0], [0, 1, 1]]).unwrap();
//! assert_eq!(a.rank(), 2);
//!
//! let x = a.solve(&from_bits(&[1, 1])).unwrap().unwrap();
//! assert_eq!(a.mul_vec(&x).unwrap(), from_bits(&[1, 1]));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Dense GF(2) matrices (Gantree: L1_Linalg → Gf2Matrix)
pub mod matrix;

/// Elimination (Gantree: L1_Linalg → Elimination)
pub mod elimination;

pub use elimination::RowEchelon;
pub use matrix::{from_bits, from_indices, zeros, Gf2Matrix, Gf2Vec};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
