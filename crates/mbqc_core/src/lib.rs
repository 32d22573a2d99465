//! # MBQC Core
//!
//! Open graphs, Clifford frames, commands and patterns for the MBQC flow core.
//!
//! ## Gantree Architecture
//!
//! ```text
//! mbqc_core // L0+L1+L2: Foundation + Graph + Pattern (완료)
//!     L0_Foundation // 기반 타입/상수/에러 (완료)
//!         CoreTypes // NodeId, Plane, Axis (완료)
//!         Constants // 각도 허용오차 (완료)
//!         Errors // MbqcError (완료)
//!     L1_Graph // 그래프 모델 (완료)
//!         GraphLike // 그래프 능력 trait (완료)
//!         OpenGraph // 입출력 + 평면 (완료)
//!     L1_Frame // 클리포드 프레임 (완료)
//!         Clifford // 24원소 군 (완료)
//!         MeasurementBasis // 기저 변환 (완료)
//!         Signal // 도메인 XOR (완료)
//!         NodeFrame // W·X^x·Z^z (완료)
//!     L2_Pattern // 명령 시퀀스 (완료)
//!         Command // N E M X Z C (완료)
//!         Pattern // 검증 + 그래프 뷰 (완료)
//!         PatternBuilder // 빌더 패턴 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use mbqc_core::prelude::*;
//!
//! // Two J(0) gadgets: the identity on one logical qubit
//! let pattern = PatternBuilder::new(vec![0], vec![2])
//!     .j(0, 1, 0.0)
//!     .j(1, 2, 0.0)
//!     .build_validated()
//!     .unwrap();
//!
//! assert_eq!(pattern.measurement_order(), vec![0, 1]);
//! println!("{}", pattern);
//! ```
//!
//! ## Open Graphs
//!
//! ```rust
//! use mbqc_core::prelude::*;
//!
//! let mut og = OpenGraph::from_edges_xy(&[(0, 1), (1, 2)], vec![0], vec![2]).unwrap();
//! assert_eq!(og.plane(1).unwrap(), Plane::XY);
//!
//! // Boundary nodes are protected
//! assert!(og.remove_node(0).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Core types (Gantree: L0_Foundation → CoreTypes)
pub mod types;

/// Constants (Gantree: L0_Foundation → Constants)
pub mod constants;

/// Error types (Gantree: L0_Foundation → Errors)
pub mod error;

/// Graph model (Gantree: L1_Graph → GraphModel)
pub mod graph;

/// Clifford group (Gantree: L1_Frame → Clifford)
pub mod clifford;

/// Measurement bases (Gantree: L1_Frame → MeasurementBasis)
pub mod measurement;

/// Outcome signals (Gantree: L1_Frame → Signal)
pub mod signal;

/// Byproduct frames (Gantree: L1_Frame → NodeFrame)
pub mod frame;

/// Commands (Gantree: L2_Pattern → Command)
pub mod command;

/// Patterns (Gantree: L2_Pattern → Pattern)
pub mod pattern;

/// Pattern builder (Gantree: L2_Pattern → PatternBuilder)
pub mod builder;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::PatternBuilder;
pub use clifford::Clifford;
pub use command::{Command, CommandKind, Measurement};
pub use constants::{angles, limits};
pub use error::{MbqcError, MbqcResult};
pub use frame::NodeFrame;
pub use graph::{AdjacencyGraph, GraphLike, OpenGraph};
pub use measurement::MeasurementBasis;
pub use pattern::Pattern;
pub use signal::{Domain, Signal};
pub use types::{Angle, Axis, NodeId, Plane, Sign, SignedAxis};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use mbqc_core::prelude::*;
    //! ```

    pub use crate::builder::PatternBuilder;
    pub use crate::clifford::Clifford;
    pub use crate::command::{Command, CommandKind, Measurement};
    pub use crate::error::{MbqcError, MbqcResult};
    pub use crate::frame::NodeFrame;
    pub use crate::graph::{AdjacencyGraph, GraphLike, OpenGraph};
    pub use crate::measurement::MeasurementBasis;
    pub use crate::pattern::Pattern;
    pub use crate::signal::{Domain, Signal};
    pub use crate::types::{Angle, Axis, NodeId, Plane, Sign, SignedAxis};
}

// ============================================================================
// Version Information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_pattern_graph_matches_open_graph() {
        let p = PatternBuilder::new(vec![0], vec![3])
            .j_chain(&[0, 1, 2, 3], &[0.1, 0.2, 0.3])
            .build_validated()
            .unwrap();
        let og = p.open_graph().unwrap();
        assert_eq!(og.edges(), vec![(0, 1), (1, 2), (2, 3)]);
        assert_eq!(og.non_outputs(), vec![0, 1, 2]);
        assert!(og.is_input(0));
    }

    #[test]
    fn test_frame_through_entanglement() {
        // X on a before E(a,b) equals X on a and Z on b after it
        let mut a = NodeFrame::new();
        a.apply_x(&Domain::single(9));
        assert!(a.commutes_with_entangle());
        let mut b = NodeFrame::new();
        b.apply_z(&a.entangle_kick());
        assert_eq!(b.z, Domain::single(9));
    }

    #[test]
    fn test_pauli_measurement_under_frames() {
        let basis = MeasurementBasis::new(Plane::XY, 0.5);
        let frame = NodeFrame::with_clifford(Clifford::H);
        let m = frame.measure(0, basis, &Signal::zero(), &Signal::zero());
        // H Y H = -Y
        assert_eq!(
            m.basis().pauli(),
            Some(SignedAxis::minus(Axis::Y))
        );
    }

    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
        assert_eq!(super::NAME, "mbqc_core");
    }
}
