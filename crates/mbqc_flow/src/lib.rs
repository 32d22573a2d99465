//! # MBQC Flow
//!
//! Generalized flow search on open graphs.
//!
//! ## Gantree Architecture
//!
//! ```text
//! mbqc_flow // L3: Flow (완료)
//!     GFlow // (g, d) 결과 + 측정 순서 (완료)
//!     GFlowSolver // 층별 GF(2) 탐색 (완료)
//!         MaximallyDelayed // 층마다 일괄 소거 (완료)
//!         Any // 탐욕적 탐색 (완료)
//!         Refine // 이전 순서 재사용 (완료)
//!     Verifier // 평면 조건 검사 (완료)
//!     CausalFlow // XY 전용 인과 플로우 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use mbqc_core::OpenGraph;
//! use mbqc_flow::{find_gflow, verify_gflow, FlowMode};
//!
//! let og = OpenGraph::from_edges_xy(&[(0, 1), (1, 2)], vec![0], vec![2]).unwrap();
//! let flow = find_gflow(&og, FlowMode::MaximallyDelayed).unwrap();
//!
//! assert_eq!(flow.measurement_order(), vec![0, 1]);
//! assert!(verify_gflow(&og, &flow).is_ok());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Flow results (Gantree: L3_Flow → GFlow)
pub mod gflow;

/// Gflow search (Gantree: L3_Flow → GFlowSolver)
pub mod solver;

/// Flow verification (Gantree: L3_Flow → Verifier)
pub mod verify;

/// Causal flow (Gantree: L3_Flow → CausalFlow)
pub mod causal;

// ============================================================================
// Re-exports
// ============================================================================

pub use causal::{find_causal_flow, CausalFlow};
pub use gflow::{FlowMode, GFlow};
pub use solver::GFlowSolver;
pub use verify::verify_gflow;

use mbqc_core::{GraphLike, MbqcResult, OpenGraph};

/// Find a gflow of `graph` under `mode`
pub fn find_gflow<G: GraphLike>(graph: &OpenGraph<G>, mode: FlowMode) -> MbqcResult<GFlow> {
    GFlowSolver::find_gflow(graph, mode)
}

/// Re-derive a flow after `graph` changed, reusing the order of `previous`
pub fn refine_gflow<G: GraphLike>(graph: &OpenGraph<G>, previous: &GFlow) -> MbqcResult<GFlow> {
    GFlowSolver::refine_gflow(graph, previous)
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Integration Tests
// ============================================================================
