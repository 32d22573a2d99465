//! # MBQC Pattern
//!
//! Pattern rewriting: standardization, signal shifting, per-node local
//! standardization, generation from a flow and space minimization.
//!
//! ## Gantree Architecture
//!
//! ```text
//! mbqc_pattern // L4: Pattern rewriting (완료)
//!     Fold // 바이프로덕트를 끝으로 이동 (완료)
//!     Standardizer // N* E* M* 보정, 깊이 순서 (완료)
//!     SignalShifter // 평면별 신호 전파 (완료)
//!     LocalPattern // 노드별 클러스터 표준화 (완료)
//!     PatternGenerator // 플로우 → 패턴 (완료)
//!     Space // 최대 활성 큐비트, 지연 준비 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use mbqc_core::PatternBuilder;
//! use mbqc_pattern::{shift_signals, standardize};
//!
//! let wire = PatternBuilder::new(vec![0], vec![2])
//!     .j(0, 1, 0.25)
//!     .j(1, 2, 0.5)
//!     .build();
//!
//! let p = shift_signals(&standardize(&wire).unwrap()).unwrap();
//! assert!(p.is_standard());
//! assert_eq!(p.measurement_order(), vec![0, 1]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

mod fold;

/// Standardization (Gantree: L4_Pattern → Standardizer)
pub mod standardize;

/// Signal shifting (Gantree: L4_Pattern → SignalShifter)
pub mod shift;

/// Per-node standardization (Gantree: L4_Pattern → LocalPattern)
pub mod local;

/// Pattern generation (Gantree: L4_Pattern → PatternGenerator)
pub mod generate;

/// Space accounting (Gantree: L4_Pattern → Space)
pub mod space;

// ============================================================================
// Re-exports
// ============================================================================

pub use generate::PatternGenerator;
pub use local::{standardize_local, LocalPattern, NodeCluster};
pub use shift::shift_signals;
pub use space::{max_space, minimize_space};
pub use standardize::{MeasurementOrder, Standardizer};

use mbqc_core::{MbqcResult, Pattern};

/// Standardize with a maximally delayed flow
pub fn standardize(pattern: &Pattern) -> MbqcResult<Pattern> {
    Standardizer::default().standardize(pattern)
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Integration Tests
// ============================================================================
