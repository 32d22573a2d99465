//! # MBQC Engine
//!
//! Staged optimization pipeline over measurement patterns.
//!
//! ## Gantree Architecture
//!
//! ```text
//! mbqc_engine // L7: Integration (완료)
//!     OptimizerConfig // 통합 설정 (완료)
//!         flow_mode, measurement_order, strategy
//!         shift / pauli / space 스위치, 검증 옵션
//!         standard(), fast(), thorough(), JSON
//!     Pipeline // 단계별 실행 (완료)
//!         validate() → standardize() → shift() → reduce_pauli()
//!         → resolve_flow() → finish()
//!         run() - 전체 파이프라인
//!     OptimizationReport // 전후 지표 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use mbqc_core::PatternBuilder;
//! use mbqc_engine::prelude::*;
//!
//! let wire = PatternBuilder::new(vec![0], vec![3])
//!     .j(0, 1, 0.3)
//!     .j(1, 2, 0.5)
//!     .j(2, 3, 0.7)
//!     .build();
//!
//! let report = Pipeline::new(OptimizerConfig::default()).run(&wire).unwrap();
//! assert_eq!(report.pauli_removed, 1);
//! assert!(report.pattern.is_standard());
//! ```
//!
//! ## Configuration Modes
//!
//! ```rust
//! use mbqc_engine::prelude::*;
//!
//! // Flow order, shifting, Pauli reduction (default)
//! let standard = OptimizerConfig::default();
//!
//! // Greedy flow, no Pauli reduction
//! let fast = OptimizerConfig::fast();
//!
//! // Everything, checked on the reference executor
//! let thorough = OptimizerConfig::thorough();
//!
//! let json = thorough.to_json().unwrap();
//! assert_eq!(OptimizerConfig::from_json(&json).unwrap(), thorough);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Configuration (Gantree: L7_Integration → OptimizerConfig)
pub mod config;

/// Pipeline (Gantree: L7_Integration → Pipeline)
pub mod pipeline;

/// Report (Gantree: L7_Integration → OptimizationReport)
pub mod report;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{OptimizerConfig, StandardizeStrategy};
pub use pipeline::{Pipeline, PipelineStage, PipelineState};
pub use report::{OptimizationReport, PatternMetrics};

use mbqc_core::{MbqcResult, Pattern};

/// Run the full pipeline once
pub fn optimize(pattern: &Pattern, config: OptimizerConfig) -> MbqcResult<OptimizationReport> {
    Pipeline::new(config).run(pattern)
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Prelude
// ============================================================================

/// Convenient imports for common use cases
pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use mbqc_engine::prelude::*;
    //! ```

    pub use crate::config::{OptimizerConfig, StandardizeStrategy};
    pub use crate::optimize;
    pub use crate::pipeline::{Pipeline, PipelineStage};
    pub use crate::report::{OptimizationReport, PatternMetrics};
    pub use mbqc_pauli::FlowStatus;
}

// ============================================================================
// Integration Tests
// ============================================================================
