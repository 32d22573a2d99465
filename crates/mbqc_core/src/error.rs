//! Error types for the MBQC flow core
//!
//! Gantree: L0_Foundation → Errors
//!
//! Every fallible operation in the workspace returns [`MbqcResult`].

// Error variant fields are self-documenting via error messages
#![allow(missing_docs)]

use crate::types::NodeId;
use thiserror::Error;

/// Main error type for the MBQC core
/// Gantree: MbqcError // enum
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MbqcError {
    // ========================================================================
    // Graph Errors
    // ========================================================================
    /// Forbidden graph mutation or malformed label
    /// Gantree: InvalidOperation(String) // 금지된 변경
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Node is not part of the graph or pattern
    #[error("Unknown node {0}")]
    UnknownNode(NodeId),

    // ========================================================================
    // Flow Errors
    // ========================================================================
    /// Graph admits no gflow under the requested mode
    /// Gantree: NoFlowExists{unresolved} // 플로우 없음
    #[error("No flow exists: nodes {unresolved:?} cannot be corrected")]
    NoFlowExists { unresolved: Vec<NodeId> },

    /// A flow failed verification
    #[error("Flow violation at node {node}: {reason}")]
    FlowViolation { node: NodeId, reason: String },

    // ========================================================================
    // Linear Algebra Errors
    // ========================================================================
    /// A solve that must succeed produced no solution
    /// Gantree: SingularSystem(String) // 내부 불변식 위반
    #[error("Singular system: {0}")]
    SingularSystem(String),

    /// Matrix/vector shapes do not agree
    #[error("Dimension mismatch in {context}: expected {expected}, found {found}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        found: usize,
    },

    // ========================================================================
    // Pattern Errors
    // ========================================================================
    /// Command sequence violates pattern invariants
    /// Gantree: InconsistentPattern(String) // 패턴 불일치
    #[error("Inconsistent pattern: {0}")]
    InconsistentPattern(String),

    // ========================================================================
    // Configuration / Execution Errors
    // ========================================================================
    /// Invalid optimizer configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Reference executor size limit
    #[error("Pattern needs {requested} live qubits, executor limit is {max}")]
    CapacityExceeded { requested: usize, max: usize },

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(String),
}

/// Result type alias for MBQC operations
/// Gantree: MbqcResult<T> // type alias
pub type MbqcResult<T> = Result<T, MbqcError>;

// ============================================================================
// Error Conversion Helpers
// ============================================================================

impl From<serde_json::Error> for MbqcError {
    fn from(err: serde_json::Error) -> Self {
        MbqcError::JsonError(err.to_string())
    }
}

// ============================================================================
// Error Helpers
// ============================================================================

impl MbqcError {
    /// Shorthand for [`MbqcError::InconsistentPattern`]
    pub fn pattern(msg: impl Into<String>) -> Self {
        MbqcError::InconsistentPattern(msg.into())
    }

    /// Shorthand for [`MbqcError::InvalidOperation`]
    pub fn invalid(msg: impl Into<String>) -> Self {
        MbqcError::InvalidOperation(msg.into())
    }

    /// Check if the caller may recover by switching strategy
    ///
    /// Only a missing flow qualifies: the caller can fall back to
    /// another flow mode or to a flow-free backend.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, MbqcError::NoFlowExists { .. })
    }

    /// Check if error reports a malformed pattern or graph
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            MbqcError::InconsistentPattern(_)
                | MbqcError::InvalidOperation(_)
                | MbqcError::UnknownNode(_)
        )
    }

    /// Check if error is an internal invariant violation
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            MbqcError::SingularSystem(_) | MbqcError::FlowViolation { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
