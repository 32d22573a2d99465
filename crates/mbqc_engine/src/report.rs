//! Optimization report
//!
//! Gantree: L7_Integration → OptimizationReport

use mbqc_core::{CommandKind, Pattern};
use mbqc_pattern::max_space;
use mbqc_pauli::FlowStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Size metrics of one pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternMetrics {
    /// Total commands
    pub commands: usize,

    /// Inputs plus prepared nodes
    pub nodes: usize,

    /// `E` commands
    pub entanglements: usize,

    /// `M` commands
    pub measurements: usize,

    /// `X`, `Z` and `C` commands
    pub corrections: usize,

    /// Peak live qubits
    pub max_space: usize,
}

impl PatternMetrics {
    /// Measure `pattern`
    pub fn of(pattern: &Pattern) -> Self {
        Self {
            commands: pattern.len(),
            nodes: pattern.nodes().len(),
            entanglements: pattern.count(CommandKind::Entangle),
            measurements: pattern.count(CommandKind::Measure),
            corrections: pattern.commands().iter().filter(|c| c.is_correction()).count(),
            max_space: max_space(pattern),
        }
    }
}

impl fmt::Display for PatternMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cmds, {} nodes, {} E, {} M, space {}",
            self.commands, self.nodes, self.entanglements, self.measurements, self.max_space
        )
    }
}

/// Result of a full pipeline run
/// Gantree: OptimizationReport // 전후 지표 + 플로우 상태
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationReport {
    /// Pattern name, if any
    pub name: Option<String>,

    /// Metrics of the source pattern
    pub before: PatternMetrics,

    /// Metrics of the optimized pattern
    pub after: PatternMetrics,

    /// Pauli nodes removed by preprocessing
    pub pauli_removed: usize,

    /// Pauli nodes kept next to inputs
    pub pauli_retained: usize,

    /// How the final flow was obtained, if resolved
    pub flow_status: Option<FlowStatus>,

    /// Number of non-output flow layers
    pub flow_depth: Option<usize>,

    /// A fallback replaced the requested flow or order
    pub fallback_used: bool,

    /// Worst executor fidelity against the source, if checked
    pub min_fidelity: Option<f64>,

    /// Wall-clock time of the run
    pub total_time_ms: u64,

    /// Optimized pattern
    pub pattern: Pattern,
}

impl OptimizationReport {
    /// Commands saved
    pub fn command_reduction(&self) -> isize {
        self.before.commands as isize - self.after.commands as isize
    }

    /// True if the optimized pattern has a flow
    pub fn has_flow(&self) -> bool {
        self.flow_status.is_some_and(|s| s.has_flow())
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> mbqc_core::MbqcResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for OptimizationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimization report {}", self.name.as_deref().unwrap_or(""))?;
        writeln!(f, "  before: {}", self.before)?;
        writeln!(f, "  after:  {}", self.after)?;
        writeln!(
            f,
            "  pauli:  {} removed, {} retained",
            self.pauli_removed, self.pauli_retained
        )?;
        match (self.flow_status, self.flow_depth) {
            (Some(s), Some(d)) => writeln!(f, "  flow:   {} (depth {})", s, d)?,
            (Some(s), None) => writeln!(f, "  flow:   {}", s)?,
            _ => writeln!(f, "  flow:   unresolved")?,
        }
        if let Some(fid) = self.min_fidelity {
            writeln!(f, "  fidelity: {:.6}", fid)?;
        }
        write!(f, "  time:   {} ms", self.total_time_ms)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use mbqc_core::PatternBuilder;

    #[test]
    fn test_metrics_of_wire() {
        let p = PatternBuilder::new(vec![0], vec![2])
            .j(0, 1, 0.1)
            .j(1, 2, 0.2)
            .build();
        let m = PatternMetrics::of(&p);
        assert_eq!(m.commands, 8);
        assert_eq!(m.nodes, 3);
        assert_eq!(m.entanglements, 2);
        assert_eq!(m.measurements, 2);
        assert_eq!(m.corrections, 2);
        assert_eq!(m.max_space, 2);
    }
}
