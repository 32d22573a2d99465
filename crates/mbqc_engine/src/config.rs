//! Optimizer configuration
//!
//! Gantree: L7_Integration → OptimizerConfig
//!
//! One serde struct drives every stage of the pipeline.

use mbqc_core::{limits, MbqcError, MbqcResult};
use mbqc_flow::FlowMode;
use mbqc_pattern::MeasurementOrder;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the pattern is brought into standard form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StandardizeStrategy {
    /// Whole-pattern fold ordered by flow depth
    #[default]
    Global,
    /// Per-node clusters, no flow needed
    Local,
}

/// Pipeline configuration
/// Gantree: OptimizerConfig // 통합 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    // ========================================================================
    // Flow / Standardization
    // ========================================================================
    /// Flow search policy
    pub flow_mode: FlowMode,

    /// Measurement order of the standardized pattern
    pub measurement_order: MeasurementOrder,

    /// Global or per-node standardization
    pub strategy: StandardizeStrategy,

    /// Retry with the source order when no flow orders the measurements
    pub allow_order_fallback: bool,

    // ========================================================================
    // Rewrites
    // ========================================================================
    /// Run signal shifting
    pub shift_signals: bool,

    /// Run Pauli preprocessing
    pub pauli_preprocess: bool,

    /// Keep declared inputs out of Pauli preprocessing
    pub leave_input: bool,

    /// Reorder preparations just in time
    pub minimize_space: bool,

    // ========================================================================
    // Verification
    // ========================================================================
    /// Check the resolved flow with `verify_gflow`
    pub verify_flow: bool,

    /// Compare source and result on the reference executor (`simulator` feature)
    pub verify_with_simulator: bool,

    /// Executor runs per comparison
    pub sim_trials: usize,

    /// Largest live-qubit count the comparison will attempt
    pub max_sim_qubits: usize,

    /// Seed for inputs and outcomes
    pub seed: u64,
}

impl OptimizerConfig {
    // ========================================================================
    // Presets
    // ========================================================================

    /// Standard pipeline: flow order, shifting, Pauli reduction
    pub fn standard() -> Self {
        Self {
            flow_mode: FlowMode::MaximallyDelayed,
            measurement_order: MeasurementOrder::FlowDepth,
            strategy: StandardizeStrategy::Global,
            allow_order_fallback: true,
            shift_signals: true,
            pauli_preprocess: true,
            leave_input: true,
            minimize_space: false,
            verify_flow: true,
            verify_with_simulator: false,
            sim_trials: 4,
            max_sim_qubits: 12,
            seed: 42,
        }
    }

    /// Cheapest useful pipeline: greedy flow, no Pauli reduction
    pub fn fast() -> Self {
        Self {
            flow_mode: FlowMode::Any,
            pauli_preprocess: false,
            verify_flow: false,
            ..Self::standard()
        }
    }

    /// Every rewrite plus simulator verification
    pub fn thorough() -> Self {
        Self {
            minimize_space: true,
            verify_with_simulator: true,
            sim_trials: 8,
            ..Self::standard()
        }
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    /// Set flow mode
    pub fn with_flow_mode(mut self, mode: FlowMode) -> Self {
        self.flow_mode = mode;
        self
    }

    /// Set measurement order
    pub fn with_measurement_order(mut self, order: MeasurementOrder) -> Self {
        self.measurement_order = order;
        self
    }

    /// Set standardization strategy
    pub fn with_strategy(mut self, strategy: StandardizeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Enable or disable Pauli preprocessing
    pub fn with_pauli_preprocess(mut self, enabled: bool) -> Self {
        self.pauli_preprocess = enabled;
        self
    }

    /// Set input handling for Pauli preprocessing
    pub fn with_leave_input(mut self, leave_input: bool) -> Self {
        self.leave_input = leave_input;
        self
    }

    /// Enable or disable space minimization
    pub fn with_minimize_space(mut self, enabled: bool) -> Self {
        self.minimize_space = enabled;
        self
    }

    /// Enable or disable simulator verification
    pub fn with_simulator(mut self, enabled: bool) -> Self {
        self.verify_with_simulator = enabled;
        self
    }

    /// Set seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Validate configuration
    pub fn validate(&self) -> MbqcResult<()> {
        if self.max_sim_qubits == 0 || self.max_sim_qubits > limits::MAX_SIM_QUBITS {
            return Err(MbqcError::InvalidConfig(format!(
                "max_sim_qubits must be in 1..={}, got {}",
                limits::MAX_SIM_QUBITS,
                self.max_sim_qubits
            )));
        }

        if self.verify_with_simulator && self.sim_trials == 0 {
            return Err(MbqcError::InvalidConfig(
                "sim_trials must be > 0 when simulator verification is on".to_string(),
            ));
        }

        Ok(())
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Serialize to JSON
    pub fn to_json(&self) -> MbqcResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate
    pub fn from_json(json: &str) -> MbqcResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Display for OptimizerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OptimizerConfig({}, {:?}, {:?}, pauli={}, shift={}, space={})",
            self.flow_mode,
            self.measurement_order,
            self.strategy,
            self.pauli_preprocess,
            self.shift_signals,
            self.minimize_space
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        for config in [
            OptimizerConfig::default(),
            OptimizerConfig::fast(),
            OptimizerConfig::thorough(),
        ] {
            assert!(config.validate().is_ok(), "{}", config);
        }
    }

    #[test]
    fn test_fast_mode() {
        let config = OptimizerConfig::fast();
        assert_eq!(config.flow_mode, FlowMode::Any);
        assert!(!config.pauli_preprocess);
    }

    #[test]
    fn test_thorough_mode() {
        let config = OptimizerConfig::thorough();
        assert!(config.minimize_space);
        assert!(config.verify_with_simulator);
    }

    #[test]
    fn test_validation() {
        let mut config = OptimizerConfig::default();
        config.max_sim_qubits = limits::MAX_SIM_QUBITS + 1;
        assert!(matches!(config.validate(), Err(MbqcError::InvalidConfig(_))));

        let mut config = OptimizerConfig::thorough();
        config.sim_trials = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = OptimizerConfig::thorough().with_seed(7);
        let json = config.to_json().unwrap();
        assert_eq!(OptimizerConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_json_rejects_invalid() {
        let mut config = OptimizerConfig::default();
        config.max_sim_qubits = 0;
        let json = serde_json::to_string(&config).unwrap();
        assert!(matches!(
            OptimizerConfig::from_json(&json),
            Err(MbqcError::InvalidConfig(_))
        ));
        assert!(matches!(
            OptimizerConfig::from_json("{ not json"),
            Err(MbqcError::JsonError(_))
        ));
    }
}
