//! Pipeline for staged pattern optimization
//!
//! Gantree: L7_Integration → Pipeline
//!
//! Validated → Standardized → Shifted → PauliReduced → FlowResolved →
//! Finished. Each stage can be run on its own; a stage refuses to run
//! before the one it depends on.

use crate::config::{OptimizerConfig, StandardizeStrategy};
use crate::report::{OptimizationReport, PatternMetrics};
use log::{debug, info, warn};
use mbqc_core::{MbqcError, MbqcResult, Pattern};
use mbqc_flow::{find_gflow, verify_gflow, FlowMode, GFlow};
use mbqc_pattern::{minimize_space, shift_signals, standardize_local, MeasurementOrder, Standardizer};
use mbqc_pauli::{FlowStatus, PauliPreprocessor, PauliReduction};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

#[cfg(feature = "simulator")]
use mbqc_pattern::max_space;
#[cfg(feature = "simulator")]
use mbqc_sim::{fidelity, random_state, StatevectorBackend};
#[cfg(feature = "simulator")]
use rand::SeedableRng;
#[cfg(feature = "simulator")]
use rand_chacha::ChaCha8Rng;

/// Executor fidelity below this is reported as a mismatch
#[cfg(feature = "simulator")]
const FIDELITY_TOLERANCE: f64 = 1e-6;

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PipelineStage {
    /// Nothing loaded
    Initial,
    /// Source pattern and configuration checked
    Validated,
    /// Standard form reached
    Standardized,
    /// Signals shifted
    Shifted,
    /// Pauli measurements removed
    PauliReduced,
    /// Flow of the current pattern known
    FlowResolved,
    /// Report produced
    Finished,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Pipeline state holding intermediate results
#[derive(Debug, Clone)]
pub struct PipelineState {
    /// Current stage
    pub stage: PipelineStage,

    /// Configuration
    pub config: OptimizerConfig,

    /// Pattern as supplied
    pub source: Option<Pattern>,

    /// Pattern after the latest stage
    pub pattern: Option<Pattern>,

    /// Pauli preprocessing result
    pub reduction: Option<PauliReduction>,

    /// Flow of `pattern`
    pub flow: Option<GFlow>,

    /// Where `flow` came from
    pub flow_status: Option<FlowStatus>,

    /// Any stage fell back from the configured behaviour
    pub fallback_used: bool,
}

impl PipelineState {
    /// Create new pipeline state
    pub fn new(config: OptimizerConfig) -> Self {
        Self {
            stage: PipelineStage::Initial,
            config,
            source: None,
            pattern: None,
            reduction: None,
            flow: None,
            flow_status: None,
            fallback_used: false,
        }
    }

    /// Check if a source pattern is loaded
    pub fn is_validated(&self) -> bool {
        self.source.is_some()
    }

    /// Check if Pauli preprocessing ran
    pub fn is_reduced(&self) -> bool {
        self.reduction.is_some()
    }

    /// Check if a flow is known
    pub fn has_flow(&self) -> bool {
        self.flow.is_some()
    }
}

/// Staged optimization pipeline
/// Gantree: Pipeline // 단계별 실행
pub struct Pipeline {
    state: PipelineState,
    started: Option<Instant>,
}

impl Pipeline {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create new pipeline with configuration
    pub fn new(config: OptimizerConfig) -> Self {
        Self {
            state: PipelineState::new(config),
            started: None,
        }
    }

    // ========================================================================
    // Stage Accessors
    // ========================================================================

    /// Get current stage
    pub fn stage(&self) -> PipelineStage {
        self.state.stage
    }

    /// Get current state
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Get configuration
    pub fn config(&self) -> &OptimizerConfig {
        &self.state.config
    }

    /// Pattern after the latest stage
    pub fn pattern(&self) -> MbqcResult<&Pattern> {
        self.state
            .pattern
            .as_ref()
            .ok_or_else(|| MbqcError::invalid("pipeline has no pattern loaded"))
    }

    fn source(&self) -> MbqcResult<&Pattern> {
        self.state
            .source
            .as_ref()
            .ok_or_else(|| MbqcError::invalid("pipeline has no pattern loaded"))
    }

    fn require(&self, stage: PipelineStage) -> MbqcResult<()> {
        if self.state.stage < stage {
            return Err(MbqcError::invalid(format!(
                "pipeline is at {}, {} required",
                self.state.stage, stage
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Pipeline Stages
    // ========================================================================

    /// Stage 1: Validation
    ///
    /// Checks the configuration and the pattern, then loads it.
    pub fn validate(&mut self, pattern: &Pattern) -> MbqcResult<()> {
        self.state.config.validate()?;
        pattern.validate()?;
        self.state.source = Some(pattern.clone());
        self.state.pattern = Some(pattern.clone());
        self.state.stage = PipelineStage::Validated;
        info!("pipeline: validated {} commands", pattern.len());
        Ok(())
    }

    /// Stage 2: Standardization
    ///
    /// Without a flow the measurement order falls back to the source order
    /// when `allow_order_fallback` is set.
    pub fn standardize(&mut self) -> MbqcResult<&Pattern> {
        self.require(PipelineStage::Validated)?;
        let config = self.state.config.clone();
        let source = self.source()?.clone();

        let standard = match config.strategy {
            StandardizeStrategy::Local => standardize_local(&source)?,
            StandardizeStrategy::Global => {
                let standardizer =
                    Standardizer::new(config.flow_mode).with_order(config.measurement_order);
                match standardizer.standardize(&source) {
                    Ok(p) => p,
                    Err(e) if e.is_recoverable() && config.allow_order_fallback => {
                        warn!("pipeline: {}; keeping the source measurement order", e);
                        self.state.fallback_used = true;
                        standardizer
                            .with_order(MeasurementOrder::Preserve)
                            .standardize(&source)?
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        self.state.pattern = Some(standard);
        self.state.stage = PipelineStage::Standardized;
        info!("pipeline: standardized ({:?})", config.strategy);
        self.pattern()
    }

    /// Stage 3: Signal shifting
    pub fn shift(&mut self) -> MbqcResult<&Pattern> {
        self.require(PipelineStage::Standardized)?;
        // 국소 표준화는 이미 이동된 신호를 낸다
        if self.state.config.shift_signals
            && self.state.config.strategy == StandardizeStrategy::Global
        {
            let shifted = shift_signals(self.pattern()?)?;
            self.state.pattern = Some(shifted);
        }
        self.state.stage = PipelineStage::Shifted;
        debug!("pipeline: signals shifted");
        self.pattern()
    }

    /// Stage 4: Pauli preprocessing
    ///
    /// Returns `None` when preprocessing is disabled.
    pub fn reduce_pauli(&mut self) -> MbqcResult<Option<&PauliReduction>> {
        self.require(PipelineStage::Shifted)?;
        if self.state.config.pauli_preprocess {
            let red = PauliPreprocessor::new(self.state.config.leave_input)
                .perform_pauli_measurements(self.pattern()?)?;
            let pattern = if self.state.config.shift_signals {
                shift_signals(&red.pattern)?
            } else {
                red.pattern.clone()
            };
            self.state.pattern = Some(pattern);
            self.state.flow = red.flow.clone();
            self.state.flow_status = Some(red.flow_status);
            self.state.fallback_used |= red.fallback_used;
            info!(
                "pipeline: {} Pauli nodes removed, flow {}",
                red.removed.len(),
                red.flow_status
            );
            self.state.reduction = Some(red);
        }
        self.state.stage = PipelineStage::PauliReduced;
        Ok(self.state.reduction.as_ref())
    }

    /// Stage 5: Flow resolution
    ///
    /// Reuses the flow found by Pauli preprocessing; otherwise searches
    /// with the configured mode and then greedily.
    pub fn resolve_flow(&mut self) -> MbqcResult<Option<&GFlow>> {
        self.require(PipelineStage::PauliReduced)?;
        let og = self.pattern()?.open_graph()?;

        if self.state.flow_status.is_none() {
            let mode = self.state.config.flow_mode;
            let (flow, status) = match find_gflow(&og, mode) {
                Ok(flow) => (Some(flow), FlowStatus::Recomputed),
                Err(e) if e.is_recoverable() && mode == FlowMode::MaximallyDelayed => {
                    match find_gflow(&og, FlowMode::Any) {
                        Ok(flow) => {
                            warn!("pipeline: greedy flow after {}", e);
                            (Some(flow), FlowStatus::Fallback)
                        }
                        Err(e) if e.is_recoverable() => (None, FlowStatus::Absent),
                        Err(e) => return Err(e),
                    }
                }
                Err(e) if e.is_recoverable() => (None, FlowStatus::Absent),
                Err(e) => return Err(e),
            };
            if matches!(status, FlowStatus::Fallback | FlowStatus::Absent) {
                self.state.fallback_used = true;
            }
            if status == FlowStatus::Absent {
                warn!("pipeline: pattern has no flow");
            }
            self.state.flow = flow;
            self.state.flow_status = Some(status);
        }

        if self.state.config.verify_flow {
            if let Some(flow) = &self.state.flow {
                verify_gflow(&og, flow)?;
            }
        }
        self.state.stage = PipelineStage::FlowResolved;
        info!(
            "pipeline: flow {}",
            self.state.flow_status.unwrap_or(FlowStatus::Absent)
        );
        Ok(self.state.flow.as_ref())
    }

    /// Stage 6: Space minimization, executor check and report
    pub fn finish(&mut self) -> MbqcResult<OptimizationReport> {
        self.require(PipelineStage::FlowResolved)?;
        if self.state.config.minimize_space {
            let small = minimize_space(self.pattern()?)?;
            self.state.pattern = Some(small);
        }

        let source = self.source()?;
        let result = self.pattern()?;
        let min_fidelity = if self.state.config.verify_with_simulator {
            self.compare_on_executor(source, result)?
        } else {
            None
        };

        let report = OptimizationReport {
            name: source.name().map(str::to_string),
            before: PatternMetrics::of(source),
            after: PatternMetrics::of(result),
            pauli_removed: self.state.reduction.as_ref().map_or(0, |r| r.removed.len()),
            pauli_retained: self
                .state
                .reduction
                .as_ref()
                .map_or(0, |r| r.retained_pauli_nodes.len()),
            flow_status: self.state.flow_status,
            flow_depth: self.state.flow.as_ref().map(GFlow::max_depth),
            fallback_used: self.state.fallback_used,
            min_fidelity,
            total_time_ms: self
                .started
                .map_or(0, |t| t.elapsed().as_millis() as u64),
            pattern: result.clone(),
        };
        self.state.stage = PipelineStage::Finished;
        info!("pipeline: {} -> {}", report.before, report.after);
        Ok(report)
    }

    /// Run full pipeline
    ///
    /// Executes all stages in sequence.
    pub fn run(&mut self, pattern: &Pattern) -> MbqcResult<OptimizationReport> {
        self.reset();
        self.started = Some(Instant::now());

        self.validate(pattern)?;
        self.standardize()?;
        self.shift()?;
        self.reduce_pauli()?;
        self.resolve_flow()?;
        self.finish()
    }

    // ========================================================================
    // Verification
    // ========================================================================

    /// Worst fidelity of `result` against `source` over seeded runs
    ///
    /// Skipped (`None`) when either pattern lacks a flow or needs more live
    /// qubits than `max_sim_qubits`.
    #[cfg(feature = "simulator")]
    fn compare_on_executor(&self, source: &Pattern, result: &Pattern) -> MbqcResult<Option<f64>> {
        let config = &self.state.config;
        let space = max_space(source).max(max_space(result));
        if space > config.max_sim_qubits {
            info!("pipeline: executor check skipped, {} live qubits", space);
            return Ok(None);
        }
        let deterministic = self.state.flow.is_some()
            && find_gflow(&source.open_graph()?, FlowMode::Any).is_ok();
        if !deterministic {
            warn!("pipeline: executor check skipped, outputs depend on outcomes");
            return Ok(None);
        }

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let input = (source.inputs() == result.inputs())
            .then(|| random_state(&mut rng, source.inputs().len()));
        let expected = StatevectorBackend::new(config.seed)
            .run(source, input.as_deref())?
            .state;

        let mut worst = 1.0_f64;
        for k in 0..config.sim_trials {
            let out = StatevectorBackend::new(config.seed.wrapping_add(k as u64 + 1))
                .run(result, input.as_deref())?;
            worst = worst.min(fidelity(&out.state, &expected));
        }
        if worst < 1.0 - FIDELITY_TOLERANCE {
            warn!("pipeline: executor mismatch, fidelity {:.6}", worst);
        }
        Ok(Some(worst))
    }

    /// Built without the reference executor: nothing to compare on
    #[cfg(not(feature = "simulator"))]
    fn compare_on_executor(
        &self,
        _source: &Pattern,
        _result: &Pattern,
    ) -> MbqcResult<Option<f64>> {
        warn!("pipeline: executor check needs the `simulator` feature");
        Ok(None)
    }

    // ========================================================================
    // Reset
    // ========================================================================

    /// Reset pipeline to initial state
    pub fn reset(&mut self) {
        let config = self.state.config.clone();
        self.state = PipelineState::new(config);
        self.started = None;
    }

    /// Reset and reconfigure
    pub fn reconfigure(&mut self, config: OptimizerConfig) {
        self.state = PipelineState::new(config);
        self.started = None;
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(OptimizerConfig::default())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use mbqc_core::{PatternBuilder, Plane};

    fn wire() -> Pattern {
        PatternBuilder::new(vec![0], vec![4])
            .name("wire")
            .j(0, 1, 0.3)
            .j(1, 2, 0.0)
            .j(2, 3, 0.5)
            .j(3, 4, 0.7)
            .build()
    }

    #[test]
    fn test_pipeline_new() {
        let pipeline = Pipeline::default();
        assert_eq!(pipeline.stage(), PipelineStage::Initial);
        assert!(pipeline.pattern().is_err());
    }

    #[test]
    fn test_stage_order_enforced() {
        let mut pipeline = Pipeline::default();
        assert!(matches!(
            pipeline.standardize(),
            Err(MbqcError::InvalidOperation(_))
        ));
        pipeline.validate(&wire()).unwrap();
        assert!(pipeline.reduce_pauli().is_err());
        assert_eq!(pipeline.stage(), PipelineStage::Validated);
    }

    #[test]
    fn test_staged_execution() {
        let mut pipeline = Pipeline::default();
        pipeline.validate(&wire()).unwrap();
        assert!(pipeline.state().is_validated());

        assert!(pipeline.standardize().unwrap().is_standard());
        assert_eq!(pipeline.stage(), PipelineStage::Standardized);

        pipeline.shift().unwrap();
        assert_eq!(pipeline.stage(), PipelineStage::Shifted);

        let red = pipeline.reduce_pauli().unwrap().unwrap();
        assert_eq!(red.removed, vec![1, 2]);
        assert!(pipeline.state().is_reduced());

        assert!(pipeline.resolve_flow().unwrap().is_some());
        let report = pipeline.finish().unwrap();
        assert_eq!(pipeline.stage(), PipelineStage::Finished);
        assert_eq!(report.name.as_deref(), Some("wire"));
        assert_eq!(report.pauli_removed, 2);
        assert!(report.after.measurements < report.before.measurements);
    }

    #[test]
    fn test_fast_skips_pauli() {
        let mut pipeline = Pipeline::new(OptimizerConfig::fast());
        let report = pipeline.run(&wire()).unwrap();
        assert_eq!(report.pauli_removed, 0);
        assert_eq!(report.flow_status, Some(FlowStatus::Recomputed));
        assert_eq!(report.after.measurements, 4);
    }

    #[test]
    #[cfg(feature = "simulator")]
    fn test_thorough_verifies_on_executor() {
        let mut pipeline = Pipeline::new(OptimizerConfig::thorough());
        let report = pipeline.run(&wire()).unwrap();
        let fid = report.min_fidelity.unwrap();
        approx::assert_relative_eq!(fid, 1.0, epsilon = 1e-8);
        assert!(report.after.max_space <= report.before.max_space.max(3));
    }

    #[test]
    fn test_executor_check_follows_feature() {
        let report = Pipeline::new(OptimizerConfig::thorough()).run(&wire()).unwrap();
        assert_eq!(report.min_fidelity.is_some(), cfg!(feature = "simulator"));
        assert!(report.pattern.is_standard());
    }

    #[test]
    fn test_order_fallback_without_flow() {
        // 1 hangs off the input only: no flow
        let p = PatternBuilder::new(vec![0], vec![2])
            .n(1)
            .n(2)
            .e(0, 1)
            .e(0, 2)
            .m(0, Plane::XY, 0.3)
            .m(1, Plane::XY, 0.2)
            .build();
        let report = Pipeline::default().run(&p).unwrap();
        assert!(report.fallback_used);
        assert_eq!(report.flow_status, Some(FlowStatus::Absent));
        assert!(!report.has_flow());

        let mut config = OptimizerConfig::default();
        config.allow_order_fallback = false;
        let err = Pipeline::new(config).run(&p).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = OptimizerConfig::default();
        config.max_sim_qubits = 0;
        assert!(matches!(
            Pipeline::new(config).run(&wire()),
            Err(MbqcError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_reset() {
        let mut pipeline = Pipeline::default();
        pipeline.validate(&wire()).unwrap();
        pipeline.reset();
        assert_eq!(pipeline.stage(), PipelineStage::Initial);
        assert!(!pipeline.state().is_validated());
    }

    #[test]
    fn test_reconfigure() {
        let mut pipeline = Pipeline::default();
        pipeline.validate(&wire()).unwrap();
        pipeline.reconfigure(OptimizerConfig::fast());
        assert_eq!(pipeline.stage(), PipelineStage::Initial);
        assert_eq!(pipeline.config().flow_mode, FlowMode::Any);
    }
}
