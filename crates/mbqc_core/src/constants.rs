//! Constants for the MBQC core
//!
//! Gantree: L0_Foundation → Constants

// ============================================================================
// Angle Constants
// Gantree: angles // 각도 상수
// ============================================================================

pub mod angles {
    //! Angle handling (angles are expressed in units of π)

    /// Tolerance when classifying an angle as a Pauli angle
    /// Gantree: PAULI_TOLERANCE: f64 = 1e-9
    pub const PAULI_TOLERANCE: f64 = 1e-9;

    /// Angle period in units of π
    pub const PERIOD: f64 = 2.0;

    /// Normalize an angle into `[0, 2)`
    pub fn normalize(angle: f64) -> f64 {
        let a = angle.rem_euclid(PERIOD);
        // rem_euclid can round up to exactly PERIOD for tiny negatives
        if a >= PERIOD {
            0.0
        } else {
            a
        }
    }
}

// ============================================================================
// Limits
// Gantree: limits // 한계값
// ============================================================================

pub mod limits {
    //! Size limits

    /// Maximum live qubits for the reference statevector executor
    /// Gantree: MAX_SIM_QUBITS: usize = 20
    pub const MAX_SIM_QUBITS: usize = 20;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(angles::normalize(0.5), 0.5);
        assert!((angles::normalize(-0.5) - 1.5).abs() < 1e-12);
        assert!((angles::normalize(4.25) - 0.25).abs() < 1e-12);
        assert!(angles::normalize(-1e-18) < angles::PERIOD);
    }
}
