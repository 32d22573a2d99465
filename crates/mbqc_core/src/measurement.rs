//! Measurement bases
//!
//! Gantree: L1_Frame → MeasurementBasis
//!
//! A basis is a plane and an angle (units of π). Outcome `0` is the `+1`
//! eigenvalue of the observable along [`MeasurementBasis::direction`].

use crate::clifford::Clifford;
use crate::constants::angles;
use crate::types::{Angle, Plane, Sign, SignedAxis};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Single-qubit measurement basis
/// Gantree: MeasurementBasis // 평면 + 각도
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementBasis {
    /// Measurement plane
    pub plane: Plane,
    /// Angle in units of π
    pub angle: Angle,
}

impl MeasurementBasis {
    /// Create basis
    pub fn new(plane: Plane, angle: Angle) -> Self {
        Self { plane, angle }
    }

    /// Basis measuring the given signed Pauli
    pub fn from_pauli(p: SignedAxis) -> Self {
        let plane = match p.axis {
            crate::types::Axis::X | crate::types::Axis::Y => Plane::XY,
            crate::types::Axis::Z => Plane::XZ,
        };
        let (c, _) = plane.axes();
        let k = if p.axis == c { 0.0 } else { 0.5 };
        let angle = if p.sign.is_minus() { k + 1.0 } else { k };
        Self::new(plane, angle)
    }

    /// Signed Pauli measured by this basis, if the angle is a multiple of π/2
    /// Gantree: pauli() -> Option<SignedAxis> // 파울리 판정
    pub fn pauli(&self) -> Option<SignedAxis> {
        let a = angles::normalize(self.angle);
        let twice = 2.0 * a;
        let k = twice.round();
        if (twice - k).abs() > 2.0 * angles::PAULI_TOLERANCE {
            return None;
        }
        let (c, s) = self.plane.axes();
        let p = match (k as i64).rem_euclid(4) {
            0 => SignedAxis::plus(c),
            1 => SignedAxis::plus(s),
            2 => SignedAxis::minus(c),
            _ => SignedAxis::minus(s),
        };
        Some(p)
    }

    /// True if the basis is a Pauli basis
    pub fn is_pauli(&self) -> bool {
        self.pauli().is_some()
    }

    /// Bloch vector of the outcome-0 eigenstate
    pub fn direction(&self) -> [f64; 3] {
        let (c, s) = self.plane.axes();
        let theta = PI * self.angle;
        let (uc, us) = (c.unit(), s.unit());
        let (cos, sin) = (theta.cos(), theta.sin());
        [
            cos * uc[0] + sin * us[0],
            cos * uc[1] + sin * us[1],
            cos * uc[2] + sin * us[2],
        ]
    }

    /// Basis of the observable `C n C†`
    /// Gantree: conjugated(Clifford) -> MeasurementBasis // 기저 변환
    pub fn conjugated(&self, clifford: &Clifford) -> Self {
        let (c, s) = self.plane.axes();
        let img_c = clifford.conjugate(SignedAxis::plus(c));
        let img_s = clifford.conjugate(SignedAxis::plus(s));
        // distinct axes always span a plane
        let plane = Plane::spanned_by(img_c.axis, img_s.axis).unwrap_or(self.plane);
        let (pc, _) = plane.axes();
        let angle = if img_c.axis == pc {
            signed_angle(img_c.sign, img_s.sign, self.angle)
        } else {
            signed_angle(img_s.sign, img_c.sign, 0.5 - self.angle)
        };
        Self::new(plane, angles::normalize(angle))
    }

    /// Measuring `W|ψ⟩` in `self` equals measuring `|ψ⟩` in the returned basis
    pub fn absorb(&self, frame: &Clifford) -> Self {
        self.conjugated(&frame.inverse())
    }

    /// Same plane and angle modulo 2 within tolerance
    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        if self.plane != other.plane {
            return false;
        }
        let d = angles::normalize(self.angle - other.angle);
        d < tol || angles::PERIOD - d < tol
    }
}

/// Angle `a'` with `cos(πa') = s_cos·cos(πa)` and `sin(πa') = s_sin·sin(πa)`
fn signed_angle(s_cos: Sign, s_sin: Sign, a: Angle) -> Angle {
    match (s_cos, s_sin) {
        (Sign::Plus, Sign::Plus) => a,
        (Sign::Plus, Sign::Minus) => -a,
        (Sign::Minus, Sign::Plus) => 1.0 - a,
        (Sign::Minus, Sign::Minus) => 1.0 + a,
    }
}

impl fmt::Display for MeasurementBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:.4}π)", self.plane, self.angle)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Axis;
    use approx::assert_relative_eq;

    fn conjugate_vec(c: &Clifford, v: [f64; 3]) -> [f64; 3] {
        let mut out = [0.0; 3];
        for (i, axis) in Axis::ALL.iter().enumerate() {
            let img = c.conjugate(SignedAxis::plus(*axis)).vector();
            for k in 0..3 {
                out[k] += v[i] * img[k];
            }
        }
        out
    }

    #[test]
    fn test_pauli_detection() {
        let b = MeasurementBasis::new(Plane::XY, 0.0);
        assert_eq!(b.pauli(), Some(SignedAxis::plus(Axis::X)));
        let b = MeasurementBasis::new(Plane::XY, 0.5);
        assert_eq!(b.pauli(), Some(SignedAxis::plus(Axis::Y)));
        let b = MeasurementBasis::new(Plane::XY, -0.5);
        assert_eq!(b.pauli(), Some(SignedAxis::minus(Axis::Y)));
        let b = MeasurementBasis::new(Plane::YZ, 1.0);
        assert_eq!(b.pauli(), Some(SignedAxis::minus(Axis::Z)));
        let b = MeasurementBasis::new(Plane::XZ, 2.5);
        assert_eq!(b.pauli(), Some(SignedAxis::plus(Axis::X)));
        assert!(MeasurementBasis::new(Plane::XY, 0.25).pauli().is_none());
    }

    #[test]
    fn test_from_pauli() {
        for axis in Axis::ALL {
            for p in [SignedAxis::plus(axis), SignedAxis::minus(axis)] {
                assert_eq!(MeasurementBasis::from_pauli(p).pauli(), Some(p));
            }
        }
    }

    #[test]
    fn test_conjugated_matches_bloch_rotation() {
        for c in Clifford::all() {
            for plane in Plane::ALL {
                for angle in [0.0, 0.1, 0.25, 0.7, 1.3, 1.75] {
                    let b = MeasurementBasis::new(plane, angle);
                    let expected = conjugate_vec(&c, b.direction());
                    let got = b.conjugated(&c).direction();
                    for k in 0..3 {
                        assert_relative_eq!(got[k], expected[k], epsilon = 1e-9);
                    }
                }
            }
        }
    }

    #[test]
    fn test_absorb_inverts_conjugation() {
        let b = MeasurementBasis::new(Plane::XZ, 0.3);
        let c = Clifford::H.compose(&Clifford::S);
        let back = b.conjugated(&c).absorb(&c);
        assert!(back.approx_eq(&b, 1e-12));
    }

    #[test]
    fn test_pauli_stays_pauli() {
        let b = MeasurementBasis::new(Plane::XY, 0.5);
        for c in Clifford::all() {
            assert!(b.conjugated(&c).is_pauli());
        }
    }
}
