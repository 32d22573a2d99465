//! Core types for the MBQC core
//!
//! Gantree: L0_Foundation → CoreTypes
//!
//! Node identifiers, measurement planes and signed Pauli axes.

use crate::error::{MbqcError, MbqcResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Mul, Neg};
use std::str::FromStr;

// ============================================================================
// Type Aliases
// ============================================================================

/// Node identifier in an open graph or pattern
/// Gantree: NodeId // pub type NodeId = usize
pub type NodeId = usize;

/// Measurement angle in units of π (`0.5` is π/2)
/// Gantree: Angle // pub type Angle = f64
pub type Angle = f64;

// ============================================================================
// Pauli Axis
// ============================================================================

/// Single-qubit Pauli axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axis {
    /// Pauli X
    X,
    /// Pauli Y
    Y,
    /// Pauli Z
    Z,
}

impl Axis {
    /// All axes in X, Y, Z order
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Levi-Civita sign of the ordered pair `(self, other)`
    ///
    /// `+1` for cyclic (XY, YZ, ZX), `-1` for anti-cyclic pairs.
    /// Callers must pass two distinct axes.
    pub fn epsilon(self, other: Axis) -> Sign {
        match (self, other) {
            (Axis::X, Axis::Y) | (Axis::Y, Axis::Z) | (Axis::Z, Axis::X) => Sign::Plus,
            _ => Sign::Minus,
        }
    }

    /// The axis different from both `self` and `other`
    pub fn third(self, other: Axis) -> Axis {
        match (self, other) {
            (Axis::X, Axis::Y) | (Axis::Y, Axis::X) => Axis::Z,
            (Axis::Y, Axis::Z) | (Axis::Z, Axis::Y) => Axis::X,
            _ => Axis::Y,
        }
    }

    /// Unit vector on the Bloch sphere
    pub fn unit(self) -> [f64; 3] {
        match self {
            Axis::X => [1.0, 0.0, 0.0],
            Axis::Y => [0.0, 1.0, 0.0],
            Axis::Z => [0.0, 0.0, 1.0],
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        };
        write!(f, "{}", s)
    }
}

// ============================================================================
// Sign
// ============================================================================

/// Sign of a Pauli operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sign {
    /// +1
    Plus,
    /// -1
    Minus,
}

impl Sign {
    /// Sign from a boolean flip flag
    pub fn from_flip(flip: bool) -> Self {
        if flip {
            Sign::Minus
        } else {
            Sign::Plus
        }
    }

    /// True for `Minus`
    pub fn is_minus(self) -> bool {
        self == Sign::Minus
    }

    /// Numeric value (+1.0 / -1.0)
    pub fn value(self) -> f64 {
        match self {
            Sign::Plus => 1.0,
            Sign::Minus => -1.0,
        }
    }
}

impl Mul for Sign {
    type Output = Sign;

    fn mul(self, rhs: Sign) -> Sign {
        Sign::from_flip(self != rhs)
    }
}

impl Neg for Sign {
    type Output = Sign;

    fn neg(self) -> Sign {
        Sign::from_flip(self == Sign::Plus)
    }
}

// ============================================================================
// Signed Axis
// ============================================================================

/// Signed Pauli operator `±P` (phase-free)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignedAxis {
    /// Sign
    pub sign: Sign,
    /// Axis
    pub axis: Axis,
}

impl SignedAxis {
    /// Create signed axis
    pub const fn new(sign: Sign, axis: Axis) -> Self {
        Self { sign, axis }
    }

    /// `+P`
    pub const fn plus(axis: Axis) -> Self {
        Self::new(Sign::Plus, axis)
    }

    /// `-P`
    pub const fn minus(axis: Axis) -> Self {
        Self::new(Sign::Minus, axis)
    }

    /// Bloch vector of the +1 eigenstate
    pub fn vector(self) -> [f64; 3] {
        let s = self.sign.value();
        let [x, y, z] = self.axis.unit();
        [s * x, s * y, s * z]
    }
}

impl Neg for SignedAxis {
    type Output = SignedAxis;

    fn neg(self) -> SignedAxis {
        SignedAxis::new(-self.sign, self.axis)
    }
}

impl fmt::Display for SignedAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = if self.sign.is_minus() { "-" } else { "+" };
        write!(f, "{}{}", s, self.axis)
    }
}

// ============================================================================
// Measurement Plane
// ============================================================================

/// Measurement plane on the Bloch sphere
/// Gantree: Plane // XY | XZ | YZ
///
/// A measurement at angle `a` (units of π) points along
/// `cos(πa)·C + sin(πa)·S` where `(C, S)` is given by [`Plane::axes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Plane {
    /// Equatorial plane: `(X, Y)`
    XY,
    /// `(Z, X)`
    XZ,
    /// `(Z, Y)`
    YZ,
}

impl Plane {
    /// All planes
    pub const ALL: [Plane; 3] = [Plane::XY, Plane::XZ, Plane::YZ];

    /// `(cos axis, sin axis)` for this plane
    pub fn axes(self) -> (Axis, Axis) {
        match self {
            Plane::XY => (Axis::X, Axis::Y),
            Plane::XZ => (Axis::Z, Axis::X),
            Plane::YZ => (Axis::Z, Axis::Y),
        }
    }

    /// Axis orthogonal to the plane
    pub fn normal(self) -> Axis {
        match self {
            Plane::XY => Axis::Z,
            Plane::XZ => Axis::Y,
            Plane::YZ => Axis::X,
        }
    }

    /// Plane spanned by two distinct axes
    pub fn spanned_by(a: Axis, b: Axis) -> Option<Plane> {
        match (a, b) {
            (Axis::X, Axis::Y) | (Axis::Y, Axis::X) => Some(Plane::XY),
            (Axis::X, Axis::Z) | (Axis::Z, Axis::X) => Some(Plane::XZ),
            (Axis::Y, Axis::Z) | (Axis::Z, Axis::Y) => Some(Plane::YZ),
            _ => None,
        }
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Plane::XY => "XY",
            Plane::XZ => "XZ",
            Plane::YZ => "YZ",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Plane {
    type Err = MbqcError;

    fn from_str(s: &str) -> MbqcResult<Self> {
        match s.trim().to_uppercase().as_str() {
            "XY" | "YX" => Ok(Plane::XY),
            "XZ" | "ZX" => Ok(Plane::XZ),
            "YZ" | "ZY" => Ok(Plane::YZ),
            other => Err(MbqcError::invalid(format!(
                "malformed plane label '{}'",
                other
            ))),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_parse() {
        assert_eq!("xy".parse::<Plane>().unwrap(), Plane::XY);
        assert_eq!("ZX".parse::<Plane>().unwrap(), Plane::XZ);
        assert_eq!(" yz ".parse::<Plane>().unwrap(), Plane::YZ);
        assert!(matches!(
            "XX".parse::<Plane>(),
            Err(MbqcError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_plane_axes() {
        for plane in Plane::ALL {
            let (c, s) = plane.axes();
            assert_ne!(c, s);
            assert_eq!(Plane::spanned_by(c, s), Some(plane));
            assert_eq!(c.third(s), plane.normal());
        }
    }

    #[test]
    fn test_sign_algebra() {
        assert_eq!(Sign::Minus * Sign::Minus, Sign::Plus);
        assert_eq!(Sign::Plus * Sign::Minus, Sign::Minus);
        assert_eq!(-Sign::Plus, Sign::Minus);
        assert_eq!(Axis::Z.epsilon(Axis::X), Sign::Plus);
        assert_eq!(Axis::X.epsilon(Axis::Z), Sign::Minus);
    }

    #[test]
    fn test_signed_axis_display() {
        assert_eq!(SignedAxis::minus(Axis::Y).to_string(), "-Y");
        assert_eq!((-SignedAxis::minus(Axis::Y)).to_string(), "+Y");
    }
}
