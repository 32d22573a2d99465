//! Single-qubit Clifford group
//!
//! Gantree: L1_Frame → Clifford
//!
//! A Clifford `C` is stored by its action on Paulis under conjugation,
//! `P ↦ C P C†`, which identifies it up to global phase. Composition
//! `a.compose(&b)` is the operator product `a·b` (apply `b` first).

use crate::error::{MbqcError, MbqcResult};
use crate::types::{Axis, Sign, SignedAxis};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Single-qubit Clifford operator modulo global phase
/// Gantree: Clifford // 24원소 군
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Clifford {
    /// Image of X
    x: SignedAxis,
    /// Image of Z
    z: SignedAxis,
}

impl Clifford {
    // ========================================================================
    // Named Elements
    // ========================================================================

    /// Identity
    pub const I: Clifford = Clifford::images(SignedAxis::plus(Axis::X), SignedAxis::plus(Axis::Z));
    /// Pauli X
    pub const X: Clifford = Clifford::images(SignedAxis::plus(Axis::X), SignedAxis::minus(Axis::Z));
    /// Pauli Y
    pub const Y: Clifford =
        Clifford::images(SignedAxis::minus(Axis::X), SignedAxis::minus(Axis::Z));
    /// Pauli Z
    pub const Z: Clifford = Clifford::images(SignedAxis::minus(Axis::X), SignedAxis::plus(Axis::Z));
    /// Hadamard
    pub const H: Clifford = Clifford::images(SignedAxis::plus(Axis::Z), SignedAxis::plus(Axis::X));
    /// Phase gate `S = diag(1, i)`
    pub const S: Clifford = Clifford::images(SignedAxis::plus(Axis::Y), SignedAxis::plus(Axis::Z));
    /// `S†`
    pub const SDG: Clifford =
        Clifford::images(SignedAxis::minus(Axis::Y), SignedAxis::plus(Axis::Z));
    /// `√X ∝ exp(-iπX/4)`
    pub const SX: Clifford =
        Clifford::images(SignedAxis::plus(Axis::X), SignedAxis::minus(Axis::Y));
    /// `√X†`
    pub const SXDG: Clifford =
        Clifford::images(SignedAxis::plus(Axis::X), SignedAxis::plus(Axis::Y));

    const NAMED: [(&'static str, Clifford); 9] = [
        ("I", Clifford::I),
        ("X", Clifford::X),
        ("Y", Clifford::Y),
        ("Z", Clifford::Z),
        ("H", Clifford::H),
        ("S", Clifford::S),
        ("SDG", Clifford::SDG),
        ("SX", Clifford::SX),
        ("SXDG", Clifford::SXDG),
    ];

    // ========================================================================
    // Constructors
    // ========================================================================

    const fn images(x: SignedAxis, z: SignedAxis) -> Self {
        Self { x, z }
    }

    /// Create from the conjugation images of X and Z
    /// Gantree: new(x,z) -> Result<Self> // 생성+검증
    pub fn new(x: SignedAxis, z: SignedAxis) -> MbqcResult<Self> {
        let c = Self::images(x, z);
        if !c.is_valid() {
            return Err(MbqcError::invalid(format!(
                "X and Z cannot both map onto {}",
                x.axis
            )));
        }
        Ok(c)
    }

    /// Pauli operator as a Clifford
    pub fn pauli(axis: Axis) -> Self {
        match axis {
            Axis::X => Self::X,
            Axis::Y => Self::Y,
            Axis::Z => Self::Z,
        }
    }

    /// Look up a named element (`"H"`, `"SDG"`, ...)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMED
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, c)| c)
    }

    /// All 24 group elements in a fixed order
    pub fn all() -> Vec<Clifford> {
        let mut out = Vec::with_capacity(24);
        for xa in Axis::ALL {
            for xs in [Sign::Plus, Sign::Minus] {
                for za in Axis::ALL {
                    if za == xa {
                        continue;
                    }
                    for zs in [Sign::Plus, Sign::Minus] {
                        out.push(Self::images(
                            SignedAxis::new(xs, xa),
                            SignedAxis::new(zs, za),
                        ));
                    }
                }
            }
        }
        out
    }

    // ========================================================================
    // Action
    // ========================================================================

    /// Image of X
    pub fn image_x(&self) -> SignedAxis {
        self.x
    }

    /// Image of Z
    pub fn image_z(&self) -> SignedAxis {
        self.z
    }

    /// Image of Y, from `Y = iXZ`
    pub fn image_y(&self) -> SignedAxis {
        let axis = self.x.axis.third(self.z.axis);
        let sign = -(self.x.sign * self.z.sign * self.x.axis.epsilon(self.z.axis));
        SignedAxis::new(sign, axis)
    }

    /// Image of a bare axis
    pub fn image(&self, axis: Axis) -> SignedAxis {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.image_y(),
            Axis::Z => self.z,
        }
    }

    /// Conjugate a signed Pauli: `C (±P) C†`
    /// Gantree: conjugate(SignedAxis) -> SignedAxis // 켤레 작용
    pub fn conjugate(&self, p: SignedAxis) -> SignedAxis {
        let img = self.image(p.axis);
        SignedAxis::new(p.sign * img.sign, img.axis)
    }

    /// Operator product `self · inner`
    pub fn compose(&self, inner: &Clifford) -> Clifford {
        Self::images(self.conjugate(inner.x), self.conjugate(inner.z))
    }

    /// Group inverse
    pub fn inverse(&self) -> Clifford {
        // C(P) = ±Q  ⇒  C⁻¹(Q) = ±P
        let preimage = |target: Axis| {
            Axis::ALL
                .into_iter()
                .map(|p| (p, self.image(p)))
                .find(|(_, img)| img.axis == target)
                .map(|(p, img)| SignedAxis::new(img.sign, p))
                .unwrap_or(SignedAxis::plus(target))
        };
        Self::images(preimage(Axis::X), preimage(Axis::Z))
    }

    // ========================================================================
    // Predicates
    // ========================================================================

    /// X and Z images are on distinct axes
    pub fn is_valid(&self) -> bool {
        self.x.axis != self.z.axis
    }

    /// Identity element
    pub fn is_identity(&self) -> bool {
        *self == Self::I
    }

    /// Pauli element (I, X, Y or Z)
    pub fn is_pauli(&self) -> bool {
        self.x.axis == Axis::X && self.z.axis == Axis::Z
    }

    /// Diagonal in the computational basis (commutes with CZ)
    pub fn is_diagonal(&self) -> bool {
        self.z == SignedAxis::plus(Axis::Z)
    }

    /// Name of the element, if it is one of the named constants
    pub fn name(&self) -> Option<&'static str> {
        Self::NAMED.iter().find(|(_, c)| c == self).map(|&(n, _)| n)
    }
}

impl Default for Clifford {
    fn default() -> Self {
        Self::I
    }
}

impl fmt::Display for Clifford {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(n) => write!(f, "{}", n),
            None => write!(f, "C[X->{}, Z->{}]", self.x, self.z),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
