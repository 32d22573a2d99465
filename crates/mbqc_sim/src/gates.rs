//! Single-qubit matrices
//!
//! Gantree: L6_Sim → Gates

use mbqc_core::{Axis, Clifford, SignedAxis};
use num_complex::Complex64;

/// 2×2 complex matrix, row-major
pub type Mat2 = [[Complex64; 2]; 2];

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

/// Signed Pauli matrix
pub fn pauli_matrix(p: SignedAxis) -> Mat2 {
    let m = match p.axis {
        Axis::X => [[ZERO, ONE], [ONE, ZERO]],
        Axis::Y => [[ZERO, -I], [I, ZERO]],
        Axis::Z => [[ONE, ZERO], [ZERO, -ONE]],
    };
    scale(&m, Complex64::new(p.sign.value(), 0.0))
}

/// `+1` eigenvector of `n·σ` for a unit Bloch vector `n`
pub fn eigenvector(n: [f64; 3]) -> [Complex64; 2] {
    let a = 1.0 + n[2];
    if a < 1e-12 {
        return [ZERO, ONE];
    }
    let b = Complex64::new(n[0], n[1]);
    let norm = (a * a + b.norm_sqr()).sqrt();
    [Complex64::new(a / norm, 0.0), b / norm]
}

/// Matrix of a Clifford, fixed up to global phase
/// Gantree: clifford_matrix(C) -> Mat2 // C|0⟩, C|1⟩ 열
///
/// `C|0⟩` is the `+1` eigenvector of `C Z C†` and `C|1⟩ = (C X C†) C|0⟩`.
pub fn clifford_matrix(c: &Clifford) -> Mat2 {
    let v0 = eigenvector(c.image_z().vector());
    let v1 = mul_vec(&pauli_matrix(c.image_x()), &v0);
    [[v0[0], v1[0]], [v0[1], v1[1]]]
}

/// Matrix product `a·b`
pub fn mul(a: &Mat2, b: &Mat2) -> Mat2 {
    let mut out = [[ZERO; 2]; 2];
    for (r, row) in out.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            *cell = a[r][0] * b[0][c] + a[r][1] * b[1][c];
        }
    }
    out
}

/// Conjugate transpose
pub fn dagger(a: &Mat2) -> Mat2 {
    [
        [a[0][0].conj(), a[1][0].conj()],
        [a[0][1].conj(), a[1][1].conj()],
    ]
}

fn mul_vec(a: &Mat2, v: &[Complex64; 2]) -> [Complex64; 2] {
    [
        a[0][0] * v[0] + a[0][1] * v[1],
        a[1][0] * v[0] + a[1][1] * v[1],
    ]
}

fn scale(a: &Mat2, k: Complex64) -> Mat2 {
    [[a[0][0] * k, a[0][1] * k], [a[1][0] * k, a[1][1] * k]]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: &Mat2, b: &Mat2) -> bool {
        a.iter()
            .flatten()
            .zip(b.iter().flatten())
            .all(|(x, y)| (x - y).norm() < 1e-9)
    }

    #[test]
    fn test_clifford_matrices_conjugate_paulis() {
        for c in Clifford::all() {
            let u = clifford_matrix(&c);
            let ud = dagger(&u);
            for axis in [Axis::X, Axis::Y, Axis::Z] {
                let conj = mul(&mul(&u, &pauli_matrix(SignedAxis::plus(axis))), &ud);
                assert!(
                    close(&conj, &pauli_matrix(c.image(axis))),
                    "{} on {}",
                    c,
                    axis
                );
            }
        }
    }

    #[test]
    fn test_hadamard_matrix() {
        let h = clifford_matrix(&Clifford::H);
        let r = std::f64::consts::FRAC_1_SQRT_2;
        approx::assert_relative_eq!(h[0][0].re, r, epsilon = 1e-12);
        approx::assert_relative_eq!(h[1][1].re, -r, epsilon = 1e-12);
    }

    #[test]
    fn test_eigenvector() {
        let v = eigenvector([0.0, 0.0, -1.0]);
        assert_eq!(v, [ZERO, ONE]);
        let v = eigenvector([0.0, 1.0, 0.0]);
        approx::assert_relative_eq!(v[1].im, std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);
    }
}
