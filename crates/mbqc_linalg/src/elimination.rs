//! Gauss-Jordan elimination over GF(2)
//!
//! Gantree: L1_Linalg → Elimination
//!
//! Pivoting is fixed: columns left to right, and for each column the first
//! row at or below the current pivot row holding a 1. The pivot column is
//! then cleared from every other row, giving the reduced row-echelon form.

use crate::matrix::{zeros, Gf2Matrix, Gf2Vec};
use bitvec::prelude::*;
use mbqc_core::{MbqcError, MbqcResult};

/// Reduced row-echelon form with pivot columns
/// Gantree: RowEchelon // RREF + 피벗
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowEchelon {
    /// Reduced matrix
    pub matrix: Gf2Matrix,
    /// `pivots[i]` is the pivot column of row `i`
    pub pivots: Vec<usize>,
}

impl RowEchelon {
    /// Rank
    pub fn rank(&self) -> usize {
        self.pivots.len()
    }

    /// Columns without a pivot, ascending
    pub fn free_columns(&self) -> Vec<usize> {
        let mut is_pivot = vec![false; self.matrix.ncols()];
        for &p in &self.pivots {
            is_pivot[p] = true;
        }
        (0..self.matrix.ncols()).filter(|&c| !is_pivot[c]).collect()
    }
}

impl Gf2Matrix {
    /// Reduce the first `limit` columns in place; returns pivot columns
    fn reduce_columns(&mut self, limit: usize) -> Vec<usize> {
        let mut pivots = Vec::new();
        let mut r = 0;
        for c in 0..limit.min(self.ncols()) {
            if r == self.nrows() {
                break;
            }
            let Some(p) = (r..self.nrows()).find(|&i| self.get(i, c)) else {
                continue;
            };
            self.swap_rows(r, p);
            for i in 0..self.nrows() {
                if i != r && self.get(i, c) {
                    self.add_row(r, i);
                }
            }
            pivots.push(c);
            r += 1;
        }
        pivots
    }

    /// Reduced row-echelon form
    /// Gantree: row_reduce() -> RowEchelon // 가우스-조던
    pub fn row_reduce(&self) -> RowEchelon {
        let mut matrix = self.clone();
        let pivots = matrix.reduce_columns(self.ncols());
        RowEchelon { matrix, pivots }
    }

    /// Rank
    pub fn rank(&self) -> usize {
        self.row_reduce().rank()
    }

    /// Null-space basis, one vector per free column in ascending order
    /// Gantree: null_space() -> Vec<Gf2Vec> // 영공간
    pub fn null_space(&self) -> Vec<Gf2Vec> {
        let ech = self.row_reduce();
        ech.free_columns()
            .into_iter()
            .map(|f| {
                let mut v = zeros(self.ncols());
                v.set(f, true);
                for (i, &p) in ech.pivots.iter().enumerate() {
                    if ech.matrix.get(i, f) {
                        v.set(p, true);
                    }
                }
                v
            })
            .collect()
    }

    /// One particular solution of `self · x = b`, `None` if inconsistent
    /// Gantree: solve(b) -> Result<Option<x>> // 특수해
    ///
    /// Free variables are set to 0.
    pub fn solve(&self, b: &BitSlice<u64, Lsb0>) -> MbqcResult<Option<Gf2Vec>> {
        let mut all = self.solve_many(&[b.to_bitvec()])?;
        Ok(all.pop().flatten())
    }

    /// Solve `self · x = b_j` for every right-hand side with one elimination
    /// Gantree: solve_many(B) -> Result<Vec<Option<x>>> // 공유 소거
    pub fn solve_many(&self, rhs: &[Gf2Vec]) -> MbqcResult<Vec<Option<Gf2Vec>>> {
        for b in rhs {
            if b.len() != self.nrows() {
                return Err(MbqcError::DimensionMismatch {
                    context: "Gf2Matrix::solve_many".into(),
                    expected: self.nrows(),
                    found: b.len(),
                });
            }
        }
        let n = self.ncols();
        let mut aug = self.clone();
        for b in rhs {
            aug.push_column(b.as_bitslice());
        }
        let pivots = aug.reduce_columns(n);
        let rank = pivots.len();

        let mut out = Vec::with_capacity(rhs.len());
        for (j, b) in rhs.iter().enumerate() {
            let col = n + j;
            let consistent = (rank..aug.nrows()).all(|i| !aug.get(i, col));
            if !consistent {
                out.push(None);
                continue;
            }
            let mut x = zeros(n);
            for (i, &p) in pivots.iter().enumerate() {
                if aug.get(i, col) {
                    x.set(p, true);
                }
            }
            if self.mul_vec(&x)? != *b {
                return Err(MbqcError::SingularSystem(format!(
                    "back-substitution for right-hand side {} does not satisfy the system",
                    j
                )));
            }
            out.push(Some(x));
        }
        Ok(out)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::from_bits;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn random_matrix(rng: &mut ChaCha8Rng, m: usize, n: usize) -> Gf2Matrix {
        let rows: Vec<Vec<u8>> = (0..m)
            .map(|_| (0..n).map(|_| rng.gen_range(0..2u8)).collect())
            .collect();
        if m == 0 {
            return Gf2Matrix::new(0, n);
        }
        Gf2Matrix::from_rows(&rows).unwrap()
    }

    #[test]
    fn test_rref_known() {
        let a = Gf2Matrix::from_rows(&[[0u8, 1, 1], [1, 1, 0], [1, 0, 1]]).unwrap();
        let ech = a.row_reduce();
        assert_eq!(ech.pivots, vec![0, 1]);
        assert_eq!(
            ech.matrix,
            Gf2Matrix::from_rows(&[[1u8, 0, 1], [0, 1, 1], [0, 0, 0]]).unwrap()
        );
        assert_eq!(a.rank(), 2);
        assert_eq!(ech.free_columns(), vec![2]);
    }

    #[test]
    fn test_null_space_known() {
        let a = Gf2Matrix::from_rows(&[[0u8, 1, 1], [1, 1, 0], [1, 0, 1]]).unwrap();
        let ns = a.null_space();
        assert_eq!(ns, vec![from_bits(&[1, 1, 1])]);
        assert!(Gf2Matrix::identity(4).null_space().is_empty());
    }

    #[test]
    fn test_solve_known() {
        let a = Gf2Matrix::from_rows(&[[1u8, 1, 0], [0, 1, 1]]).unwrap();
        let x = a.solve(&from_bits(&[1, 0])).unwrap().unwrap();
        // free variable x2 = 0
        assert_eq!(x, from_bits(&[1, 0, 0]));

        let singular = Gf2Matrix::from_rows(&[[1u8, 1], [1, 1]]).unwrap();
        assert_eq!(singular.solve(&from_bits(&[1, 0])).unwrap(), None);
        assert!(singular.solve(&from_bits(&[1])).is_err());
    }

    #[test]
    fn test_rank_nullity_random() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..50 {
            let m = rng.gen_range(1..9);
            let n = rng.gen_range(1..9);
            let a = random_matrix(&mut rng, m, n);
            let ns = a.null_space();
            assert_eq!(a.rank() + ns.len(), n);
            for v in &ns {
                assert!(a.mul_vec(v).unwrap().not_any());
            }
        }
    }

    #[test]
    fn test_solve_many_random() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..50 {
            let m = rng.gen_range(1..8);
            let n = rng.gen_range(1..8);
            let a = random_matrix(&mut rng, m, n);
            // consistent right-hand sides from random x
            let rhs: Vec<Gf2Vec> = (0..4)
                .map(|_| {
                    let x: Gf2Vec = (0..n).map(|_| rng.gen_bool(0.5)).collect();
                    a.mul_vec(&x).unwrap()
                })
                .collect();
            for (b, x) in rhs.iter().zip(a.solve_many(&rhs).unwrap()) {
                let x = x.expect("consistent system must be solvable");
                assert_eq!(&a.mul_vec(&x).unwrap(), b);
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let a = random_matrix(&mut rng, 6, 6);
        assert_eq!(a.row_reduce(), a.row_reduce());
        let b = from_bits(&[1, 0, 1, 0, 1, 0]);
        assert_eq!(a.solve(&b).unwrap(), a.solve(&b).unwrap());
    }
}
