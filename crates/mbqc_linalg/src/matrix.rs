//! Dense GF(2) matrices
//!
//! Gantree: L1_Linalg → Gf2Matrix
//!
//! Rows are packed bit vectors; addition is XOR and multiplication is AND.

use bitvec::prelude::*;
use mbqc_core::{MbqcError, MbqcResult};
use std::fmt;

/// Packed GF(2) vector
pub type Gf2Vec = BitVec<u64, Lsb0>;

/// Zero vector of length `n`
pub fn zeros(n: usize) -> Gf2Vec {
    BitVec::repeat(false, n)
}

/// Vector of length `n` with ones at `indices`
pub fn from_indices(n: usize, indices: impl IntoIterator<Item = usize>) -> Gf2Vec {
    let mut v = zeros(n);
    for i in indices {
        if i < n {
            let bit = v[i];
            v.set(i, !bit);
        }
    }
    v
}

/// Vector from a 0/1 slice (any nonzero byte is 1)
pub fn from_bits(bits: &[u8]) -> Gf2Vec {
    bits.iter().map(|&b| b != 0).collect()
}

/// `m × n` matrix over GF(2)
/// Gantree: Gf2Matrix // 비트 행렬
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Gf2Matrix {
    rows: Vec<Gf2Vec>,
    ncols: usize,
}

impl Gf2Matrix {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Zero matrix
    /// Gantree: new(m,n) -> Self // 영행렬
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self {
            rows: vec![zeros(ncols); nrows],
            ncols,
        }
    }

    /// Identity matrix
    pub fn identity(n: usize) -> Self {
        let mut m = Self::new(n, n);
        for i in 0..n {
            m.rows[i].set(i, true);
        }
        m
    }

    /// Build from 0/1 rows
    /// Gantree: from_rows(rows) -> Result<Self> // 행 목록에서 생성
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> MbqcResult<Self> {
        let ncols = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            let r = r.as_ref();
            if r.len() != ncols {
                return Err(MbqcError::DimensionMismatch {
                    context: "Gf2Matrix::from_rows".into(),
                    expected: ncols,
                    found: r.len(),
                });
            }
            if let Some(&bad) = r.iter().find(|&&b| b > 1) {
                return Err(MbqcError::invalid(format!(
                    "GF(2) entry must be 0 or 1, got {}",
                    bad
                )));
            }
            out.push(from_bits(r));
        }
        Ok(Self { rows: out, ncols })
    }

    /// Build from packed rows of equal length
    pub fn from_vecs(rows: Vec<Gf2Vec>, ncols: usize) -> MbqcResult<Self> {
        if let Some(r) = rows.iter().find(|r| r.len() != ncols) {
            return Err(MbqcError::DimensionMismatch {
                context: "Gf2Matrix::from_vecs".into(),
                expected: ncols,
                found: r.len(),
            });
        }
        Ok(Self { rows, ncols })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Number of rows
    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Entry `(r, c)`
    pub fn get(&self, r: usize, c: usize) -> bool {
        self.rows[r][c]
    }

    /// Set entry `(r, c)`
    pub fn set(&mut self, r: usize, c: usize, value: bool) {
        self.rows[r].set(c, value);
    }

    /// Flip entry `(r, c)`
    pub fn toggle(&mut self, r: usize, c: usize) {
        let bit = self.rows[r][c];
        self.rows[r].set(c, !bit);
    }

    /// Row `r`
    pub fn row(&self, r: usize) -> &BitSlice<u64, Lsb0> {
        self.rows[r].as_bitslice()
    }

    /// All rows
    pub fn rows(&self) -> &[Gf2Vec] {
        &self.rows
    }

    /// Column `c` as a vector
    pub fn column(&self, c: usize) -> Gf2Vec {
        self.rows.iter().map(|r| r[c]).collect()
    }

    /// True if every entry is 0
    pub fn is_zero(&self) -> bool {
        self.rows.iter().all(|r| r.not_any())
    }

    // ========================================================================
    // Row Operations
    // ========================================================================

    /// Swap two rows
    pub(crate) fn swap_rows(&mut self, a: usize, b: usize) {
        self.rows.swap(a, b);
    }

    /// `rows[dst] ^= rows[src]`
    pub(crate) fn add_row(&mut self, src: usize, dst: usize) {
        let source = self.rows[src].clone();
        self.rows[dst] ^= source.as_bitslice();
    }

    /// Append a column (one bit per row)
    pub(crate) fn push_column(&mut self, column: &BitSlice<u64, Lsb0>) {
        for (row, bit) in self.rows.iter_mut().zip(column.iter().by_vals()) {
            row.push(bit);
        }
        self.ncols += 1;
    }

    // ========================================================================
    // Arithmetic
    // ========================================================================

    /// Transpose
    pub fn transpose(&self) -> Gf2Matrix {
        let mut t = Gf2Matrix::new(self.ncols, self.nrows());
        for (r, row) in self.rows.iter().enumerate() {
            for c in row.iter_ones() {
                t.rows[c].set(r, true);
            }
        }
        t
    }

    /// Matrix product `self · other`
    pub fn mul(&self, other: &Gf2Matrix) -> MbqcResult<Gf2Matrix> {
        if self.ncols != other.nrows() {
            return Err(MbqcError::DimensionMismatch {
                context: "Gf2Matrix::mul".into(),
                expected: self.ncols,
                found: other.nrows(),
            });
        }
        let mut out = Gf2Matrix::new(self.nrows(), other.ncols);
        for (r, row) in self.rows.iter().enumerate() {
            for k in row.iter_ones() {
                out.rows[r] ^= other.rows[k].as_bitslice();
            }
        }
        Ok(out)
    }

    /// Matrix-vector product `self · v`
    pub fn mul_vec(&self, v: &BitSlice<u64, Lsb0>) -> MbqcResult<Gf2Vec> {
        if v.len() != self.ncols {
            return Err(MbqcError::DimensionMismatch {
                context: "Gf2Matrix::mul_vec".into(),
                expected: self.ncols,
                found: v.len(),
            });
        }
        Ok(self
            .rows
            .iter()
            .map(|row| row.iter_ones().filter(|&c| v[c]).count() % 2 == 1)
            .collect())
    }
}

impl fmt::Display for Gf2Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            for bit in row.iter().by_vals() {
                write!(f, "{}", if bit { '1' } else { '0' })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
