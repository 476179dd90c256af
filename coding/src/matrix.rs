//! Dense matrices over GF(2^8).

use crate::{gf256, Error};

/// A row-major matrix of field elements.
#[derive(Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<u8>,
}

impl std::fmt::Debug for Matrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Matrix({}x{})", self.rows, self.cols)?;
        for row in 0..self.rows {
            for value in self.row(row) {
                write!(f, " {value:02x}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Matrix {
    /// Create a `rows x cols` matrix filled with zero.
    pub fn zero(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0; rows * cols],
        }
    }

    /// Create the `size x size` identity matrix.
    pub fn identity(size: usize) -> Self {
        let mut out = Self::zero(size, size);
        for i in 0..size {
            out.set(i, i, 1);
        }
        out
    }

    /// Build the `total x minimum` generator matrix.
    ///
    /// Entry `(row, col)` is `2^((row * col) mod 255)`. Row `i` is thus the powers of
    /// `2^i`, a Vandermonde row, and any `minimum` rows with distinct indices below 255
    /// are linearly independent.
    pub fn generator(total: usize, minimum: usize) -> Self {
        let mut out = Self::zero(total, minimum);
        for row in 0..total {
            for col in 0..minimum {
                out.set(row, col, gf256::exp((row * col) % gf256::ORDER));
            }
        }
        out
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Get the entry at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the position is out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        assert!(row < self.rows && col < self.cols, "({row}, {col}) out of bounds");
        self.data[row * self.cols + col]
    }

    #[inline]
    fn set(&mut self, row: usize, col: usize, value: u8) {
        self.data[row * self.cols + col] = value;
    }

    /// Borrow a single row.
    pub fn row(&self, row: usize) -> &[u8] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Build a new matrix out of the given rows of `self`, in the given order.
    pub fn select_rows(&self, indices: &[u16]) -> Result<Self, Error> {
        let mut data = Vec::with_capacity(indices.len() * self.cols);
        for &index in indices {
            if usize::from(index) >= self.rows {
                return Err(Error::InvalidIndex(index));
            }
            data.extend_from_slice(self.row(usize::from(index)));
        }
        Ok(Self {
            rows: indices.len(),
            cols: self.cols,
            data,
        })
    }

    /// Multiply `self` by `other`.
    ///
    /// # Panics
    ///
    /// Panics if the inner dimensions do not agree.
    pub fn mul(&self, other: &Self) -> Self {
        assert_eq!(self.cols, other.rows, "dimension mismatch");
        let mut out = Self::zero(self.rows, other.cols);
        for row in 0..self.rows {
            let dst = &mut out.data[row * other.cols..(row + 1) * other.cols];
            for (inner, &coeff) in self.row(row).iter().enumerate() {
                gf256::mul_acc(dst, other.row(inner), coeff);
            }
        }
        out
    }

    /// Invert a square matrix with Gauss-Jordan elimination.
    ///
    /// Rows are never exchanged: pivots are taken from the diagonal in order, and a zero
    /// pivot is reported as [Error::SingularMatrix]. For generator submatrices every
    /// leading principal minor is itself a Vandermonde determinant, so this only fires
    /// when the selected rows are linearly dependent.
    ///
    /// # Panics
    ///
    /// Panics if the matrix is not square.
    pub fn invert(&self) -> Result<Self, Error> {
        assert_eq!(self.rows, self.cols, "only square matrices can be inverted");
        let size = self.rows;
        let width = 2 * size;

        // Build [self | I]
        let mut augmented = vec![0u8; size * width];
        for i in 0..size {
            augmented[i * width..i * width + size].copy_from_slice(self.row(i));
            augmented[i * width + size + i] = 1;
        }

        for i in 0..size {
            let pivot = augmented[i * width + i];
            if pivot == 0 {
                return Err(Error::SingularMatrix);
            }

            // Normalize the pivot row
            let scale = gf256::inv(pivot)?;
            for value in &mut augmented[i * width..(i + 1) * width] {
                *value = gf256::mul(*value, scale);
            }

            // Clear column i in every other row
            let pivot_row = augmented[i * width..(i + 1) * width].to_vec();
            for r in (0..size).filter(|&r| r != i) {
                let factor = augmented[r * width + i];
                gf256::mul_acc(&mut augmented[r * width..(r + 1) * width], &pivot_row, factor);
            }
        }

        let mut data = Vec::with_capacity(size * size);
        for i in 0..size {
            data.extend_from_slice(&augmented[i * width + size..(i + 1) * width]);
        }
        Ok(Self {
            rows: size,
            cols: size,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, seq::index::sample, SeedableRng};
    use test_case::test_case;

    #[test]
    fn test_generator_shape() {
        let g = Matrix::generator(10, 7);
        assert_eq!(g.rows(), 10);
        assert_eq!(g.cols(), 7);
        // Row 0 and column 0 are all ones.
        assert!(g.row(0).iter().all(|&v| v == 1));
        assert!((0..10).all(|row| g.get(row, 0) == 1));
        // Row 1 is the successive powers of the generator.
        for col in 0..7 {
            assert_eq!(g.get(1, col), gf256::exp(col));
        }
    }

    #[test]
    fn test_generator_deterministic() {
        assert_eq!(Matrix::generator(255, 254), Matrix::generator(255, 254));
    }

    #[test]
    fn test_generator_wraps_exponent() {
        let g = Matrix::generator(255, 200);
        // 254 * 199 mod 255 = 56
        assert_eq!(g.get(254, 199), gf256::exp(56));
    }

    #[test]
    fn test_select_rows() {
        let g = Matrix::generator(10, 3);
        let sub = g.select_rows(&[7, 2]).unwrap();
        assert_eq!(sub.rows(), 2);
        assert_eq!(sub.row(0), g.row(7));
        assert_eq!(sub.row(1), g.row(2));
        assert!(matches!(g.select_rows(&[10]), Err(Error::InvalidIndex(10))));
    }

    #[test]
    fn test_identity_inverse() {
        let i = Matrix::identity(5);
        assert_eq!(i.invert().unwrap(), i);
    }

    #[test]
    fn test_mul_identity() {
        let g = Matrix::generator(6, 4);
        assert_eq!(g.mul(&Matrix::identity(4)), g);
        assert_eq!(Matrix::identity(6).mul(&g), g);
    }

    #[test_case(2, 1; "one column")]
    #[test_case(10, 7; "small")]
    #[test_case(64, 32; "medium")]
    #[test_case(255, 128; "full field")]
    fn test_inverse_of_random_rows(total: usize, minimum: usize) {
        let g = Matrix::generator(total, minimum);
        let mut rng = StdRng::seed_from_u64(total as u64);
        for _ in 0..8 {
            let mut rows: Vec<u16> = sample(&mut rng, total, minimum)
                .into_iter()
                .map(|i| i as u16)
                .collect();
            rows.sort_unstable();
            let sub = g.select_rows(&rows).unwrap();
            let inverse = sub.invert().unwrap();
            assert_eq!(sub.mul(&inverse), Matrix::identity(minimum));
            assert_eq!(inverse.mul(&sub), Matrix::identity(minimum));
        }
    }

    #[test]
    fn test_inverse_of_last_rows() {
        let g = Matrix::generator(255, 10);
        let rows: Vec<u16> = (245..255).collect();
        let sub = g.select_rows(&rows).unwrap();
        let inverse = sub.invert().unwrap();
        assert_eq!(sub.mul(&inverse), Matrix::identity(10));
    }

    #[test]
    fn test_singular_duplicate_rows() {
        let g = Matrix::generator(10, 3);
        let sub = g.select_rows(&[4, 4, 5]).unwrap();
        assert!(matches!(sub.invert(), Err(Error::SingularMatrix)));
    }

    #[test]
    fn test_singular_zero_matrix() {
        assert!(matches!(
            Matrix::zero(3, 3).invert(),
            Err(Error::SingularMatrix)
        ));
    }

    #[test]
    fn test_zero_pivot_without_row_exchange() {
        // Invertible (a permutation), but the first pivot is zero and rows are never
        // exchanged.
        let m = Matrix {
            rows: 2,
            cols: 2,
            data: vec![0, 1, 1, 0],
        };
        assert!(matches!(m.invert(), Err(Error::SingularMatrix)));
    }

    #[test]
    #[should_panic(expected = "only square matrices")]
    fn test_invert_non_square() {
        let _ = Matrix::generator(3, 2).invert();
    }
}
