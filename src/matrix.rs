//! Dense matrices over the process-wide field.
//!
//! Rows are dual vectors (linear functionals on the ambient space), so a
//! linear map `f` acts on a functional `v` by right multiplication `v · f`.
//! Every space returned by this module is a canonical basis: the non-zero
//! rows of a reduced row echelon form, ordered by pivot column.

use std::fmt;

use crate::field::{self, Elem, FieldError};

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Elem>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0; rows * cols],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = 1;
        }
        m
    }

    /// Build a matrix from raw coefficients, validating that rows have equal
    /// length and that every coefficient is a field element.
    pub fn from_rows(rows: &[Vec<u32>]) -> Result<Self, FieldError> {
        let field = field::current();
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            if row.len() != cols {
                return Err(FieldError::RaggedRows {
                    first: cols,
                    other: row.len(),
                });
            }
            for &value in row {
                data.push(field.element(value)?);
            }
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// A single-row matrix, i.e. one dual vector.
    pub fn row_vector(values: &[u32]) -> Result<Self, FieldError> {
        Self::from_rows(&[values.to_vec()])
    }

    pub fn nrows(&self) -> usize {
        self.rows
    }

    pub fn ncols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Elem {
        self.data[row * self.cols + col]
    }

    pub fn row(&self, row: usize) -> &[Elem] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Elem]> {
        (0..self.rows).map(move |r| self.row(r))
    }

    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|&x| x == 0)
    }

    /// Stack `other` below `self`.
    ///
    /// # Panics
    /// Panics if the column counts differ.
    pub fn vstack(&self, other: &Matrix) -> Matrix {
        assert_eq!(self.cols, other.cols, "vstack: column count mismatch");
        let mut data = Vec::with_capacity(self.data.len() + other.data.len());
        data.extend_from_slice(&self.data);
        data.extend_from_slice(&other.data);
        Matrix {
            rows: self.rows + other.rows,
            cols: self.cols,
            data,
        }
    }

    /// Place `other` to the right of `self`.
    ///
    /// # Panics
    /// Panics if the row counts differ.
    pub fn hstack(&self, other: &Matrix) -> Matrix {
        assert_eq!(self.rows, other.rows, "hstack: row count mismatch");
        let cols = self.cols + other.cols;
        let mut data = Vec::with_capacity(self.rows * cols);
        for r in 0..self.rows {
            data.extend_from_slice(self.row(r));
            data.extend_from_slice(other.row(r));
        }
        Matrix {
            rows: self.rows,
            cols,
            data,
        }
    }

    /// Matrix product `self · rhs`.
    ///
    /// # Panics
    /// Panics if `self.ncols() != rhs.nrows()`.
    pub fn matmul(&self, rhs: &Matrix) -> Matrix {
        assert_eq!(
            self.cols, rhs.rows,
            "matmul: {}x{} times {}x{}",
            self.rows, self.cols, rhs.rows, rhs.cols
        );
        let field = field::current();
        let mut out = Matrix::zeros(self.rows, rhs.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.get(i, k);
                if a == 0 {
                    continue;
                }
                for j in 0..rhs.cols {
                    let idx = i * rhs.cols + j;
                    out.data[idx] = field.add(out.data[idx], field.mul(a, rhs.get(k, j)));
                }
            }
        }
        out
    }

    /// Entrywise sum.
    ///
    /// # Panics
    /// Panics on a shape mismatch.
    pub fn add(&self, rhs: &Matrix) -> Matrix {
        self.zip_with(rhs, |f, a, b| f.add(a, b))
    }

    /// Entrywise difference.
    ///
    /// # Panics
    /// Panics on a shape mismatch.
    pub fn sub(&self, rhs: &Matrix) -> Matrix {
        self.zip_with(rhs, |f, a, b| f.sub(a, b))
    }

    fn zip_with(&self, rhs: &Matrix, op: impl Fn(&field::Field, Elem, Elem) -> Elem) -> Matrix {
        assert!(
            self.rows == rhs.rows && self.cols == rhs.cols,
            "shape mismatch: {}x{} vs {}x{}",
            self.rows,
            self.cols,
            rhs.rows,
            rhs.cols
        );
        let field = field::current();
        let data = self
            .data
            .iter()
            .zip(&rhs.data)
            .map(|(&a, &b)| op(field, a, b))
            .collect();
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data,
        }
    }

    pub fn transpose(&self) -> Matrix {
        let mut out = Matrix::zeros(self.cols, self.rows);
        for r in 0..self.rows {
            for c in 0..self.cols {
                out.data[c * self.rows + r] = self.get(r, c);
            }
        }
        out
    }

    /// Pad with zero columns on the right up to `dim` columns.
    ///
    /// # Panics
    /// Panics if `dim` is smaller than the current column count.
    pub fn embed_left(&self, dim: usize) -> Matrix {
        assert!(dim >= self.cols, "cannot embed {} columns into {dim}", self.cols);
        self.hstack(&Matrix::zeros(self.rows, dim - self.cols))
    }

    /// Pad with zero columns on the left up to `dim` columns.
    ///
    /// # Panics
    /// Panics if `dim` is smaller than the current column count.
    pub fn embed_right(&self, dim: usize) -> Matrix {
        assert!(dim >= self.cols, "cannot embed {} columns into {dim}", self.cols);
        Matrix::zeros(self.rows, dim - self.cols).hstack(self)
    }

    /// Reduced row echelon form and its pivot columns.
    pub fn rref(&self) -> (Matrix, Vec<usize>) {
        let field = field::current();
        let mut m = self.clone();
        let mut pivots = Vec::new();
        let mut lead = 0;
        for col in 0..m.cols {
            if lead == m.rows {
                break;
            }
            let Some(pivot) = (lead..m.rows).find(|&r| m.get(r, col) != 0) else {
                continue;
            };
            m.swap_rows(lead, pivot);
            let inv = field.inv(m.get(lead, col));
            for c in 0..m.cols {
                let idx = lead * m.cols + c;
                m.data[idx] = field.mul(m.data[idx], inv);
            }
            for r in 0..m.rows {
                let factor = m.get(r, col);
                if r == lead || factor == 0 {
                    continue;
                }
                for c in 0..m.cols {
                    let sub = field.mul(factor, m.get(lead, c));
                    let idx = r * m.cols + c;
                    m.data[idx] = field.sub(m.data[idx], sub);
                }
            }
            pivots.push(col);
            lead += 1;
        }
        (m, pivots)
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for c in 0..self.cols {
            self.data.swap(a * self.cols + c, b * self.cols + c);
        }
    }

    fn take_rows(&self, n: usize) -> Matrix {
        Matrix {
            rows: n,
            cols: self.cols,
            data: self.data[..n * self.cols].to_vec(),
        }
    }

    pub fn rank(&self) -> usize {
        self.rref().1.len()
    }

    /// Canonical basis of the span of the rows.
    pub fn row_space(&self) -> Matrix {
        let (r, pivots) = self.rref();
        r.take_rows(pivots.len())
    }

    /// Canonical basis of the span of the columns, one basis vector per row.
    pub fn column_space(&self) -> Matrix {
        self.transpose().row_space()
    }

    /// Canonical basis of `{ v : self · vᵗ = 0 }`, one basis vector per row.
    pub fn null_space(&self) -> Matrix {
        let field = field::current();
        let (r, pivots) = self.rref();
        let free: Vec<usize> = (0..self.cols).filter(|c| !pivots.contains(c)).collect();
        let mut basis = Matrix::zeros(free.len(), self.cols);
        for (i, &fc) in free.iter().enumerate() {
            basis.data[i * self.cols + fc] = 1;
            for (row, &pc) in pivots.iter().enumerate() {
                basis.data[i * self.cols + pc] = field.neg(r.get(row, fc));
            }
        }
        basis.row_space()
    }

    /// Canonical basis of `{ v : v · self = 0 }`, one basis vector per row.
    pub fn left_null_space(&self) -> Matrix {
        self.transpose().null_space()
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "[")?;
            for (j, x) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{x}")?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Matrix({}x{})", self.rows, self.cols)?;
        if self.rows > 0 {
            write!(f, "\n{self}")?;
        }
        Ok(())
    }
}
