use std::fmt;

use tracing::trace;

use super::{extends_span, single_row};
use crate::error::{ensure_dim, Result};
use crate::matrix::Matrix;

/// One random oracle call `H(q) = a`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RandomOracleConstraint {
    pub(crate) q: Matrix,
    pub(crate) a: Matrix,
}

impl RandomOracleConstraint {
    pub fn new(q: Matrix, a: Matrix) -> Result<Self> {
        single_row("oracle query", &q)?;
        single_row("oracle answer", &a)?;
        ensure_dim("oracle answer", q.ncols(), a.ncols())?;
        Ok(Self { q, a })
    }

    pub fn query(&self) -> &Matrix {
        &self.q
    }

    pub fn answer(&self) -> &Matrix {
        &self.a
    }

    pub fn dim(&self) -> usize {
        self.q.ncols()
    }

    pub fn fixing_matrix(&self) -> Matrix {
        self.q.vstack(&self.a)
    }

    pub fn map(&self, f: &Matrix) -> Self {
        Self {
            q: self.q.matmul(f),
            a: self.a.matmul(f),
        }
    }

    pub(crate) fn map_functionals(&self, op: impl Fn(&Matrix) -> Matrix) -> Self {
        Self {
            q: op(&self.q),
            a: op(&self.a),
        }
    }

    /// Once the query is known, the answer must be new information.
    pub fn is_solvable(&self, fixing: &Matrix) -> bool {
        let known = fixing.vstack(&self.q);
        let solvable = extends_span(&known, &self.a);
        if !solvable {
            trace!("answer {} already determined by\n{}", self.a, known.row_space());
        }
        solvable
    }

    /// Two calls with the same query would need the same answer.
    pub fn is_proper<'a>(&self, prior: impl IntoIterator<Item = &'a RandomOracleConstraint>) -> bool {
        prior.into_iter().all(|c| c.q != self.q)
    }

    pub fn difference_matrix(&self, other: &Self) -> Matrix {
        self.q.sub(&other.q).vstack(&self.a.sub(&other.a))
    }
}

impl fmt::Display for RandomOracleConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} |-> {}", self.q, self.a)
    }
}
