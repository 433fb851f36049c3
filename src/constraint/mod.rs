//! Atomic Linicrypt constraints.
//!
//! A constraint is one call to an idealized primitive, written as linear
//! functionals over the shared ambient space. Both variants offer the same
//! capabilities, dispatched through the closed [`Constraint`] enum.

mod ideal_cipher;
mod random_oracle;

use std::fmt;

pub use ideal_cipher::IdealCipherConstraint;
pub use random_oracle::RandomOracleConstraint;

use crate::config::CipherMode;
use crate::error::{ensure_dim, LinicryptError, Result};
use crate::matrix::Matrix;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Constraint {
    RandomOracle(RandomOracleConstraint),
    IdealCipher(IdealCipherConstraint),
}

impl Constraint {
    /// Build a constraint from its raw functionals: `(q, a)` for a random
    /// oracle call, `(x, k, y)` for an ideal cipher call.
    pub fn from_repr(functionals: &[Matrix]) -> Result<Self> {
        match functionals {
            [q, a] => Ok(RandomOracleConstraint::new(q.clone(), a.clone())?.into()),
            [x, k, y] => Ok(IdealCipherConstraint::new(x.clone(), k.clone(), y.clone())?.into()),
            _ => Err(LinicryptError::MalformedConstraint {
                arity: functionals.len(),
            }),
        }
    }

    pub fn dim(&self) -> usize {
        match self {
            Constraint::RandomOracle(c) => c.dim(),
            Constraint::IdealCipher(c) => c.dim(),
        }
    }

    /// Functionals that become known once this call is resolved.
    pub fn fixing_matrix(&self) -> Matrix {
        match self {
            Constraint::RandomOracle(c) => c.fixing_matrix(),
            Constraint::IdealCipher(c) => c.fixing_matrix(),
        }
    }

    /// Change of basis: right-multiply every functional by `f`.
    ///
    /// # Panics
    /// Panics if `f.nrows() != self.dim()`.
    pub fn map(&self, f: &Matrix) -> Self {
        match self {
            Constraint::RandomOracle(c) => c.map(f).into(),
            Constraint::IdealCipher(c) => c.map(f).into(),
        }
    }

    /// Pad every functional with zero columns on the right.
    ///
    /// # Panics
    /// Panics if `dim < self.dim()`.
    pub fn embed_left(&self, dim: usize) -> Self {
        self.map_functionals(|m| m.embed_left(dim))
    }

    /// Pad every functional with zero columns on the left.
    ///
    /// # Panics
    /// Panics if `dim < self.dim()`.
    pub fn embed_right(&self, dim: usize) -> Self {
        self.map_functionals(|m| m.embed_right(dim))
    }

    fn map_functionals(&self, op: impl Fn(&Matrix) -> Matrix) -> Self {
        match self {
            Constraint::RandomOracle(c) => c.map_functionals(op).into(),
            Constraint::IdealCipher(c) => c.map_functionals(op).into(),
        }
    }

    /// Whether this call can be resolved when the span of `fixing` is known.
    pub fn is_solvable(&self, fixing: &Matrix, mode: CipherMode) -> bool {
        match self {
            Constraint::RandomOracle(c) => c.is_solvable(fixing),
            Constraint::IdealCipher(c) => c.is_solvable(fixing, mode),
        }
    }

    /// Whether this call is consistent with the calls placed before it.
    /// Calls to a different primitive never conflict.
    pub fn is_proper(&self, prior: &[Constraint], mode: CipherMode) -> bool {
        match self {
            Constraint::RandomOracle(c) => c.is_proper(prior.iter().filter_map(|p| match p {
                Constraint::RandomOracle(p) => Some(p),
                Constraint::IdealCipher(_) => None,
            })),
            Constraint::IdealCipher(c) => c.is_proper(
                prior.iter().filter_map(|p| match p {
                    Constraint::IdealCipher(p) => Some(p),
                    Constraint::RandomOracle(_) => None,
                }),
                mode,
            ),
        }
    }

    /// Rows whose vanishing makes the two constraints structurally equal.
    pub fn difference_matrix(&self, other: &Constraint) -> Result<Matrix> {
        ensure_dim("difference_matrix", self.dim(), other.dim())?;
        match (self, other) {
            (Constraint::RandomOracle(a), Constraint::RandomOracle(b)) => Ok(a.difference_matrix(b)),
            (Constraint::IdealCipher(a), Constraint::IdealCipher(b)) => Ok(a.difference_matrix(b)),
            _ => Err(LinicryptError::VariantMismatch),
        }
    }

    pub fn is_random_oracle(&self) -> bool {
        matches!(self, Constraint::RandomOracle(_))
    }
}

impl From<RandomOracleConstraint> for Constraint {
    fn from(c: RandomOracleConstraint) -> Self {
        Constraint::RandomOracle(c)
    }
}

impl From<IdealCipherConstraint> for Constraint {
    fn from(c: IdealCipherConstraint) -> Self {
        Constraint::IdealCipher(c)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::RandomOracle(c) => write!(f, "{c}"),
            Constraint::IdealCipher(c) => write!(f, "{c}"),
        }
    }
}

/// True if `extra` is not contained in the span of `base`.
fn extends_span(base: &Matrix, extra: &Matrix) -> bool {
    let base = base.row_space();
    base.vstack(extra).rank() > base.nrows()
}

fn single_row(context: &'static str, m: &Matrix) -> Result<()> {
    ensure_dim(context, 1, m.nrows())
}
