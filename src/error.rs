use thiserror::Error;

use crate::field::FieldError;

/// Errors raised while building or analysing Linicrypt programs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LinicryptError {
    #[error("{context}: dimension mismatch, expected {expected} but found {found}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("cannot combine a random oracle constraint with an ideal cipher constraint")]
    VariantMismatch,

    #[error("constraint index {index} out of range for a system of {len} constraints")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("cannot collapse constraint {index} with itself")]
    SelfCollapse { index: usize },

    #[error("constraint representation of arity {arity}: expected (q, a) or (x, k, y)")]
    MalformedConstraint { arity: usize },

    #[error("invalid construction: {0}")]
    InvalidConstruction(String),

    #[error("field error: {0}")]
    Field(#[from] FieldError),

    /// A logic defect in the collapse or pullback computation.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
}

pub type Result<T> = std::result::Result<T, LinicryptError>;

/// Fail with `DimensionMismatch` unless `found == expected`.
pub(crate) fn ensure_dim(context: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(LinicryptError::DimensionMismatch {
            context,
            expected,
            found,
        })
    }
}
