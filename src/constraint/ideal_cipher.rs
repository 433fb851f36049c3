use std::fmt;

use tracing::trace;

use super::{extends_span, single_row};
use crate::config::CipherMode;
use crate::error::{ensure_dim, Result};
use crate::matrix::Matrix;

/// One ideal cipher call `E_k(x) = y`, resolvable forwards (x, k -> y)
/// or backwards (k, y -> x).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IdealCipherConstraint {
    pub(crate) x: Matrix,
    pub(crate) k: Matrix,
    pub(crate) y: Matrix,
}

impl IdealCipherConstraint {
    pub fn new(x: Matrix, k: Matrix, y: Matrix) -> Result<Self> {
        single_row("cipher input", &x)?;
        single_row("cipher key", &k)?;
        single_row("cipher output", &y)?;
        ensure_dim("cipher key", x.ncols(), k.ncols())?;
        ensure_dim("cipher output", x.ncols(), y.ncols())?;
        Ok(Self { x, k, y })
    }

    pub fn input(&self) -> &Matrix {
        &self.x
    }

    pub fn key(&self) -> &Matrix {
        &self.k
    }

    pub fn output(&self) -> &Matrix {
        &self.y
    }

    pub fn dim(&self) -> usize {
        self.k.ncols()
    }

    pub fn fixing_matrix(&self) -> Matrix {
        self.x.vstack(&self.k).vstack(&self.y)
    }

    pub fn map(&self, f: &Matrix) -> Self {
        Self {
            x: self.x.matmul(f),
            k: self.k.matmul(f),
            y: self.y.matmul(f),
        }
    }

    pub(crate) fn map_functionals(&self, op: impl Fn(&Matrix) -> Matrix) -> Self {
        Self {
            x: op(&self.x),
            k: op(&self.k),
            y: op(&self.y),
        }
    }

    pub fn is_fixed_point(&self) -> bool {
        self.x == self.y
    }

    pub fn is_solvable_enc(&self, fixing: &Matrix) -> bool {
        let known = fixing.vstack(&self.x).vstack(&self.k);
        let solvable = extends_span(&known, &self.y);
        if !solvable {
            trace!("enc: output {} already determined", self.y);
        }
        solvable
    }

    pub fn is_solvable_dec(&self, fixing: &Matrix) -> bool {
        let known = fixing.vstack(&self.k).vstack(&self.y);
        let solvable = extends_span(&known, &self.x);
        if !solvable {
            trace!("dec: input {} already determined", self.x);
        }
        solvable
    }

    /// A fixed point `E_k(x) = x` where both the key and the point are
    /// still free.
    pub fn is_solvable_fixed_point(&self, fixing: &Matrix) -> bool {
        self.is_fixed_point()
            && extends_span(fixing, &self.k)
            && extends_span(&fixing.vstack(&self.k), &self.x)
    }

    pub fn is_solvable(&self, fixing: &Matrix, mode: CipherMode) -> bool {
        if self.is_solvable_enc(fixing) || self.is_solvable_dec(fixing) {
            return true;
        }
        mode == CipherMode::FixedPoints && self.is_solvable_fixed_point(fixing)
    }

    /// A keyed permutation is injective in both directions, so no earlier
    /// call may share `(x, k)` or `(k, y)` with this one.
    pub fn is_proper<'a>(
        &self,
        prior: impl IntoIterator<Item = &'a IdealCipherConstraint>,
        mode: CipherMode,
    ) -> bool {
        prior.into_iter().all(|c| {
            let xk_clash = c.x == self.x && c.k == self.k;
            let ky_clash = c.k == self.k && c.y == self.y;
            !xk_clash && !ky_clash && !(mode == CipherMode::FixedPoints && self.fixed_point_clash(c))
        })
    }

    fn fixed_point_clash(&self, other: &Self) -> bool {
        if !self.is_fixed_point() || !other.is_fixed_point() {
            return false;
        }
        let same_point = self.x == other.x;
        let same_key = self.k == other.k;
        same_point != same_key
    }

    pub fn difference_matrix(&self, other: &Self) -> Matrix {
        self.x
            .sub(&other.x)
            .vstack(&self.k.sub(&other.k))
            .vstack(&self.y.sub(&other.y))
    }
}

impl fmt::Display for IdealCipherConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <- {} -> {}", self.x, self.k, self.y)
    }
}
