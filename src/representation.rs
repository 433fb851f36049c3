//! Programs as algebraic representations, and the attack searches on them.
//!
//! Collision and second-preimage attacks are found by running two copies of
//! the program side by side, forcing their outputs to agree, and looking for
//! a way to resolve every call that does not force the two copies to be
//! identical.

use std::fmt;

use tracing::{debug, info};

use crate::attack::{maximal_attacks, Attack};
use crate::error::{ensure_dim, LinicryptError, Result};
use crate::matrix::Matrix;
use crate::partition::Partition;
use crate::system::{ConstraintSystem, SolvableSubspacesOutside};

/// A Linicrypt program: its calls, the inputs an adversary knows, and the
/// output functionals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlgebraicRepresentation {
    cs: ConstraintSystem,
    fixing: Matrix,
    output: Matrix,
}

impl AlgebraicRepresentation {
    /// `fixing` and `output` must have one column per ambient dimension. A
    /// system without constraints takes its dimension from `output`.
    pub fn new(cs: ConstraintSystem, fixing: Matrix, output: Matrix) -> Result<Self> {
        let dim = output.ncols();
        ensure_dim("fixing", dim, fixing.ncols())?;
        let cs = if cs.is_empty() && cs.dim() == 0 {
            ConstraintSystem::empty(dim).with_cipher_mode(cs.cipher_mode())
        } else {
            cs
        };
        ensure_dim("constraint system", dim, cs.dim())?;
        Ok(Self {
            cs,
            fixing: fixing.row_space(),
            output,
        })
    }

    pub fn dim(&self) -> usize {
        self.output.ncols()
    }

    pub fn constraint_system(&self) -> &ConstraintSystem {
        &self.cs
    }

    pub fn fixing(&self) -> &Matrix {
        &self.fixing
    }

    pub fn output(&self) -> &Matrix {
        &self.output
    }

    pub fn map(&self, f: &Matrix) -> Result<Self> {
        ensure_dim("AlgebraicRepresentation::map", self.dim(), f.nrows())?;
        Ok(Self {
            cs: self.cs.map(f)?,
            fixing: self.fixing.matmul(f).row_space(),
            output: self.output.matmul(f),
        })
    }

    pub fn embed_left(&self, dim: usize) -> Result<Self> {
        self.check_embedding(dim)?;
        Ok(Self {
            cs: self.cs.embed_left(dim)?,
            fixing: self.fixing.embed_left(dim),
            output: self.output.embed_left(dim),
        })
    }

    pub fn embed_right(&self, dim: usize) -> Result<Self> {
        self.check_embedding(dim)?;
        Ok(Self {
            cs: self.cs.embed_right(dim)?,
            fixing: self.fixing.embed_right(dim),
            output: self.output.embed_right(dim),
        })
    }

    fn check_embedding(&self, dim: usize) -> Result<()> {
        if dim < self.dim() {
            return Err(LinicryptError::DimensionMismatch {
                context: "embedding target smaller than program",
                expected: self.dim(),
                found: dim,
            });
        }
        Ok(())
    }

    /// Accumulate another program over the same basis: calls are merged,
    /// known inputs are joined and outputs are stacked.
    pub fn merge(&mut self, other: &AlgebraicRepresentation) -> Result<()> {
        ensure_dim("AlgebraicRepresentation::merge", self.dim(), other.dim())?;
        self.cs.merge(&other.cs)?;
        self.fixing = self.fixing.vstack(&other.fixing).row_space();
        self.output = self.output.vstack(&other.output);
        Ok(())
    }

    /// Two copies of the program with equal outputs.
    ///
    /// Returns the map `f` onto assignments where both outputs agree and the
    /// preimage under `f` of the diagonal, where both copies are identical.
    fn doubled(&self) -> Result<Doubled> {
        let dim = self.dim();
        let joined = self.cs.construct_joined();
        let output_collapse = self
            .output
            .embed_left(2 * dim)
            .sub(&self.output.embed_right(2 * dim));
        let f = output_collapse.null_space().transpose();

        let diagonal = Matrix::identity(dim).vstack(&Matrix::identity(dim));
        let annihilator = diagonal.left_null_space();
        let preimage = annihilator.matmul(&f).null_space().transpose();
        if f.matmul(&preimage) != diagonal {
            return Err(LinicryptError::InvariantViolation(
                "diagonal is not recovered from its preimage under the output collapse".to_string(),
            ));
        }
        debug!(
            "doubled program of dimension {} collapses to {} under equal outputs",
            2 * dim,
            f.ncols()
        );

        Ok(Doubled {
            joined: joined.map(&f)?,
            f,
            preimage,
        })
    }

    fn search(&self, known_inputs: bool) -> Result<Attacks> {
        let Doubled { joined, f, preimage } = self.doubled()?;
        let fixing = if known_inputs {
            Some(self.fixing.embed_left(2 * self.dim()).matmul(&f))
        } else {
            None
        };
        let subspaces = joined.find_solvable_subspaces_outside(&preimage, fixing.as_ref())?;
        let diagonal_rank = self.dim();
        Ok(Attacks {
            subspaces,
            joined,
            f,
            fixing,
            diagonal_rank,
        })
    }

    /// Lazily enumerate collision attacks, in partition order.
    pub fn list_collision_attacks(&self) -> Result<Attacks> {
        self.search(false)
    }

    pub fn is_collision_resistant(&self) -> Result<bool> {
        match self.list_collision_attacks()?.next() {
            None => Ok(true),
            Some(attack) => attack.map(|_| false),
        }
    }

    /// Like [`list_collision_attacks`](Self::list_collision_attacks), but
    /// the first copy's inputs are already known to the adversary.
    pub fn list_second_preimage_attacks(&self) -> Result<Attacks> {
        self.search(true)
    }

    pub fn is_second_preimage_resistant(&self) -> Result<bool> {
        match self.list_second_preimage_attacks()?.next() {
            None => Ok(true),
            Some(attack) => attack.map(|_| false),
        }
    }

    /// All collision attacks, reduced to those with a maximal partition.
    pub fn all_maximal_collision_attacks(&self) -> Result<Vec<Attack>> {
        let attacks = self.list_collision_attacks()?.collect::<Result<Vec<_>>>()?;
        Ok(maximal_attacks(attacks))
    }
}

impl fmt::Display for AlgebraicRepresentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "constraints:\n{}", self.cs)?;
        writeln!(f, "fixing:\n{}", self.fixing)?;
        write!(f, "output:\n{}", self.output)
    }
}

struct Doubled {
    joined: ConstraintSystem,
    f: Matrix,
    preimage: Matrix,
}

/// Iterator returned by the attack searches on [`AlgebraicRepresentation`].
pub struct Attacks {
    subspaces: SolvableSubspacesOutside,
    joined: ConstraintSystem,
    f: Matrix,
    fixing: Option<Matrix>,
    diagonal_rank: usize,
}

impl Attacks {
    fn to_attack(&self, partition: Partition, map: Matrix) -> Result<Attack> {
        let subspace = self.f.matmul(&map);
        let diagonal = Matrix::identity(self.diagonal_rank).vstack(&Matrix::identity(self.diagonal_rank));
        if diagonal.hstack(&subspace).rank() <= self.diagonal_rank {
            return Err(LinicryptError::InvariantViolation(format!(
                "attack subspace for {partition} lies on the diagonal"
            )));
        }
        let solution = self.joined.map(&map)?;
        info!("found attack with partition {partition}");
        Ok(Attack::new(partition, subspace, self.fixing.clone(), solution))
    }
}

impl Iterator for Attacks {
    type Item = Result<Attack>;

    fn next(&mut self) -> Option<Self::Item> {
        let found = match self.subspaces.next()? {
            Ok(found) => found,
            Err(e) => return Some(Err(e)),
        };
        Some(self.to_attack(found.partition, found.map))
    }
}
