//! Constraint systems: ordering, solvability and the collapse search.
//!
//! A system is solvable from a fixing when its calls can be resolved one at
//! a time, each call producing new information given everything fixed
//! before it. The collapse search looks at every way of identifying calls
//! with each other and keeps the identifications whose collapsed system is
//! still proper and solvable.

use std::fmt;

use tracing::{debug, trace};

use crate::config::CipherMode;
use crate::constraint::Constraint;
use crate::error::{ensure_dim, LinicryptError, Result};
use crate::matrix::Matrix;
use crate::partition::{Partition, SetPartitions};

/// An ordered, duplicate-free list of constraints sharing one ambient
/// dimension.
///
/// The dimension is taken from the first constraint added, or given
/// explicitly with [`ConstraintSystem::empty`]; a system with no constraints
/// keeps its dimension through every transform.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConstraintSystem {
    constraints: Vec<Constraint>,
    dim: usize,
    mode: CipherMode,
}

impl ConstraintSystem {
    pub fn new(constraints: Vec<Constraint>) -> Result<Self> {
        let mut system = Self::default();
        for c in constraints {
            system.add(c)?;
        }
        Ok(system)
    }

    /// A system without constraints over a `dim`-dimensional space.
    pub fn empty(dim: usize) -> Self {
        Self {
            dim,
            ..Default::default()
        }
    }

    /// Build a system from raw `(q, a)` / `(x, k, y)` tuples.
    pub fn from_repr(representation: &[Vec<Matrix>]) -> Result<Self> {
        let constraints = representation
            .iter()
            .map(|c| Constraint::from_repr(c))
            .collect::<Result<Vec<_>>>()?;
        Self::new(constraints)
    }

    pub fn with_cipher_mode(mut self, mode: CipherMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn cipher_mode(&self) -> CipherMode {
        self.mode
    }

    /// Collect transformed constraints, dropping any that became equal.
    fn from_mapped(&self, constraints: impl IntoIterator<Item = Constraint>, dim: usize) -> Self {
        let mut unique: Vec<Constraint> = Vec::new();
        for c in constraints {
            if !unique.contains(&c) {
                unique.push(c);
            }
        }
        Self {
            constraints: unique,
            dim,
            mode: self.mode,
        }
    }

    /// Append a constraint. Adding a constraint already present is a no-op.
    pub fn add(&mut self, c: Constraint) -> Result<()> {
        if self.is_unset() {
            self.dim = c.dim();
        }
        ensure_dim("ConstraintSystem::add", self.dim, c.dim())?;
        if !self.constraints.contains(&c) {
            self.constraints.push(c);
        }
        Ok(())
    }

    pub fn merge(&mut self, other: &ConstraintSystem) -> Result<()> {
        if other.is_unset() {
            return Ok(());
        }
        if self.is_unset() {
            self.dim = other.dim;
        }
        ensure_dim("ConstraintSystem::merge", self.dim, other.dim)?;
        for c in &other.constraints {
            self.add(c.clone())?;
        }
        Ok(())
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// No constraints and no dimension chosen yet.
    fn is_unset(&self) -> bool {
        self.constraints.is_empty() && self.dim == 0
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Constraint> {
        self.constraints.iter()
    }

    /// Apply the change of basis `f` (a `dim x k` matrix) to every constraint.
    pub fn map(&self, f: &Matrix) -> Result<Self> {
        ensure_dim("ConstraintSystem::map", self.dim, f.nrows())?;
        Ok(self.from_mapped(self.constraints.iter().map(|c| c.map(f)), f.ncols()))
    }

    pub fn embed_left(&self, dim: usize) -> Result<Self> {
        self.check_embedding(dim)?;
        Ok(self.from_mapped(self.constraints.iter().map(|c| c.embed_left(dim)), dim))
    }

    pub fn embed_right(&self, dim: usize) -> Result<Self> {
        self.check_embedding(dim)?;
        Ok(self.from_mapped(self.constraints.iter().map(|c| c.embed_right(dim)), dim))
    }

    fn check_embedding(&self, dim: usize) -> Result<()> {
        if dim < self.dim {
            return Err(LinicryptError::DimensionMismatch {
                context: "embedding target smaller than system",
                expected: self.dim,
                found: dim,
            });
        }
        Ok(())
    }

    /// Two independent copies of the system side by side in twice the
    /// dimension: the left copy on the first half of the coordinates, the
    /// right copy on the second half.
    pub fn construct_joined(&self) -> Self {
        let dim = 2 * self.dim;
        let left = self.constraints.iter().map(|c| c.embed_left(dim));
        let right = self.constraints.iter().map(|c| c.embed_right(dim));
        self.from_mapped(left.chain(right), dim)
    }

    /// The same constraints in the order given by `order`, a permutation of
    /// `0..len`.
    pub fn reorder(&self, order: &[usize]) -> Result<Self> {
        ensure_dim("ConstraintSystem::reorder", self.len(), order.len())?;
        let mut constraints = Vec::with_capacity(order.len());
        for &i in order {
            let c = self.constraints.get(i).ok_or(LinicryptError::IndexOutOfRange {
                index: i,
                len: self.len(),
            })?;
            constraints.push(c.clone());
        }
        Ok(self.from_mapped(constraints, self.dim))
    }

    /// Every constraint is proper with respect to all constraints before it.
    pub fn is_proper(&self) -> bool {
        for (i, c) in self.constraints.iter().enumerate() {
            if !c.is_proper(&self.constraints[..i], self.mode) {
                debug!("{c} is not proper with the {i} constraints before it");
                return false;
            }
        }
        true
    }

    fn initial_fixing(&self, fixing: Option<&Matrix>) -> Result<Matrix> {
        match fixing {
            None => Ok(Matrix::zeros(0, self.dim)),
            Some(m) => {
                ensure_dim("fixing", self.dim, m.ncols())?;
                Ok(m.clone())
            }
        }
    }

    /// Resolve the constraints in list order, extending the fixing by each
    /// resolved constraint. Fails at the first unsolvable constraint.
    pub fn is_solution_ordering(&self, fixing: Option<&Matrix>) -> Result<bool> {
        if self.is_empty() {
            return Ok(true);
        }
        let fixing = self.initial_fixing(fixing)?;
        Ok(self.follows_ordering(&(0..self.len()).collect::<Vec<_>>(), fixing))
    }

    fn follows_ordering(&self, order: &[usize], mut fixing: Matrix) -> bool {
        for &i in order {
            let c = &self.constraints[i];
            if !c.is_solvable(&fixing, self.mode) {
                trace!("not a solution ordering because of {i}: {c}");
                return false;
            }
            fixing = fixing.vstack(&c.fixing_matrix()).row_space();
        }
        true
    }

    /// Find a solution ordering by backward elimination.
    ///
    /// The last constraint of any solution ordering must be solvable while
    /// everything else is already fixed. Repeatedly remove such a constraint
    /// and put it in front of the ordering found so far. Returns the
    /// ordering as indices into this system.
    pub fn solution_ordering(&self, fixing: Option<&Matrix>) -> Result<Option<Vec<usize>>> {
        if self.is_empty() {
            return Ok(Some(Vec::new()));
        }
        let fixing = self.initial_fixing(fixing)?;
        let mut remaining: Vec<usize> = (0..self.len()).collect();
        let mut reversed = Vec::with_capacity(self.len());
        while !remaining.is_empty() {
            let pick = remaining.iter().position(|&i| {
                let others = remaining
                    .iter()
                    .filter(|&&j| j != i)
                    .fold(fixing.clone(), |acc, &j| acc.vstack(&self.constraints[j].fixing_matrix()));
                self.constraints[i].is_solvable(&others, self.mode)
            });
            match pick {
                Some(pos) => reversed.push(remaining.remove(pos)),
                None => {
                    trace!("no removable constraint among {remaining:?}");
                    return Ok(None);
                }
            }
        }
        reversed.reverse();
        Ok(Some(reversed))
    }

    /// True if some ordering of the constraints is a solution ordering.
    pub fn is_solvable(&self, fixing: Option<&Matrix>) -> Result<bool> {
        Ok(self.solution_ordering(fixing)?.is_some())
    }

    /// Same answer as [`is_solvable`](Self::is_solvable), by trying every
    /// permutation in lexicographic order.
    pub fn is_solvable_brute_force(&self, fixing: Option<&Matrix>) -> Result<bool> {
        if self.is_empty() {
            return Ok(true);
        }
        let fixing = self.initial_fixing(fixing)?;
        let mut order: Vec<usize> = (0..self.len()).collect();
        loop {
            if self.follows_ordering(&order, fixing.clone()) {
                debug!("found solution ordering {order:?}");
                return Ok(true);
            }
            if !next_permutation(&mut order) {
                return Ok(false);
            }
        }
    }

    /// Identify the constraints inside each block of `partition`.
    ///
    /// Consecutive constraints of a block are differenced, and the map `f`
    /// is the transposed null space of all difference rows: the most general
    /// change of basis under which every block becomes a single constraint.
    /// Returns the collapsed system and `f`.
    pub fn collapse(&self, partition: &Partition) -> Result<(Self, Matrix)> {
        let mut diff = Matrix::zeros(0, self.dim);
        for block in partition.blocks() {
            for &i in block {
                if i >= self.len() {
                    return Err(LinicryptError::IndexOutOfRange {
                        index: i,
                        len: self.len(),
                    });
                }
            }
            for pair in block.windows(2) {
                let d = self.constraints[pair[0]].difference_matrix(&self.constraints[pair[1]])?;
                diff = diff.vstack(&d);
            }
        }
        trace!("collapsing {partition} with difference rows\n{diff}");

        let f = diff.null_space().transpose();
        if !diff.matmul(&f).is_zero() {
            return Err(LinicryptError::InvariantViolation(format!(
                "collapse map for {partition} does not annihilate its difference rows"
            )));
        }
        Ok((self.map(&f)?, f))
    }

    /// Identify constraints `i` and `j`, which must be distinct.
    pub fn collapse_pair(&self, i: usize, j: usize) -> Result<(Self, Matrix)> {
        if i == j {
            return Err(LinicryptError::SelfCollapse { index: i });
        }
        self.collapse(&Partition::new(vec![vec![i, j]]))
    }

    /// Lazily enumerate every partition whose collapse is proper and
    /// solvable from `fixing` pushed through the collapse map.
    pub fn find_solvable_subspaces(&self, fixing: Option<&Matrix>) -> Result<SolvableSubspaces> {
        let fixing = self.initial_fixing(fixing)?;
        Ok(SolvableSubspaces {
            partitions: SetPartitions::new(self.len()),
            system: self.clone(),
            fixing,
        })
    }

    /// Like [`find_solvable_subspaces`](Self::find_solvable_subspaces), but
    /// only yields subspaces not contained in the column span of `w`.
    pub fn find_solvable_subspaces_outside(
        &self,
        w: &Matrix,
        fixing: Option<&Matrix>,
    ) -> Result<SolvableSubspacesOutside> {
        ensure_dim("reference subspace", self.dim, w.nrows())?;
        Ok(SolvableSubspacesOutside {
            inner: self.find_solvable_subspaces(fixing)?,
            w_rank: w.rank(),
            w: w.clone(),
        })
    }

    fn check_partition(&self, partition: &Partition, fixing: &Matrix) -> Result<Option<SolvableSubspace>> {
        let (collapsed, map) = self.collapse(partition)?;
        if !collapsed.is_proper() {
            return Ok(None);
        }
        let fixing = fixing.matmul(&map);
        if !collapsed.is_solvable(Some(&fixing))? {
            return Ok(None);
        }
        debug!("{partition} collapses to a solvable system");
        Ok(Some(SolvableSubspace {
            partition: partition.clone(),
            map,
        }))
    }
}

impl fmt::Display for ConstraintSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.constraints.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ConstraintSystem {
    type Item = &'a Constraint;
    type IntoIter = std::slice::Iter<'a, Constraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.constraints.iter()
    }
}

/// A partition whose collapse is solvable, with its collapse map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolvableSubspace {
    pub partition: Partition,
    /// Columns span the subspace of assignments the collapse allows.
    pub map: Matrix,
}

/// Iterator returned by [`ConstraintSystem::find_solvable_subspaces`].
pub struct SolvableSubspaces {
    system: ConstraintSystem,
    fixing: Matrix,
    partitions: SetPartitions,
}

impl Iterator for SolvableSubspaces {
    type Item = Result<SolvableSubspace>;

    fn next(&mut self) -> Option<Self::Item> {
        for partition in self.partitions.by_ref() {
            match self.system.check_partition(&partition, &self.fixing) {
                Ok(Some(found)) => return Some(Ok(found)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}

/// Iterator returned by [`ConstraintSystem::find_solvable_subspaces_outside`].
pub struct SolvableSubspacesOutside {
    inner: SolvableSubspaces,
    w: Matrix,
    w_rank: usize,
}

impl SolvableSubspacesOutside {
    fn is_outside(&self, subspace: &Matrix) -> bool {
        self.w.hstack(subspace).rank() > self.w_rank
    }
}

impl Iterator for SolvableSubspacesOutside {
    type Item = Result<SolvableSubspace>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Ok(found) if self.is_outside(&found.map) => return Some(Ok(found)),
                Ok(found) => trace!("{} stays inside the reference subspace", found.partition),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Advance to the next permutation in lexicographic order. Returns false
/// after the last one.
fn next_permutation(p: &mut [usize]) -> bool {
    let n = p.len();
    if n < 2 {
        return false;
    }
    let mut i = n - 1;
    while i > 0 && p[i - 1] >= p[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let mut j = n - 1;
    while p[j] <= p[i - 1] {
        j -= 1;
    }
    p.swap(i - 1, j);
    p[i..].reverse();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    fn v(values: &[u32]) -> Matrix {
        Matrix::row_vector(values).unwrap()
    }

    fn ro(q: &[u32], a: &[u32]) -> Vec<Matrix> {
        vec![v(q), v(a)]
    }

    fn ic(x: &[u32], k: &[u32], y: &[u32]) -> Vec<Matrix> {
        vec![v(x), v(k), v(y)]
    }

    fn chain() -> ConstraintSystem {
        ConstraintSystem::from_repr(&[
            ro(&[1, 0, 0, 0, 0], &[0, 0, 1, 0, 0]),
            ro(&[0, 0, 1, 0, 0], &[0, 0, 0, 1, 0]),
            ro(&[0, 1, 0, 0, 0], &[0, 0, 0, 0, 1]),
        ])
        .unwrap()
    }

    fn chain_inputs() -> Matrix {
        v(&[1, 0, 0, 0, 0]).vstack(&v(&[0, 1, 0, 0, 0]))
    }

    fn random_functional(rng: &mut ChaCha20Rng, dim: usize) -> Matrix {
        let values: Vec<u32> = (0..dim).map(|_| rng.gen_range(0..3)).collect();
        v(&values)
    }

    fn random_system(rng: &mut ChaCha20Rng) -> (ConstraintSystem, Matrix) {
        let dim = rng.gen_range(2..=5);
        let n = rng.gen_range(1..=4);
        let mut repr = Vec::new();
        for _ in 0..n {
            let arity = if rng.gen_bool(0.5) { 2 } else { 3 };
            repr.push((0..arity).map(|_| random_functional(rng, dim)).collect());
        }
        let system = ConstraintSystem::from_repr(&repr).unwrap();
        let rows = rng.gen_range(0..=2);
        let fixing = (0..rows).fold(Matrix::zeros(0, dim), |acc, _| {
            acc.vstack(&random_functional(rng, dim))
        });
        (system, fixing)
    }

    #[test]
    fn test_duplicates_are_removed() {
        let system =
            ConstraintSystem::from_repr(&[ro(&[1, 0], &[0, 1]), ro(&[1, 0], &[0, 1])]).unwrap();
        assert_eq!(system.len(), 1);
    }

    #[test]
    fn test_add_rejects_other_dimension() {
        let mut system = chain();
        let err = system.add(Constraint::from_repr(&ro(&[1, 0], &[0, 1])).unwrap());
        assert!(matches!(err, Err(LinicryptError::DimensionMismatch { expected: 5, found: 2, .. })));
    }

    #[test]
    fn test_merge() {
        let mut a = ConstraintSystem::from_repr(&[ro(&[1, 0], &[0, 1])]).unwrap();
        let b = ConstraintSystem::from_repr(&[ro(&[1, 0], &[0, 1]), ro(&[0, 1], &[1, 1])]).unwrap();
        a.merge(&b).unwrap();
        assert_eq!(a.len(), 2);
        assert!(a.merge(&chain()).is_err());
    }

    #[test]
    fn test_chain_identity_ordering_is_solution() {
        let system = chain();
        assert!(system.is_proper());
        assert!(system.is_solution_ordering(Some(&chain_inputs())).unwrap());
        assert!(system.is_solvable(Some(&chain_inputs())).unwrap());
    }

    #[test]
    fn test_chain_wrong_order_is_not_solution() {
        // Querying H(v2) first fixes v2, which H(v0) then needs as a new answer.
        let system = chain().reorder(&[1, 0, 2]).unwrap();
        assert!(!system.is_solution_ordering(Some(&chain_inputs())).unwrap());
        assert!(system.is_solvable(Some(&chain_inputs())).unwrap());
    }

    #[test]
    fn test_greedy_ordering_passes_check() {
        let system = chain();
        let order = system.solution_ordering(Some(&chain_inputs())).unwrap().unwrap();
        let mut sorted = order.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2]);
        assert!(system
            .reorder(&order)
            .unwrap()
            .is_solution_ordering(Some(&chain_inputs()))
            .unwrap());
    }

    #[test]
    fn test_unsolvable_when_answer_is_fixed() {
        let system = chain();
        let fixing = chain_inputs().vstack(&v(&[0, 0, 0, 1, 0]));
        assert!(!system.is_solvable(Some(&fixing)).unwrap());
        assert!(!system.is_solvable_brute_force(Some(&fixing)).unwrap());
    }

    #[test]
    fn test_greedy_agrees_with_brute_force() {
        let mut rng = ChaCha20Rng::seed_from_u64(12345);
        for _ in 0..300 {
            let (system, fixing) = random_system(&mut rng);
            let greedy = system.solution_ordering(Some(&fixing)).unwrap();
            let brute = system.is_solvable_brute_force(Some(&fixing)).unwrap();
            assert_eq!(greedy.is_some(), brute, "disagreement on\n{system}\nfixing\n{fixing}");
            if let Some(order) = greedy {
                assert!(system
                    .reorder(&order)
                    .unwrap()
                    .is_solution_ordering(Some(&fixing))
                    .unwrap());
            }
        }
    }

    #[test]
    fn test_empty_system() {
        let system = ConstraintSystem::default();
        assert_eq!(system.dim(), 0);
        assert!(system.is_proper());
        assert!(system.is_solution_ordering(None).unwrap());
        assert!(system.is_solvable(None).unwrap());
        assert!(system.is_solvable_brute_force(None).unwrap());
        let found: Vec<_> = system.find_solvable_subspaces(None).unwrap().collect();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_empty_system_keeps_dimension() {
        let system = ConstraintSystem::empty(3);
        let found: Vec<_> = system
            .find_solvable_subspaces(None)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].map, Matrix::identity(3));

        let f = Matrix::identity(3).hstack(&Matrix::identity(3));
        assert_eq!(system.map(&f).unwrap().dim(), 6);
        assert_eq!(system.construct_joined().dim(), 6);

        let mut grown = ConstraintSystem::empty(3);
        let err = grown.add(Constraint::from_repr(&ro(&[1, 0], &[0, 1])).unwrap());
        assert!(matches!(err, Err(LinicryptError::DimensionMismatch { expected: 3, found: 2, .. })));
    }

    #[test]
    fn test_fixing_dimension_is_checked() {
        let err = chain().is_solvable(Some(&v(&[1, 0])));
        assert!(matches!(err, Err(LinicryptError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_construct_joined() {
        let joined = chain().construct_joined();
        assert_eq!(joined.dim(), 10);
        assert_eq!(joined.len(), 6);
        let first = joined.constraints()[0].fixing_matrix();
        let last = joined.constraints()[5].fixing_matrix();
        assert_eq!(first.row(0), &[1, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(last.row(1), &[0, 0, 0, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_collapse_singletons_is_identity() {
        let system = chain();
        let (collapsed, f) = system.collapse(&Partition::singletons(3)).unwrap();
        assert_eq!(f, Matrix::identity(5));
        assert_eq!(collapsed, system);
    }

    #[test]
    fn test_collapse_pair_identifies_constraints() {
        let system = ConstraintSystem::from_repr(&[
            ic(&[1, 0, 0, 0], &[0, 1, 0, 0], &[0, 0, 1, 0]),
            ic(&[0, 1, 0, 0], &[1, 0, 0, 0], &[0, 0, 0, 1]),
        ])
        .unwrap();
        let (collapsed, f) = system.collapse_pair(0, 1).unwrap();
        assert_eq!(collapsed.len(), 1);
        assert_eq!(collapsed.dim(), f.ncols());
        let diff = system.constraints()[0]
            .difference_matrix(&system.constraints()[1])
            .unwrap();
        assert!(diff.matmul(&f).is_zero());
    }

    #[test]
    fn test_collapse_across_variants_fails() {
        let system = ConstraintSystem::from_repr(&[
            ro(&[1, 0, 0], &[0, 1, 0]),
            ic(&[1, 0, 0], &[0, 1, 0], &[0, 0, 1]),
        ])
        .unwrap();
        assert_eq!(system.collapse_pair(0, 1), Err(LinicryptError::VariantMismatch));
    }

    #[test]
    fn test_collapse_rejects_bad_index() {
        assert_eq!(
            chain().collapse_pair(0, 7),
            Err(LinicryptError::IndexOutOfRange { index: 7, len: 3 })
        );
    }

    #[test]
    fn test_collapse_pair_rejects_same_index() {
        assert_eq!(chain().collapse_pair(1, 1), Err(LinicryptError::SelfCollapse { index: 1 }));
        assert_eq!(chain().collapse_pair(7, 7), Err(LinicryptError::SelfCollapse { index: 7 }));
    }

    #[test]
    fn test_find_solvable_subspaces_is_lazy_and_deterministic() {
        let system = chain();
        let first: Vec<_> = system
            .find_solvable_subspaces(Some(&chain_inputs()))
            .unwrap()
            .take(1)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(first.len(), 1);

        let run = || -> Vec<Partition> {
            system
                .find_solvable_subspaces(Some(&chain_inputs()))
                .unwrap()
                .map(|s| s.unwrap().partition)
                .collect()
        };
        let all = run();
        assert_eq!(all, run());
        assert!(all.contains(&Partition::singletons(3)));
    }

    #[test]
    fn test_find_outside_whole_space_is_empty() {
        let system = chain();
        let whole = Matrix::identity(5);
        let found: Vec<_> = system
            .find_solvable_subspaces_outside(&whole, None)
            .unwrap()
            .collect();
        assert!(found.is_empty());
    }

    /// `E_k1(v0) = v0` followed by `E_k2(v0) = v3`, over `(v0, k1, k2, v3)`.
    fn fixed_point_then_encryption() -> ConstraintSystem {
        ConstraintSystem::from_repr(&[
            ic(&[1, 0, 0, 0], &[0, 1, 0, 0], &[1, 0, 0, 0]),
            ic(&[1, 0, 0, 0], &[0, 0, 1, 0], &[0, 0, 0, 1]),
        ])
        .unwrap()
    }

    #[test]
    fn test_fixed_point_system_needs_fixed_point_mode() {
        let system = fixed_point_then_encryption();
        assert_eq!(system.cipher_mode(), CipherMode::Permutation);
        assert!(!system.is_solvable(None).unwrap());
        assert!(!system.is_solvable_brute_force(None).unwrap());
        // Merging both calls leaves a single fixed point, still unsolvable.
        let found: Vec<_> = system.find_solvable_subspaces(None).unwrap().collect();
        assert!(found.is_empty());

        let system = system.with_cipher_mode(CipherMode::FixedPoints);
        assert!(system.is_proper());
        assert_eq!(system.solution_ordering(None).unwrap(), Some(vec![0, 1]));
        assert!(system.is_solution_ordering(None).unwrap());
        assert!(system.is_solvable_brute_force(None).unwrap());
        assert!(!system.reorder(&[1, 0]).unwrap().is_solution_ordering(None).unwrap());

        let found: Vec<Partition> = system
            .find_solvable_subspaces(None)
            .unwrap()
            .map(|s| s.unwrap().partition)
            .collect();
        assert!(found.contains(&Partition::singletons(2)));

        let (collapsed, _) = system.collapse_pair(0, 1).unwrap();
        assert_eq!(collapsed.cipher_mode(), CipherMode::FixedPoints);
        assert_eq!(collapsed.len(), 1);
    }

    #[test]
    fn test_next_permutation() {
        let mut p = vec![0, 1, 2];
        let mut all = vec![p.clone()];
        while next_permutation(&mut p) {
            all.push(p.clone());
        }
        assert_eq!(all.len(), 6);
        assert_eq!(all[1], vec![0, 2, 1]);
        assert_eq!(all[5], vec![2, 1, 0]);
    }
}
