use std::fmt;
use std::hash::{Hash, Hasher};

use crate::matrix::Matrix;
use crate::partition::{Partition, PartitionOrder};
use crate::system::ConstraintSystem;

/// A collision or second-preimage attack found by the collapse search.
///
/// Two attacks are the same attack when their partitions are equal as sets
/// of sets; the remaining fields are the witness.
#[derive(Clone, Debug)]
pub struct Attack {
    /// Which calls of the doubled program are identified.
    pub partition: Partition,
    /// Columns span the attack subspace, in the doubled program's basis.
    pub subspace: Matrix,
    /// Inputs the adversary was given, if any.
    pub fixing: Option<Matrix>,
    /// The collapsed doubled system that admits a solution ordering.
    pub solution: ConstraintSystem,
}

impl Attack {
    pub fn new(
        partition: Partition,
        subspace: Matrix,
        fixing: Option<Matrix>,
        solution: ConstraintSystem,
    ) -> Self {
        Self {
            partition,
            subspace,
            fixing,
            solution,
        }
    }
}

impl PartialEq for Attack {
    fn eq(&self, other: &Self) -> bool {
        self.partition == other.partition
    }
}

impl Eq for Attack {}

impl Hash for Attack {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.partition.hash(state);
    }
}

impl fmt::Display for Attack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "partition {}", self.partition)?;
        writeln!(f, "subspace:\n{}", self.subspace)?;
        write!(f, "solution:\n{}", self.solution)
    }
}

/// Keep only attacks whose partition is not strictly coarser than, or equal
/// to, the partition of another attack already kept. A finer partition
/// forces fewer identifications, so it is the more general attack.
///
/// The refinement order is partial, so several maxima may remain. They are
/// returned in the order they were first kept.
pub fn maximal_attacks(attacks: impl IntoIterator<Item = Attack>) -> Vec<Attack> {
    let mut maxima: Vec<Attack> = Vec::new();
    for attack in attacks {
        let dominated = maxima.iter().any(|m| {
            matches!(
                attack.partition.compare(&m.partition),
                PartitionOrder::Coarser | PartitionOrder::Equal
            )
        });
        if dominated {
            continue;
        }
        maxima.retain(|m| attack.partition.compare(&m.partition) != PartitionOrder::Finer);
        maxima.push(attack);
    }
    maxima
}
