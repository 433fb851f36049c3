//! Set partitions of constraint indices and their refinement order.
//!
//! [`SetPartitions`] enumerates every partition of `0..n` in
//! restricted-growth-string order, starting from the single block and ending
//! with all singletons. The order is fixed, so searches built on it are
//! reproducible.

use std::fmt;

use serde::Serialize;

/// A partition viewed as a set of sets: blocks are kept sorted, so two
/// partitions compare equal regardless of the order they were written in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Partition {
    blocks: Vec<Vec<usize>>,
}

impl Partition {
    /// Normalize the given blocks. Empty blocks are dropped.
    pub fn new(blocks: Vec<Vec<usize>>) -> Self {
        let mut blocks: Vec<Vec<usize>> = blocks
            .into_iter()
            .filter(|b| !b.is_empty())
            .map(|mut b| {
                b.sort_unstable();
                b.dedup();
                b
            })
            .collect();
        blocks.sort();
        Self { blocks }
    }

    /// Every index in its own block.
    pub fn singletons(n: usize) -> Self {
        Self {
            blocks: (0..n).map(|i| vec![i]).collect(),
        }
    }

    fn from_rgs(rgs: &[usize]) -> Self {
        let count = rgs.iter().max().map_or(0, |m| m + 1);
        let mut blocks = vec![Vec::new(); count];
        for (i, &b) in rgs.iter().enumerate() {
            blocks[b].push(i);
        }
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Vec<usize>] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// True if every block of `self` lies inside some block of `other`.
    pub fn is_finer(&self, other: &Partition) -> bool {
        self.blocks
            .iter()
            .all(|a| other.blocks.iter().any(|b| a.iter().all(|i| b.contains(i))))
    }

    pub fn compare(&self, other: &Partition) -> PartitionOrder {
        compare_partitions(self, other)
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.blocks)
    }
}

/// Outcome of comparing two partitions under refinement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PartitionOrder {
    Finer,
    Coarser,
    Equal,
    Uncomparable,
}

pub fn is_finer(a: &Partition, b: &Partition) -> bool {
    a.is_finer(b)
}

pub fn compare_partitions(a: &Partition, b: &Partition) -> PartitionOrder {
    match (a.is_finer(b), b.is_finer(a)) {
        (true, true) => PartitionOrder::Equal,
        (true, false) => PartitionOrder::Finer,
        (false, true) => PartitionOrder::Coarser,
        (false, false) => PartitionOrder::Uncomparable,
    }
}

/// Lazy enumeration of all Bell(n) partitions of `0..n`.
#[derive(Clone, Debug)]
pub struct SetPartitions {
    rgs: Vec<usize>,
    done: bool,
}

impl SetPartitions {
    pub fn new(n: usize) -> Self {
        Self {
            rgs: vec![0; n],
            done: false,
        }
    }

    fn advance(&mut self) {
        for i in (1..self.rgs.len()).rev() {
            let max_before = self.rgs[..i].iter().copied().max().unwrap_or(0);
            if self.rgs[i] <= max_before {
                self.rgs[i] += 1;
                self.rgs[i + 1..].iter_mut().for_each(|x| *x = 0);
                return;
            }
        }
        self.done = true;
    }
}

impl Iterator for SetPartitions {
    type Item = Partition;

    fn next(&mut self) -> Option<Partition> {
        if self.done {
            return None;
        }
        let current = Partition::from_rgs(&self.rgs);
        self.advance();
        Some(current)
    }
}
