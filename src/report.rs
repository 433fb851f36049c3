//! Classification of the PGV family by attack search.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::config::CipherMode;
use crate::error::Result;
use crate::partition::Partition;
use crate::pgv::{PgvCompressionFunction, PgvParams};

/// What the attack search found for one PGV construction iterated over a
/// fixed number of blocks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub params: PgvParams,
    pub blocks: usize,
    pub pgv_category: &'static str,
    pub pgv_index: u8,
    pub brs_category: char,
    pub linicrypt_is_secure: bool,
    pub collision_resistant: bool,
    pub second_preimage_resistant: bool,
    /// Partitions of the maximal collision attacks, in the order found.
    pub maximal_attacks: Vec<Partition>,
}

impl Classification {
    /// Whether the search agrees with the syntactic security condition.
    pub fn matches_syntactic_test(&self) -> bool {
        self.collision_resistant == self.linicrypt_is_secure
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = |resistant: bool| if resistant { "yes" } else { "no" };
        write!(
            f,
            "{}\t CR: {}, SPR: {}, attacks: {}",
            PgvCompressionFunction::new(self.params),
            verdict(self.collision_resistant),
            verdict(self.second_preimage_resistant),
            self.maximal_attacks.len()
        )
    }
}

/// Run the collision and second-preimage searches on `blocks` iterations of
/// one PGV construction.
pub fn classify(params: PgvParams, blocks: usize, mode: CipherMode) -> Result<Classification> {
    let scheme = PgvCompressionFunction::new(params).with_cipher_mode(mode);
    let program = scheme.merkle_damgard(blocks)?;

    let maximal_attacks: Vec<Partition> = program
        .all_maximal_collision_attacks()?
        .into_iter()
        .map(|attack| attack.partition)
        .collect();
    let second_preimage_resistant = program.is_second_preimage_resistant()?;
    let (pgv_category, pgv_index) = scheme.pgv_category();
    debug!(
        "{params}: {} maximal collision attacks over {blocks} blocks",
        maximal_attacks.len()
    );

    Ok(Classification {
        params,
        blocks,
        pgv_category,
        pgv_index,
        brs_category: scheme.brs_category(),
        linicrypt_is_secure: scheme.linicrypt_is_secure(),
        collision_resistant: maximal_attacks.is_empty(),
        second_preimage_resistant,
        maximal_attacks,
    })
}

/// Classify all 64 parameterizations, in [`PgvParams::all`] order.
pub fn classify_all(blocks: usize, mode: CipherMode) -> Result<Vec<Classification>> {
    PgvParams::all()
        .map(|params| classify(params, blocks, mode))
        .collect()
}
