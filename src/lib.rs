//! # Linicrypt - solvability and attack search for Linicrypt programs
//!
//! A Linicrypt program computes only linear combinations over a finite field
//! and calls to idealized primitives: random oracles and ideal ciphers. Each
//! call is a [`Constraint`] over a shared ambient space, and a program is an
//! [`AlgebraicRepresentation`] of its calls, known inputs and outputs.
//!
//! Collision and second-preimage resistance are decided by searching the
//! doubled program for a way to identify calls that is still solvable but
//! leaves the two executions distinct.
//!
//! ## Modules
//!
//! - [`field`] - GF(q) arithmetic, one field per process
//! - [`matrix`] - Dual vectors and subspaces as canonical bases
//! - [`constraint`] - Random oracle and ideal cipher calls
//! - [`system`] - Solution orderings and the collapse search
//! - [`representation`] - Programs and their collision / second-preimage searches
//! - [`attack`] - Attacks and their reduction to maximal partitions
//! - [`pgv`] - The 64 PGV compression functions and their iteration
//! - [`report`] - Classification of the PGV family

pub mod attack;
pub mod config;
pub mod constraint;
pub mod error;
pub mod field;
pub mod matrix;
pub mod partition;
pub mod pgv;
pub mod report;
pub mod representation;
pub mod system;

pub use attack::{maximal_attacks, Attack};
pub use config::{CipherMode, SolverConfig};
pub use constraint::{Constraint, IdealCipherConstraint, RandomOracleConstraint};
pub use error::{LinicryptError, Result};
pub use field::{Field, FieldError};
pub use matrix::Matrix;
pub use partition::{compare_partitions, is_finer, Partition, PartitionOrder, SetPartitions};
pub use pgv::{PgvCompressionFunction, PgvParams};
pub use report::{classify, classify_all, Classification};
pub use representation::{AlgebraicRepresentation, Attacks};
pub use system::{ConstraintSystem, SolvableSubspace, SolvableSubspaces, SolvableSubspacesOutside};
