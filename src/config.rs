use serde::Serialize;

use crate::error::Result;
use crate::field::{self, Field, DEFAULT_ORDER};

/// How ideal-cipher constraints are resolved and checked for properness.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum CipherMode {
    /// A call is resolvable by encryption or decryption only.
    #[default]
    Permutation,
    /// Additionally accept fresh fixed points `E_k(x) = x`, and reject
    /// inconsistent fixed points between calls.
    FixedPoints,
}

/// Settings for one analysis run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolverConfig {
    pub field_order: u32,
    pub cipher_mode: CipherMode,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            field_order: DEFAULT_ORDER,
            cipher_mode: CipherMode::Permutation,
        }
    }
}

impl SolverConfig {
    pub fn new(field_order: u32) -> Self {
        Self {
            field_order,
            ..Default::default()
        }
    }

    pub fn with_cipher_mode(mut self, mode: CipherMode) -> Self {
        self.cipher_mode = mode;
        self
    }

    /// Install the configured field for the rest of the process.
    pub fn install(&self) -> Result<&'static Field> {
        Ok(field::install(Field::new(self.field_order)?)?)
    }
}
