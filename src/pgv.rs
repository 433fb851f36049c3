//! PGV block-cipher based compression functions and their Merkle-Damgard
//! iteration.
//!
//! The 64 constructions `h' = E(c·h + d·m, e·h + f·m) + a·h + b·m` with
//! coefficients in {0, 1} are the Preneel-Govaerts-Vandewalle family. The
//! first argument of `E` is the key, the second the plaintext. Each
//! parameterization is expressed as an [`AlgebraicRepresentation`] so the
//! attack search can classify it, and carries its PGV and
//! Black-Rogaway-Shrimpton labels for comparison.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::config::CipherMode;
use crate::constraint::{Constraint, IdealCipherConstraint};
use crate::error::{LinicryptError, Result};
use crate::field;
use crate::matrix::Matrix;
use crate::representation::AlgebraicRepresentation;
use crate::system::ConstraintSystem;

/// Black-Rogaway-Shrimpton group letter for each PGV index, 1-based.
const BRS_CATEGORIES: &[u8; 64] = b"abcaadeafbebfdcfcacacbebeaeaebcbcbgbcdggebgbedggaagaabgafagafbgb";

/// PGV attack label and index by (feed-forward, key, plaintext) choice.
/// The feed-forward axis is ordered `0, m, h, h + m`; the other two follow
/// [`key_choice`]. `-` marks the schemes that are trivially weak.
const PGV_TABLE: [[[(&str, Option<u8>); 4]; 4]; 4] = [
    [
        [("-", None), ("B", Some(13)), ("B", Some(25)), ("-", None)],
        [("D", Some(1)), ("-", None), ("D", Some(26)), ("-", None)],
        [("B", Some(2)), ("B", Some(14)), ("F", Some(27)), ("F", Some(1))],
        [("-", None), ("-", None), ("D", Some(28)), ("-", None)],
    ],
    [
        [("-", None), ("B", Some(15)), ("B", Some(29)), ("-", None)],
        [("✓", Some(3)), ("D", Some(16)), ("✓", Some(30)), ("D", Some(12))],
        [("FP", Some(4)), ("FP", Some(17)), ("B", Some(31)), ("B", Some(43))],
        [("-", None), ("D", Some(18)), ("B", Some(32)), ("-", None)],
    ],
    [
        [("P", Some(5)), ("FP", Some(19)), ("FP", Some(33)), ("P", Some(44))],
        [("D", Some(6)), ("-", None), ("D", Some(34)), ("-", None)],
        [("FP", Some(7)), ("FP", Some(20)), ("B", Some(35)), ("B", Some(45))],
        [("D", Some(8)), ("-", None), ("D", Some(36)), ("-", None)],
    ],
    [
        [("P", Some(9)), ("FP", Some(21)), ("FP", Some(37)), ("P", Some(46))],
        [("✓", Some(10)), ("D", Some(22)), ("✓", Some(38)), ("D", Some(47))],
        [("B", Some(11)), ("B", Some(23)), ("F", Some(39)), ("F", Some(48))],
        [("P", Some(12)), ("D", Some(24)), ("F", Some(40)), ("D", Some(49))],
    ],
];

/// Coefficients of one PGV construction, each 0 or 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PgvParams {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub f: u8,
}

impl PgvParams {
    pub fn new(a: u8, b: u8, c: u8, d: u8, e: u8, f: u8) -> Result<Self> {
        let params = Self { a, b, c, d, e, f };
        if params.bits().iter().any(|&bit| bit > 1) {
            return Err(LinicryptError::InvalidConstruction(format!(
                "PGV coefficients must be 0 or 1, got {params}"
            )));
        }
        Ok(params)
    }

    /// All 64 parameterizations, `a` most significant.
    pub fn all() -> impl Iterator<Item = PgvParams> {
        (0u8..64).map(|n| Self {
            a: (n >> 5) & 1,
            b: (n >> 4) & 1,
            c: (n >> 3) & 1,
            d: (n >> 2) & 1,
            e: (n >> 1) & 1,
            f: n & 1,
        })
    }

    fn bits(&self) -> [u8; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }
}

impl fmt::Display for PgvParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.bits() {
            write!(f, "{bit}")?;
        }
        Ok(())
    }
}

/// Parses six binary digits in `abcdef` order, e.g. `101001`.
impl FromStr for PgvParams {
    type Err = LinicryptError;

    fn from_str(s: &str) -> Result<Self> {
        let digits: Vec<u8> = s
            .chars()
            .map(|ch| match ch {
                '0' => Ok(0),
                '1' => Ok(1),
                _ => Err(LinicryptError::InvalidConstruction(format!(
                    "expected six binary digits, got {s:?}"
                ))),
            })
            .collect::<Result<_>>()?;
        match digits[..] {
            [a, b, c, d, e, f] => Ok(Self { a, b, c, d, e, f }),
            _ => Err(LinicryptError::InvalidConstruction(format!(
                "expected six binary digits, got {s:?}"
            ))),
        }
    }
}

/// One PGV compression function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PgvCompressionFunction {
    params: PgvParams,
    mode: CipherMode,
}

impl PgvCompressionFunction {
    pub fn new(params: PgvParams) -> Self {
        Self {
            params,
            mode: CipherMode::default(),
        }
    }

    pub fn with_cipher_mode(mut self, mode: CipherMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn params(&self) -> PgvParams {
        self.params
    }

    /// The single compression call over the basis `(h, m, y)` where `y` is
    /// the cipher output. Both `h` and `m` are inputs.
    pub fn representation(&self) -> Result<AlgebraicRepresentation> {
        let PgvParams { a, b, c, d, e, f } = self.params;
        let constraint = IdealCipherConstraint::new(
            Matrix::row_vector(&[e.into(), f.into(), 0])?,
            Matrix::row_vector(&[c.into(), d.into(), 0])?,
            Matrix::row_vector(&[0, 0, 1])?,
        )?;
        let cs = ConstraintSystem::new(vec![constraint.into()])?.with_cipher_mode(self.mode);
        let inputs = Matrix::from_rows(&[vec![1, 0, 0], vec![0, 1, 0]])?;
        let output = Matrix::row_vector(&[a.into(), b.into(), 1])?;
        AlgebraicRepresentation::new(cs, inputs, output)
    }

    /// `blocks` compression calls chained from an initial value.
    ///
    /// The basis is `(h0, m1, h1, ..., mn, hn)`. The inputs are `h0` and
    /// every message block; the outputs are `h0` and `hn`, so two colliding
    /// executions must start from the same initial value.
    pub fn merkle_damgard(&self, blocks: usize) -> Result<AlgebraicRepresentation> {
        if blocks == 0 {
            return Err(LinicryptError::InvalidConstruction(
                "Merkle-Damgard needs at least one block".to_string(),
            ));
        }
        let PgvParams { a, b, c, d, e, f } = self.params;
        let field = field::current();
        let neg = |v: u8| u32::from(field.neg(v.into()));
        let dim = 2 * blocks + 1;

        let mut cs = ConstraintSystem::empty(dim).with_cipher_mode(self.mode);
        let mut inputs = vec![unit(dim, 0)];
        for i in 1..=blocks {
            let (h_prev, m, h) = (2 * i - 2, 2 * i - 1, 2 * i);
            let mut x = vec![0u32; dim];
            x[h_prev] = e.into();
            x[m] = f.into();
            let mut k = vec![0u32; dim];
            k[h_prev] = c.into();
            k[m] = d.into();
            let mut y = vec![0u32; dim];
            y[h] = 1;
            y[h_prev] = neg(a);
            y[m] = neg(b);

            let call = IdealCipherConstraint::new(
                Matrix::row_vector(&x)?,
                Matrix::row_vector(&k)?,
                Matrix::row_vector(&y)?,
            )?;
            cs.add(Constraint::from(call))?;
            inputs.push(unit(dim, m));
        }

        let inputs = Matrix::from_rows(&inputs)?;
        let output = Matrix::from_rows(&[unit(dim, 0), unit(dim, dim - 1)])?;
        AlgebraicRepresentation::new(cs, inputs, output)
    }

    /// The PGV attack label and the scheme's index in 1..=64.
    pub fn pgv_category(&self) -> (&'static str, u8) {
        let PgvParams { a, b, c, d, e, f } = self.params;
        let i_ff = usize::from(2 * a + b);
        let i_k = key_choice(c, d);
        let i_p = key_choice(e, f);
        let (label, _) = PGV_TABLE[i_ff][i_k][i_p];
        let index = 16 * i_p + 4 * i_ff + i_k + 1;
        (label, index as u8)
    }

    pub fn brs_category(&self) -> char {
        let (_, index) = self.pgv_category();
        char::from(BRS_CATEGORIES[usize::from(index) - 1])
    }

    /// Syntactic condition for collision resistance of the iteration: no
    /// zero coefficient pair, and the key differs from both the feed-forward
    /// and the plaintext.
    pub fn linicrypt_is_secure(&self) -> bool {
        let PgvParams { a, b, c, d, e, f } = self.params;
        ![(a, b), (c, d), (e, f)].contains(&(0, 0)) && (a, b) != (c, d) && (c, d) != (e, f)
    }
}

impl fmt::Display for PgvCompressionFunction {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let PgvParams { a, b, c, d, e, f } = self.params;
        let (pgv, index) = self.pgv_category();
        write!(
            fmt,
            "E({c}h + {d}m, {e}h + {f}m) + {a}h + {b}m\t PGV: ({pgv}, {index}), BRS: {}",
            self.brs_category()
        )
    }
}

/// Position of a (h, m) coefficient pair in the PGV key/plaintext axes,
/// which order the choices `m, h, m + h, constant`.
fn key_choice(h: u8, m: u8) -> usize {
    match (h, m) {
        (0, 1) => 0,
        (1, 0) => 1,
        (1, 1) => 2,
        _ => 3,
    }
}

fn unit(dim: usize, i: usize) -> Vec<u32> {
    let mut row = vec![0; dim];
    row[i] = 1;
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn pgv(s: &str) -> PgvCompressionFunction {
        PgvCompressionFunction::new(s.parse().unwrap())
    }

    #[test]
    fn test_all_params() {
        let all: Vec<PgvParams> = PgvParams::all().collect();
        assert_eq!(all.len(), 64);
        assert_eq!(all[0].to_string(), "000000");
        assert_eq!(all[63].to_string(), "111111");
        let mut sorted = all.clone();
        sorted.sort();
        assert_eq!(sorted, all);
    }

    #[test]
    fn test_parse_params() {
        let params: PgvParams = "101001".parse().unwrap();
        assert_eq!(params, PgvParams::new(1, 0, 1, 0, 0, 1).unwrap());
        assert!("10100".parse::<PgvParams>().is_err());
        assert!("10100x".parse::<PgvParams>().is_err());
        assert!(PgvParams::new(2, 0, 0, 0, 0, 0).is_err());
    }

    #[test]
    fn test_pgv_indices_are_a_bijection() {
        let indices: HashSet<u8> = PgvParams::all()
            .map(|p| PgvCompressionFunction::new(p).pgv_category().1)
            .collect();
        assert_eq!(indices, (1..=64).collect());
    }

    #[test]
    fn test_known_labels() {
        // Davies-Meyer E_m(h) + h
        let dm = pgv("100110");
        assert_eq!(dm.pgv_category(), ("FP", 25));
        assert_eq!(dm.brs_category(), 'e');
        assert!(dm.linicrypt_is_secure());

        // Matyas-Meyer-Oseas E_h(m) + m
        let mmo = pgv("011001");
        assert_eq!(mmo.pgv_category(), ("✓", 6));
        assert_eq!(mmo.brs_category(), 'd');
        assert!(mmo.linicrypt_is_secure());

        let constant = pgv("000000");
        assert_eq!(constant.pgv_category(), ("-", 52));
        assert!(!constant.linicrypt_is_secure());
    }

    #[test]
    fn test_syntactically_secure_are_the_pgv_secure_schemes() {
        let secure: Vec<PgvCompressionFunction> = PgvParams::all()
            .map(PgvCompressionFunction::new)
            .filter(PgvCompressionFunction::linicrypt_is_secure)
            .collect();
        assert_eq!(secure.len(), 12);
        for scheme in secure {
            assert!(matches!(scheme.pgv_category().0, "✓" | "FP"), "{scheme}");
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(
            pgv("100110").to_string(),
            "E(0h + 1m, 1h + 0m) + 1h + 0m\t PGV: (FP, 25), BRS: e"
        );
    }

    #[test]
    fn test_merkle_damgard_shape() {
        let md = pgv("100110").merkle_damgard(2).unwrap();
        assert_eq!(md.dim(), 5);
        assert_eq!(md.constraint_system().len(), 2);
        assert_eq!(md.fixing().nrows(), 3);
        assert_eq!(md.output().nrows(), 2);
        assert!(pgv("100110").merkle_damgard(0).is_err());
    }

    #[test]
    fn test_compression_function_attacks() {
        // Davies-Meyer resists collisions; the bare cipher E_m(h) does not,
        // since y can be decrypted under any second key.
        assert!(pgv("100110").representation().unwrap().is_collision_resistant().unwrap());
        assert!(!pgv("000110").representation().unwrap().is_collision_resistant().unwrap());
    }

    #[test]
    fn test_constant_construction_collides_when_iterated() {
        let md = pgv("000000").merkle_damgard(1).unwrap();
        assert!(!md.is_collision_resistant().unwrap());
        assert!(!pgv("000000").linicrypt_is_secure());
    }

    #[test]
    fn test_davies_meyer_iteration_is_resistant() {
        let md = pgv("100110").merkle_damgard(1).unwrap();
        assert!(md.is_collision_resistant().unwrap());
        assert!(md.is_second_preimage_resistant().unwrap());
    }
}
