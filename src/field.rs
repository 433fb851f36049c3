//! Small finite fields for Linicrypt coefficient arithmetic.
//!
//! Supports prime fields GF(p) with p < 2^16 and binary extension fields
//! GF(2^m) for 2 <= m <= 8. Multiplication goes through log/antilog tables
//! built once when the field is constructed.
//!
//! One field is used for a whole analysis run. It is installed once per
//! process with [`install`] and read everywhere else with [`current`], which
//! falls back to GF(16) when nothing was installed.

use std::fmt;
use std::sync::OnceLock;

use thiserror::Error;

/// A field element, always reduced into `0..order`.
pub type Elem = u16;

/// Field order used when no field was installed explicitly.
pub const DEFAULT_ORDER: u32 = 16;

/// Primitive polynomials for GF(2^m), indexed by m.
const PRIMITIVE_POLYS: [u32; 9] = [0, 0, 0x7, 0xB, 0x13, 0x25, 0x43, 0x83, 0x11D];

static FIELD: OnceLock<Field> = OnceLock::new();

/// Errors from field construction and element validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("unsupported field order {0}: expected a prime below 65536 or 2^m with 2 <= m <= 8")]
    UnsupportedOrder(u32),

    #[error("coefficient {value} is not an element of GF({order})")]
    ElementOutOfRange { value: u32, order: u32 },

    #[error("matrix rows have different lengths ({first} and {other})")]
    RaggedRows { first: usize, other: usize },

    #[error("GF({installed}) is already installed, cannot switch to GF({requested})")]
    AlreadyInstalled { installed: u32, requested: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    Prime,
    Binary { degree: u32, poly: u32 },
}

/// A finite field with precomputed multiplication tables.
#[derive(Clone)]
pub struct Field {
    order: u32,
    kind: Kind,
    /// `exp[i] = g^i`, doubled in length so `log a + log b` never wraps.
    exp: Vec<Elem>,
    log: Vec<u32>,
}

impl Field {
    /// Build the field of the given order.
    pub fn new(order: u32) -> Result<Self, FieldError> {
        if order < (1 << 16) && is_prime(order) {
            return Self::prime(order).ok_or(FieldError::UnsupportedOrder(order));
        }
        match binary_degree(order) {
            Some(degree) if (2..=8).contains(&degree) => Ok(Self::binary(degree)),
            _ => Err(FieldError::UnsupportedOrder(order)),
        }
    }

    /// GF(16) with modulus x^4 + x + 1.
    pub fn gf16() -> Self {
        Self::binary(4)
    }

    fn binary(degree: u32) -> Self {
        let poly = PRIMITIVE_POLYS[degree as usize];
        let kind = Kind::Binary { degree, poly };
        // x is a generator because the modulus is primitive.
        Self::with_generator(1 << degree, kind, 2)
    }

    fn prime(p: u32) -> Option<Self> {
        let generator = (1..p).find(|&g| multiplicative_order(g, p) == p - 1)?;
        Some(Self::with_generator(p, Kind::Prime, generator))
    }

    fn with_generator(order: u32, kind: Kind, generator: u32) -> Self {
        let group = (order - 1) as usize;
        let mut exp = vec![0 as Elem; 2 * group.max(1)];
        let mut log = vec![0u32; order as usize];
        let mut x = 1u32;
        for i in 0..group {
            exp[i] = x as Elem;
            log[x as usize] = i as u32;
            x = slow_mul(kind, order, x, generator);
        }
        for i in group..exp.len() {
            exp[i] = exp[i - group.max(1)];
        }
        Self {
            order,
            kind,
            exp,
            log,
        }
    }

    /// Number of elements.
    pub fn order(&self) -> u32 {
        self.order
    }

    pub fn characteristic(&self) -> u32 {
        match self.kind {
            Kind::Prime => self.order,
            Kind::Binary { .. } => 2,
        }
    }

    /// Validate a raw coefficient. Values outside `0..order` are rejected,
    /// never reduced.
    pub fn element(&self, value: u32) -> Result<Elem, FieldError> {
        if value < self.order {
            Ok(value as Elem)
        } else {
            Err(FieldError::ElementOutOfRange {
                value,
                order: self.order,
            })
        }
    }

    #[inline]
    pub fn add(&self, a: Elem, b: Elem) -> Elem {
        match self.kind {
            Kind::Binary { .. } => a ^ b,
            Kind::Prime => ((a as u32 + b as u32) % self.order) as Elem,
        }
    }

    #[inline]
    pub fn neg(&self, a: Elem) -> Elem {
        match self.kind {
            Kind::Binary { .. } => a,
            Kind::Prime => ((self.order - a as u32) % self.order) as Elem,
        }
    }

    #[inline]
    pub fn sub(&self, a: Elem, b: Elem) -> Elem {
        self.add(a, self.neg(b))
    }

    #[inline]
    pub fn mul(&self, a: Elem, b: Elem) -> Elem {
        if a == 0 || b == 0 {
            return 0;
        }
        self.exp[(self.log[a as usize] + self.log[b as usize]) as usize]
    }

    /// Multiplicative inverse.
    ///
    /// # Panics
    /// Panics if `a` is zero.
    #[inline]
    pub fn inv(&self, a: Elem) -> Elem {
        assert!(a != 0, "zero has no inverse in GF({})", self.order);
        let group = self.order - 1;
        self.exp[((group - self.log[a as usize]) % group) as usize]
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order && self.kind == other.kind
    }
}

impl Eq for Field {}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("order", &self.order)
            .field("kind", &self.kind)
            .finish()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GF({})", self.order)
    }
}

/// Install the process-wide field. Installing the same order twice is a
/// no-op; installing a different order after the first one is an error.
pub fn install(field: Field) -> Result<&'static Field, FieldError> {
    let requested = field.order();
    let installed = FIELD.get_or_init(|| field);
    if installed.order() == requested {
        Ok(installed)
    } else {
        Err(FieldError::AlreadyInstalled {
            installed: installed.order(),
            requested,
        })
    }
}

/// The process-wide field, GF(16) unless [`install`] ran first.
pub fn current() -> &'static Field {
    FIELD.get_or_init(Field::gf16)
}

fn slow_mul(kind: Kind, order: u32, a: u32, b: u32) -> u32 {
    match kind {
        Kind::Prime => (a * b) % order,
        Kind::Binary { degree, poly } => {
            let (mut a, mut b) = (a, b);
            let mut acc = 0u32;
            while b != 0 {
                if b & 1 != 0 {
                    acc ^= a;
                }
                b >>= 1;
                a <<= 1;
                if a & (1 << degree) != 0 {
                    a ^= poly;
                }
            }
            acc
        }
    }
}

fn multiplicative_order(g: u32, p: u32) -> u32 {
    let mut x = g % p;
    let mut k = 1;
    while x != 1 {
        x = (x * g) % p;
        k += 1;
        if k > p {
            return 0;
        }
    }
    k
}

fn is_prime(n: u32) -> bool {
    if n < 2 {
        return false;
    }
    let mut d = 2u32;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}

fn binary_degree(order: u32) -> Option<u32> {
    if order.is_power_of_two() {
        Some(order.trailing_zeros())
    } else {
        None
    }
}
