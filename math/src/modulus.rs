pub mod barrett;
pub mod impl_u64;
pub mod montgomery;
pub mod prime;

use crate::error::{Error, Result};

pub type REDUCEMOD = u8;

pub const NONE: REDUCEMOD = 0;
pub const ONCE: REDUCEMOD = 1;
pub const TWICE: REDUCEMOD = 2;
pub const FOURTIMES: REDUCEMOD = 3;
pub const BARRETT: REDUCEMOD = 4;
pub const BARRETTLAZY: REDUCEMOD = 5;

/// Largest supported modulus (exclusive). Leaves two spare bits so that lazy
/// butterflies can hold values in [0, 4q) in a u64.
pub const MAX_MODULUS: u64 = 1 << 62;

/// Bit helpers on power-of-two sizes.
pub trait WordOps {
    /// Number of bits of `self - 1`, that is log2 for a power of two.
    fn log2(self) -> Self;
    /// The low `n` bits of `self` in reverse order.
    fn reverse_bits_msb(self, n: u32) -> Self;
}

impl WordOps for usize {
    #[inline(always)]
    fn log2(self) -> usize {
        (usize::BITS - self.saturating_sub(1).leading_zeros()) as usize
    }

    #[inline(always)]
    fn reverse_bits_msb(self, n: u32) -> usize {
        match n {
            0 => 0,
            _ => self.reverse_bits() >> (usize::BITS - n),
        }
    }
}

pub trait ReduceOnce<O> {
    /// Branch-free `x mod q` for x in [0, 2q). 2q must fit in the word.
    fn reduce_once_constant_time_assign(&mut self, q: O);
    fn reduce_once_constant_time(&self, q: O) -> O;
    /// Same contract, with a data-dependent branch.
    fn reduce_once_assign(&mut self, q: O);
    fn reduce_once(&self, q: O) -> O;
}

/// The modular-arithmetic contract every modulus exposes.
///
/// Inputs are canonical residues in `[0, q)` unless stated otherwise; results
/// are canonical in `[0, q)`, or in `(-q/2, q/2]` for the centered variants.
pub trait ModularArith {
    fn q(&self) -> u64;
    /// x * 2^64 mod q. Accepts any u64.
    fn to_montgomery(&self, x: u64) -> u64;
    /// x * 2^-64 mod q.
    fn from_montgomery(&self, x: u64) -> u64;
    /// a * b * 2^-64 mod q.
    fn mul_montgomery(&self, a: u64, b: u64) -> u64;
    /// a * b mod q through Barrett reduction of the 128-bit product.
    fn mul_barrett(&self, a: u64, b: u64) -> u64;
    fn add(&self, a: u64, b: u64) -> u64;
    fn sub(&self, a: u64, b: u64) -> u64;
    fn neg(&self, a: u64) -> u64;
    /// Lifts a residue to its representative in (-q/2, q/2].
    fn center(&self, a: u64) -> i64;
    fn add_centered(&self, a: u64, b: u64) -> i64 {
        self.center(self.add(a, b))
    }
    fn sub_centered(&self, a: u64, b: u64) -> i64 {
        self.center(self.sub(a, b))
    }
    /// Maps a signed integer to its canonical residue.
    fn from_signed(&self, a: i64) -> u64;
}

/// Returns `x` if it is a canonical residue modulo `q`.
pub fn canonical(x: u64, q: u64) -> Result<u64> {
    if x >= q {
        return Err(Error::RangeError(format!("{} is not reduced modulo {}", x, q)));
    }
    Ok(x)
}

/// Validates that `q` is usable with Montgomery (R = 2^64) and Barrett arithmetic.
pub fn check_modulus(q: u64) -> Result<()> {
    if q < 3 || q & 1 == 0 {
        return Err(Error::RangeError(format!(
            "modulus {} must be odd and at least 3",
            q
        )));
    }
    if q >= MAX_MODULUS {
        return Err(Error::RangeError(format!(
            "modulus {} does not fit in 62 bits",
            q
        )));
    }
    Ok(())
}
