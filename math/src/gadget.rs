use crate::crt::CrtBasis;
use crate::error::{Error, Result};
use crate::modulus::prime::Modulus;
use serde::{Deserialize, Serialize};

/// Upper bound on the digit count, sized for a 62-bit modulus in base 2.
pub const MAX_DIGITS: usize = 64;

/// Signed gadget decomposition in base B = 2^log_base with `digits` digits
/// after discarding the `rm` least significant bits.
///
/// Digit i carries weight 2^(rm + i * log_base). Digits 0..digits-1 are
/// balanced in [-B/2, B/2); the last digit takes whatever carry remains so
/// the recombination is exact up to the discarded low bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GadgetParams {
    pub log_base: u32,
    pub digits: usize,
    pub rm: u32,
}

impl GadgetParams {
    pub fn new(log_base: u32, digits: usize, rm: u32) -> Result<Self> {
        let gadget: GadgetParams = Self {
            log_base,
            digits,
            rm,
        };
        gadget.check()?;
        Ok(gadget)
    }

    fn check(&self) -> Result<()> {
        if self.log_base == 0 || self.log_base > 31 {
            return Err(Error::RangeError(format!(
                "gadget base 2^{} is out of range",
                self.log_base
            )));
        }
        if self.digits == 0 || self.digits > MAX_DIGITS {
            return Err(Error::RangeError(format!(
                "gadget digit count {} is out of range",
                self.digits
            )));
        }
        if self.rm >= 62 {
            return Err(Error::RangeError(format!(
                "cannot drop {} bits of a 62-bit modulus",
                self.rm
            )));
        }
        Ok(())
    }

    /// Checks that the decomposition spans all `log_q` bits and that every
    /// digit is a small residue of each channel modulus.
    pub fn check_against(&self, log_q: u32, min_channel_bits: u32) -> Result<()> {
        self.check()?;
        let span: u64 = self.rm as u64 + self.log_base as u64 * self.digits as u64;
        if span < log_q as u64 {
            return Err(Error::ParameterMismatch(format!(
                "gadget spans {} bits but the modulus has {}",
                span, log_q
            )));
        }
        if self.log_base + 1 >= min_channel_bits {
            return Err(Error::ParameterMismatch(format!(
                "gadget base 2^{} is too large for a {}-bit channel",
                self.log_base, min_channel_bits
            )));
        }
        Ok(())
    }

    #[inline(always)]
    pub fn base(&self) -> u64 {
        1 << self.log_base
    }

    /// Returns 2^(rm + i * log_base) mod q.
    pub fn weight(&self, i: usize, modulus: &Modulus<u64>) -> u64 {
        modulus.pow(2, self.rm as u64 + (i as u64) * self.log_base as u64)
    }

    /// Decomposes a signed integer, low digit first.
    #[inline(always)]
    pub fn decompose_signed(&self, value: i64, digits: &mut [i64]) {
        debug_assert!(digits.len() >= self.digits);
        let mut v: i64 = value;
        if self.rm > 0 {
            v = (v + (1i64 << (self.rm - 1))) >> self.rm;
        }
        let base: i64 = 1 << self.log_base;
        let half: i64 = base >> 1;
        let mask: i64 = base - 1;
        let last: usize = self.digits - 1;
        for digit in digits[..last].iter_mut() {
            let mut d: i64 = v & mask;
            d -= ((d >= half) as i64) * base;
            *digit = d;
            v = (v - d) >> self.log_base;
        }
        digits[last] = v;
    }

    /// Recombines digits into sum d_i * 2^(rm + i * log_base).
    pub fn recompose_signed(&self, digits: &[i64]) -> i128 {
        digits[..self.digits]
            .iter()
            .rev()
            .fold(0i128, |acc, d| (acc << self.log_base) + *d as i128)
            << self.rm
    }

    /// Decomposes the coefficient whose residues are `column` over `basis`.
    #[inline(always)]
    pub fn decompose_column(&self, basis: &CrtBasis, column: &[u64], digits: &mut [i64]) {
        self.decompose_signed(basis.reconstruct_centered(column), digits)
    }
}

/// Maps a digit with |d| < q to its canonical residue.
#[inline(always)]
pub fn lift_digit(d: i64, q: u64) -> u64 {
    debug_assert!(d.unsigned_abs() < q);
    (d + ((d >> 63) & q as i64)) as u64
}
