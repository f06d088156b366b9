use crate::modulus::barrett::BarrettPrecomp;
use crate::modulus::montgomery::MontgomeryPrecomp;

/// An odd modulus with its Montgomery and Barrett precomputations.
/// Immutable once built and shared by reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Modulus<O> {
    pub q: O,
    pub montgomery: MontgomeryPrecomp<O>,
    pub barrett: BarrettPrecomp<O>,
}

/// A prime modulus together with the data needed to find roots of unity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prime<O> {
    pub modulus: Modulus<O>,
    /// Euler totient of q.
    pub phi: O,
    /// Distinct prime factors of q-1.
    pub factors: Vec<O>,
}

impl<O> std::ops::Deref for Prime<O> {
    type Target = Modulus<O>;

    fn deref(&self) -> &Modulus<O> {
        &self.modulus
    }
}

/// Walks the arithmetic progression 1 + k * nth_root around 2^bit_size
/// and yields the primes it meets.
pub struct NTTFriendlyPrimesGenerator {
    pub size: u32,
    pub nth_root: u64,
    pub next_prime: u64,
    pub prev_prime: u64,
    pub check_next_prime: bool,
    pub check_prev_prime: bool,
}
