use crate::error::{Error, Result};
use crate::modulus::barrett::Barrett;
use crate::modulus::prime::{Modulus, Prime};
use crate::modulus::{ModularArith, BARRETT, MAX_MODULUS, ONCE};

/// A set of distinct primes q_0..q_{k-1} whose product Q < 2^62 is the
/// modulus a multi-channel polynomial lives in.
#[derive(Clone, Debug)]
pub struct CrtBasis {
    primes: Vec<Prime<u64>>,
    big_q: Modulus<u64>,
    /// Q / q_i.
    q_hat: Vec<u64>,
    /// (Q / q_i)^-1 mod q_i, in Shoup form.
    q_hat_inv: Vec<Barrett<u64>>,
}

impl CrtBasis {
    pub fn new(primes: Vec<Prime<u64>>) -> Result<Self> {
        if primes.is_empty() {
            return Err(Error::ParameterMismatch("empty CRT basis".into()));
        }
        let mut big_q: u64 = 1;
        for (i, prime) in primes.iter().enumerate() {
            if primes[..i].iter().any(|p| p.q == prime.q) {
                return Err(Error::ParameterMismatch(format!(
                    "prime {} appears twice in the CRT basis",
                    prime.q
                )));
            }
            big_q = big_q
                .checked_mul(prime.q)
                .filter(|q| *q < MAX_MODULUS)
                .ok_or_else(|| {
                    Error::RangeError("CRT basis product does not fit in 62 bits".into())
                })?;
        }
        let q_hat: Vec<u64> = primes.iter().map(|p| big_q / p.q).collect();
        let q_hat_inv: Vec<Barrett<u64>> = primes
            .iter()
            .zip(q_hat.iter())
            .map(|(p, q_hat)| {
                let reduced: u64 = p.barrett.reduce::<BARRETT>(q_hat);
                p.barrett.prepare(p.inv(reduced))
            })
            .collect();
        Ok(Self {
            primes,
            big_q: Modulus::new(big_q)?,
            q_hat,
            q_hat_inv,
        })
    }

    #[inline(always)]
    pub fn channels(&self) -> usize {
        self.primes.len()
    }

    #[inline(always)]
    pub fn primes(&self) -> &[Prime<u64>] {
        &self.primes
    }

    #[inline(always)]
    pub fn prime(&self, channel: usize) -> &Prime<u64> {
        &self.primes[channel]
    }

    /// The product of all channel moduli.
    #[inline(always)]
    pub fn q(&self) -> u64 {
        self.big_q.q
    }

    #[inline(always)]
    pub fn modulus(&self) -> &Modulus<u64> {
        &self.big_q
    }

    /// Number of bits of Q.
    pub fn log_q(&self) -> u32 {
        u64::BITS - self.big_q.q.leading_zeros()
    }

    /// Returns x mod Q from its residues x mod q_i.
    #[inline]
    pub fn reconstruct(&self, residues: &[u64]) -> u64 {
        debug_assert_eq!(residues.len(), self.primes.len());
        let mut x: u64 = 0;
        for (i, prime) in self.primes.iter().enumerate() {
            let y: u64 = prime.barrett.mul_external::<ONCE>(self.q_hat_inv[i], residues[i]);
            x = self.big_q.add(x, self.big_q.mul_barrett(y, self.q_hat[i]));
        }
        x
    }

    /// Returns the representative of x mod Q in (-Q/2, Q/2].
    #[inline]
    pub fn reconstruct_centered(&self, residues: &[u64]) -> i64 {
        self.big_q.center(self.reconstruct(residues))
    }

    /// Writes the residues of x (taken mod Q) into `residues`.
    #[inline]
    pub fn decompose(&self, x: u64, residues: &mut [u64]) {
        debug_assert_eq!(residues.len(), self.primes.len());
        for (r, prime) in residues.iter_mut().zip(self.primes.iter()) {
            *r = prime.barrett.reduce::<BARRETT>(&x);
        }
    }

    /// Writes the residues of a signed integer into `residues`.
    #[inline]
    pub fn decompose_signed(&self, x: i64, residues: &mut [u64]) {
        for (r, prime) in residues.iter_mut().zip(self.primes.iter()) {
            *r = prime.from_signed(x);
        }
    }
}
