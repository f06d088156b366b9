pub mod impl_u64;

use crate::crt::CrtBasis;
use crate::dft::ntt::Table;
use crate::error::{Error, Result};
use crate::kernel::{self, Kernel};
use crate::modulus::prime::{NTTFriendlyPrimesGenerator, Prime};
use crate::modulus::WordOps;
use crate::poly::Poly;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shape of a ring: degree N and a CRT basis of `channels` primes just below
/// 2^prime_bits, each equal to 1 mod 2N.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingParams {
    pub degree: usize,
    pub prime_bits: u32,
    pub channels: usize,
}

impl RingParams {
    /// Generates the channel primes, largest first.
    pub fn primes(&self) -> Result<Vec<Prime<u64>>> {
        if !self.degree.is_power_of_two() || self.degree < 2 {
            return Err(Error::ParameterMismatch(format!(
                "ring degree {} is not a power of two",
                self.degree
            )));
        }
        if self.prime_bits as usize * self.channels > 62 {
            return Err(Error::RangeError(format!(
                "{} channels of {} bits exceed 62 bits",
                self.channels, self.prime_bits
            )));
        }
        NTTFriendlyPrimesGenerator::new(self.prime_bits, (self.degree as u64) << 1)
            .next_downstream_primes(self.channels)
    }
}

/// Z_Q[X]/(X^N + 1) with Q given by a CRT basis, the NTT tables of every
/// channel and the kernel backend selected at construction.
#[derive(Clone, Debug)]
pub struct Ring {
    n: usize,
    basis: CrtBasis,
    tables: Vec<Table<u64>>,
    kernel: Arc<dyn Kernel>,
}

impl Ring {
    /// Builds the ring from explicit channel moduli with the auto-selected kernel.
    pub fn new(n: usize, moduli: &[u64]) -> Result<Self> {
        let primes: Vec<Prime<u64>> = moduli
            .iter()
            .map(|q| Prime::new(*q))
            .collect::<Result<Vec<_>>>()?;
        Self::from_primes(n, primes, kernel::select())
    }

    pub fn from_params(params: &RingParams) -> Result<Self> {
        Self::from_primes(params.degree, params.primes()?, kernel::select())
    }

    pub fn from_primes(n: usize, primes: Vec<Prime<u64>>, kernel: Arc<dyn Kernel>) -> Result<Self> {
        if !n.is_power_of_two() || n < 2 {
            return Err(Error::ParameterMismatch(format!(
                "ring degree {} is not a power of two",
                n
            )));
        }
        let tables: Vec<Table<u64>> = primes
            .iter()
            .map(|prime| Table::new(prime.clone(), n))
            .collect::<Result<Vec<_>>>()?;
        let basis: CrtBasis = CrtBasis::new(primes)?;
        tracing::debug!(
            n,
            channels = basis.channels(),
            log_q = basis.log_q(),
            kernel = kernel.name(),
            "ring ready"
        );
        Ok(Self {
            n,
            basis,
            tables,
            kernel,
        })
    }

    /// Same ring with another kernel backend.
    pub fn with_kernel(&self, kernel: Arc<dyn Kernel>) -> Self {
        Self {
            n: self.n,
            basis: self.basis.clone(),
            tables: self.tables.clone(),
            kernel,
        }
    }

    #[inline(always)]
    pub fn n(&self) -> usize {
        self.n
    }

    #[inline(always)]
    pub fn log_n(&self) -> usize {
        self.n.log2()
    }

    /// 2N, the order of X in the multiplicative group of the ring.
    #[inline(always)]
    pub fn cyclotomic_order(&self) -> usize {
        self.n << 1
    }

    #[inline(always)]
    pub fn channels(&self) -> usize {
        self.basis.channels()
    }

    /// The full modulus Q.
    #[inline(always)]
    pub fn q(&self) -> u64 {
        self.basis.q()
    }

    #[inline(always)]
    pub fn basis(&self) -> &CrtBasis {
        &self.basis
    }

    #[inline(always)]
    pub fn table(&self, channel: usize) -> &Table<u64> {
        &self.tables[channel]
    }

    #[inline(always)]
    pub fn kernel(&self) -> &dyn Kernel {
        self.kernel.as_ref()
    }

    /// Number of u64 words of one polynomial.
    #[inline(always)]
    pub fn poly_size(&self) -> usize {
        self.n * self.channels()
    }

    pub fn new_poly(&self) -> Poly<u64> {
        Poly::new(self.n, self.channels())
    }

    pub fn new_polys(&self, count: usize) -> Vec<Poly<u64>> {
        (0..count).map(|_| self.new_poly()).collect()
    }

    pub(crate) fn check_shape(&self, a: &Poly<u64>) -> Result<()> {
        if a.n() != self.n || a.channels() != self.channels() {
            return Err(Error::ParameterMismatch(format!(
                "polynomial of shape {}x{} used with a ring of shape {}x{}",
                a.channels(),
                a.n(),
                self.channels(),
                self.n
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Ring, RingParams};
    use crate::error::Error;

    #[test]
    fn params_generate_friendly_primes() {
        let params: RingParams = RingParams {
            degree: 256,
            prime_bits: 25,
            channels: 2,
        };
        let ring: Ring = Ring::from_params(&params).unwrap();
        assert_eq!(ring.channels(), 2);
        for prime in ring.basis().primes() {
            assert_eq!(prime.q % 512, 1);
            assert!(prime.q < 1 << 25);
        }
        assert!(ring.q() < 1 << 50);
    }

    #[test]
    fn bad_shapes_are_rejected() {
        assert!(matches!(Ring::new(100, &[12289]), Err(Error::ParameterMismatch(_))));
        let params: RingParams = RingParams {
            degree: 256,
            prime_bits: 32,
            channels: 2,
        };
        assert!(matches!(Ring::from_params(&params), Err(Error::RangeError(_))));
    }
}
