use math::error::{Error, Result};
use math::poly::Poly;
use math::ring::Ring;
use sampling::distributions::Distribution;
use sampling::source::Source;

/// Rank-k RLWE secret (s_1, ..., s_k), kept both as signed coefficients and
/// in NTT domain, Montgomery form for products.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RlweSecret {
    pub(crate) coeffs: Vec<Vec<i64>>,
    pub(crate) ntt: Vec<Poly<u64>>,
}

impl RlweSecret {
    pub fn generate(ring: &Ring, rank: usize, dist: Distribution, source: &mut Source) -> Result<Self> {
        let coeffs: Vec<Vec<i64>> = (0..rank)
            .map(|_| {
                let mut s: Vec<i64> = vec![0; ring.n()];
                dist.fill(source, &mut s);
                s
            })
            .collect();
        Self::from_coeffs(ring, coeffs)
    }

    pub fn from_coeffs(ring: &Ring, coeffs: Vec<Vec<i64>>) -> Result<Self> {
        if coeffs.is_empty() {
            return Err(Error::ParameterMismatch("RLWE secret of rank 0".into()));
        }
        let ntt: Vec<Poly<u64>> = coeffs
            .iter()
            .map(|s| {
                let mut p: Poly<u64> = ring.new_poly();
                ring.set_signed(&mut p, s)?;
                ring.ntt(&mut p)?;
                ring.to_montgomery(&mut p)?;
                Ok(p)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { coeffs, ntt })
    }

    #[inline(always)]
    pub fn rank(&self) -> usize {
        self.coeffs.len()
    }

    #[inline(always)]
    pub fn n(&self) -> usize {
        self.coeffs[0].len()
    }

    pub fn coeffs(&self, c: usize) -> &[i64] {
        &self.coeffs[c]
    }

    /// The LWE secret matching [RlweCiphertext::sample_extract](crate::rlwe::RlweCiphertext::sample_extract):
    /// all components concatenated.
    pub fn extracted(&self) -> Vec<i64> {
        self.coeffs.iter().flatten().copied().collect()
    }
}
