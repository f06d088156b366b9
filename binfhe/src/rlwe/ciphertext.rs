use crate::lwe::ciphertext::LweCiphertext;
use math::error::{Error, Result};
use math::poly::Poly;
use math::ring::Ring;

/// Rank-k RLWE ciphertext: `polys[0]` is b, `polys[1..]` are a_1..a_k, with
/// phase b - sum a_c s_c.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RlweCiphertext {
    pub(crate) polys: Vec<Poly<u64>>,
}

impl RlweCiphertext {
    pub fn new(ring: &Ring, rank: usize) -> Self {
        Self {
            polys: ring.new_polys(rank + 1),
        }
    }

    /// Noiseless ciphertext of `message` (coefficient domain).
    pub fn trivial(ring: &Ring, rank: usize, message: &Poly<u64>) -> Self {
        let mut ct: RlweCiphertext = Self::new(ring, rank);
        ct.polys[0].copy_from(message);
        ct
    }

    #[inline(always)]
    pub fn rank(&self) -> usize {
        self.polys.len() - 1
    }

    pub fn b(&self) -> &Poly<u64> {
        &self.polys[0]
    }

    /// Mask component c in 1..=k.
    pub fn a(&self, c: usize) -> &Poly<u64> {
        &self.polys[c]
    }

    pub fn polys(&self) -> &[Poly<u64>] {
        &self.polys
    }

    pub fn polys_mut(&mut self) -> &mut [Poly<u64>] {
        &mut self.polys
    }

    pub fn copy_from(&mut self, other: &RlweCiphertext) {
        self.polys
            .iter_mut()
            .zip(other.polys.iter())
            .for_each(|(a, b)| a.copy_from(b));
    }

    pub(crate) fn check_coefficients(&self) -> Result<()> {
        if self.polys.iter().any(|p| p.is_ntt() || p.is_montgomery()) {
            return Err(Error::DomainError(
                "RLWE ciphertext expected in coefficient domain, plain form".into(),
            ));
        }
        Ok(())
    }

    /// Reads the constant coefficient as an LWE ciphertext mod Q of dimension
    /// k * N: for each component, a'_0 = a_0 and a'_j = -a_{N-j}; b' = b_0.
    pub fn sample_extract(&self, ring: &Ring, out: &mut LweCiphertext) -> Result<()> {
        self.check_coefficients()?;
        let n: usize = ring.n();
        let q: u64 = ring.q();
        let channels: usize = ring.channels();
        if out.n() != self.rank() * n {
            return Err(Error::ParameterMismatch(format!(
                "extraction into dimension {} from rank {} and degree {}",
                out.n(),
                self.rank(),
                n
            )));
        }
        let mut column: Vec<u64> = vec![0; channels];
        let mut coeff = |p: &Poly<u64>, j: usize| -> u64 {
            for (c, r) in column.iter_mut().enumerate() {
                *r = p.at(c)[j];
            }
            ring.basis().reconstruct(&column)
        };
        for (c, a) in self.polys[1..].iter().enumerate() {
            let dst: &mut [u64] = &mut out.a[c * n..(c + 1) * n];
            dst[0] = coeff(a, 0);
            for j in 1..n {
                let x: u64 = coeff(a, n - j);
                dst[j] = if x == 0 { 0 } else { q - x };
            }
        }
        out.b = coeff(&self.polys[0], 0);
        out.q = q;
        Ok(())
    }
}
