use crate::rgsw::GadgetMatrix;
use crate::rlwe::ciphertext::RlweCiphertext;
use math::error::{Error, Result};
use math::gadget::GadgetParams;
use math::ring::Ring;

/// Digit buffer of one decomposed RLWE ciphertext: (k + 1) * digits
/// polynomials, row (c, i) at index `c * digits + i`, NTT domain, plain form.
#[derive(Clone, Debug)]
pub struct ExternalProductScratch {
    pub(crate) digits: Vec<u64>,
    rank: usize,
    gadget: GadgetParams,
    poly_size: usize,
}

impl ExternalProductScratch {
    pub fn new(ring: &Ring, rank: usize, gadget: &GadgetParams) -> Self {
        Self {
            digits: vec![0; (rank + 1) * gadget.digits * ring.poly_size()],
            rank,
            gadget: *gadget,
            poly_size: ring.poly_size(),
        }
    }

    /// Decomposes polynomials `from..` of `ct` into digit rows `from * digits..`.
    pub fn decompose(&mut self, ring: &Ring, ct: &RlweCiphertext, from: usize) -> Result<()> {
        if ct.rank() != self.rank {
            return Err(Error::ParameterMismatch(format!(
                "rank-{} ciphertext with a rank-{} scratch",
                ct.rank(),
                self.rank
            )));
        }
        ct.check_coefficients()?;
        let block: usize = self.gadget.digits * self.poly_size;
        for c in from..=self.rank {
            let dst: &mut [u64] = &mut self.digits[c * block..(c + 1) * block];
            ring.decompose_raw(ct.polys[c].raw(), &self.gadget, dst);
            ring.ntt_raw(dst);
        }
        Ok(())
    }

    /// out = sum over rows r >= from * digits of digit_r * key[r - from * digits],
    /// returned in coefficient domain.
    pub fn apply<D: AsRef<[u64]>>(
        &self,
        ring: &Ring,
        key: &GadgetMatrix<D>,
        from: usize,
        out: &mut RlweCiphertext,
    ) -> Result<()> {
        let first: usize = from * self.gadget.digits;
        let rows: usize = (self.rank + 1) * self.gadget.digits - first;
        if key.rows() != rows || key.cols() != self.rank + 1 || out.rank() != self.rank {
            return Err(Error::ParameterMismatch(format!(
                "key of {}x{} polynomials applied to {} digit rows of a rank-{} ciphertext",
                key.rows(),
                key.cols(),
                rows,
                self.rank
            )));
        }
        let size: usize = self.poly_size;
        for p in out.polys.iter_mut() {
            p.raw_mut().fill(0);
        }
        for r in 0..rows {
            let digit: &[u64] = &self.digits[(first + r) * size..(first + r + 1) * size];
            for (col, p) in out.polys.iter_mut().enumerate() {
                ring.multiply_accumulate_raw(key.at(r, col), digit, p.raw_mut());
            }
        }
        for p in out.polys.iter_mut() {
            ring.intt_raw(p.raw_mut());
            p.set_flags(false, false);
        }
        Ok(())
    }
}

/// out = ct (external product) RGSW key.
pub fn external_product<D: AsRef<[u64]>>(
    ring: &Ring,
    ct: &RlweCiphertext,
    key: &GadgetMatrix<D>,
    scratch: &mut ExternalProductScratch,
    out: &mut RlweCiphertext,
) -> Result<()> {
    scratch.decompose(ring, ct, 0)?;
    scratch.apply(ring, key, 0, out)
}

#[cfg(test)]
mod tests {
    use super::{external_product, ExternalProductScratch};
    use crate::rgsw::{constant, encrypt_rgsw, monomial, GadgetMatrix};
    use crate::rlwe::ciphertext::RlweCiphertext;
    use crate::rlwe::secret::RlweSecret;
    use math::gadget::GadgetParams;
    use math::poly::Poly;
    use math::ring::{Ring, RingParams};
    use sampling::distributions::Distribution;
    use sampling::source::Source;

    fn setup(rank: usize) -> (Ring, RlweSecret, GadgetParams, Source) {
        let ring: Ring = Ring::from_params(&RingParams {
            degree: 64,
            prime_bits: 25,
            channels: 2,
        })
        .unwrap();
        let mut source: Source = Source::new([2u8; 32]);
        let sk: RlweSecret = RlweSecret::generate(&ring, rank, Distribution::Ternary, &mut source).unwrap();
        (ring, sk, GadgetParams::new(8, 3, 26).unwrap(), source)
    }

    #[test]
    fn product_with_monomial_rotates() {
        for rank in [1usize, 2] {
            let (ring, sk, gadget, mut source) = setup(rank);
            let message: Vec<i64> = (0..64).map(|i| (i - 32) << 36).collect();
            let mut m: Poly<u64> = ring.new_poly();
            ring.set_signed(&mut m, &message).unwrap();
            let ct: RlweCiphertext = sk.encrypt(&ring, &m, 3.2, &mut source).unwrap();

            let mut key: GadgetMatrix<Vec<u64>> =
                GadgetMatrix::alloc((rank + 1) * 3, rank + 1, ring.channels(), ring.n());
            let x3: Poly<u64> = monomial(&ring, 3).unwrap();
            encrypt_rgsw(&ring, &sk, &gadget, &x3, 3.2, &mut source, &mut key).unwrap();

            let mut scratch: ExternalProductScratch = ExternalProductScratch::new(&ring, rank, &gadget);
            let mut out: RlweCiphertext = RlweCiphertext::new(&ring, rank);
            external_product(&ring, &ct, &key, &mut scratch, &mut out).unwrap();

            let mut want: Poly<u64> = ring.new_poly();
            ring.mul_monomial(&m, 3, &mut want).unwrap();
            let want: Vec<i64> = ring.to_signed(&want).unwrap();
            let got: Vec<i64> = ring.to_signed(&sk.decrypt(&ring, &out).unwrap()).unwrap();
            for (w, g) in want.iter().zip(got.iter()) {
                assert!((w - g).abs() < 1 << 34, "rank {}: {} vs {}", rank, w, g);
            }
        }
    }

    #[test]
    fn product_with_zero_cancels() {
        let (ring, sk, gadget, mut source) = setup(1);
        let mut m: Poly<u64> = ring.new_poly();
        ring.set_signed(&mut m, &vec![1i64 << 40; 64]).unwrap();
        let ct: RlweCiphertext = sk.encrypt(&ring, &m, 3.2, &mut source).unwrap();
        let mut key: GadgetMatrix<Vec<u64>> = GadgetMatrix::alloc(6, 2, ring.channels(), ring.n());
        let zero: Poly<u64> = constant(&ring, 0).unwrap();
        encrypt_rgsw(&ring, &sk, &gadget, &zero, 3.2, &mut source, &mut key).unwrap();
        let mut scratch: ExternalProductScratch = ExternalProductScratch::new(&ring, 1, &gadget);
        let mut out: RlweCiphertext = RlweCiphertext::new(&ring, 1);
        external_product(&ring, &ct, &key, &mut scratch, &mut out).unwrap();
        let got: Vec<i64> = ring.to_signed(&sk.decrypt(&ring, &out).unwrap()).unwrap();
        assert!(got.iter().all(|x| x.abs() < 1 << 30));
    }

    #[test]
    fn shape_mismatch_is_reported() {
        let (ring, _, gadget, _) = setup(1);
        let ct: RlweCiphertext = RlweCiphertext::new(&ring, 1);
        let key: GadgetMatrix<Vec<u64>> = GadgetMatrix::alloc(4, 2, ring.channels(), ring.n());
        let mut scratch: ExternalProductScratch = ExternalProductScratch::new(&ring, 1, &gadget);
        let mut out: RlweCiphertext = RlweCiphertext::new(&ring, 1);
        assert!(external_product(&ring, &ct, &key, &mut scratch, &mut out).is_err());
    }
}
