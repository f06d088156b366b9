use crate::rlwe::ciphertext::RlweCiphertext;
use crate::rlwe::secret::RlweSecret;
use math::error::{Error, Result};
use math::poly::Poly;
use math::ring::Ring;
use sampling::source::Source;

impl RlweSecret {
    /// Samples (b, a_1..a_k) in NTT domain, plain form, with
    /// b = sum a_c s_c + e, and adds NTT(message) to polynomial `component`.
    fn encrypt_ntt(
        &self,
        ring: &Ring,
        message: Option<(usize, &Poly<u64>)>,
        sigma: f64,
        source: &mut Source,
    ) -> Result<Vec<Poly<u64>>> {
        let k: usize = self.rank();
        let mut polys: Vec<Poly<u64>> = ring.new_polys(k + 1);
        polys[0].set_flags(true, false);
        let (b, a) = polys.split_at_mut(1);
        let b: &mut Poly<u64> = &mut b[0];
        for (c, a) in a.iter_mut().enumerate() {
            // Uniform residues are uniform in either domain.
            ring.sample_uniform(source, a)?;
            a.set_flags(true, false);
            ring.multiply_accumulate_external(&self.ntt[c], a, b)?;
        }
        let mut e: Poly<u64> = ring.new_poly();
        ring.sample_discrete_gaussian(source, sigma, &mut e)?;
        ring.ntt(&mut e)?;
        ring.add_assign(b, &e)?;
        if let Some((component, m)) = message {
            if component > k {
                return Err(Error::ParameterMismatch(format!(
                    "component {} of a rank-{} ciphertext",
                    component, k
                )));
            }
            let mut m: Poly<u64> = m.clone();
            ring.ntt(&mut m)?;
            ring.add_assign(&mut polys[component], &m)?;
        }
        Ok(polys)
    }

    /// Writes one gadget row (k + 1 polynomials, NTT domain, Montgomery form)
    /// encrypting `message` on polynomial `component` into `out`.
    pub fn encrypt_row(
        &self,
        ring: &Ring,
        message: Option<(usize, &Poly<u64>)>,
        sigma: f64,
        source: &mut Source,
        out: &mut [u64],
    ) -> Result<()> {
        let size: usize = ring.poly_size();
        if out.len() != (self.rank() + 1) * size {
            return Err(Error::ParameterMismatch(format!(
                "row of {} words for rank {} and polynomial size {}",
                out.len(),
                self.rank(),
                size
            )));
        }
        let polys: Vec<Poly<u64>> = self.encrypt_ntt(ring, message, sigma, source)?;
        for (mut p, dst) in polys.into_iter().zip(out.chunks_exact_mut(size)) {
            ring.to_montgomery(&mut p)?;
            dst.copy_from_slice(p.raw());
        }
        Ok(())
    }

    /// Encrypts a coefficient-domain message; the ciphertext is returned in
    /// coefficient domain, plain form.
    pub fn encrypt(
        &self,
        ring: &Ring,
        message: &Poly<u64>,
        sigma: f64,
        source: &mut Source,
    ) -> Result<RlweCiphertext> {
        let mut polys: Vec<Poly<u64>> = self.encrypt_ntt(ring, Some((0, message)), sigma, source)?;
        for p in polys.iter_mut() {
            ring.intt(p)?;
        }
        Ok(RlweCiphertext { polys })
    }

    /// Returns the phase b - sum a_c s_c in coefficient domain.
    pub fn decrypt(&self, ring: &Ring, ct: &RlweCiphertext) -> Result<Poly<u64>> {
        if ct.rank() != self.rank() {
            return Err(Error::ParameterMismatch(format!(
                "rank-{} ciphertext under a rank-{} secret",
                ct.rank(),
                self.rank()
            )));
        }
        ct.check_coefficients()?;
        let mut acc: Poly<u64> = ring.new_poly();
        acc.set_flags(true, false);
        for (c, a) in ct.polys[1..].iter().enumerate() {
            let mut a: Poly<u64> = a.clone();
            ring.ntt(&mut a)?;
            ring.multiply_accumulate_external(&self.ntt[c], &a, &mut acc)?;
        }
        ring.intt(&mut acc)?;
        let mut phase: Poly<u64> = ct.polys[0].clone();
        ring.sub_assign(&mut phase, &acc)?;
        Ok(phase)
    }
}

#[cfg(test)]
mod tests {
    use crate::lwe::ciphertext::LweCiphertext;
    use crate::lwe::secret::LweSecret;
    use crate::params::SecretKind;
    use crate::rlwe::ciphertext::RlweCiphertext;
    use crate::rlwe::secret::RlweSecret;
    use math::poly::Poly;
    use math::ring::Ring;
    use sampling::distributions::Distribution;
    use sampling::source::Source;

    fn ring() -> Ring {
        Ring::new(64, &[12289, 18433]).unwrap()
    }

    #[test]
    fn decryption_recovers_message_up_to_noise() {
        let ring: Ring = ring();
        let mut source: Source = Source::new([0u8; 32]);
        for rank in [1usize, 2] {
            let sk: RlweSecret = RlweSecret::generate(&ring, rank, Distribution::Ternary, &mut source).unwrap();
            let message: Vec<i64> = (0..64).map(|i| (i % 5 - 2) * 1_000_000).collect();
            let mut m: Poly<u64> = ring.new_poly();
            ring.set_signed(&mut m, &message).unwrap();
            let ct: RlweCiphertext = sk.encrypt(&ring, &m, 3.2, &mut source).unwrap();
            let phase: Vec<i64> = ring.to_signed(&sk.decrypt(&ring, &ct).unwrap()).unwrap();
            for (want, got) in message.iter().zip(phase.iter()) {
                assert!((want - got).abs() < 40, "{} vs {}", want, got);
            }
        }
    }

    #[test]
    fn extraction_matches_the_constant_coefficient() {
        let ring: Ring = ring();
        let mut source: Source = Source::new([1u8; 32]);
        let sk: RlweSecret = RlweSecret::generate(&ring, 2, Distribution::Ternary, &mut source).unwrap();
        let mut m: Poly<u64> = ring.new_poly();
        let message: Vec<i64> = (0..64).map(|i| i * 1000 - 7).collect();
        ring.set_signed(&mut m, &message).unwrap();
        let ct: RlweCiphertext = sk.encrypt(&ring, &m, 3.2, &mut source).unwrap();
        let mut lwe: LweCiphertext = LweCiphertext::new(128, ring.q());
        ct.sample_extract(&ring, &mut lwe).unwrap();
        let extracted: LweSecret = LweSecret::from_coeffs(sk.extracted(), SecretKind::Ternary).unwrap();
        let p: u64 = extracted.phase(&lwe).unwrap();
        let q: u64 = ring.q();
        let got: i64 = if p > q / 2 { p as i64 - q as i64 } else { p as i64 };
        assert!((got + 7).abs() < 40, "{}", got);
    }
}
