use crate::lwe::ciphertext::LweCiphertext;
use crate::lwe::keyswitch_key::LweKeySwitchKey;
use math::error::{Error, Result};
use math::gadget::MAX_DIGITS;

impl LweKeySwitchKey {
    /// Switches `ct` from the input secret to the output secret, staying at Q.
    ///
    /// Each a_j is centered, gadget-decomposed and combined with the key
    /// entries: a_out = -sum d K.a, b_out = b - sum d K.b.
    pub fn keyswitch(&self, ct: &LweCiphertext, out: &mut LweCiphertext) -> Result<()> {
        if ct.n() != self.n_in || ct.q() != self.q {
            return Err(Error::ParameterMismatch(format!(
                "key-switching key expects (n={}, q={}), got (n={}, q={})",
                self.n_in,
                self.q,
                ct.n(),
                ct.q()
            )));
        }
        let q: u64 = self.q;
        let half: u64 = q >> 1;
        let digits_count: usize = self.gadget.digits;
        let mut acc_a: Vec<i128> = vec![0; self.n_out];
        let mut acc_b: i128 = 0;
        let mut digits: [i64; MAX_DIGITS] = [0; MAX_DIGITS];
        for (j, a_j) in ct.a().iter().enumerate() {
            let centered: i64 = if *a_j > half {
                *a_j as i64 - q as i64
            } else {
                *a_j as i64
            };
            self.gadget.decompose_signed(centered, &mut digits);
            for (i, d) in digits[..digits_count].iter().enumerate() {
                if *d == 0 {
                    continue;
                }
                let (k_a, k_b) = self.entry(j, i);
                let d: i128 = *d as i128;
                acc_a
                    .iter_mut()
                    .zip(k_a.iter())
                    .for_each(|(acc, k)| *acc += d * *k as i128);
                acc_b += d * k_b as i128;
            }
        }
        let q_i: i128 = q as i128;
        out.a.clear();
        out.a
            .extend(acc_a.iter().map(|x| (-*x).rem_euclid(q_i) as u64));
        out.b = (ct.b() as i128 - acc_b).rem_euclid(q_i) as u64;
        out.q = q;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::lwe::ciphertext::LweCiphertext;
    use crate::lwe::keyswitch_key::LweKeySwitchKey;
    use crate::lwe::secret::LweSecret;
    use crate::params::SecretKind;
    use math::gadget::GadgetParams;
    use math::modulus::prime::Modulus;
    use sampling::source::Source;

    #[test]
    fn keyswitch_preserves_the_phase() {
        let mut source: Source = Source::new([8u8; 32]);
        let q: u64 = 12289 * 18433;
        let modulus: Modulus<u64> = Modulus::new(q).unwrap();
        let from: LweSecret = LweSecret::generate(128, SecretKind::Ternary, &mut source);
        let to: LweSecret = LweSecret::generate(32, SecretKind::Binary, &mut source);
        let gadget: GadgetParams = GadgetParams::new(5, 4, 8).unwrap();
        let ksk: LweKeySwitchKey =
            LweKeySwitchKey::generate(from.coeffs(), &to, &gadget, &modulus, 3.2, &mut source).unwrap();
        for m in 0..4u64 {
            let ct: LweCiphertext = from.encrypt_message(m, 4, q, 3.2, &mut source).unwrap();
            let mut out: LweCiphertext = LweCiphertext::new(32, q);
            ksk.keyswitch(&ct, &mut out).unwrap();
            assert_eq!(to.decrypt_message(&out, 4).unwrap(), m);
            let shift: i64 = to.phase(&out).unwrap() as i64 - from.phase(&ct).unwrap() as i64;
            let shift: i64 = shift.rem_euclid(q as i64);
            assert!(shift.min(q as i64 - shift) < (q as i64) >> 6);
        }
        let wrong: LweCiphertext = LweCiphertext::new(31, q);
        let mut out: LweCiphertext = LweCiphertext::new(32, q);
        assert!(ksk.keyswitch(&wrong, &mut out).is_err());
    }
}
