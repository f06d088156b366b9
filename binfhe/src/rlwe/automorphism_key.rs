use crate::rgsw::{gadget_multiple, GadgetMatrix};
use crate::rlwe::ciphertext::RlweCiphertext;
use crate::rlwe::external_product::ExternalProductScratch;
use crate::rlwe::secret::RlweSecret;
use math::automorphism::AutoPerm;
use math::error::{Error, Result};
use math::gadget::GadgetParams;
use math::poly::Poly;
use math::ring::Ring;
use sampling::source::Source;

/// Fills `out` with the key switching psi_t(s) back to s: k * digits rows,
/// row (c, i) an RLWE encryption of -psi_t(s_c) * g_i.
pub fn encrypt_automorphism_key<D: AsRef<[u64]> + AsMut<[u64]>>(
    ring: &Ring,
    secret: &RlweSecret,
    gadget: &GadgetParams,
    gal_el: usize,
    sigma: f64,
    source: &mut Source,
    out: &mut GadgetMatrix<D>,
) -> Result<()> {
    let k: usize = secret.rank();
    if out.rows() != k * gadget.digits || out.cols() != k + 1 {
        return Err(Error::ParameterMismatch(format!(
            "automorphism key of {}x{} polynomials for rank {} and {} digits",
            out.rows(),
            out.cols(),
            k,
            gadget.digits
        )));
    }
    let mut s: Poly<u64> = ring.new_poly();
    let mut psi_s: Poly<u64> = ring.new_poly();
    for c in 0..k {
        ring.set_signed(&mut s, secret.coeffs(c))?;
        ring.automorphism(&s, gal_el, &mut psi_s)?;
        for i in 0..gadget.digits {
            let m: Poly<u64> = gadget_multiple(ring, &psi_s, gadget, i, true)?;
            secret.encrypt_row(ring, Some((0, &m)), sigma, source, out.row_mut(c * gadget.digits + i))?;
        }
    }
    Ok(())
}

/// Scratch of [apply_automorphism].
#[derive(Clone, Debug)]
pub struct AutomorphismScratch {
    permuted: RlweCiphertext,
    decomposed: ExternalProductScratch,
}

impl AutomorphismScratch {
    pub fn new(ring: &Ring, rank: usize, gadget: &GadgetParams) -> Self {
        Self {
            permuted: RlweCiphertext::new(ring, rank),
            decomposed: ExternalProductScratch::new(ring, rank, gadget),
        }
    }
}

/// ct <- psi_t(ct) re-encrypted under s:
/// (psi(b), 0, ..) + sum_{c, i} d_{c,i}(psi(a_c)) * K_{c,i}.
pub fn apply_automorphism<D: AsRef<[u64]>>(
    ring: &Ring,
    perm: &AutoPerm,
    key: &GadgetMatrix<D>,
    ct: &mut RlweCiphertext,
    scratch: &mut AutomorphismScratch,
) -> Result<()> {
    for (src, dst) in ct.polys.iter().zip(scratch.permuted.polys.iter_mut()) {
        ring.automorphism_with(perm, src, dst)?;
    }
    scratch.decomposed.decompose(ring, &scratch.permuted, 1)?;
    scratch.decomposed.apply(ring, key, 1, ct)?;
    ring.add_assign(&mut ct.polys[0], &scratch.permuted.polys[0])
}

#[cfg(test)]
mod tests {
    use super::{apply_automorphism, encrypt_automorphism_key, AutomorphismScratch};
    use crate::rgsw::GadgetMatrix;
    use crate::rlwe::ciphertext::RlweCiphertext;
    use crate::rlwe::secret::RlweSecret;
    use math::automorphism::AutoPerm;
    use math::gadget::GadgetParams;
    use math::poly::Poly;
    use math::ring::{Ring, RingParams};
    use sampling::distributions::Distribution;
    use sampling::source::Source;

    #[test]
    fn automorphism_acts_on_the_plaintext() {
        let ring: Ring = Ring::from_params(&RingParams {
            degree: 64,
            prime_bits: 25,
            channels: 2,
        })
        .unwrap();
        let gadget: GadgetParams = GadgetParams::new(8, 3, 26).unwrap();
        let mut source: Source = Source::new([6u8; 32]);
        for rank in [1usize, 2] {
            let sk: RlweSecret = RlweSecret::generate(&ring, rank, Distribution::Ternary, &mut source).unwrap();
            for gal_el in [5usize, 127] {
                let mut key: GadgetMatrix<Vec<u64>> =
                    GadgetMatrix::alloc(rank * 3, rank + 1, ring.channels(), ring.n());
                encrypt_automorphism_key(&ring, &sk, &gadget, gal_el, 3.2, &mut source, &mut key).unwrap();

                let message: Vec<i64> = (0..64).map(|i| (i * 7 % 13 - 6) << 38).collect();
                let mut m: Poly<u64> = ring.new_poly();
                ring.set_signed(&mut m, &message).unwrap();
                let mut ct: RlweCiphertext = sk.encrypt(&ring, &m, 3.2, &mut source).unwrap();
                let perm: AutoPerm = AutoPerm::new(ring.n(), gal_el).unwrap();
                let mut scratch: AutomorphismScratch = AutomorphismScratch::new(&ring, rank, &gadget);
                apply_automorphism(&ring, &perm, &key, &mut ct, &mut scratch).unwrap();

                let mut want: Poly<u64> = ring.new_poly();
                ring.automorphism(&m, gal_el, &mut want).unwrap();
                let want: Vec<i64> = ring.to_signed(&want).unwrap();
                let got: Vec<i64> = ring.to_signed(&sk.decrypt(&ring, &ct).unwrap()).unwrap();
                for (w, g) in want.iter().zip(got.iter()) {
                    assert!((w - g).abs() < 1 << 34, "{} vs {}", w, g);
                }
            }
        }
    }
}
