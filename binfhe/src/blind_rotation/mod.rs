//! Blind rotation: homomorphic evaluation of X^(sum a_i s_i) on an RLWE
//! accumulator, with GINX and LMKCDEY key layouts.

pub mod ginx;
pub mod key;
pub mod lmkcdey;
pub mod test_vector;

pub use key::BlindRotationKey;
pub use lmkcdey::LmkcdeyTables;

use crate::params::{BlindRotationMethod, Params};
use crate::rlwe::automorphism_key::AutomorphismScratch;
use crate::rlwe::ciphertext::RlweCiphertext;
use crate::rlwe::external_product::ExternalProductScratch;
use math::error::{Error, Result};
use math::ring::Ring;

/// round(x * 2N / q) mod 2N.
#[inline(always)]
pub fn switch_to_2n(x: u64, q: u64, n: usize) -> usize {
    let two_n: u128 = 2 * n as u128;
    let q: u128 = q as u128;
    (((x as u128 * two_n + q / 2) / q) % two_n) as usize
}

/// 2 * floor(x * N / q) + 1, an odd residue in [1, 2N).
#[inline(always)]
pub fn switch_to_odd(x: u64, q: u64, n: usize) -> usize {
    let floor: u128 = (x as u128 % q as u128) * n as u128 / q as u128;
    2 * floor as usize + 1
}

/// Reusable buffers of one blind rotation.
#[derive(Clone, Debug)]
pub struct BlindRotationScratch {
    pub(crate) product: ExternalProductScratch,
    pub(crate) tmp: RlweCiphertext,
    pub(crate) tmp_minus: RlweCiphertext,
    pub(crate) automorphism: AutomorphismScratch,
    pub(crate) plus: Vec<Vec<usize>>,
    pub(crate) minus: Vec<Vec<usize>>,
}

impl BlindRotationScratch {
    pub fn new(ring: &Ring, params: &Params) -> Self {
        let br = &params.blind_rotation;
        let buckets: usize = match br.method {
            BlindRotationMethod::Ginx => 0,
            BlindRotationMethod::Lmkcdey => ring.n() / 2,
        };
        Self {
            product: ExternalProductScratch::new(ring, br.rank, &br.gadget),
            tmp: RlweCiphertext::new(ring, br.rank),
            tmp_minus: RlweCiphertext::new(ring, br.rank),
            automorphism: AutomorphismScratch::new(ring, br.rank, &br.gadget),
            plus: vec![Vec::new(); buckets],
            minus: vec![Vec::new(); buckets],
        }
    }
}

/// Rotates `acc` by X^(sum rotations[i] * s_i). `rotations` are already
/// switched to Z_2N (odd residues for LMKCDEY).
pub fn blind_rotate(
    ring: &Ring,
    key: &BlindRotationKey,
    tables: Option<&LmkcdeyTables>,
    rotations: &[usize],
    acc: &mut RlweCiphertext,
    scratch: &mut BlindRotationScratch,
) -> Result<()> {
    if rotations.len() != key.n_lwe() {
        return Err(Error::ParameterMismatch(format!(
            "{} rotations for a key of dimension {}",
            rotations.len(),
            key.n_lwe()
        )));
    }
    match key.method() {
        BlindRotationMethod::Ginx => ginx::blind_rotate(ring, key, rotations, acc, scratch),
        BlindRotationMethod::Lmkcdey => {
            let tables: &LmkcdeyTables = tables.ok_or_else(|| {
                Error::ParameterMismatch("LMKCDEY rotation without automorphism tables".into())
            })?;
            lmkcdey::blind_rotate(ring, key, tables, rotations, acc, scratch)
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{blind_rotate, switch_to_2n, switch_to_odd, BlindRotationKey, BlindRotationScratch, LmkcdeyTables};
    use crate::lwe::secret::LweSecret;
    use crate::params::{BlindRotationMethod, Params, SecretKind};
    use crate::rlwe::ciphertext::RlweCiphertext;
    use crate::rlwe::secret::RlweSecret;
    use crate::blind_rotation::lmkcdey::GENERATOR;
    use crate::blind_rotation::test_vector::sign_test_vector;
    use math::poly::Poly;
    use math::ring::{Ring, RingParams};
    use sampling::distributions::Distribution;
    use sampling::source::Source;

    pub(crate) fn small_params(method: BlindRotationMethod, secret: SecretKind) -> Params {
        let mut params: Params = Params::test().with_method(method).with_secret(secret);
        params.lwe.n = 16;
        params.ring = RingParams {
            degree: 64,
            prime_bits: 25,
            channels: 2,
        };
        params.blind_rotation.window = 3;
        params
    }

    #[test]
    fn modulus_switches_round_as_documented() {
        assert_eq!(switch_to_2n(0, 1 << 14, 1024), 0);
        assert_eq!(switch_to_2n(4, 1 << 14, 1024), 1);
        assert_eq!(switch_to_2n(3, 1 << 14, 1024), 0);
        assert_eq!(switch_to_2n((1 << 14) - 3, 1 << 14, 1024), 0);
        assert_eq!(switch_to_odd(0, 1 << 14, 1024), 1);
        assert_eq!(switch_to_odd((1 << 14) - 1, 1 << 14, 1024), 2047);
        for x in 0..(1u64 << 10) {
            assert_eq!(switch_to_odd(x, 1 << 10, 64) % 2, 1);
        }
    }

    fn check_rotation(method: BlindRotationMethod, secret: SecretKind) {
        let params: Params = small_params(method, secret);
        let ring: Ring = Ring::from_params(&params.ring).unwrap();
        let mut source: Source = Source::new([11u8; 32]);
        let lwe: LweSecret = LweSecret::generate(params.lwe.n, secret, &mut source);
        let rlwe: RlweSecret = RlweSecret::generate(&ring, 1, Distribution::Ternary, &mut source).unwrap();
        let key: BlindRotationKey = BlindRotationKey::generate(&ring, &lwe, &rlwe, &params, &mut source).unwrap();
        let tables: LmkcdeyTables = LmkcdeyTables::new(ring.n(), params.blind_rotation.window).unwrap();
        let mut scratch: BlindRotationScratch = BlindRotationScratch::new(&ring, &params);
        let tv: Poly<u64> = sign_test_vector(&ring).unwrap();
        let two_n: i64 = 2 * ring.n() as i64;

        for _ in 0..4 {
            let rotations: Vec<usize> = (0..params.lwe.n)
                .map(|_| match method {
                    BlindRotationMethod::Ginx => source.next_u64n(two_n as u64, two_n as u64 - 1) as usize,
                    BlindRotationMethod::Lmkcdey => 2 * source.next_u64n(64, 63) as usize + 1,
                })
                .collect();
            // LMKCDEY expects the accumulator pre-twisted by psi_{-g}.
            let mut init: Poly<u64> = tv.clone();
            if method == BlindRotationMethod::Lmkcdey {
                ring.automorphism(&tv, two_n as usize - GENERATOR, &mut init).unwrap();
            }
            let mut acc: RlweCiphertext = RlweCiphertext::trivial(&ring, 1, &init);
            blind_rotate(&ring, &key, Some(&tables), &rotations, &mut acc, &mut scratch).unwrap();

            let e: i64 = rotations
                .iter()
                .zip(lwe.coeffs())
                .map(|(a, s)| *a as i64 * s)
                .sum::<i64>()
                .rem_euclid(two_n);
            let mut want: Poly<u64> = ring.new_poly();
            ring.mul_monomial(&tv, e as usize, &mut want).unwrap();
            let want: Vec<i64> = ring.to_signed(&want).unwrap();
            let got: Vec<i64> = ring.to_signed(&rlwe.decrypt(&ring, &acc).unwrap()).unwrap();
            for (w, g) in want.iter().zip(got.iter()) {
                assert!((w - g).abs() < 1 << 40, "{:?}/{:?}: {} vs {}", method, secret, w, g);
            }
        }
    }

    #[test]
    fn ginx_binary_rotates_by_the_inner_product() {
        check_rotation(BlindRotationMethod::Ginx, SecretKind::Binary);
    }

    #[test]
    fn ginx_ternary_rotates_by_the_inner_product() {
        check_rotation(BlindRotationMethod::Ginx, SecretKind::Ternary);
    }

    #[test]
    fn lmkcdey_rotates_by_the_inner_product() {
        check_rotation(BlindRotationMethod::Lmkcdey, SecretKind::Ternary);
        check_rotation(BlindRotationMethod::Lmkcdey, SecretKind::Binary);
    }

    #[test]
    fn wrong_rotation_count_is_rejected() {
        let params: Params = small_params(BlindRotationMethod::Ginx, SecretKind::Binary);
        let ring: Ring = Ring::from_params(&params.ring).unwrap();
        let mut source: Source = Source::new([12u8; 32]);
        let lwe: LweSecret = LweSecret::generate(params.lwe.n, SecretKind::Binary, &mut source);
        let rlwe: RlweSecret = RlweSecret::generate(&ring, 1, Distribution::Ternary, &mut source).unwrap();
        let key: BlindRotationKey = BlindRotationKey::generate(&ring, &lwe, &rlwe, &params, &mut source).unwrap();
        let mut scratch: BlindRotationScratch = BlindRotationScratch::new(&ring, &params);
        let mut acc: RlweCiphertext = RlweCiphertext::new(&ring, 1);
        assert!(blind_rotate(&ring, &key, None, &[0; 3], &mut acc, &mut scratch).is_err());
    }
}
