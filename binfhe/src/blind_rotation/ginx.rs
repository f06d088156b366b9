use crate::blind_rotation::key::BlindRotationKey;
use crate::blind_rotation::BlindRotationScratch;
use crate::params::SecretKind;
use crate::rlwe::ciphertext::RlweCiphertext;
use itertools::izip;
use math::error::Result;
use math::ring::Ring;

/// ACC <- ACC + (X^a_i - 1) * (ACC x BK_i) for every coordinate; ternary
/// secrets add the (X^-a_i - 1) * (ACC x BK_i^-) term from the same
/// decomposition. No coordinate is skipped, so the work does not depend on
/// the rotation amounts.
pub(crate) fn blind_rotate(
    ring: &Ring,
    key: &BlindRotationKey,
    rotations: &[usize],
    acc: &mut RlweCiphertext,
    scratch: &mut BlindRotationScratch,
) -> Result<()> {
    let two_n: usize = 2 * ring.n();
    for (i, a) in rotations.iter().enumerate() {
        scratch.product.decompose(ring, acc, 0)?;
        match key.secret {
            SecretKind::Binary => {
                scratch.product.apply(ring, &key.brk.matrix(i), 0, &mut scratch.tmp)?;
                for (dst, src) in acc.polys.iter_mut().zip(scratch.tmp.polys.iter()) {
                    ring.add_rotated_difference(src, *a, dst)?;
                }
            }
            SecretKind::Ternary => {
                scratch.product.apply(ring, &key.brk.matrix(2 * i), 0, &mut scratch.tmp)?;
                scratch.product.apply(ring, &key.brk.matrix(2 * i + 1), 0, &mut scratch.tmp_minus)?;
                let minus_a: usize = (two_n - a % two_n) % two_n;
                for (dst, plus, minus) in izip!(
                    acc.polys.iter_mut(),
                    scratch.tmp.polys.iter(),
                    scratch.tmp_minus.polys.iter()
                ) {
                    ring.add_rotated_difference(plus, *a, dst)?;
                    ring.add_rotated_difference(minus, minus_a, dst)?;
                }
            }
        }
    }
    Ok(())
}
