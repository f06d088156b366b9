use math::error::Result;
use math::poly::Poly;
use math::ring::Ring;

/// Sign test polynomial: every coefficient Q/8.
///
/// After multiplication by X^-p, the constant coefficient is +Q/8 for
/// p in [0, N) and -Q/8 for p in [N, 2N).
pub fn sign_test_vector(ring: &Ring) -> Result<Poly<u64>> {
    from_fn(ring, |_| ring.q() / 8)
}

/// Test polynomial with coefficient j set to f(j) mod Q.
pub fn from_fn<F: Fn(usize) -> u64>(ring: &Ring, f: F) -> Result<Poly<u64>> {
    let n: usize = ring.n();
    let mut poly: Poly<u64> = ring.new_poly();
    let mut residues: Vec<u64> = vec![0; ring.channels()];
    let mut channels: Vec<Vec<u64>> = vec![vec![0; n]; ring.channels()];
    for j in 0..n {
        ring.basis().decompose(f(j), &mut residues);
        for (channel, r) in channels.iter_mut().zip(residues.iter()) {
            channel[j] = *r;
        }
    }
    for (c, channel) in channels.iter().enumerate() {
        ring.set_channel(&mut poly, c, channel)?;
    }
    poly.set_flags(false, false);
    Ok(poly)
}
