use crate::error::Result;
use crate::modulus::montgomery::Montgomery;
use crate::modulus::prime::Prime;
use crate::modulus::WordOps;
use crate::modulus::ONCE;

/// Twiddle tables of the negacyclic NTT of size n over one prime.
///
/// `psi_forward_rev[i] = psi^bitrev(i)` and `psi_backward_rev[i] = psi^-bitrev(i)`,
/// where psi is a primitive 2n-th root of unity, both in Montgomery form so
/// that a butterfly multiplication maps plain inputs to plain outputs.
#[derive(Clone, Debug)]
pub struct Table<O> {
    pub prime: Prime<O>,
    pub n: usize,
    pub psi: O,
    pub psi_forward_rev: Vec<Montgomery<O>>,
    pub psi_backward_rev: Vec<Montgomery<O>>,
    /// n^-1 in Montgomery form.
    pub n_inv: Montgomery<O>,
    pub q: O,
    pub two_q: O,
    pub four_q: O,
}

impl Table<u64> {
    /// Fails with [crate::error::Error::ParameterMismatch] if q != 1 mod 2n.
    pub fn new(prime: Prime<u64>, n: usize) -> Result<Table<u64>> {
        debug_assert!(n.is_power_of_two(), "invalid argument: n = {} is not a power of two", n);

        let psi: u64 = prime.primitive_nth_root((n as u64) << 1)?;

        let montgomery = prime.montgomery;
        let psi_mont: Montgomery<u64> = montgomery.prepare::<ONCE>(psi);
        let psi_inv_mont: Montgomery<u64> = montgomery.prepare::<ONCE>(prime.inv(psi));

        let mut psi_forward_rev: Vec<Montgomery<u64>> = vec![0; n];
        let mut psi_backward_rev: Vec<Montgomery<u64>> = vec![0; n];

        let log_n: u32 = n.log2() as u32;

        let mut powers_forward: Montgomery<u64> = montgomery.one();
        let mut powers_backward: Montgomery<u64> = montgomery.one();

        for i in 0..n {
            let i_rev: usize = i.reverse_bits_msb(log_n);
            psi_forward_rev[i_rev] = powers_forward;
            psi_backward_rev[i_rev] = powers_backward;
            montgomery.mul_internal_assign::<ONCE>(psi_mont, &mut powers_forward);
            montgomery.mul_internal_assign::<ONCE>(psi_inv_mont, &mut powers_backward);
        }

        let n_inv: Montgomery<u64> = montgomery.prepare::<ONCE>(prime.inv(n as u64 % prime.q));
        let q: u64 = prime.q;

        Ok(Self {
            prime,
            n,
            psi,
            psi_forward_rev,
            psi_backward_rev,
            n_inv,
            q,
            two_q: q << 1,
            four_q: q << 2,
        })
    }
}
