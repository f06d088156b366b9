use crate::crt::CrtBasis;
use crate::dft::ntt::Table;
use crate::gadget::{GadgetParams, MAX_DIGITS};
use crate::kernel::{decompose_range, Kernel};
use crate::modulus::montgomery::MontgomeryPrecomp;
use crate::modulus::{ReduceOnce, ONCE};
use itertools::izip;

/// Portable reference backend: every butterfly fully reduced.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScalarKernel;

impl Kernel for ScalarKernel {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn ntt(&self, table: &Table<u64>, a: &mut [u64]) {
        let n: usize = a.len();
        debug_assert_eq!(n, table.n);
        let q: u64 = table.q;
        let montgomery: &MontgomeryPrecomp<u64> = &table.prime.montgomery;
        let mut t: usize = n;
        let mut m: usize = 1;
        while m < n {
            t >>= 1;
            izip!(a.chunks_exact_mut(2 * t), &table.psi_forward_rev[m..2 * m]).for_each(
                |(a, psi)| {
                    let (lo, hi) = a.split_at_mut(t);
                    izip!(lo, hi).for_each(|(x, y)| {
                        let u: u64 = *x;
                        let v: u64 = montgomery.mul_external::<ONCE>(*psi, *y);
                        *x = (u + v).reduce_once(q);
                        *y = (u + q - v).reduce_once(q);
                    });
                },
            );
            m <<= 1;
        }
    }

    fn intt(&self, table: &Table<u64>, a: &mut [u64]) {
        let n: usize = a.len();
        debug_assert_eq!(n, table.n);
        let q: u64 = table.q;
        let montgomery: &MontgomeryPrecomp<u64> = &table.prime.montgomery;
        let mut t: usize = 1;
        let mut m: usize = n;
        while m > 1 {
            let h: usize = m >> 1;
            izip!(a.chunks_exact_mut(2 * t), &table.psi_backward_rev[h..m]).for_each(
                |(a, psi)| {
                    let (lo, hi) = a.split_at_mut(t);
                    izip!(lo, hi).for_each(|(x, y)| {
                        let u: u64 = *x;
                        let v: u64 = *y;
                        *x = (u + v).reduce_once(q);
                        *y = montgomery.mul_external::<ONCE>(*psi, u + q - v);
                    });
                },
            );
            t <<= 1;
            m = h;
        }
        a.iter_mut()
            .for_each(|x| *x = montgomery.mul_external::<ONCE>(table.n_inv, *x));
    }

    fn mul_mont(&self, montgomery: &MontgomeryPrecomp<u64>, a: &[u64], b: &[u64], c: &mut [u64]) {
        izip!(a, b, c).for_each(|(a, b, c)| *c = montgomery.mul_external::<ONCE>(*a, *b));
    }

    fn mul_mont_add(
        &self,
        montgomery: &MontgomeryPrecomp<u64>,
        a: &[u64],
        b: &[u64],
        c: &mut [u64],
    ) {
        let q: u64 = montgomery.q;
        izip!(a, b, c).for_each(|(a, b, c)| {
            *c = (*c + montgomery.mul_external::<ONCE>(*a, *b)).reduce_once(q)
        });
    }

    fn decompose(
        &self,
        gadget: &GadgetParams,
        basis: &CrtBasis,
        n: usize,
        src: &[u64],
        dst: &mut [u64],
    ) {
        let mut column: Vec<u64> = vec![0; basis.channels()];
        let mut digits: [i64; MAX_DIGITS] = [0; MAX_DIGITS];
        decompose_range(gadget, basis, n, src, dst, 0..n, &mut column, &mut digits);
    }
}
