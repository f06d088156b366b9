use crate::crt::CrtBasis;
use crate::dft::ntt::Table;
use crate::gadget::{GadgetParams, MAX_DIGITS};
use crate::kernel::{decompose_range, Kernel};
use crate::modulus::montgomery::MontgomeryPrecomp;
use crate::modulus::{ReduceOnce, NONE, ONCE};
use crate::CHUNK;
use itertools::izip;

/// Harvey-style backend: butterflies keep values in [0, 4q) (forward) or
/// [0, 2q) (inverse) and reduce only at the end; inner loops are unrolled by
/// [CHUNK] so they map onto wide vector units.
#[derive(Clone, Copy, Debug, Default)]
pub struct LazyKernel;

impl LazyKernel {
    #[inline(always)]
    fn dit(montgomery: &MontgomeryPrecomp<u64>, two_q: u64, psi: u64, x: &mut u64, y: &mut u64) {
        let u: u64 = (*x).reduce_once(two_q);
        let v: u64 = montgomery.mul_external::<NONE>(psi, *y);
        *x = u + v;
        *y = u + two_q - v;
    }

    #[inline(always)]
    fn dif(montgomery: &MontgomeryPrecomp<u64>, two_q: u64, psi: u64, x: &mut u64, y: &mut u64) {
        let u: u64 = *x;
        let v: u64 = *y;
        *x = (u + v).reduce_once(two_q);
        *y = montgomery.mul_external::<NONE>(psi, u + two_q - v);
    }
}

impl Kernel for LazyKernel {
    fn name(&self) -> &'static str {
        "lazy"
    }

    fn ntt(&self, table: &Table<u64>, a: &mut [u64]) {
        let n: usize = a.len();
        debug_assert_eq!(n, table.n);
        let (q, two_q) = (table.q, table.two_q);
        let montgomery: &MontgomeryPrecomp<u64> = &table.prime.montgomery;
        let mut t: usize = n;
        let mut m: usize = 1;
        while m < n {
            t >>= 1;
            izip!(a.chunks_exact_mut(2 * t), &table.psi_forward_rev[m..2 * m]).for_each(
                |(a, psi)| {
                    let (lo, hi) = a.split_at_mut(t);
                    if t >= CHUNK {
                        izip!(lo.chunks_exact_mut(CHUNK), hi.chunks_exact_mut(CHUNK)).for_each(
                            |(x, y)| {
                                Self::dit(montgomery, two_q, *psi, &mut x[0], &mut y[0]);
                                Self::dit(montgomery, two_q, *psi, &mut x[1], &mut y[1]);
                                Self::dit(montgomery, two_q, *psi, &mut x[2], &mut y[2]);
                                Self::dit(montgomery, two_q, *psi, &mut x[3], &mut y[3]);
                                Self::dit(montgomery, two_q, *psi, &mut x[4], &mut y[4]);
                                Self::dit(montgomery, two_q, *psi, &mut x[5], &mut y[5]);
                                Self::dit(montgomery, two_q, *psi, &mut x[6], &mut y[6]);
                                Self::dit(montgomery, two_q, *psi, &mut x[7], &mut y[7]);
                            },
                        );
                    } else {
                        izip!(lo, hi).for_each(|(x, y)| Self::dit(montgomery, two_q, *psi, x, y));
                    }
                },
            );
            m <<= 1;
        }
        a.iter_mut().for_each(|x| {
            x.reduce_once_assign(two_q);
            x.reduce_once_assign(q);
        });
    }

    fn intt(&self, table: &Table<u64>, a: &mut [u64]) {
        let n: usize = a.len();
        debug_assert_eq!(n, table.n);
        let two_q: u64 = table.two_q;
        let montgomery: &MontgomeryPrecomp<u64> = &table.prime.montgomery;
        let mut t: usize = 1;
        let mut m: usize = n;
        while m > 1 {
            let h: usize = m >> 1;
            izip!(a.chunks_exact_mut(2 * t), &table.psi_backward_rev[h..m]).for_each(
                |(a, psi)| {
                    let (lo, hi) = a.split_at_mut(t);
                    if t >= CHUNK {
                        izip!(lo.chunks_exact_mut(CHUNK), hi.chunks_exact_mut(CHUNK)).for_each(
                            |(x, y)| {
                                Self::dif(montgomery, two_q, *psi, &mut x[0], &mut y[0]);
                                Self::dif(montgomery, two_q, *psi, &mut x[1], &mut y[1]);
                                Self::dif(montgomery, two_q, *psi, &mut x[2], &mut y[2]);
                                Self::dif(montgomery, two_q, *psi, &mut x[3], &mut y[3]);
                                Self::dif(montgomery, two_q, *psi, &mut x[4], &mut y[4]);
                                Self::dif(montgomery, two_q, *psi, &mut x[5], &mut y[5]);
                                Self::dif(montgomery, two_q, *psi, &mut x[6], &mut y[6]);
                                Self::dif(montgomery, two_q, *psi, &mut x[7], &mut y[7]);
                            },
                        );
                    } else {
                        izip!(lo, hi).for_each(|(x, y)| Self::dif(montgomery, two_q, *psi, x, y));
                    }
                },
            );
            t <<= 1;
            m = h;
        }
        a.chunks_mut(CHUNK).for_each(|x| {
            x.iter_mut()
                .for_each(|x| *x = montgomery.mul_external::<ONCE>(table.n_inv, *x))
        });
    }

    fn mul_mont(&self, montgomery: &MontgomeryPrecomp<u64>, a: &[u64], b: &[u64], c: &mut [u64]) {
        izip!(a.chunks(CHUNK), b.chunks(CHUNK), c.chunks_mut(CHUNK)).for_each(|(a, b, c)| {
            izip!(a, b, c).for_each(|(a, b, c)| *c = montgomery.mul_external::<ONCE>(*a, *b))
        });
    }

    fn mul_mont_add(
        &self,
        montgomery: &MontgomeryPrecomp<u64>,
        a: &[u64],
        b: &[u64],
        c: &mut [u64],
    ) {
        let q: u64 = montgomery.q;
        izip!(a.chunks(CHUNK), b.chunks(CHUNK), c.chunks_mut(CHUNK)).for_each(|(a, b, c)| {
            izip!(a, b, c).for_each(|(a, b, c)| {
                // lazy product in [0, 2q) plus c in [0, q) stays below 3q
                let s: u64 = *c + montgomery.mul_external::<NONE>(*a, *b);
                *c = s.reduce_once(montgomery.two_q).reduce_once(q);
            })
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
        let mut start: usize = 0;
        while start < n {
            let end: usize = (start + CHUNK).min(n);
            decompose_range(gadget, basis, n, src, dst, start..end, &mut column, &mut digits);
            start = end;
        }
    }
}
