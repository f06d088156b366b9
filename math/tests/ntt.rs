use math::kernel::{Kernel, LazyKernel, ScalarKernel};
use math::poly::Poly;
use math::ring::{Ring, RingParams};
use sampling::source::Source;
use std::sync::Arc;

fn ring(kernel: Arc<dyn Kernel>) -> Ring {
    let params: RingParams = RingParams {
        degree: 256,
        prime_bits: 25,
        channels: 2,
    };
    let primes = params.primes().unwrap();
    Ring::from_primes(params.degree, primes, kernel).unwrap()
}

fn schoolbook(a: &[i64], b: &[i64], q: i64) -> Vec<i64> {
    let n: usize = a.len();
    let mut c: Vec<i128> = vec![0; n];
    for i in 0..n {
        for j in 0..n {
            let p: i128 = a[i] as i128 * b[j] as i128;
            if i + j < n {
                c[i + j] += p;
            } else {
                c[i + j - n] -= p;
            }
        }
    }
    c.iter()
        .map(|x| {
            let r: i64 = x.rem_euclid(q as i128) as i64;
            if r > q / 2 {
                r - q
            } else {
                r
            }
        })
        .collect()
}

#[test]
fn round_trip_is_identity() {
    let ring: Ring = ring(Arc::new(ScalarKernel));
    let mut source: Source = Source::new([9u8; 32]);
    let mut a: Poly<u64> = ring.new_poly();
    ring.sample_uniform(&mut source, &mut a).unwrap();
    let want: Poly<u64> = a.clone();
    ring.ntt(&mut a).unwrap();
    assert_ne!(a.raw(), want.raw());
    ring.intt(&mut a).unwrap();
    assert_eq!(a, want);
}

#[test]
fn kernels_agree_bit_for_bit() {
    let scalar: Ring = ring(Arc::new(ScalarKernel));
    let lazy: Ring = scalar.with_kernel(Arc::new(LazyKernel));
    let mut source: Source = Source::new([11u8; 32]);
    for _ in 0..8 {
        let mut a: Poly<u64> = scalar.new_poly();
        scalar.sample_uniform(&mut source, &mut a).unwrap();
        let mut b: Poly<u64> = a.clone();
        scalar.ntt(&mut a).unwrap();
        lazy.ntt(&mut b).unwrap();
        assert_eq!(a, b);

        let mut c: Poly<u64> = scalar.new_poly();
        scalar.sample_uniform(&mut source, &mut c).unwrap();
        scalar.ntt(&mut c).unwrap();
        scalar.to_montgomery(&mut c).unwrap();
        let mut acc_scalar: Poly<u64> = scalar.new_poly();
        acc_scalar.set_flags(true, false);
        let mut acc_lazy: Poly<u64> = acc_scalar.clone();
        scalar.multiply_accumulate_external(&c, &a, &mut acc_scalar).unwrap();
        lazy.multiply_accumulate_external(&c, &b, &mut acc_lazy).unwrap();
        assert_eq!(acc_scalar, acc_lazy);

        scalar.intt(&mut a).unwrap();
        lazy.intt(&mut b).unwrap();
        assert_eq!(a, b);

        let gadget = math::gadget::GadgetParams::new(8, 3, 26).unwrap();
        assert_eq!(
            scalar.decompose(&a, &gadget).unwrap(),
            lazy.decompose(&b, &gadget).unwrap()
        );
    }
}

#[test]
fn products_match_schoolbook() {
    for kernel in [Arc::new(ScalarKernel) as Arc<dyn Kernel>, Arc::new(LazyKernel)] {
        let ring: Ring = ring(kernel);
        let mut source: Source = Source::new([5u8; 32]);
        let n: usize = ring.n();
        let a_coeffs: Vec<i64> = (0..n).map(|_| source.next_mod(2001) as i64 - 1000).collect();
        let b_coeffs: Vec<i64> = (0..n).map(|_| source.next_mod(2001) as i64 - 1000).collect();
        let mut a: Poly<u64> = ring.new_poly();
        let mut b: Poly<u64> = ring.new_poly();
        ring.set_signed(&mut a, &a_coeffs).unwrap();
        ring.set_signed(&mut b, &b_coeffs).unwrap();
        ring.ntt(&mut a).unwrap();
        ring.ntt(&mut b).unwrap();
        ring.to_montgomery(&mut a).unwrap();
        ring.to_montgomery(&mut b).unwrap();
        let mut c: Poly<u64> = ring.new_poly();
        ring.multiply(&a, &b, &mut c).unwrap();
        ring.from_montgomery(&mut c).unwrap();
        ring.intt(&mut c).unwrap();
        assert_eq!(
            ring.to_signed(&c).unwrap(),
            schoolbook(&a_coeffs, &b_coeffs, ring.q() as i64)
        );
    }
}
