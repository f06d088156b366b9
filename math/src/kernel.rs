pub mod lazy;
pub mod scalar;

use crate::crt::CrtBasis;
use crate::dft::ntt::Table;
use crate::gadget::GadgetParams;
use crate::modulus::montgomery::MontgomeryPrecomp;
use std::sync::Arc;

pub use lazy::LazyKernel;
pub use scalar::ScalarKernel;

/// Environment variable forcing a kernel by name (`scalar` or `lazy`).
pub const KERNEL_ENV: &str = "FHE_KERNEL";

/// The inner loops every ring operation bottoms out in.
///
/// Backends are interchangeable: each must return canonical residues and
/// agree bit for bit with [ScalarKernel] on every input.
pub trait Kernel: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// In-place forward negacyclic NTT of one channel, canonical in and out.
    fn ntt(&self, table: &Table<u64>, a: &mut [u64]);

    /// In-place inverse negacyclic NTT of one channel, canonical in and out.
    fn intt(&self, table: &Table<u64>, a: &mut [u64]);

    /// c[i] = a[i] * b[i] * 2^-64 mod q.
    fn mul_mont(&self, montgomery: &MontgomeryPrecomp<u64>, a: &[u64], b: &[u64], c: &mut [u64]);

    /// c[i] = c[i] + a[i] * b[i] * 2^-64 mod q.
    fn mul_mont_add(
        &self,
        montgomery: &MontgomeryPrecomp<u64>,
        a: &[u64],
        b: &[u64],
        c: &mut [u64],
    );

    /// Gadget-decomposes a channel-major polynomial `src` (channels x n) into
    /// `dst` (digits x channels x n), each digit stored as a canonical residue.
    /// Digits are balanced: all but the last lie in [-B/2, B/2) and a negative
    /// d is stored as q_c - |d| in channel c.
    fn decompose(
        &self,
        gadget: &GadgetParams,
        basis: &CrtBasis,
        n: usize,
        src: &[u64],
        dst: &mut [u64],
    );
}

/// Picks the backend once, from [KERNEL_ENV] or CPU capabilities.
pub fn select() -> Arc<dyn Kernel> {
    match std::env::var(KERNEL_ENV).as_deref() {
        Ok("scalar") => return Arc::new(ScalarKernel),
        Ok("lazy") => return Arc::new(LazyKernel),
        Ok(other) => tracing::warn!("ignoring unknown {}={}", KERNEL_ENV, other),
        Err(_) => {}
    }
    if has_wide_vectors() {
        tracing::debug!("selected lazy kernel");
        Arc::new(LazyKernel)
    } else {
        tracing::debug!("no wide vector unit detected, falling back to scalar kernel");
        Arc::new(ScalarKernel)
    }
}

#[cfg(target_arch = "x86_64")]
fn has_wide_vectors() -> bool {
    std::arch::is_x86_feature_detected!("avx2")
}

#[cfg(target_arch = "aarch64")]
fn has_wide_vectors() -> bool {
    std::arch::is_aarch64_feature_detected!("neon")
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
fn has_wide_vectors() -> bool {
    false
}

/// Shared gather/scatter loop of the decomposition; `coeffs` selects the
/// coefficient indices handled in this call.
#[inline(always)]
pub(crate) fn decompose_range(
    gadget: &GadgetParams,
    basis: &CrtBasis,
    n: usize,
    src: &[u64],
    dst: &mut [u64],
    coeffs: std::ops::Range<usize>,
    column: &mut [u64],
    digits: &mut [i64],
) {
    let channels: usize = basis.channels();
    for j in coeffs {
        for (c, r) in column.iter_mut().enumerate() {
            *r = src[c * n + j];
        }
        gadget.decompose_column(basis, column, digits);
        for (i, d) in digits[..gadget.digits].iter().enumerate() {
            for (c, prime) in basis.primes().iter().enumerate() {
                dst[(i * channels + c) * n + j] = crate::gadget::lift_digit(*d, prime.q);
            }
        }
    }
}
