use crate::error::{Error, Result};
use crate::gadget::GadgetParams;
use crate::poly::Poly;
use crate::ring::Ring;

impl Ring {
    /// Gadget-decomposes a coefficient-domain polynomial into `gadget.digits`
    /// polynomials, digit i first. Digits are balanced, see [crate::kernel::Kernel::decompose].
    pub fn decompose(&self, a: &Poly<u64>, gadget: &GadgetParams) -> Result<Vec<Poly<u64>>> {
        self.check_shape(a)?;
        if a.is_ntt() || a.is_montgomery() {
            return Err(Error::DomainError(
                "decomposition needs coefficient domain, plain form".into(),
            ));
        }
        let mut dst: Vec<u64> = vec![0; gadget.digits * self.poly_size()];
        self.decompose_raw(a.raw(), gadget, &mut dst);
        Ok(dst
            .chunks_exact(self.poly_size())
            .map(|d| Poly::from_raw(self.n(), self.channels(), d.to_vec(), false, false))
            .collect())
    }

    /// Same as [Ring::decompose] on raw channel-major buffers; `dst` holds
    /// `gadget.digits` whole polynomials.
    #[inline]
    pub fn decompose_raw(&self, a: &[u64], gadget: &GadgetParams, dst: &mut [u64]) {
        debug_assert_eq!(a.len(), self.poly_size());
        debug_assert!(dst.len() >= gadget.digits * self.poly_size());
        self.kernel()
            .decompose(gadget, self.basis(), self.n(), a, dst)
    }
}
