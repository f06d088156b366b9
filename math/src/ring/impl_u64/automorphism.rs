use crate::automorphism::AutoPerm;
use crate::error::{Error, Result};
use crate::poly::Poly;
use crate::ring::Ring;

impl Ring {
    /// out = a(X^gal_el) for odd gal_el, in coefficient domain.
    pub fn automorphism(&self, a: &Poly<u64>, gal_el: usize, out: &mut Poly<u64>) -> Result<()> {
        let perm: AutoPerm = AutoPerm::new(self.n(), gal_el)?;
        self.automorphism_with(&perm, a, out)
    }

    /// Same as [Ring::automorphism] with a precomputed permutation.
    pub fn automorphism_with(&self, perm: &AutoPerm, a: &Poly<u64>, out: &mut Poly<u64>) -> Result<()> {
        self.check_shape(a)?;
        self.check_shape(out)?;
        if perm.index.len() != self.n() {
            return Err(Error::ParameterMismatch(format!(
                "permutation of degree {} used with a ring of degree {}",
                perm.index.len(),
                self.n()
            )));
        }
        if a.is_ntt() {
            return Err(Error::DomainError(
                "automorphisms are applied in coefficient domain".into(),
            ));
        }
        for c in 0..self.channels() {
            perm.apply(self.basis().prime(c).q, a.at(c), out.at_mut(c));
        }
        out.set_flags(false, a.is_montgomery());
        Ok(())
    }
}
