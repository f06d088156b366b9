use crate::error::Result;
use crate::modulus::ModularArith;
use crate::poly::Poly;
use crate::ring::Ring;
use sampling::distributions::Distribution;
use sampling::source::Source;

impl Ring {
    /// Fills `a` with a uniform element of Z_Q[X]/(X^N + 1). Residues are
    /// drawn independently per channel, which is uniform mod Q by the CRT.
    pub fn sample_uniform(&self, source: &mut Source, a: &mut Poly<u64>) -> Result<()> {
        self.check_shape(a)?;
        for c in 0..self.channels() {
            let q: u64 = self.basis().prime(c).q;
            a.at_mut(c).iter_mut().for_each(|x| *x = source.next_mod(q));
        }
        Ok(())
    }

    /// Fills `a` with small coefficients from `dist` and returns them.
    pub fn sample_distribution(
        &self,
        source: &mut Source,
        dist: Distribution,
        a: &mut Poly<u64>,
    ) -> Result<Vec<i64>> {
        self.check_shape(a)?;
        let mut coeffs: Vec<i64> = vec![0; self.n()];
        dist.fill(source, &mut coeffs);
        for c in 0..self.channels() {
            let prime = self.basis().prime(c);
            a.at_mut(c)
                .iter_mut()
                .zip(coeffs.iter())
                .for_each(|(x, v)| *x = prime.from_signed(*v));
        }
        a.set_flags(false, false);
        Ok(coeffs)
    }

    pub fn sample_ternary(&self, source: &mut Source, a: &mut Poly<u64>) -> Result<Vec<i64>> {
        self.sample_distribution(source, Distribution::Ternary, a)
    }

    pub fn sample_binary(&self, source: &mut Source, a: &mut Poly<u64>) -> Result<Vec<i64>> {
        self.sample_distribution(source, Distribution::Binary, a)
    }

    pub fn sample_discrete_gaussian(
        &self,
        source: &mut Source,
        sigma: f64,
        a: &mut Poly<u64>,
    ) -> Result<Vec<i64>> {
        self.sample_distribution(source, Distribution::Gaussian { sigma }, a)
    }
}
