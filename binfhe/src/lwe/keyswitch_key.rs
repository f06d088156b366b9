use crate::lwe::secret::{inner_product, LweSecret};
use math::error::{Error, Result};
use math::gadget::GadgetParams;
use math::modulus::prime::Modulus;
use sampling::distributions::Distribution;
use sampling::source::Source;

/// Gadget encryptions LWE_{s_out}(s_in[j] * g_i) mod Q, stored flat:
/// entry (j, i) occupies `n_out + 1` words, `a` then `b`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LweKeySwitchKey {
    pub(crate) data: Vec<u64>,
    pub(crate) n_in: usize,
    pub(crate) n_out: usize,
    pub(crate) gadget: GadgetParams,
    pub(crate) q: u64,
}

impl LweKeySwitchKey {
    pub fn generate(
        from: &[i64],
        to: &LweSecret,
        gadget: &GadgetParams,
        modulus: &Modulus<u64>,
        sigma: f64,
        source: &mut Source,
    ) -> Result<Self> {
        let q: u64 = modulus.q;
        let n_out: usize = to.n();
        let stride: usize = n_out + 1;
        let weights: Vec<u64> = (0..gadget.digits).map(|i| gadget.weight(i, modulus)).collect();
        let noise: Distribution = Distribution::Gaussian { sigma };
        let mut data: Vec<u64> = vec![0; from.len() * gadget.digits * stride];
        for (entry, chunk) in data.chunks_exact_mut(stride).enumerate() {
            let (j, i) = (entry / gadget.digits, entry % gadget.digits);
            let (a, b) = chunk.split_at_mut(n_out);
            a.iter_mut().for_each(|x| *x = source.next_mod(q));
            let message: i128 = from[j] as i128 * weights[i] as i128;
            let e: i64 = noise.sample(source);
            b[0] = (inner_product(a, to.coeffs(), q) as i128 + message + e as i128)
                .rem_euclid(q as i128) as u64;
        }
        tracing::debug!(n_in = from.len(), n_out, digits = gadget.digits, "key-switching key generated");
        Ok(Self {
            data,
            n_in: from.len(),
            n_out,
            gadget: *gadget,
            q,
        })
    }

    /// Wraps words read back from storage.
    pub fn from_words(
        data: Vec<u64>,
        n_in: usize,
        n_out: usize,
        gadget: GadgetParams,
        q: u64,
    ) -> Result<Self> {
        if data.len() != n_in * gadget.digits * (n_out + 1) {
            return Err(Error::ParameterMismatch(format!(
                "{} words given for a {}x{}x{} key-switching key",
                data.len(),
                n_in,
                gadget.digits,
                n_out + 1
            )));
        }
        Ok(Self {
            data,
            n_in,
            n_out,
            gadget,
            q,
        })
    }

    #[inline(always)]
    pub fn n_in(&self) -> usize {
        self.n_in
    }

    #[inline(always)]
    pub fn n_out(&self) -> usize {
        self.n_out
    }

    #[inline(always)]
    pub fn q(&self) -> u64 {
        self.q
    }

    pub fn gadget(&self) -> &GadgetParams {
        &self.gadget
    }

    pub fn words(&self) -> &[u64] {
        &self.data
    }

    /// Entry (j, i) as (a, b).
    #[inline(always)]
    pub(crate) fn entry(&self, j: usize, i: usize) -> (&[u64], u64) {
        let stride: usize = self.n_out + 1;
        let start: usize = (j * self.gadget.digits + i) * stride;
        let chunk: &[u64] = &self.data[start..start + stride];
        (&chunk[..self.n_out], chunk[self.n_out])
    }
}
