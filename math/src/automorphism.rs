use crate::error::{Error, Result};
use crate::modulus::WordOps;
use utils::map::Map;

/// Cache of coefficient permutations keyed by Galois element.
#[derive(Clone, Debug, Default)]
pub struct AutoPermMap(Map<usize, AutoPerm>);

impl AutoPermMap {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn insert(&mut self, perm: AutoPerm) {
        self.0.insert(perm.gal_el, perm);
    }

    /// Builds and caches the permutation of X -> X^gal_el for degree n.
    pub fn generate(&mut self, n: usize, gal_el: usize) -> Result<&AutoPerm> {
        let gal_el: usize = gal_el & (2 * n - 1);
        if self.0.get(&gal_el).is_none() {
            self.insert(AutoPerm::new(n, gal_el)?);
        }
        self.0
            .get(&gal_el)
            .ok_or_else(|| Error::ParameterMismatch(format!("no permutation for {}", gal_el)))
    }

    pub fn get(&self, gal_el: &usize) -> Option<&AutoPerm> {
        self.0.get(gal_el)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Coefficient-domain permutation of X -> X^gal_el in Z[X]/(X^N + 1):
/// input coefficient i lands at `index[i]`, negated when `negate[i]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutoPerm {
    pub gal_el: usize,
    pub index: Vec<usize>,
    pub negate: Vec<bool>,
}

impl AutoPerm {
    /// `gal_el` is taken mod 2N and must be odd.
    pub fn new(n: usize, gal_el: usize) -> Result<Self> {
        if !n.is_power_of_two() || n < 2 {
            return Err(Error::ParameterMismatch(format!(
                "degree {} is not a power of two",
                n
            )));
        }
        let mask: usize = 2 * n - 1;
        let gal_el: usize = gal_el & mask;
        if gal_el & 1 == 0 {
            return Err(Error::ParameterMismatch(format!(
                "Galois element {} is not invertible modulo {}",
                gal_el,
                2 * n
            )));
        }
        let log_n: usize = n.log2();
        let mut index: Vec<usize> = Vec::with_capacity(n);
        let mut negate: Vec<bool> = Vec::with_capacity(n);
        for i in 0..n {
            let j: usize = (i * gal_el) & mask;
            index.push(j & (n - 1));
            negate.push((j >> log_n) & 1 == 1);
        }
        Ok(Self {
            gal_el,
            index,
            negate,
        })
    }

    /// Applies the permutation to one channel of residues modulo q.
    #[inline]
    pub fn apply(&self, q: u64, a: &[u64], b: &mut [u64]) {
        for (i, x) in a.iter().enumerate() {
            b[self.index[i]] = if self.negate[i] && *x != 0 { q - *x } else { *x };
        }
    }
}
