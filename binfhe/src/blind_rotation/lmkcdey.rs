use crate::blind_rotation::key::BlindRotationKey;
use crate::blind_rotation::BlindRotationScratch;
use crate::rgsw::GadgetMatrix;
use crate::rlwe::automorphism_key::apply_automorphism;
use crate::rlwe::ciphertext::RlweCiphertext;
use crate::rlwe::external_product::external_product;
use math::automorphism::{AutoPerm, AutoPermMap};
use math::error::{Error, Result};
use math::ring::Ring;
use utils::map::Map;

/// Generator of the cyclic part of Z_2N^*.
pub const GENERATOR: usize = 5;

/// Galois elements with an automorphism key, in key order:
/// g^1, .., g^window, then -g, all mod 2N.
pub fn galois_elements(n: usize, window: usize) -> Vec<usize> {
    let two_n: usize = 2 * n;
    let mut elements: Vec<usize> = Vec::with_capacity(window + 1);
    let mut g: usize = 1;
    for _ in 0..window {
        g = g * GENERATOR % two_n;
        elements.push(g);
    }
    elements.push(two_n - GENERATOR);
    elements
}

/// Discrete logarithm over the odd residues of Z_2N:
/// g^k maps to (k, false) and -g^k to (k, true), k in [0, N/2).
#[derive(Clone, Debug)]
pub struct DiscreteLog(Map<usize, (usize, bool)>);

impl DiscreteLog {
    pub fn new(n: usize) -> Self {
        let two_n: usize = 2 * n;
        let mut map: Map<usize, (usize, bool)> = Map::with_capacity(n);
        let mut power: usize = 1;
        for k in 0..(n / 2).max(1) {
            map.insert(power, (k, false));
            map.insert(two_n - power, (k, true));
            power = power * GENERATOR % two_n;
        }
        Self(map)
    }

    pub fn get(&self, a: usize) -> Option<(usize, bool)> {
        self.0.get(&a).copied()
    }
}

/// Lookup tables an LMKCDEY rotation needs besides the keys.
#[derive(Clone, Debug)]
pub struct LmkcdeyTables {
    dlog: DiscreteLog,
    perms: AutoPermMap,
    elements: Vec<usize>,
    window: usize,
}

impl LmkcdeyTables {
    pub fn new(n: usize, window: usize) -> Result<Self> {
        let elements: Vec<usize> = galois_elements(n, window);
        let mut perms: AutoPermMap = AutoPermMap::new();
        for gal_el in elements.iter() {
            perms.generate(n, *gal_el)?;
        }
        Ok(Self {
            dlog: DiscreteLog::new(n),
            perms,
            elements,
            window,
        })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn dlog(&self) -> &DiscreteLog {
        &self.dlog
    }

    /// Permutation and key index of g^power (1 <= power <= window), or of -g
    /// when `power` is None.
    fn automorphism(&self, power: Option<usize>) -> Result<(&AutoPerm, usize)> {
        let j: usize = match power {
            Some(p) if p >= 1 && p <= self.window => p - 1,
            Some(p) => {
                return Err(Error::ParameterMismatch(format!(
                    "no automorphism key for g^{}",
                    p
                )))
            }
            None => self.window,
        };
        let perm: &AutoPerm = self
            .perms
            .get(&self.elements[j])
            .ok_or_else(|| Error::ParameterMismatch(format!("no permutation for {}", self.elements[j])))?;
        Ok((perm, j))
    }
}

fn automorphism(
    ring: &Ring,
    key: &BlindRotationKey,
    tables: &LmkcdeyTables,
    power: Option<usize>,
    acc: &mut RlweCiphertext,
    scratch: &mut BlindRotationScratch,
) -> Result<()> {
    let (perm, j) = tables.automorphism(power)?;
    let auto_key: GadgetMatrix<&[u64]> = key.automorphism_key(j)?;
    apply_automorphism(ring, perm, &auto_key, acc, &mut scratch.automorphism)
}

fn multiply(
    ring: &Ring,
    key: &BlindRotationKey,
    bucket: &[usize],
    acc: &mut RlweCiphertext,
    scratch: &mut BlindRotationScratch,
) -> Result<()> {
    for i in bucket {
        external_product(ring, acc, &key.brk.matrix(*i), &mut scratch.product, &mut scratch.tmp)?;
        std::mem::swap(acc, &mut scratch.tmp);
    }
    Ok(())
}

/// Walks k from N/2 - 1 down to 1, multiplying in the keys of every
/// coordinate with a_i = +-g^k and applying psi_g between steps. Pending
/// psi_g are merged into one psi_{g^w} with w <= window. The negative
/// half ends with psi_{-g}; the initial accumulator must already carry the
/// matching psi_{-g}.
pub(crate) fn blind_rotate(
    ring: &Ring,
    key: &BlindRotationKey,
    tables: &LmkcdeyTables,
    rotations: &[usize],
    acc: &mut RlweCiphertext,
    scratch: &mut BlindRotationScratch,
) -> Result<()> {
    let half: usize = ring.n() / 2;
    if scratch.plus.len() != half || scratch.minus.len() != half {
        return Err(Error::ParameterMismatch(
            "scratch buckets do not match the ring degree".into(),
        ));
    }
    scratch.plus.iter_mut().for_each(|b| b.clear());
    scratch.minus.iter_mut().for_each(|b| b.clear());
    for (i, a) in rotations.iter().enumerate() {
        let (k, negative) = tables.dlog.get(*a).ok_or_else(|| {
            Error::RangeError(format!("rotation {} is not an odd residue mod 2N", a))
        })?;
        if negative {
            scratch.minus[k].push(i);
        } else {
            scratch.plus[k].push(i);
        }
    }

    for negative in [true, false] {
        let mut pending: usize = 0;
        for k in (1..half).rev() {
            let bucket: Vec<usize> = if negative {
                std::mem::take(&mut scratch.minus[k])
            } else {
                std::mem::take(&mut scratch.plus[k])
            };
            if !bucket.is_empty() {
                if pending > 0 {
                    automorphism(ring, key, tables, Some(pending), acc, scratch)?;
                    pending = 0;
                }
                multiply(ring, key, &bucket, acc, scratch)?;
            }
            restore(scratch, negative, k, bucket);
            pending += 1;
            if pending == tables.window || k == 1 {
                automorphism(ring, key, tables, Some(pending), acc, scratch)?;
                pending = 0;
            }
        }
        let bucket: Vec<usize> = if negative {
            std::mem::take(&mut scratch.minus[0])
        } else {
            std::mem::take(&mut scratch.plus[0])
        };
        multiply(ring, key, &bucket, acc, scratch)?;
        restore(scratch, negative, 0, bucket);
        if negative {
            automorphism(ring, key, tables, None, acc, scratch)?;
        }
    }
    Ok(())
}

fn restore(scratch: &mut BlindRotationScratch, negative: bool, k: usize, bucket: Vec<usize>) {
    if negative {
        scratch.minus[k] = bucket;
    } else {
        scratch.plus[k] = bucket;
    }
}

#[cfg(test)]
mod tests {
    use super::{galois_elements, DiscreteLog};

    #[test]
    fn every_odd_residue_has_one_logarithm() {
        for n in [16usize, 64, 1024] {
            let dlog: DiscreteLog = DiscreteLog::new(n);
            for a in (1..2 * n).step_by(2) {
                let (k, negative) = dlog.get(a).unwrap();
                let mut p: usize = 1;
                for _ in 0..k {
                    p = p * 5 % (2 * n);
                }
                let want: usize = if negative { 2 * n - p } else { p };
                assert_eq!(want, a);
            }
            assert!(dlog.get(2).is_none());
        }
    }

    #[test]
    fn galois_elements_end_with_minus_g() {
        assert_eq!(galois_elements(16, 3), vec![5, 25, 29, 27]);
    }
}
