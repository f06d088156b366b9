use crate::params::SecretKind;
use math::error::{Error, Result};
use sampling::distributions::Distribution;
use sampling::source::Source;

/// LWE secret with small signed coordinates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LweSecret {
    pub(crate) data: Vec<i64>,
    pub(crate) kind: SecretKind,
}

impl LweSecret {
    pub fn generate(n: usize, kind: SecretKind, source: &mut Source) -> Self {
        let dist: Distribution = match kind {
            SecretKind::Binary => Distribution::Binary,
            SecretKind::Ternary => Distribution::Ternary,
        };
        let mut data: Vec<i64> = vec![0; n];
        dist.fill(source, &mut data);
        Self { data, kind }
    }

    pub fn from_coeffs(data: Vec<i64>, kind: SecretKind) -> Result<Self> {
        let bad = |x: &i64| match kind {
            SecretKind::Binary => !(0..=1).contains(x),
            SecretKind::Ternary => !(-1..=1).contains(x),
        };
        if let Some(x) = data.iter().find(|x| bad(x)) {
            return Err(Error::RangeError(format!(
                "coordinate {} is outside the {:?} support",
                x, kind
            )));
        }
        Ok(Self { data, kind })
    }

    #[inline(always)]
    pub fn n(&self) -> usize {
        self.data.len()
    }

    #[inline(always)]
    pub fn kind(&self) -> SecretKind {
        self.kind
    }

    #[inline(always)]
    pub fn coeffs(&self) -> &[i64] {
        &self.data
    }
}

/// Returns <a, s> mod q for a small signed secret.
#[inline]
pub(crate) fn inner_product(a: &[u64], s: &[i64], q: u64) -> u64 {
    debug_assert_eq!(a.len(), s.len());
    let sum: i128 = a
        .iter()
        .zip(s.iter())
        .map(|(a, s)| *a as i128 * *s as i128)
        .sum();
    sum.rem_euclid(q as i128) as u64
}

#[cfg(test)]
mod tests {
    use super::{inner_product, LweSecret};
    use crate::params::SecretKind;
    use sampling::source::Source;

    #[test]
    fn generated_secrets_follow_their_kind() {
        let mut source: Source = Source::new([0u8; 32]);
        let s: LweSecret = LweSecret::generate(512, SecretKind::Ternary, &mut source);
        assert!(s.coeffs().iter().any(|x| *x == -1));
        let s: LweSecret = LweSecret::generate(512, SecretKind::Binary, &mut source);
        assert!(s.coeffs().iter().all(|x| *x == 0 || *x == 1));
        assert!(LweSecret::from_coeffs(vec![0, -1], SecretKind::Binary).is_err());
    }

    #[test]
    fn inner_product_handles_negative_coordinates() {
        assert_eq!(inner_product(&[3, 5, 7], &[1, -1, 0], 16), 14);
    }
}
