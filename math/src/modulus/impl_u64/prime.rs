use crate::error::{Error, Result};
use crate::modulus::barrett::BarrettPrecomp;
use crate::modulus::montgomery::{Montgomery, MontgomeryPrecomp};
use crate::modulus::prime::{Modulus, Prime};
use crate::modulus::{check_modulus, ModularArith, ReduceOnce, ONCE};
use primality_test::is_prime;
use prime_factorization::Factorization;

impl Modulus<u64> {
    /// Returns the precomputed arithmetic for an odd modulus 3 <= q < 2^62.
    pub fn new(q: u64) -> Result<Self> {
        check_modulus(q)?;
        Ok(Self {
            q,
            montgomery: MontgomeryPrecomp::new(q),
            barrett: BarrettPrecomp::new(q),
        })
    }

    /// Returns x^exponent mod q.
    pub fn pow(&self, x: u64, exponent: u64) -> u64 {
        let x_mont: Montgomery<u64> = self.montgomery.prepare::<ONCE>(x);
        self.montgomery
            .unprepare::<ONCE>(self.montgomery.pow(x_mont, exponent))
    }
}

impl ModularArith for Modulus<u64> {
    #[inline(always)]
    fn q(&self) -> u64 {
        self.q
    }

    #[inline(always)]
    fn to_montgomery(&self, x: u64) -> u64 {
        self.montgomery.prepare::<ONCE>(x)
    }

    #[inline(always)]
    fn from_montgomery(&self, x: u64) -> u64 {
        self.montgomery.unprepare::<ONCE>(x)
    }

    #[inline(always)]
    fn mul_montgomery(&self, a: u64, b: u64) -> u64 {
        debug_assert!(a < self.q, "mul_montgomery: {} >= q = {}", a, self.q);
        self.montgomery.mul_external::<ONCE>(a, b)
    }

    #[inline(always)]
    fn mul_barrett(&self, a: u64, b: u64) -> u64 {
        self.barrett.mul(a, b)
    }

    #[inline(always)]
    fn add(&self, a: u64, b: u64) -> u64 {
        (a + b).reduce_once(self.q)
    }

    #[inline(always)]
    fn sub(&self, a: u64, b: u64) -> u64 {
        (a + self.q - b).reduce_once(self.q)
    }

    #[inline(always)]
    fn neg(&self, a: u64) -> u64 {
        (self.q - a).reduce_once(self.q)
    }

    #[inline(always)]
    fn center(&self, a: u64) -> i64 {
        if a > self.q >> 1 {
            a as i64 - self.q as i64
        } else {
            a as i64
        }
    }

    #[inline(always)]
    fn from_signed(&self, a: i64) -> u64 {
        a.rem_euclid(self.q as i64) as u64
    }
}

impl Prime<u64> {
    /// Returns a new instance of Prime<u64>, failing with
    /// [Error::RangeError] if q is not a prime in [3, 2^62).
    pub fn new(q: u64) -> Result<Self> {
        check_modulus(q)?;
        if !is_prime(q) {
            return Err(Error::RangeError(format!("{} is not prime", q)));
        }
        Self::new_unchecked(q)
    }

    /// Returns a new instance of Prime<u64> without the primality check.
    pub fn new_unchecked(q: u64) -> Result<Self> {
        let factors: Vec<u64> = Factorization::run(q - 1)
            .prime_factor_repr()
            .iter()
            .map(|factor| factor.0)
            .collect();
        Ok(Self {
            modulus: Modulus::new(q)?,
            phi: q - 1,
            factors,
        })
    }

    /// Returns x^-1 mod q. User must ensure that x is not divisible by q.
    #[inline(always)]
    pub fn inv(&self, x: u64) -> u64 {
        self.pow(x, self.phi - 1)
    }

    /// Returns the smallest generator of the multiplicative group.
    pub fn primitive_root(&self) -> u64 {
        let mut candidate: u64 = 1;
        loop {
            candidate += 1;
            if self
                .factors
                .iter()
                .all(|&factor| self.pow(candidate, self.phi / factor) != 1)
            {
                return candidate;
            }
        }
    }

    /// Returns a primitive nth_root-th root of unity mod q.
    pub fn primitive_nth_root(&self, nth_root: u64) -> Result<u64> {
        if nth_root == 0 || self.phi % nth_root != 0 {
            return Err(Error::ParameterMismatch(format!(
                "q = {} is not 1 mod {}",
                self.q, nth_root
            )));
        }
        let psi: u64 = self.pow(self.primitive_root(), self.phi / nth_root);
        debug_assert!(self.pow(psi, nth_root) == 1);
        debug_assert!(nth_root & 1 == 1 || self.pow(psi, nth_root >> 1) == self.q - 1);
        Ok(psi)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::modulus::prime::{Modulus, Prime};
    use crate::modulus::ModularArith;
    use sampling::source::Source;

    #[test]
    fn montgomery_round_trip() {
        let mut source: Source = Source::new([0u8; 32]);
        for q in [3u64, 12289, 18433, 65537, 0x1fffffffffe00001, (1 << 61) - 1] {
            let modulus: Modulus<u64> = Modulus::new(q).unwrap();
            for _ in 0..2000 {
                let x: u64 = source.next_mod(q);
                assert_eq!(modulus.from_montgomery(modulus.to_montgomery(x)), x);
            }
            assert_eq!(modulus.from_montgomery(modulus.to_montgomery(q - 1)), q - 1);
            assert_eq!(modulus.from_montgomery(modulus.to_montgomery(0)), 0);
        }
    }

    #[test]
    fn montgomery_and_barrett_products_agree() {
        let mut source: Source = Source::new([1u8; 32]);
        let q: u64 = 0x1fffffffffe00001;
        let modulus: Modulus<u64> = Modulus::new(q).unwrap();
        for _ in 0..2000 {
            let a: u64 = source.next_mod(q);
            let b: u64 = source.next_mod(q);
            let expected: u64 = ((a as u128 * b as u128) % q as u128) as u64;
            assert_eq!(modulus.mul_barrett(a, b), expected);
            let a_mont: u64 = modulus.to_montgomery(a);
            assert_eq!(modulus.mul_montgomery(a_mont, b), expected);
        }
    }

    #[test]
    fn centered_results_are_in_half_open_range() {
        let q: u64 = 12289;
        let modulus: Modulus<u64> = Modulus::new(q).unwrap();
        let half: i64 = (q / 2) as i64;
        for a in (0..q).step_by(97) {
            for b in (0..q).step_by(89) {
                let s: i64 = modulus.add_centered(a, b);
                let d: i64 = modulus.sub_centered(a, b);
                assert!(-half <= s && s <= half);
                assert!(-half <= d && d <= half);
                assert_eq!(modulus.from_signed(s), (a + b) % q);
                assert_eq!(modulus.from_signed(d), (a + q - b) % q);
            }
        }
    }

    #[test]
    fn rejects_unsupported_moduli() {
        assert!(matches!(Modulus::new(1 << 20), Err(Error::RangeError(_))));
        assert!(matches!(Modulus::new((1 << 62) + 1), Err(Error::RangeError(_))));
        assert!(matches!(Prime::new(12287 * 3), Err(Error::RangeError(_))));
    }

    #[test]
    fn primitive_roots_have_the_right_order() {
        let prime: Prime<u64> = Prime::new(12289).unwrap();
        let psi: u64 = prime.primitive_nth_root(2048).unwrap();
        assert_eq!(prime.pow(psi, 2048), 1);
        assert_eq!(prime.pow(psi, 1024), 12288);
        assert_eq!(prime.inv(psi) * psi % 12289, 1);
        assert!(prime.primitive_nth_root(8192).is_err());
    }
}
