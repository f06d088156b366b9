use math::error::{Error, Result};
use math::modulus::ReduceOnce;

/// (a, b) mod q with phase b - <a, s>.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LweCiphertext {
    pub(crate) a: Vec<u64>,
    pub(crate) b: u64,
    pub(crate) q: u64,
}

impl LweCiphertext {
    /// The zero ciphertext of dimension n.
    pub fn new(n: usize, q: u64) -> Self {
        Self {
            a: vec![0; n],
            b: 0,
            q,
        }
    }

    /// Noiseless encryption of phase `b`, valid under any secret.
    pub fn trivial(b: u64, n: usize, q: u64) -> Self {
        Self {
            a: vec![0; n],
            b: b % q,
            q,
        }
    }

    /// Wraps raw coefficients, rejecting unreduced values.
    pub fn from_parts(a: Vec<u64>, b: u64, q: u64) -> Result<Self> {
        if let Some(x) = a.iter().chain(std::iter::once(&b)).find(|x| **x >= q) {
            return Err(Error::RangeError(format!("{} is not reduced modulo {}", x, q)));
        }
        Ok(Self { a, b, q })
    }

    #[inline(always)]
    pub fn n(&self) -> usize {
        self.a.len()
    }

    #[inline(always)]
    pub fn q(&self) -> u64 {
        self.q
    }

    #[inline(always)]
    pub fn a(&self) -> &[u64] {
        &self.a
    }

    #[inline(always)]
    pub fn b(&self) -> u64 {
        self.b
    }

    pub(crate) fn check_compatible(&self, other: &LweCiphertext) -> Result<()> {
        if self.n() != other.n() || self.q != other.q {
            return Err(Error::ParameterMismatch(format!(
                "LWE ciphertexts (n={}, q={}) and (n={}, q={}) do not combine",
                self.n(),
                self.q,
                other.n(),
                other.q
            )));
        }
        Ok(())
    }

    pub fn add_assign(&mut self, other: &LweCiphertext) -> Result<()> {
        self.check_compatible(other)?;
        let q: u64 = self.q;
        self.a
            .iter_mut()
            .zip(other.a.iter())
            .for_each(|(x, y)| *x = (*x + y).reduce_once(q));
        self.b = (self.b + other.b).reduce_once(q);
        Ok(())
    }

    pub fn sub_assign(&mut self, other: &LweCiphertext) -> Result<()> {
        self.check_compatible(other)?;
        let q: u64 = self.q;
        self.a
            .iter_mut()
            .zip(other.a.iter())
            .for_each(|(x, y)| *x = (*x + q - y).reduce_once(q));
        self.b = (self.b + q - other.b).reduce_once(q);
        Ok(())
    }

    pub fn neg_assign(&mut self) {
        let q: u64 = self.q;
        self.a.iter_mut().for_each(|x| *x = (q - *x).reduce_once(q));
        self.b = (q - self.b).reduce_once(q);
    }

    pub fn mul_scalar_assign(&mut self, s: i64) {
        let q: u64 = self.q;
        let s: u64 = s.rem_euclid(q as i64) as u64;
        let mul = |x: u64| ((x as u128 * s as u128) % q as u128) as u64;
        self.a.iter_mut().for_each(|x| *x = mul(*x));
        self.b = mul(self.b);
    }

    /// Adds a signed constant to the phase.
    pub fn add_constant(&mut self, c: i64) {
        let q: u64 = self.q;
        self.b = (self.b + c.rem_euclid(q as i64) as u64).reduce_once(q);
    }

    /// Returns round(x * q' / q) mod q' for every coefficient.
    pub fn mod_switch(&self, q_out: u64) -> LweCiphertext {
        let q: u64 = self.q;
        let switch = |x: u64| -> u64 {
            let y: u128 = (x as u128 * q_out as u128 + (q as u128 >> 1)) / q as u128;
            (y % q_out as u128) as u64
        };
        LweCiphertext {
            a: self.a.iter().map(|x| switch(*x)).collect(),
            b: switch(self.b),
            q: q_out,
        }
    }
}
