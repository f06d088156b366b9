use crate::lwe::ciphertext::LweCiphertext;
use crate::lwe::secret::{inner_product, LweSecret};
use math::error::{Error, Result};
use sampling::distributions::Distribution;
use sampling::source::Source;

/// Phase of bit m: m * q/4.
#[inline(always)]
pub fn encode_bit(bit: bool, q: u64) -> u64 {
    (bit as u64) * (q >> 2)
}

/// Returns round(phase * t / q) mod t.
#[inline(always)]
pub fn decode(phase: u64, t: u64, q: u64) -> u64 {
    let x: u128 = (phase as u128 * t as u128 + (q as u128 >> 1)) / q as u128;
    (x % t as u128) as u64
}

impl LweSecret {
    /// Encrypts an arbitrary phase with fresh Gaussian noise.
    pub fn encrypt_phase(&self, phase: u64, q: u64, sigma: f64, source: &mut Source) -> LweCiphertext {
        let a: Vec<u64> = (0..self.n()).map(|_| source.next_mod(q)).collect();
        let e: i64 = Distribution::Gaussian { sigma }.sample(source);
        let mut b: u64 = (inner_product(&a, &self.data, q) + phase % q) % q;
        b = ((b as i128 + e as i128).rem_euclid(q as i128)) as u64;
        LweCiphertext { a, b, q }
    }

    pub fn encrypt_bit(&self, bit: bool, q: u64, sigma: f64, source: &mut Source) -> LweCiphertext {
        self.encrypt_phase(encode_bit(bit, q), q, sigma, source)
    }

    /// Encrypts m in Z_t as m * q / t.
    pub fn encrypt_message(
        &self,
        m: u64,
        t: u64,
        q: u64,
        sigma: f64,
        source: &mut Source,
    ) -> Result<LweCiphertext> {
        if t == 0 || t > q || m >= t {
            return Err(Error::RangeError(format!(
                "message {} does not fit a plaintext space of {} under q = {}",
                m, t, q
            )));
        }
        let phase: u64 = ((m as u128 * q as u128) / t as u128) as u64;
        Ok(self.encrypt_phase(phase, q, sigma, source))
    }

    /// Returns b - <a, s> mod q.
    pub fn phase(&self, ct: &LweCiphertext) -> Result<u64> {
        if ct.n() != self.n() {
            return Err(Error::ParameterMismatch(format!(
                "ciphertext of dimension {} under a secret of dimension {}",
                ct.n(),
                self.n()
            )));
        }
        let q: u64 = ct.q;
        Ok((ct.b + q - inner_product(&ct.a, &self.data, q)) % q)
    }

    /// A bit decodes to one when its phase rounds to q/4.
    pub fn decrypt_bit(&self, ct: &LweCiphertext) -> Result<bool> {
        Ok(decode(self.phase(ct)?, 4, ct.q) == 1)
    }

    pub fn decrypt_message(&self, ct: &LweCiphertext, t: u64) -> Result<u64> {
        Ok(decode(self.phase(ct)?, t, ct.q))
    }
}
