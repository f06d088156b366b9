use crate::lwe::ciphertext::LweCiphertext;
use crate::lwe::encryption::encode_bit;
use crate::lwe::secret::LweSecret;
use crate::params::LweParams;
use math::error::{Error, Result};
use sampling::source::Source;

/// Regev-style public key: `rows` LWE encryptions of zero.
/// Encryption sums a uniformly random subset of the rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    pub(crate) rows: Vec<LweCiphertext>,
    pub(crate) n: usize,
    pub(crate) q: u64,
}

impl PublicKey {
    pub fn generate(secret: &LweSecret, lwe: &LweParams, rows: usize, source: &mut Source) -> Self {
        let rows: Vec<LweCiphertext> = (0..rows)
            .map(|_| secret.encrypt_phase(0, lwe.q, lwe.sigma, source))
            .collect();
        tracing::debug!(rows = rows.len(), n = secret.n(), "public key generated");
        Self {
            rows,
            n: secret.n(),
            q: lwe.q,
        }
    }

    pub(crate) fn from_rows(rows: Vec<LweCiphertext>, n: usize, q: u64) -> Result<Self> {
        if let Some(row) = rows.iter().find(|r| r.n() != n || r.q() != q) {
            return Err(Error::ParameterMismatch(format!(
                "public key row (n={}, q={}) in a key of (n={}, q={})",
                row.n(),
                row.q(),
                n,
                q
            )));
        }
        Ok(Self { rows, n, q })
    }

    #[inline(always)]
    pub fn n(&self) -> usize {
        self.n
    }

    #[inline(always)]
    pub fn q(&self) -> u64 {
        self.q
    }

    pub fn rows(&self) -> &[LweCiphertext] {
        &self.rows
    }

    pub fn encrypt_phase(&self, phase: u64, source: &mut Source) -> LweCiphertext {
        let mut ct: LweCiphertext = LweCiphertext::trivial(phase, self.n, self.q);
        for row in self.rows.iter() {
            if source.next_bit() {
                // Rows share (n, q) by construction.
                let _ = ct.add_assign(row);
            }
        }
        ct
    }

    pub fn encrypt_bit(&self, bit: bool, source: &mut Source) -> LweCiphertext {
        self.encrypt_phase(encode_bit(bit, self.q), source)
    }
}
