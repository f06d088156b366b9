use rand_chacha::ChaCha8Rng;
use rand_core::{RngCore, SeedableRng};

const MAXF64: f64 = 9007199254740992.0;

/// Deterministic ChaCha8 stream. Every secret-dependent sample in the
/// workspace goes through a [Source], seeded either explicitly (tests,
/// reproducible key generation) or from the operating system via [new_seed].
pub struct Source {
    source: ChaCha8Rng,
}

/// Returns 32 bytes drawn from the thread-local CSPRNG, itself seeded by the OS.
pub fn new_seed() -> [u8; 32] {
    let mut seed = [0u8; 32];
    rand::rng().fill_bytes(&mut seed);
    seed
}

impl Source {
    pub fn new(seed: [u8; 32]) -> Source {
        Source {
            source: ChaCha8Rng::from_seed(seed),
        }
    }

    /// Returns a source seeded from the operating system.
    pub fn from_entropy() -> Source {
        Source::new(new_seed())
    }

    pub fn new_seed(&mut self) -> [u8; 32] {
        let mut seed: [u8; 32] = [0u8; 32];
        self.source.fill_bytes(&mut seed);
        seed
    }

    /// Splits off an independent child stream.
    pub fn branch(&mut self) -> Self {
        Source::new(self.new_seed())
    }

    /// Uniform in [0, max) by rejection on `mask`-truncated words.
    /// `mask` must be at least `max.next_power_of_two() - 1`.
    #[inline(always)]
    pub fn next_u64n(&mut self, max: u64, mask: u64) -> u64 {
        let mut x: u64 = self.next_u64() & mask;
        while x >= max {
            x = self.next_u64() & mask;
        }
        x
    }

    /// Uniform in [0, q).
    #[inline(always)]
    pub fn next_mod(&mut self, q: u64) -> u64 {
        debug_assert!(q > 0);
        let mask: u64 = if q.is_power_of_two() {
            q - 1
        } else {
            q.next_power_of_two() - 1
        };
        self.next_u64n(q, mask)
    }

    #[inline(always)]
    pub fn next_f64(&mut self, min: f64, max: f64) -> f64 {
        min + ((self.next_u64() << 11 >> 11) as f64) / MAXF64 * (max - min)
    }

    #[inline(always)]
    pub fn next_bit(&mut self) -> bool {
        self.next_u32() & 1 == 1
    }
}

impl RngCore for Source {
    #[inline(always)]
    fn next_u32(&mut self) -> u32 {
        self.source.next_u32()
    }

    #[inline(always)]
    fn next_u64(&mut self) -> u64 {
        self.source.next_u64()
    }

    #[inline(always)]
    fn fill_bytes(&mut self, bytes: &mut [u8]) {
        self.source.fill_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::Source;

    #[test]
    fn same_seed_same_stream() {
        let mut a: Source = Source::new([7u8; 32]);
        let mut b: Source = Source::new([7u8; 32]);
        for _ in 0..64 {
            assert_eq!(a.next_mod(12289), b.next_mod(12289));
        }
    }

    #[test]
    fn next_mod_stays_in_range() {
        let mut source: Source = Source::new([0u8; 32]);
        for q in [2u64, 3, 12289, 1 << 14, (1 << 61) - 1] {
            for _ in 0..256 {
                assert!(source.next_mod(q) < q);
            }
        }
    }

    #[test]
    fn branches_diverge() {
        let mut source: Source = Source::new([0u8; 32]);
        let mut left: Source = source.branch();
        let mut right: Source = source.branch();
        let l: Vec<u64> = (0..8).map(|_| left.next_mod(1 << 40)).collect();
        let r: Vec<u64> = (0..8).map(|_| right.next_mod(1 << 40)).collect();
        assert_ne!(l, r);
    }
}
