use crate::error::{Error, Result};
use crate::modulus::prime::{NTTFriendlyPrimesGenerator, Prime};
use crate::modulus::MAX_MODULUS;
use primality_test::is_prime;

impl NTTFriendlyPrimesGenerator {
    /// Primes of the form 1 + k * nth_root around 2^bit_size.
    /// `nth_root` must be a power of two not larger than 2^bit_size.
    pub fn new(bit_size: u32, nth_root: u64) -> Self {
        debug_assert!(nth_root.is_power_of_two());
        let next_prime: u64 = (1u64 << bit_size) + 1;
        Self {
            size: bit_size,
            nth_root,
            next_prime,
            prev_prime: next_prime.saturating_sub(nth_root),
            check_next_prime: next_prime < MAX_MODULUS,
            check_prev_prime: next_prime > nth_root,
        }
    }

    /// Returns the next prime above 2^bit_size, failing once the progression
    /// leaves the bit size or the supported range.
    pub fn next_upstream_prime(&mut self) -> Result<Prime<u64>> {
        while self.check_next_prime {
            let candidate: u64 = self.next_prime;
            if candidate >= MAX_MODULUS || candidate >> (self.size + 1) != 0 {
                self.check_next_prime = false;
                break;
            }
            self.next_prime += self.nth_root;
            if is_prime(candidate) {
                return Prime::new_unchecked(candidate);
            }
        }
        Err(Error::RangeError(format!(
            "no more {}-bit primes equal to 1 mod {} above 2^{}",
            self.size + 1,
            self.nth_root,
            self.size
        )))
    }

    /// Returns the next prime below 2^bit_size, failing once the progression
    /// drops below 2^(bit_size-1).
    pub fn next_downstream_prime(&mut self) -> Result<Prime<u64>> {
        while self.check_prev_prime {
            let candidate: u64 = self.prev_prime;
            if candidate < self.nth_root || candidate >> (self.size - 1) == 0 {
                self.check_prev_prime = false;
                break;
            }
            self.prev_prime -= self.nth_root;
            if is_prime(candidate) {
                return Prime::new_unchecked(candidate);
            }
        }
        Err(Error::RangeError(format!(
            "no more {}-bit primes equal to 1 mod {} below 2^{}",
            self.size, self.nth_root, self.size
        )))
    }

    pub fn next_downstream_primes(&mut self, k: usize) -> Result<Vec<Prime<u64>>> {
        (0..k).map(|_| self.next_downstream_prime()).collect()
    }

    pub fn next_upstream_primes(&mut self, k: usize) -> Result<Vec<Prime<u64>>> {
        (0..k).map(|_| self.next_upstream_prime()).collect()
    }
}
