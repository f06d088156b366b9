//! Modular arithmetic, CRT bases, negacyclic NTTs and multi-channel
//! polynomial rings for lattice-based homomorphic encryption.

pub mod automorphism;
pub mod crt;
pub mod dft;
pub mod error;
pub mod gadget;
pub mod kernel;
pub mod modulus;
pub mod poly;
pub mod ring;

pub use error::{Error, Result};

/// Unroll width of the vector-friendly loops.
pub const CHUNK: usize = 8;
