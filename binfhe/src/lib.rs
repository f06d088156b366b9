//! Gate bootstrapping over LWE/RLWE with GINX and LMKCDEY blind rotation.
//!
//! A [Params] value selects every dimension; [KeyMaterial] holds the
//! read-only evaluation keys; a [Bootstrapper] with one [BootstrapContext]
//! per thread refreshes ciphertexts; [GateEvaluator] maps boolean gates onto
//! bootstraps and [ParallelEvaluator] spreads them over a worker pool.

pub mod arena;
pub mod blind_rotation;
pub mod bootstrap;
pub mod circuit;
pub mod concurrency;
pub mod gates;
pub mod integer;
pub mod keypack;
pub mod keys;
pub mod lwe;
pub mod params;
pub mod rgsw;
pub mod rlwe;
pub mod wire;

pub use bootstrap::{BootstrapContext, BootstrapState, Bootstrapper};
pub use circuit::{Circuit, Wire};
pub use concurrency::{ParallelEvaluator, PoolConfig};
pub use gates::{Gate, GateEvaluator};
pub use keys::{KeyMaterial, SecretKey};
pub use lwe::LweCiphertext;
pub use math::error::{Error, Result};
pub use params::Params;
