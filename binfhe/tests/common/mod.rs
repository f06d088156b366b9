#![allow(dead_code)]

use binfhe::{KeyMaterial, Params, SecretKey};
use sampling::source::Source;
use tracing_subscriber::EnvFilter;

/// Installs a test-friendly subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn keys(params: &Params, seed: u8) -> (SecretKey, KeyMaterial, Source) {
    init_tracing();
    let mut source: Source = Source::new([seed; 32]);
    let (sk, keys) = KeyMaterial::generate(params, &mut source).expect("key generation");
    (sk, keys, source)
}
