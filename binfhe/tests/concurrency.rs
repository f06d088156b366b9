mod common;

use binfhe::lwe::LweCiphertext;
use binfhe::{Bootstrapper, BootstrapContext, Params, ParallelEvaluator, PoolConfig};

#[test]
fn parallel_bootstraps_match_sequential_ones() {
    let params: Params = Params::test();
    let (sk, keys, mut source) = common::keys(&params, 21);
    let bits: Vec<bool> = (0..32).map(|_| source.next_bit()).collect();
    let cts: Vec<LweCiphertext> = bits.iter().map(|bit| sk.encrypt_bit(*bit, &mut source)).collect();

    let bootstrapper: Bootstrapper = Bootstrapper::new(&params).unwrap();
    let mut ctx: BootstrapContext = bootstrapper.context();
    let sequential: Vec<LweCiphertext> = cts
        .iter()
        .map(|ct| bootstrapper.bootstrap(&keys, &mut ctx, ct).unwrap())
        .collect();
    for (ct, bit) in sequential.iter().zip(bits.iter()) {
        assert_eq!(sk.decrypt_bit(ct).unwrap(), *bit);
    }

    let evaluator: ParallelEvaluator =
        ParallelEvaluator::new(&params, keys, PoolConfig { threads: 8, domains: 2 }).unwrap();
    let parallel: Vec<LweCiphertext> = evaluator.bootstrap_batch(cts).unwrap();
    assert_eq!(parallel, sequential);
}
