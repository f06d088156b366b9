use binfhe::params::BlindRotationMethod;
use binfhe::{
    BootstrapContext, Bootstrapper, Gate, GateEvaluator, KeyMaterial, LweCiphertext, Params,
    ParallelEvaluator, PoolConfig, SecretKey,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use sampling::source::Source;
use std::hint::black_box;

fn bootstrap(c: &mut Criterion) {
    let mut group = c.benchmark_group("bootstrap");
    group.sample_size(10);
    for method in [BlindRotationMethod::Ginx, BlindRotationMethod::Lmkcdey] {
        let params: Params = Params::standard().with_method(method);
        let mut source: Source = Source::new([7u8; 32]);
        let (sk, keys): (SecretKey, KeyMaterial) = KeyMaterial::generate(&params, &mut source).unwrap();
        let bootstrapper: Bootstrapper = Bootstrapper::new(&params).unwrap();
        let mut ctx: BootstrapContext = bootstrapper.context();
        let ct: LweCiphertext = sk.encrypt_bit(true, &mut source);
        group.bench_function(BenchmarkId::new("sign", format!("{:?}", method)), |b| {
            b.iter(|| black_box(bootstrapper.bootstrap(&keys, &mut ctx, &ct).unwrap()))
        });
    }
    group.finish();
}

fn gates(c: &mut Criterion) {
    let mut group = c.benchmark_group("gates");
    group.sample_size(10);
    let params: Params = Params::standard();
    let mut source: Source = Source::new([9u8; 32]);
    let (sk, keys): (SecretKey, KeyMaterial) = KeyMaterial::generate(&params, &mut source).unwrap();
    let bootstrapper: Bootstrapper = Bootstrapper::new(&params).unwrap();
    let eval: GateEvaluator = GateEvaluator::new(&bootstrapper, &keys).unwrap();
    let mut ctx: BootstrapContext = eval.context();
    let inputs: Vec<LweCiphertext> = (0..3).map(|i| sk.encrypt_bit(i == 1, &mut source)).collect();
    let refs: Vec<&LweCiphertext> = inputs.iter().collect();
    for gate in [Gate::Nand, Gate::Xor, Gate::Maj3, Gate::Mux] {
        let args: &[&LweCiphertext] = &refs[..gate.arity()];
        group.bench_function(format!("{:?}", gate), |b| {
            b.iter(|| black_box(eval.evaluate(&mut ctx, gate, args).unwrap()))
        });
    }
    group.finish();
}

fn batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("bootstrap_batch");
    group.sample_size(10);
    let params: Params = Params::standard();
    let mut source: Source = Source::new([11u8; 32]);
    let (sk, keys): (SecretKey, KeyMaterial) = KeyMaterial::generate(&params, &mut source).unwrap();
    let cts: Vec<LweCiphertext> = (0..64).map(|i| sk.encrypt_bit(i % 3 == 0, &mut source)).collect();
    for threads in [1usize, 4, 16] {
        let evaluator: ParallelEvaluator =
            ParallelEvaluator::new(&params, keys.clone(), PoolConfig { threads, domains: 1 }).unwrap();
        group.bench_with_input(BenchmarkId::new("threads", threads), &cts, |b, cts| {
            b.iter(|| black_box(evaluator.bootstrap_batch(cts.clone()).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, bootstrap, gates, batch);
criterion_main!(benches);
