use crate::bootstrap::{BootstrapContext, Bootstrapper};
use crate::circuit::{resolve, Circuit, Wire};
use crate::concurrency::alloc::SystemAllocator;
use crate::concurrency::pool::WorkerPool;
use crate::concurrency::replicas::KeyReplicas;
use crate::concurrency::scheduler::Scheduler;
use crate::concurrency::PoolConfig;
use crate::gates::{Gate, GateEvaluator};
use crate::keys::KeyMaterial;
use crate::lwe::ciphertext::LweCiphertext;
use crate::params::Params;
use math::error::{Error, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// State shared by all tasks of one evaluator.
struct Shared {
    bootstrapper: Bootstrapper,
    replicas: KeyReplicas,
    /// One context per worker, only ever locked by that worker.
    contexts: Vec<Mutex<BootstrapContext>>,
}

impl Shared {
    fn run<T>(&self, worker: usize, f: impl FnOnce(&GateEvaluator, &mut BootstrapContext) -> Result<T>) -> Result<T> {
        let keys: &KeyMaterial = self.replicas.for_worker(worker);
        let eval: GateEvaluator = GateEvaluator::new_unchecked(&self.bootstrapper, keys);
        let mut ctx: MutexGuard<BootstrapContext> = self.contexts[worker % self.contexts.len()]
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        f(&eval, &mut *ctx)
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Runs independent bootstraps, gates and whole circuits on a [Scheduler].
/// Results come back in submission order whatever order the tasks ran in.
pub struct ParallelEvaluator {
    shared: Arc<Shared>,
    scheduler: Arc<dyn Scheduler>,
}

impl ParallelEvaluator {
    /// Starts a [WorkerPool] sized by `config` with `config.domains` key replicas.
    pub fn new(params: &Params, keys: KeyMaterial, config: PoolConfig) -> Result<Self> {
        let pool: WorkerPool = WorkerPool::new(config.threads)?;
        let replicas: KeyReplicas = KeyReplicas::new(keys, config.domains, &SystemAllocator)?;
        Self::with_scheduler(Bootstrapper::new(params)?, replicas, Arc::new(pool))
    }

    pub fn with_scheduler(
        bootstrapper: Bootstrapper,
        replicas: KeyReplicas,
        scheduler: Arc<dyn Scheduler>,
    ) -> Result<Self> {
        replicas.for_worker(0).check(bootstrapper.params())?;
        let contexts: Vec<Mutex<BootstrapContext>> = (0..scheduler.workers().max(1))
            .map(|_| Mutex::new(bootstrapper.context()))
            .collect();
        Ok(Self {
            shared: Arc::new(Shared {
                bootstrapper,
                replicas,
                contexts,
            }),
            scheduler,
        })
    }

    pub fn bootstrapper(&self) -> &Bootstrapper {
        &self.shared.bootstrapper
    }

    fn run_batch<I, F>(&self, items: Vec<I>, f: F) -> Result<Vec<LweCiphertext>>
    where
        I: Send + 'static,
        F: Fn(&GateEvaluator, &mut BootstrapContext, I) -> Result<LweCiphertext> + Send + Sync + 'static,
    {
        let count: usize = items.len();
        let results: Arc<Vec<Mutex<Option<Result<LweCiphertext>>>>> =
            Arc::new((0..count).map(|_| Mutex::new(None)).collect());
        let f: Arc<F> = Arc::new(f);
        for (i, item) in items.into_iter().enumerate() {
            let (shared, results, f) = (self.shared.clone(), results.clone(), f.clone());
            self.scheduler.submit(Box::new(move |worker| {
                let out: Result<LweCiphertext> = shared.run(worker, |eval, ctx| (*f)(eval, ctx, item));
                *lock(&results[i]) = Some(out);
            }));
        }
        self.scheduler.drain();
        results
            .iter()
            .map(|slot| {
                lock(slot)
                    .take()
                    .unwrap_or_else(|| Err(Error::ParameterMismatch("task produced no result".into())))
            })
            .collect()
    }

    /// Refreshes every encrypted bit, as [Bootstrapper::bootstrap] does.
    pub fn bootstrap_batch(&self, cts: Vec<LweCiphertext>) -> Result<Vec<LweCiphertext>> {
        self.run_batch(cts, |eval, ctx, ct| {
            eval.bootstrapper().bootstrap(eval.keys(), ctx, &ct)
        })
    }

    /// Evaluates independent gates.
    pub fn evaluate_gates(&self, tasks: Vec<(Gate, Vec<LweCiphertext>)>) -> Result<Vec<LweCiphertext>> {
        self.run_batch(tasks, |eval, ctx, (gate, inputs)| {
            let refs: Vec<&LweCiphertext> = inputs.iter().collect();
            eval.evaluate(ctx, gate, &refs)
        })
    }

    /// Evaluates `circuit`, starting each node as soon as its last input is
    /// ready: the producer of that input decrements the node's dependency
    /// count and submits it on reaching zero.
    pub fn evaluate_circuit(&self, circuit: &Circuit, inputs: Vec<LweCiphertext>) -> Result<Vec<LweCiphertext>> {
        if inputs.len() != circuit.num_inputs() {
            return Err(Error::ParameterMismatch(format!(
                "{} inputs given to a circuit of {}",
                inputs.len(),
                circuit.num_inputs()
            )));
        }
        let (pending, readers) = circuit.dependencies();
        let run: Arc<CircuitRun> = Arc::new(CircuitRun {
            circuit: circuit.clone(),
            inputs,
            values: (0..circuit.nodes().len()).map(|_| Mutex::new(None)).collect(),
            pending: pending.iter().map(|p| AtomicUsize::new(*p)).collect(),
            readers,
            error: Mutex::new(None),
        });
        for (node, p) in pending.iter().enumerate() {
            if *p == 0 {
                submit_node(&self.shared, &self.scheduler, &run, node);
            }
        }
        self.scheduler.drain();
        if let Some(e) = lock(&run.error).take() {
            return Err(e);
        }
        let values: Vec<LweCiphertext> = run.collect_values()?;
        let eval: GateEvaluator = GateEvaluator::new_unchecked(&self.shared.bootstrapper, self.shared.replicas.for_worker(0));
        Ok(circuit
            .outputs()
            .iter()
            .map(|w| resolve(&eval, &run.inputs, &values, *w))
            .collect())
    }
}

struct CircuitRun {
    circuit: Circuit,
    inputs: Vec<LweCiphertext>,
    values: Vec<Mutex<Option<LweCiphertext>>>,
    pending: Vec<AtomicUsize>,
    readers: Vec<Vec<usize>>,
    error: Mutex<Option<Error>>,
}

impl CircuitRun {
    fn value(&self, node: usize) -> Result<LweCiphertext> {
        lock(&self.values[node])
            .clone()
            .ok_or_else(|| Error::ParameterMismatch(format!("node {} read before it ran", node)))
    }

    fn collect_values(&self) -> Result<Vec<LweCiphertext>> {
        (0..self.values.len()).map(|i| self.value(i)).collect()
    }

    fn evaluate(&self, eval: &GateEvaluator, ctx: &mut BootstrapContext, node: usize) -> Result<LweCiphertext> {
        let n = &self.circuit.nodes()[node];
        let args: Vec<LweCiphertext> = n
            .inputs
            .iter()
            .map(|w| match w {
                Wire::Node(j) => self.value(*j),
                Wire::Input(i) => Ok(self.inputs[*i].clone()),
                Wire::Const(b) => Ok(eval.constant(*b)),
            })
            .collect::<Result<_>>()?;
        let refs: Vec<&LweCiphertext> = args.iter().collect();
        eval.evaluate(ctx, n.gate, &refs)
    }
}

fn submit_node(shared: &Arc<Shared>, scheduler: &Arc<dyn Scheduler>, run: &Arc<CircuitRun>, node: usize) {
    let (shared, sched, run) = (shared.clone(), scheduler.clone(), run.clone());
    scheduler.submit(Box::new(move |worker| {
        match shared.run(worker, |eval, ctx| run.evaluate(eval, ctx, node)) {
            Ok(ct) => {
                *lock(&run.values[node]) = Some(ct);
                for reader in run.readers[node].iter() {
                    if run.pending[*reader].fetch_sub(1, Ordering::AcqRel) == 1 {
                        submit_node(&shared, &sched, &run, *reader);
                    }
                }
            }
            Err(e) => {
                let mut slot = lock(&run.error);
                if slot.is_none() {
                    *slot = Some(e);
                }
            }
        }
    }));
}
