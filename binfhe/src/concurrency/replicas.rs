use crate::concurrency::alloc::Allocator;
use crate::keys::KeyMaterial;
use math::error::Result;
use std::sync::Arc;

/// One read-only copy of the evaluation keys per memory domain.
#[derive(Clone, Debug)]
pub struct KeyReplicas {
    replicas: Vec<Arc<KeyMaterial>>,
}

impl KeyReplicas {
    /// Domain 0 keeps `keys`; domains 1.. get copies from `alloc`.
    pub fn new(keys: KeyMaterial, domains: usize, alloc: &dyn Allocator) -> Result<Self> {
        let mut replicas: Vec<Arc<KeyMaterial>> = Vec::with_capacity(domains.max(1));
        for node in 1..domains.max(1) {
            replicas.push(Arc::new(keys.replicate(alloc, node)?));
        }
        replicas.insert(0, Arc::new(keys));
        tracing::debug!(domains = replicas.len(), "key replicas ready");
        Ok(Self { replicas })
    }

    pub fn domains(&self) -> usize {
        self.replicas.len()
    }

    /// Replica of the domain worker `worker` runs on.
    pub fn for_worker(&self, worker: usize) -> &Arc<KeyMaterial> {
        &self.replicas[worker % self.replicas.len()]
    }
}
