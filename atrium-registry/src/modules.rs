use atrium_chain::ChainBuilder;
use atrium_core::sync::lock;
use atrium_core::{AtriumError, ClassName, Instance, ModuleKind};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Class name → the one live instance of that class, for one module kind.
pub struct ModuleRegistry {
    kind: ModuleKind,
    chain: ChainBuilder,
    entries: Mutex<HashMap<ClassName, Arc<Instance>>>,
}

impl ModuleRegistry {
    /// An empty registry building `kind` chains with `chain`.
    pub fn new(kind: ModuleKind, chain: ChainBuilder) -> Self {
        Self {
            kind,
            chain,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The kind this registry holds.
    pub fn kind(&self) -> ModuleKind {
        self.kind
    }

    /// Return the cached instance of `class`, or build, create and cache one.
    ///
    /// No lock is held while the chain is built, so create hooks may use the
    /// registry. If a hook re-entrantly cached the same class first, that
    /// instance wins.
    pub fn fetch_or_create(&self, class: &ClassName) -> Result<Arc<Instance>, AtriumError> {
        if let Some(existing) = self.get(class) {
            return Ok(existing);
        }
        let instance = Arc::new(self.chain.instantiate(class, self.kind, None)?);
        let mut entries = lock(&self.entries);
        let stored = entries.entry(class.clone()).or_insert_with(|| {
            tracing::debug!(%class, kind = %self.kind, "module registered");
            Arc::clone(&instance)
        });
        Ok(Arc::clone(stored))
    }

    /// The cached instance of `class`, if any.
    pub fn get(&self, class: &ClassName) -> Option<Arc<Instance>> {
        lock(&self.entries).get(class).cloned()
    }

    /// Evict `class`, running its destroy hooks.
    ///
    /// The class must resolve, cached or not. The entry is removed before
    /// the hooks run, so a hook that evicts its own class again is a no-op.
    /// Returns whether an instance was evicted.
    pub fn evict(&self, class: &ClassName) -> Result<bool, AtriumError> {
        self.chain.classes().resolve(class.as_str())?;
        let removed = lock(&self.entries).remove(class);
        let Some(instance) = removed else {
            return Ok(false);
        };
        tracing::debug!(%class, kind = %self.kind, "module evicted");
        instance.destroy();
        Ok(true)
    }

    /// Whether `class` is cached.
    pub fn contains(&self, class: &ClassName) -> bool {
        lock(&self.entries).contains_key(class)
    }

    /// Number of cached instances.
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }

    /// Cached class names, sorted.
    pub fn class_names(&self) -> Vec<ClassName> {
        let mut names: Vec<ClassName> = lock(&self.entries).keys().cloned().collect();
        names.sort();
        names
    }

    /// Evict everything, in class-name order. Returns how many were evicted.
    pub fn clear(&self) -> usize {
        let mut drained: Vec<(ClassName, Arc<Instance>)> = lock(&self.entries).drain().collect();
        drained.sort_by(|a, b| a.0.cmp(&b.0));
        for (class, instance) in &drained {
            tracing::debug!(%class, kind = %self.kind, "module evicted");
            instance.destroy();
        }
        drained.len()
    }
}
