//! Named capabilities and the two ways they travel between inheritance
//! levels: the protected scope (downward, descendants only) and the supers
//! set (the flattened public surface of an instance's ancestors).

use crate::error::AtriumError;
use crate::id::ClassName;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// What every capability call returns.
pub type CapabilityResult = Result<Value, AtriumError>;

type CapabilityFn = dyn Fn(Value) -> CapabilityResult + Send + Sync;

/// A named function a class exposes, either publicly or to descendants.
#[derive(Clone)]
pub struct Capability(Arc<CapabilityFn>);

impl Capability {
    /// Wrap a closure as a capability.
    pub fn new(f: impl Fn(Value) -> CapabilityResult + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Call the capability.
    pub fn invoke(&self, args: Value) -> CapabilityResult {
        (self.0)(args)
    }

    /// True if both handles point at the same function.
    pub fn ptr_eq(&self, other: &Capability) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Capability(..)")
    }
}

/// A set of capabilities keyed by name.
#[derive(Clone, Default)]
pub struct Capabilities {
    entries: BTreeMap<String, Capability>,
}

impl Capabilities {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a closure.
    pub fn with(
        mut self,
        name: impl Into<String>,
        f: impl Fn(Value) -> CapabilityResult + Send + Sync + 'static,
    ) -> Self {
        self.entries.insert(name.into(), Capability::new(f));
        self
    }

    /// Insert a capability, returning the one it replaced.
    pub fn insert(&mut self, name: impl Into<String>, capability: Capability) -> Option<Capability> {
        self.entries.insert(name.into(), capability)
    }

    /// Remove a capability, returning it.
    pub fn remove(&mut self, name: &str) -> Option<Capability> {
        self.entries.remove(name)
    }

    /// Look a capability up by name.
    pub fn get(&self, name: &str) -> Option<&Capability> {
        self.entries.get(name)
    }

    /// Whether a capability with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Invoke a capability by name.
    pub fn call(&self, name: &str, args: Value) -> CapabilityResult {
        self.get(name)
            .ok_or_else(|| AtriumError::capability_not_found(name))?
            .invoke(args)
    }

    /// Copy every entry of `other` into `self`; entries of `other` win.
    pub fn overlay(&mut self, other: &Capabilities) {
        for (name, capability) in &other.entries {
            self.entries.insert(name.clone(), capability.clone());
        }
    }

    /// Capability names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterate over `(name, capability)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Capability)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of capabilities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no capabilities.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

/// One level's contribution to a protected scope.
#[derive(Debug, Clone)]
pub struct ScopeLayer {
    /// The class that contributed this layer.
    pub owner: ClassName,
    /// The capabilities it contributed.
    pub entries: Capabilities,
}

/// Capabilities an ancestor exposes only to its descendants.
///
/// Built bottom-up during chain resolution as an ordered list of layers; a
/// lookup searches the most recent layer first, so a level's own capability
/// shadows a same-named inherited one. Each level receives the scope by
/// value and nothing flows back up.
#[derive(Debug, Clone, Default)]
pub struct ProtectedScope {
    layers: Vec<ScopeLayer>,
}

impl ProtectedScope {
    /// An empty scope, as seen by the root of a chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return this scope with `contribution` added as the newest layer.
    /// Empty contributions add no layer.
    pub fn layered(mut self, owner: ClassName, contribution: Capabilities) -> Self {
        if !contribution.is_empty() {
            self.layers.push(ScopeLayer {
                owner,
                entries: contribution,
            });
        }
        self
    }

    /// Resolve a capability, newest layer first.
    pub fn get(&self, name: &str) -> Option<&Capability> {
        self.layers.iter().rev().find_map(|layer| layer.entries.get(name))
    }

    /// The class whose layer currently provides `name`.
    pub fn owner_of(&self, name: &str) -> Option<&ClassName> {
        self.layers
            .iter()
            .rev()
            .find(|layer| layer.entries.contains(name))
            .map(|layer| &layer.owner)
    }

    /// Invoke a capability by name.
    pub fn call(&self, name: &str, args: Value) -> CapabilityResult {
        self.get(name)
            .ok_or_else(|| AtriumError::capability_not_found(name))?
            .invoke(args)
    }

    /// Whether a capability with this name is visible.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Every visible capability name, deduplicated and sorted.
    pub fn names(&self) -> BTreeSet<&str> {
        self.layers
            .iter()
            .flat_map(|layer| layer.entries.names())
            .collect()
    }

    /// Collapse the layers into a single set with overrides applied.
    pub fn flatten(&self) -> Capabilities {
        let mut flat = Capabilities::new();
        for layer in &self.layers {
            flat.overlay(&layer.entries);
        }
        flat
    }

    /// The layers, oldest first.
    pub fn layers(&self) -> &[ScopeLayer] {
        &self.layers
    }

    /// True if no level contributed anything.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

/// The flattened public surface of an instance's resolved base, captured at
/// construction time.
#[derive(Debug, Clone, Default)]
pub struct Supers(Capabilities);

impl Supers {
    pub(crate) fn remove(&mut self, name: &str) -> Option<Capability> {
        self.0.remove(name)
    }

    /// Look a capability up by name.
    pub fn get(&self, name: &str) -> Option<&Capability> {
        self.0.get(name)
    }

    /// Whether the ancestors expose this name.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Invoke an ancestor's public capability.
    pub fn call(&self, name: &str, args: Value) -> CapabilityResult {
        self.0.call(name, args)
    }

    /// Capability names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.names()
    }

    /// Number of capabilities.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the ancestors expose nothing.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying set.
    pub fn as_capabilities(&self) -> &Capabilities {
        &self.0
    }
}

impl From<Capabilities> for Supers {
    fn from(capabilities: Capabilities) -> Self {
        Self(capabilities)
    }
}

/// Read a string argument, failing with [`AtriumError::InvalidArgument`].
pub fn str_arg<'a>(capability: &str, args: &'a Value) -> Result<&'a str, AtriumError> {
    args.as_str()
        .ok_or_else(|| AtriumError::invalid_argument(capability, "expected a string"))
}

/// Read a string field of an object argument.
pub fn str_field<'a>(capability: &str, args: &'a Value, field: &str) -> Result<&'a str, AtriumError> {
    args.get(field).and_then(Value::as_str).ok_or_else(|| {
        AtriumError::invalid_argument(capability, format!("expected string field `{field}`"))
    })
}
