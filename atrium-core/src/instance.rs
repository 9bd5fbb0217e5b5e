//! Live instances and the one-shot guard on their lifecycle hooks.

use crate::capability::{Capabilities, Capability, CapabilityResult, ProtectedScope, Supers};
use crate::class::{Class, CreateContext};
use crate::error::AtriumError;
use crate::id::ClassName;
use crate::kind::ModuleKind;
use crate::sync::lock;
use serde_json::Value;
use std::fmt;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// A flag that can be fired exactly once.
#[derive(Debug, Default)]
pub struct OneShot(AtomicBool);

impl OneShot {
    /// A fresh, unfired guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the guard. Returns `true` only for the first call.
    pub fn fire(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }

    /// Whether the guard has been fired.
    pub fn is_spent(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// An object produced by resolving a class and running its constructor.
///
/// Holds its own level, the instance it was built on (its base, which holds
/// its own base in turn), the `supers` captured from that base, and its full
/// public surface: `supers` overlaid with the level's own public
/// capabilities.
///
/// The constructed object is checked out of its slot while a hook runs, so
/// no lock is held during user code. A destroy that arrives while the create
/// hook still has the object checked out runs once the create hook returns.
pub struct Instance {
    class: ClassName,
    kind: ModuleKind,
    object: Mutex<Option<Box<dyn Class>>>,
    base: Option<Box<Instance>>,
    supers: Supers,
    surface: Capabilities,
    created: OneShot,
    destroyed: OneShot,
}

impl Instance {
    /// Assemble an instance from a constructed level and its resolved base.
    pub fn new(
        class: ClassName,
        kind: ModuleKind,
        object: Box<dyn Class>,
        base: Option<Instance>,
        supers: Supers,
    ) -> Self {
        let mut surface = supers.as_capabilities().clone();
        surface.overlay(&object.public());
        Self {
            class,
            kind,
            object: Mutex::new(Some(object)),
            base: base.map(Box::new),
            supers,
            surface,
            created: OneShot::new(),
            destroyed: OneShot::new(),
        }
    }

    /// The class this instance was built from.
    pub fn class(&self) -> &ClassName {
        &self.class
    }

    /// The kind it was built as.
    pub fn kind(&self) -> ModuleKind {
        self.kind
    }

    /// Public capabilities inherited from the resolved base.
    pub fn supers(&self) -> &Supers {
        &self.supers
    }

    /// Every public capability: inherited ones plus this level's own.
    pub fn surface(&self) -> &Capabilities {
        &self.surface
    }

    /// The instance this one was built on.
    pub fn base(&self) -> Option<&Instance> {
        self.base.as_deref()
    }

    /// Class names from this instance down to the chain's root.
    pub fn lineage(&self) -> Vec<&ClassName> {
        let mut out = vec![&self.class];
        let mut current = self.base();
        while let Some(base) = current {
            out.push(&base.class);
            current = base.base();
        }
        out
    }

    /// Look up a public capability.
    pub fn capability(&self, name: &str) -> Option<&Capability> {
        self.surface.get(name)
    }

    /// Whether the instance exposes `name`.
    pub fn responds_to(&self, name: &str) -> bool {
        self.surface.contains(name)
    }

    /// Remove `name` from the public surface and `supers` of this level and
    /// every base, returning this level's capability.
    pub fn detach_capability(&mut self, name: &str) -> Option<Capability> {
        let below = self
            .base
            .as_mut()
            .and_then(|base| base.detach_capability(name));
        self.supers.remove(name);
        self.surface.remove(name).or(below)
    }

    /// Invoke a public capability.
    pub fn call(&self, name: &str, args: Value) -> CapabilityResult {
        self.surface.call(name, args)
    }

    /// Run the lifecycle-create hook with the given protected scope.
    ///
    /// Returns `Ok(None)` without running anything if the hook already ran.
    pub fn create(&self, protected: &ProtectedScope) -> Result<Option<Capabilities>, AtriumError> {
        if !self.created.fire() {
            return Ok(None);
        }
        let cx = CreateContext {
            protected,
            supers: &self.supers,
            class: &self.class,
        };
        let Some(mut object) = lock(&self.object).take() else {
            return Ok(Some(Capabilities::new()));
        };
        let contribution = object.on_create(&cx);
        self.check_in(object);
        contribution.map(Some)
    }

    fn check_in(&self, mut object: Box<dyn Class>) {
        let mut slot = lock(&self.object);
        if self.destroyed.is_spent() {
            drop(slot);
            object.on_destroy();
        } else {
            *slot = Some(object);
        }
    }

    /// Run the lifecycle-destroy hooks of this level and then of every base.
    ///
    /// Returns `false` without running anything if the instance was already
    /// destroyed, which makes re-entrant destruction a no-op.
    pub fn destroy(&self) -> bool {
        if !self.destroyed.fire() {
            return false;
        }
        let object = lock(&self.object).take();
        if let Some(mut object) = object {
            object.on_destroy();
        }
        if let Some(base) = &self.base {
            base.destroy();
        }
        true
    }

    /// Whether the create hook has run.
    pub fn is_created(&self) -> bool {
        self.created.is_spent()
    }

    /// Whether the destroy hooks have run.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.is_spent()
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class)
            .field("kind", &self.kind)
            .field("surface", &self.surface)
            .field("base", &self.base.as_ref().map(|b| &b.class))
            .finish_non_exhaustive()
    }
}
