//! The `Class` trait and class descriptors.

use crate::capability::{Capabilities, ProtectedScope, Supers};
use crate::error::AtriumError;
use crate::host::Host;
use crate::id::{ClassName, EventName};
use crate::kind::ModuleKind;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

/// The event that caused a controller to be constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct EventArgs {
    /// Event name that was published.
    pub name: EventName,
    /// Data published with it.
    pub data: Value,
}

impl EventArgs {
    /// Create event arguments.
    pub fn new(name: impl Into<EventName>, data: Value) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// Everything a constructor receives.
///
/// The same arguments are handed to every level of a chain: `class` is the
/// class that was requested (not the level being constructed), and `event`
/// is only present when the chain is built as a controller.
#[derive(Clone)]
pub struct ConstructArgs {
    class: ClassName,
    event: Option<EventArgs>,
    host: Weak<dyn Host>,
}

impl ConstructArgs {
    /// Arguments for building `class` against `host`.
    pub fn new(class: ClassName, host: Weak<dyn Host>) -> Self {
        Self {
            class,
            event: None,
            host,
        }
    }

    /// Attach event arguments.
    pub fn with_event(mut self, event: EventArgs) -> Self {
        self.event = Some(event);
        self
    }

    /// The requested class.
    pub fn class(&self) -> &ClassName {
        &self.class
    }

    /// Event arguments, for controller chains.
    pub fn event(&self) -> Option<&EventArgs> {
        self.event.as_ref()
    }

    /// Weak handle to the composition root.
    pub fn host(&self) -> &Weak<dyn Host> {
        &self.host
    }
}

impl fmt::Debug for ConstructArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructArgs")
            .field("class", &self.class)
            .field("event", &self.event)
            .finish_non_exhaustive()
    }
}

/// What a level sees when its lifecycle-create hook runs.
#[derive(Debug)]
pub struct CreateContext<'a> {
    /// Merged protected scope of every ancestor.
    pub protected: &'a ProtectedScope,
    /// Flattened public surface of the resolved base.
    pub supers: &'a Supers,
    /// The class this level belongs to.
    pub class: &'a ClassName,
}

/// One level of an inheritance chain.
///
/// Public capabilities are read once, when the instance is assembled. They
/// usually close over shared state that `on_create` fills in later, so the
/// closures see the protected scope they were created for.
pub trait Class: Send {
    /// Public capabilities of this level.
    fn public(&self) -> Capabilities {
        Capabilities::new()
    }

    /// Lifecycle-create hook. Receives the merged protected scope of every
    /// ancestor and returns what this level exposes to its descendants.
    /// Runs at most once per instance.
    fn on_create(&mut self, cx: &CreateContext<'_>) -> Result<Capabilities, AtriumError> {
        let _ = cx;
        Ok(Capabilities::new())
    }

    /// Lifecycle-destroy hook. Runs at most once per instance, on the
    /// requested class first and then down through its bases.
    fn on_destroy(&mut self) {}
}

/// A constructor for one class.
pub type Factory = dyn Fn(&ConstructArgs) -> Box<dyn Class> + Send + Sync;

/// A class as defined by application code: its path, its kind, its
/// constructor and, optionally, the path of its parent.
pub struct ClassDescriptor {
    name: ClassName,
    kind: ModuleKind,
    parent: OnceLock<ClassName>,
    factory: Arc<Factory>,
}

impl ClassDescriptor {
    /// Describe a class built by `factory`.
    pub fn new<F, C>(name: impl Into<ClassName>, factory: F) -> Self
    where
        F: Fn(&ConstructArgs) -> C + Send + Sync + 'static,
        C: Class + 'static,
    {
        Self {
            name: name.into(),
            kind: ModuleKind::None,
            parent: OnceLock::new(),
            factory: Arc::new(move |args: &ConstructArgs| Box::new(factory(args)) as Box<dyn Class>),
        }
    }

    /// Set the kind used when the class is constructed without an explicit one.
    pub fn with_kind(mut self, kind: ModuleKind) -> Self {
        self.kind = kind;
        self
    }

    /// Builder-style parent declaration. A second declaration is ignored
    /// with a warning; use [`declare_parent`](Self::declare_parent) to get
    /// the error instead.
    pub fn extends(self, parent: impl Into<ClassName>) -> Self {
        if let Err(e) = self.declare_parent(parent) {
            tracing::warn!(class = %self.name, error = %e, "ignoring second parent declaration");
        }
        self
    }

    /// Declare the parent class. A class's parent can be set exactly once.
    pub fn declare_parent(&self, parent: impl Into<ClassName>) -> Result<(), AtriumError> {
        if let Some(existing) = self.parent.get() {
            return Err(AtriumError::ParentAlreadyDeclared {
                class: self.name.clone(),
                parent: existing.clone(),
            });
        }
        self.parent
            .set(parent.into())
            .map_err(|rejected| AtriumError::ParentAlreadyDeclared {
                class: self.name.clone(),
                parent: rejected,
            })
    }

    /// The class path.
    pub fn name(&self) -> &ClassName {
        &self.name
    }

    /// The declared kind.
    pub fn kind(&self) -> ModuleKind {
        self.kind
    }

    /// The declared parent, if any.
    pub fn parent(&self) -> Option<&ClassName> {
        self.parent.get()
    }

    /// Run the constructor.
    pub fn construct(&self, args: &ConstructArgs) -> Box<dyn Class> {
        (self.factory)(args)
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("parent", &self.parent.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;
    impl Class for Plain {}

    #[test]
    fn parent_is_set_exactly_once() {
        let d = ClassDescriptor::new("a.B", |_| Plain);
        d.declare_parent("a.A").unwrap();
        let err = d.declare_parent("a.C").unwrap_err();
        assert!(matches!(
            err,
            AtriumError::ParentAlreadyDeclared { ref parent, .. } if parent.as_str() == "a.A"
        ));
        assert_eq!(d.parent().unwrap().as_str(), "a.A");
    }

    #[test]
    fn builder_extends_keeps_first_parent() {
        let d = ClassDescriptor::new("a.B", |_| Plain).extends("a.A").extends("a.C");
        assert_eq!(d.parent().unwrap().as_str(), "a.A");
    }

    #[test]
    fn default_kind_is_none() {
        let d = ClassDescriptor::new("a.B", |_| Plain);
        assert_eq!(d.kind(), ModuleKind::None);
        let d = d.with_kind(ModuleKind::Page);
        assert_eq!(d.kind(), ModuleKind::Page);
    }
}
