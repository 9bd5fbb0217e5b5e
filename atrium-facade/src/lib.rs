#![deny(missing_docs)]
//! Composition root for atrium.
//!
//! A [`Facade`] is built from the application's class table, a template
//! source and an [`AtriumConfig`]. It installs the base contracts, builds
//! the application's facade class on top of the Facade base contract and
//! exposes the registry and broadcast operations. The facade class's
//! `startup` capability runs once, through [`Facade::startup`].
//!
//! ```
//! use atrium_core::{Capabilities, Class, ClassDescriptor, ClassTable};
//! use atrium_facade::{AtriumConfig, Facade};
//! use serde_json::json;
//!
//! struct App;
//! impl Class for App {
//!     fn public(&self) -> Capabilities {
//!         Capabilities::new().with("startup", |_| Ok(json!("started")))
//!     }
//! }
//!
//! let mut classes = ClassTable::new();
//! classes.define(ClassDescriptor::new("app.Facade", |_| App)).unwrap();
//! let facade = Facade::new(classes, (), AtriumConfig::default()).unwrap();
//! assert_eq!(facade.startup().unwrap(), json!("started"));
//! assert!(facade.startup().is_err());
//! ```

mod config;
mod runtime;

pub use config::{AtriumConfig, DEFAULT_FACADE_CLASS};
pub use runtime::Runtime;

use atrium_chain::install_base_contracts;
use atrium_core::kind::FACADE_BASE;
use atrium_core::{
    AtriumError, Capability, ClassName, ClassTable, EventName, Host, Instance, ModuleKind, OneShot,
    Published, Subscriber, SubscriptionId, TemplateSource,
};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

const STARTUP: &str = "startup";

/// The application's entry point into the runtime.
pub struct Facade {
    runtime: Arc<Runtime>,
    instance: Instance,
    startup: Option<Capability>,
    started: OneShot,
}

impl Facade {
    /// Build the runtime and the facade instance.
    ///
    /// The base contracts are installed into `classes`, which must not
    /// define anything under their paths. The topmost declared ancestor of
    /// the configured facade class gets the Facade base contract as its
    /// parent, so every facade chain ends there.
    ///
    /// The `startup` capability is taken off every level of the facade
    /// instance; only [`startup`](Self::startup) can run it.
    pub fn new(
        mut classes: ClassTable,
        templates: impl TemplateSource + 'static,
        config: AtriumConfig,
    ) -> Result<Self, AtriumError> {
        install_base_contracts(&mut classes)?;
        root_at_facade_base(&classes, &config.facade_class)?;

        let runtime = Runtime::new(classes, Arc::new(templates), &config);
        let mut instance = runtime.construct(&config.facade_class, Some(ModuleKind::None))?;
        let startup = instance.detach_capability(STARTUP);
        tracing::info!(
            facade = %config.facade_class,
            history_limit = config.history_limit,
            has_startup = startup.is_some(),
            "facade built"
        );
        Ok(Self {
            runtime,
            instance,
            startup,
            started: OneShot::new(),
        })
    }

    /// Run the facade class's `startup` capability. Only the first call
    /// does anything; later calls fail with
    /// [`AtriumError::StartupAlreadyRun`]. A facade class without a
    /// `startup` capability starts up as a no-op.
    pub fn startup(&self) -> Result<Value, AtriumError> {
        if !self.started.fire() {
            return Err(AtriumError::StartupAlreadyRun);
        }
        tracing::info!(facade = %self.instance.class(), "startup");
        match &self.startup {
            Some(startup) => startup.invoke(Value::Null),
            None => Ok(Value::Null),
        }
    }

    /// Whether [`startup`](Self::startup) has been called.
    pub fn is_started(&self) -> bool {
        self.started.is_spent()
    }

    /// The facade instance. Its surface has no `startup` capability.
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// Invoke a public capability of the facade instance.
    pub fn call(&self, capability: &str, args: Value) -> Result<Value, AtriumError> {
        self.instance.call(capability, args)
    }

    /// The runtime behind this facade.
    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.runtime
    }

    /// Fetch the singleton Model for `class`, creating it on first use.
    pub fn fetch_model(&self, class: impl Into<ClassName>) -> Result<Arc<Instance>, AtriumError> {
        self.runtime.fetch_model(&class.into())
    }

    /// Fetch the singleton Page for `class`, creating it on first use.
    pub fn fetch_page(&self, class: impl Into<ClassName>) -> Result<Arc<Instance>, AtriumError> {
        self.runtime.fetch_page(&class.into())
    }

    /// Evict the Model for `class`. Returns whether one was cached.
    pub fn evict_model(&self, class: impl Into<ClassName>) -> Result<bool, AtriumError> {
        self.runtime.models().evict(&class.into())
    }

    /// Evict the Page for `class`. Returns whether one was cached.
    pub fn evict_page(&self, class: impl Into<ClassName>) -> Result<bool, AtriumError> {
        self.runtime.pages().evict(&class.into())
    }

    /// Subscribe controller `class` to `event`. Returns `false` if it was
    /// already subscribed, in which case its first binding is kept.
    pub fn register_controller(
        &self,
        class: impl Into<ClassName>,
        event: impl Into<EventName>,
    ) -> Result<bool, AtriumError> {
        self.runtime
            .controllers()
            .subscribe(&class.into(), &event.into(), self.runtime.dispatcher())
    }

    /// Drop the subscription of controller `class`. Returns whether it was
    /// subscribed.
    pub fn unregister_controller(&self, class: impl Into<ClassName>) -> Result<bool, AtriumError> {
        self.runtime
            .controllers()
            .unsubscribe(&class.into(), self.runtime.dispatcher())
    }

    /// Publish `data` under `event`.
    pub fn publish(&self, event: impl Into<EventName>, data: Value) -> Result<Published, AtriumError> {
        self.runtime.publish(&event.into(), data)
    }

    /// Add a subscriber to `event`.
    pub fn subscribe(&self, event: impl Into<EventName>, subscriber: Subscriber) -> SubscriptionId {
        self.runtime.subscribe(&event.into(), subscriber)
    }

    /// Remove a subscription. Returns whether it existed.
    pub fn unsubscribe(&self, event: impl Into<EventName>, id: SubscriptionId) -> bool {
        self.runtime.unsubscribe(&event.into(), id)
    }

    /// Build an unregistered instance of `class`. `kind` defaults to the
    /// class's declared kind.
    pub fn construct(
        &self,
        class: impl Into<ClassName>,
        kind: Option<ModuleKind>,
    ) -> Result<Instance, AtriumError> {
        self.runtime.construct(&class.into(), kind)
    }

    /// Evict every cached Model and Page, running their destroy hooks, and
    /// drop every controller subscription.
    pub fn shutdown(&self) {
        self.runtime.shutdown();
    }
}

/// Declare the Facade base contract as the parent of the topmost ancestor of
/// `facade`, unless the chain already ends there.
fn root_at_facade_base(classes: &ClassTable, facade: &ClassName) -> Result<(), AtriumError> {
    let mut seen = HashSet::new();
    let mut descriptor = classes.resolve(facade.as_str())?;
    loop {
        if descriptor.name().as_str() == FACADE_BASE {
            return Ok(());
        }
        if !seen.insert(descriptor.name().clone()) {
            return Err(AtriumError::CyclicInheritance(descriptor.name().clone()));
        }
        let Some(parent) = descriptor.parent().cloned() else {
            break;
        };
        descriptor = classes.resolve(parent.as_str())?;
    }
    tracing::debug!(%facade, top = %descriptor.name(), "facade chain rooted at the facade contract");
    descriptor.declare_parent(FACADE_BASE)
}
