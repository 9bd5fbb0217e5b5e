#![deny(missing_docs)]
//! # atrium: umbrella crate
//!
//! A single import surface for the atrium composition runtime. Re-exports
//! the protocol crate and the implementation crates behind feature flags,
//! plus a `prelude` for the happy path.

#[cfg(feature = "broadcast")]
pub use atrium_broadcast;
#[cfg(feature = "chain")]
pub use atrium_chain;
#[cfg(feature = "core")]
pub use atrium_core;
#[cfg(feature = "facade")]
pub use atrium_facade;
#[cfg(feature = "registry")]
pub use atrium_registry;

/// Happy-path imports for defining classes and running a facade.
pub mod prelude {
    #[cfg(feature = "core")]
    pub use atrium_core::{
        AtriumError, Capabilities, Class, ClassDescriptor, ClassName, ClassTable, CreateContext,
        EventArgs, EventName, Host, Instance, ModuleKind, ProtectedScope, Published, Subscriber,
        SubscriptionId, Supers, TemplateSource,
    };

    #[cfg(feature = "chain")]
    pub use atrium_chain::ChainBuilder;

    #[cfg(feature = "broadcast")]
    pub use atrium_broadcast::Dispatcher;

    #[cfg(feature = "registry")]
    pub use atrium_registry::{ControllerRegistry, ModuleRegistry};

    #[cfg(feature = "facade")]
    pub use atrium_facade::{AtriumConfig, Facade};
}
