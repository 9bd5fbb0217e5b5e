//! # atrium-core: protocol types for the atrium composition runtime
//!
//! This crate defines the vocabulary every other atrium crate speaks. It has
//! no registries and no dispatch logic of its own.
//!
//! ## The Pieces
//!
//! | Piece | Types | What it does |
//! |-------|-------|-------------|
//! | Naming | [`ClassName`], [`EventName`], [`ModuleKind`] | Typed identifiers and module kinds |
//! | Classes | [`Class`], [`ClassDescriptor`], [`ClassTable`] | Definitions and dotted-path resolution |
//! | Capabilities | [`Capability`], [`Capabilities`], [`ProtectedScope`], [`Supers`] | Named functions passed between inheritance levels |
//! | Instances | [`Instance`], [`OneShot`] | Live objects with one-shot lifecycle hooks |
//! | Host | [`Host`], [`TemplateSource`] | What a running class may ask of the composition root |
//! | Broadcast | [`Subscriber`], [`SubscriptionId`], [`Published`] | Publish/subscribe vocabulary |
//! | Display | [`StageBoard`], [`PageHistory`] | Which page shows where, and where it came from |
//!
//! ## Payloads
//!
//! Capability arguments, model data and event data are all
//! `serde_json::Value`. Classes are defined by application code at start-up,
//! so the payload type has to be one that any class can produce and consume
//! without the runtime knowing about it.

#![deny(missing_docs)]

pub mod capability;
pub mod class;
pub mod error;
pub mod history;
pub mod host;
pub mod id;
pub mod instance;
pub mod kind;
pub mod namespace;
pub mod stage;
pub mod subscriber;
pub mod sync;

#[cfg(feature = "test-utils")]
pub mod test_utils;

// Re-exports for convenience
pub use capability::{Capabilities, Capability, CapabilityResult, ProtectedScope, ScopeLayer, Supers};
pub use class::{Class, ClassDescriptor, ConstructArgs, CreateContext, EventArgs, Factory};
pub use error::AtriumError;
pub use history::{HistoryEntry, PageHistory};
pub use host::{Host, TemplateSource};
pub use id::{ClassName, EventName};
pub use instance::{Instance, OneShot};
pub use kind::ModuleKind;
pub use namespace::ClassTable;
pub use stage::StageBoard;
pub use subscriber::{Published, Subscriber, SubscriptionId, INVALID_SUBSCRIPTION};
