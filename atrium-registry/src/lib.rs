#![deny(missing_docs)]
//! Module registries for atrium.
//!
//! - [`ModuleRegistry`] caches at most one live instance per class name, for
//!   the singleton kinds (Model, Page).
//! - [`ControllerRegistry`] records which event each controller class is
//!   subscribed to, and builds a fresh controller for every dispatch.
//!
//! Both build instances through an [`atrium_chain::ChainBuilder`]. A chain
//! that fails to resolve leaves the registry untouched.

mod controllers;
mod modules;

pub use controllers::{ControllerBinding, ControllerRegistry};
pub use modules::ModuleRegistry;
