//! Module kinds and the base contract each one is rooted at.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Class path of the Model base contract.
pub const MODEL_BASE: &str = "atrium.core.ModelBase";
/// Class path of the Page base contract.
pub const PAGE_BASE: &str = "atrium.core.PageBase";
/// Class path of the Controller base contract.
pub const CONTROLLER_BASE: &str = "atrium.core.ControllerBase";
/// Class path of the Facade base contract.
pub const FACADE_BASE: &str = "atrium.core.FacadeBase";

/// The kind of module a class is resolved as.
///
/// The kind selects which base contract seeds the root of an inheritance
/// chain and whether event arguments reach constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    /// Singleton data holder.
    Model,
    /// Singleton display unit.
    Page,
    /// Stateless event handler, rebuilt for every dispatch.
    Controller,
    /// Plain class with no base contract.
    #[default]
    None,
}

impl ModuleKind {
    /// The base contract a chain of this kind is rooted at, if any.
    pub fn base_contract(self) -> Option<&'static str> {
        match self {
            ModuleKind::Model => Some(MODEL_BASE),
            ModuleKind::Page => Some(PAGE_BASE),
            ModuleKind::Controller => Some(CONTROLLER_BASE),
            ModuleKind::None => None,
        }
    }

    /// Whether constructors receive the event name and data.
    pub fn forwards_event(self) -> bool {
        matches!(self, ModuleKind::Controller)
    }

    /// Whether instances of this kind are cached one per class name.
    pub fn is_singleton(self) -> bool {
        matches!(self, ModuleKind::Model | ModuleKind::Page)
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModuleKind::Model => "model",
            ModuleKind::Page => "page",
            ModuleKind::Controller => "controller",
            ModuleKind::None => "none",
        };
        f.write_str(s)
    }
}
