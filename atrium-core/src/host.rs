//! The Host contract: what a running class may ask of the composition root.

use crate::error::AtriumError;
use crate::history::PageHistory;
use crate::id::{ClassName, EventName};
use crate::instance::Instance;
use crate::kind::ModuleKind;
use crate::stage::StageBoard;
use crate::subscriber::{Published, Subscriber, SubscriptionId};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// The composition root as seen from inside a class.
///
/// Base contracts and application classes receive a `Weak<dyn Host>` through
/// their construction arguments and upgrade it when a capability runs. The
/// root owns the registries that own the instances, so instances must never
/// hold a strong reference back.
pub trait Host: Send + Sync {
    /// Fetch the singleton Model for `class`, creating it on first use.
    fn fetch_model(&self, class: &ClassName) -> Result<Arc<Instance>, AtriumError>;

    /// Fetch the singleton Page for `class`, creating it on first use.
    fn fetch_page(&self, class: &ClassName) -> Result<Arc<Instance>, AtriumError>;

    /// Evict the Model for `class`, running its destroy hooks.
    fn evict_model(&self, class: &ClassName) -> Result<(), AtriumError>;

    /// Evict the Page for `class`, running its destroy hooks.
    fn evict_page(&self, class: &ClassName) -> Result<(), AtriumError>;

    /// Subscribe controller `class` to `event`. A class that is already
    /// subscribed keeps its existing binding.
    fn register_controller(&self, class: &ClassName, event: &EventName) -> Result<(), AtriumError>;

    /// Drop the subscription of controller `class`, if any.
    fn unregister_controller(&self, class: &ClassName) -> Result<(), AtriumError>;

    /// Publish `data` under `event`.
    fn publish(&self, event: &EventName, data: Value) -> Result<Published, AtriumError>;

    /// Add a subscriber to `event`.
    fn subscribe(&self, event: &EventName, subscriber: Subscriber) -> SubscriptionId;

    /// Remove a subscription. Returns whether it existed.
    fn unsubscribe(&self, event: &EventName, id: SubscriptionId) -> bool;

    /// Build a plain instance through the chain mechanism without
    /// registering it. `kind` defaults to the class's declared kind.
    fn construct(&self, class: &ClassName, kind: Option<ModuleKind>) -> Result<Instance, AtriumError>;

    /// Template text for `path`.
    fn template(&self, path: &str) -> Result<String, AtriumError>;

    /// The page history.
    fn history(&self) -> &PageHistory;

    /// The stage board.
    fn stages(&self) -> &StageBoard;
}

/// Template text lookup, owned by whatever loads resources.
pub trait TemplateSource: Send + Sync {
    /// Text of the template at `path`, if loaded.
    fn template(&self, path: &str) -> Option<String>;
}

impl TemplateSource for HashMap<String, String> {
    fn template(&self, path: &str) -> Option<String> {
        self.get(path).cloned()
    }
}

impl TemplateSource for BTreeMap<String, String> {
    fn template(&self, path: &str) -> Option<String> {
        self.get(path).cloned()
    }
}

/// No templates at all; every lookup misses.
impl TemplateSource for () {
    fn template(&self, _path: &str) -> Option<String> {
        None
    }
}
