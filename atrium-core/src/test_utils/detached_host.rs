//! DetachedHost: a host that refuses everything.

use crate::error::AtriumError;
use crate::history::PageHistory;
use crate::host::Host;
use crate::id::{ClassName, EventName};
use crate::instance::Instance;
use crate::kind::ModuleKind;
use crate::stage::StageBoard;
use crate::subscriber::{Published, Subscriber, SubscriptionId};
use serde_json::Value;
use std::sync::{Arc, Weak};

/// A host with no registries behind it. Every operation fails with
/// [`AtriumError::HostUnavailable`]; subscriptions get id 0 and are lost.
#[derive(Debug, Default)]
pub struct DetachedHost {
    history: PageHistory,
    stages: StageBoard,
}

/// A `Weak<dyn Host>` that never upgrades, for building chains in tests
/// without a composition root.
pub fn detached() -> Weak<dyn Host> {
    Weak::<DetachedHost>::new()
}

impl Host for DetachedHost {
    fn fetch_model(&self, _class: &ClassName) -> Result<Arc<Instance>, AtriumError> {
        Err(AtriumError::HostUnavailable)
    }

    fn fetch_page(&self, _class: &ClassName) -> Result<Arc<Instance>, AtriumError> {
        Err(AtriumError::HostUnavailable)
    }

    fn evict_model(&self, _class: &ClassName) -> Result<(), AtriumError> {
        Err(AtriumError::HostUnavailable)
    }

    fn evict_page(&self, _class: &ClassName) -> Result<(), AtriumError> {
        Err(AtriumError::HostUnavailable)
    }

    fn register_controller(&self, _class: &ClassName, _event: &EventName) -> Result<(), AtriumError> {
        Err(AtriumError::HostUnavailable)
    }

    fn unregister_controller(&self, _class: &ClassName) -> Result<(), AtriumError> {
        Err(AtriumError::HostUnavailable)
    }

    fn publish(&self, _event: &EventName, _data: Value) -> Result<Published, AtriumError> {
        Err(AtriumError::HostUnavailable)
    }

    fn subscribe(&self, _event: &EventName, _subscriber: Subscriber) -> SubscriptionId {
        SubscriptionId(0)
    }

    fn unsubscribe(&self, _event: &EventName, _id: SubscriptionId) -> bool {
        false
    }

    fn construct(&self, _class: &ClassName, _kind: Option<ModuleKind>) -> Result<Instance, AtriumError> {
        Err(AtriumError::HostUnavailable)
    }

    fn template(&self, _path: &str) -> Result<String, AtriumError> {
        Err(AtriumError::HostUnavailable)
    }

    fn history(&self) -> &PageHistory {
        &self.history
    }

    fn stages(&self) -> &StageBoard {
        &self.stages
    }
}
