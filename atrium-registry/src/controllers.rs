use atrium_broadcast::{Dispatcher, TransientFactory};
use atrium_chain::ChainBuilder;
use atrium_core::sync::lock;
use atrium_core::{
    AtriumError, ClassName, EventArgs, EventName, Instance, ModuleKind, Subscriber, SubscriptionId,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// Where a controller class is subscribed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerBinding {
    /// The event it listens to.
    pub event: EventName,
    /// Its subscription in the dispatcher.
    pub id: SubscriptionId,
}

/// Controller class → its single subscription.
///
/// Controllers hold no state between dispatches: each publish builds a new
/// instance through [`TransientFactory`] and drops it once its create hook
/// has run.
pub struct ControllerRegistry {
    chain: ChainBuilder,
    bindings: Mutex<HashMap<ClassName, ControllerBinding>>,
}

impl ControllerRegistry {
    /// An empty table building controller chains with `chain`.
    pub fn new(chain: ChainBuilder) -> Self {
        Self {
            chain,
            bindings: Mutex::new(HashMap::new()),
        }
    }

    /// Subscribe controller `class` to `event` in `dispatcher`.
    ///
    /// A class that is already subscribed keeps its first binding and this
    /// returns `Ok(false)`. The whole parent chain is resolved up front, so
    /// a missing ancestor or a cycle is reported here rather than at the
    /// first publish.
    pub fn subscribe(
        &self,
        class: &ClassName,
        event: &EventName,
        dispatcher: &Dispatcher,
    ) -> Result<bool, AtriumError> {
        if let Some(existing) = self.binding(class) {
            tracing::debug!(%class, %event, bound = %existing.event, "controller already registered");
            return Ok(false);
        }
        self.chain.inspect(class)?;

        let mut bindings = lock(&self.bindings);
        if bindings.contains_key(class) {
            return Ok(false);
        }
        let id = dispatcher.subscribe(event, Subscriber::controller(class.clone()));
        bindings.insert(
            class.clone(),
            ControllerBinding {
                event: event.clone(),
                id,
            },
        );
        tracing::debug!(%class, %event, %id, "controller registered");
        Ok(true)
    }

    /// Drop the subscription of `class`. The class must resolve. Returns
    /// whether it was subscribed.
    pub fn unsubscribe(&self, class: &ClassName, dispatcher: &Dispatcher) -> Result<bool, AtriumError> {
        self.chain.classes().resolve(class.as_str())?;
        let removed = lock(&self.bindings).remove(class);
        let Some(binding) = removed else {
            return Ok(false);
        };
        dispatcher.unsubscribe(&binding.event, binding.id);
        tracing::debug!(%class, event = %binding.event, id = %binding.id, "controller unregistered");
        Ok(true)
    }

    /// The binding of `class`, if subscribed.
    pub fn binding(&self, class: &ClassName) -> Option<ControllerBinding> {
        lock(&self.bindings).get(class).cloned()
    }

    /// Whether `class` is subscribed.
    pub fn contains(&self, class: &ClassName) -> bool {
        lock(&self.bindings).contains_key(class)
    }

    /// Number of subscribed controllers.
    pub fn len(&self) -> usize {
        lock(&self.bindings).len()
    }

    /// True if no controller is subscribed.
    pub fn is_empty(&self) -> bool {
        lock(&self.bindings).is_empty()
    }

    /// Drop every subscription. Returns how many were dropped.
    pub fn clear(&self, dispatcher: &Dispatcher) -> usize {
        let drained: Vec<(ClassName, ControllerBinding)> = lock(&self.bindings).drain().collect();
        for (class, binding) in &drained {
            dispatcher.unsubscribe(&binding.event, binding.id);
            tracing::debug!(%class, event = %binding.event, "controller unregistered");
        }
        drained.len()
    }
}

impl TransientFactory for ControllerRegistry {
    fn instantiate_transient(
        &self,
        class: &ClassName,
        event: &EventName,
        data: Value,
    ) -> Result<Instance, AtriumError> {
        self.chain.instantiate(
            class,
            ModuleKind::Controller,
            Some(EventArgs::new(event.clone(), data)),
        )
    }
}
