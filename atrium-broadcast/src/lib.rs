#![deny(missing_docs)]
//! Broadcast dispatcher for atrium.
//!
//! The [`Dispatcher`] keeps an event-name keyed table of subscribers. A
//! subscriber is either a callback, invoked directly, or a controller class
//! name, for which a fresh instance is built through a [`TransientFactory`]
//! on every dispatch and dropped afterwards. Subscribers run in ascending
//! subscription-id order.
//!
//! An event becomes known the first time anything subscribes to it and stays
//! known after every subscriber is removed, so publishing to it reports `0`
//! rather than "unknown".

use atrium_core::sync::lock;
use atrium_core::{AtriumError, ClassName, EventName, Instance, Published, Subscriber, SubscriptionId};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Builds the throwaway controller instance a class-name subscriber
/// dispatches to.
pub trait TransientFactory {
    /// Build a fresh, uncached instance of controller `class` with the
    /// event arguments forwarded to every level of its chain.
    fn instantiate_transient(
        &self,
        class: &ClassName,
        event: &EventName,
        data: Value,
    ) -> Result<Instance, AtriumError>;
}

/// Event name → (subscription id → subscriber).
pub struct Dispatcher {
    observers: Mutex<HashMap<EventName, BTreeMap<SubscriptionId, Subscriber>>>,
    last_id: AtomicU64,
}

impl Dispatcher {
    /// Create a dispatcher with no known events.
    pub fn new() -> Self {
        Self {
            observers: Mutex::new(HashMap::new()),
            last_id: AtomicU64::new(0),
        }
    }

    /// Add `subscriber` to `event`, returning its id. Ids start at 1 and
    /// are never reused.
    pub fn subscribe(&self, event: &EventName, subscriber: Subscriber) -> SubscriptionId {
        let id = SubscriptionId(self.last_id.fetch_add(1, Ordering::Relaxed) + 1);
        tracing::debug!(%event, %id, ?subscriber, "subscription added");
        lock(&self.observers)
            .entry(event.clone())
            .or_default()
            .insert(id, subscriber);
        id
    }

    /// Subscribe a subscriber given as JSON. Only a non-empty class-name
    /// string is accepted; anything else is rejected with `None` and
    /// leaves the table untouched.
    pub fn subscribe_value(&self, event: &EventName, subscriber: &Value) -> Option<SubscriptionId> {
        match Subscriber::from_value(subscriber) {
            Some(subscriber) => Some(self.subscribe(event, subscriber)),
            None => {
                tracing::warn!(%event, %subscriber, "rejected invalid subscriber");
                None
            }
        }
    }

    /// Remove subscription `id` from `event`. Returns whether it existed.
    pub fn unsubscribe(&self, event: &EventName, id: SubscriptionId) -> bool {
        let removed = lock(&self.observers)
            .get_mut(event)
            .is_some_and(|subscribers| subscribers.remove(&id).is_some());
        if removed {
            tracing::debug!(%event, %id, "subscription removed");
        }
        removed
    }

    /// Publish `data` under `event`.
    ///
    /// Subscribers are snapshotted before the first dispatch, so they may
    /// subscribe, unsubscribe or publish re-entrantly; changes take effect
    /// from the next publish. A controller that fails to build aborts the
    /// publish with its error.
    pub fn publish(
        &self,
        event: &EventName,
        data: Value,
        factory: &dyn TransientFactory,
    ) -> Result<Published, AtriumError> {
        let snapshot: Vec<(SubscriptionId, Subscriber)> = {
            let observers = lock(&self.observers);
            let Some(subscribers) = observers.get(event) else {
                tracing::trace!(%event, "publish to unknown event");
                return Ok(Published::UnknownEvent);
            };
            subscribers
                .iter()
                .map(|(id, subscriber)| (*id, subscriber.clone()))
                .collect()
        };

        for (id, subscriber) in &snapshot {
            tracing::trace!(%event, %id, ?subscriber, "dispatching");
            match subscriber {
                Subscriber::Callback(callback) => callback(event, &data),
                Subscriber::Controller(class) => {
                    let transient = factory.instantiate_transient(class, event, data.clone())?;
                    drop(transient);
                }
            }
        }
        Ok(Published::Delivered(snapshot.len()))
    }

    /// Current number of subscribers to `event`.
    pub fn subscriber_count(&self, event: &EventName) -> usize {
        lock(&self.observers).get(event).map_or(0, BTreeMap::len)
    }

    /// Whether anything has ever subscribed to `event`.
    pub fn is_known(&self, event: &EventName) -> bool {
        lock(&self.observers).contains_key(event)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_core::test_utils::RecordingCallback;
    use serde_json::json;

    struct NoControllers;

    impl TransientFactory for NoControllers {
        fn instantiate_transient(
            &self,
            class: &ClassName,
            _event: &EventName,
            _data: Value,
        ) -> Result<Instance, AtriumError> {
            Err(AtriumError::ClassNotFound(class.to_string()))
        }
    }

    #[test]
    fn ids_start_at_one_and_span_events() {
        let d = Dispatcher::new();
        let rec = RecordingCallback::new();
        assert_eq!(d.subscribe(&"a".into(), rec.subscriber()), SubscriptionId(1));
        assert_eq!(d.subscribe(&"b".into(), rec.subscriber()), SubscriptionId(2));
        assert_eq!(d.subscribe(&"a".into(), rec.subscriber()), SubscriptionId(3));
    }

    #[test]
    fn unknown_then_known_empty() {
        let d = Dispatcher::new();
        let ev = EventName::from("e");
        assert_eq!(d.publish(&ev, Value::Null, &NoControllers).unwrap(), Published::UnknownEvent);
        let id = d.subscribe(&ev, RecordingCallback::new().subscriber());
        assert!(d.unsubscribe(&ev, id));
        assert!(!d.unsubscribe(&ev, id));
        assert!(d.is_known(&ev));
        assert_eq!(d.publish(&ev, json!(1), &NoControllers).unwrap().count(), 0);
    }

    #[test]
    fn invalid_json_subscriber_is_rejected() {
        let d = Dispatcher::new();
        let ev = EventName::from("e");
        assert!(d.subscribe_value(&ev, &json!(7)).is_none());
        assert!(!d.is_known(&ev));
        assert_eq!(d.subscribe_value(&ev, &json!("app.contro.Go")), Some(SubscriptionId(1)));
    }

    #[test]
    fn failing_controller_aborts_publish() {
        let d = Dispatcher::new();
        let ev = EventName::from("e");
        d.subscribe(&ev, Subscriber::controller("app.contro.Missing"));
        let err = d.publish(&ev, Value::Null, &NoControllers).unwrap_err();
        assert!(matches!(err, AtriumError::ClassNotFound(_)));
    }
}
