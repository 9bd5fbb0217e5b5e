//! Broadcast subscribers, subscription ids and publish outcomes.

use crate::id::{ClassName, EventName};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Returned in place of an id when a subscriber is neither a callback nor a
/// controller class name.
pub const INVALID_SUBSCRIPTION: i64 = -1;

/// Identifier of one subscription. Allocated from a single counter, so ids
/// are unique across every event and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

impl SubscriptionId {
    /// The raw id.
    pub fn get(self) -> u64 {
        self.0
    }

    /// The id as the signed number the JSON-facing capabilities return.
    pub fn as_i64(self) -> i64 {
        i64::try_from(self.0).unwrap_or(i64::MAX)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

type CallbackFn = dyn Fn(&EventName, &Value) + Send + Sync;

/// Something that receives broadcasts.
#[derive(Clone)]
pub enum Subscriber {
    /// Invoked directly with the event name and data.
    Callback(Arc<CallbackFn>),
    /// A controller class, constructed fresh for every dispatch and then
    /// dropped.
    Controller(ClassName),
}

impl Subscriber {
    /// A callback subscriber.
    pub fn callback(f: impl Fn(&EventName, &Value) + Send + Sync + 'static) -> Self {
        Subscriber::Callback(Arc::new(f))
    }

    /// A controller subscriber.
    pub fn controller(class: impl Into<ClassName>) -> Self {
        Subscriber::Controller(class.into())
    }

    /// Interpret a JSON value as a subscriber. Callbacks cannot be written
    /// as JSON, so only a class-name string is accepted.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(class) if !class.is_empty() => Some(Subscriber::controller(class.as_str())),
            _ => None,
        }
    }
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subscriber::Callback(_) => f.write_str("Callback(..)"),
            Subscriber::Controller(class) => f.debug_tuple("Controller").field(class).finish(),
        }
    }
}

/// Outcome of a publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Published {
    /// Nobody ever subscribed to the event.
    UnknownEvent,
    /// The event is known; this many subscribers were dispatched to (possibly
    /// zero, if all of them have since unsubscribed).
    Delivered(usize),
}

impl Published {
    /// The dispatch count, with `-1` for an unknown event.
    pub fn count(self) -> i64 {
        match self {
            Published::UnknownEvent => -1,
            Published::Delivered(n) => i64::try_from(n).unwrap_or(i64::MAX),
        }
    }
}
