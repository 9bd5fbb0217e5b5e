//! RecordingCallback: a callback subscriber that remembers what it got.

use crate::id::EventName;
use crate::subscriber::Subscriber;
use crate::sync::lock;
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Records every `(event, data)` pair it is called with, optionally tagging
/// a shared ordering log so several callbacks can be compared.
#[derive(Debug, Clone, Default)]
pub struct RecordingCallback {
    received: Arc<Mutex<Vec<(EventName, Value)>>>,
}

impl RecordingCallback {
    /// A fresh recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// A subscriber that records into this recorder.
    pub fn subscriber(&self) -> Subscriber {
        let received = Arc::clone(&self.received);
        Subscriber::callback(move |event, data| {
            lock(&received).push((event.clone(), data.clone()));
        })
    }

    /// A subscriber that records here and also pushes `tag` onto `order`.
    pub fn tagged(&self, tag: &str, order: &super::CallLog) -> Subscriber {
        let received = Arc::clone(&self.received);
        let order = order.clone();
        let tag = tag.to_owned();
        Subscriber::callback(move |event, data| {
            order.push(tag.clone());
            lock(&received).push((event.clone(), data.clone()));
        })
    }

    /// Snapshot of everything received.
    pub fn received(&self) -> Vec<(EventName, Value)> {
        lock(&self.received).clone()
    }

    /// Number of calls.
    pub fn calls(&self) -> usize {
        lock(&self.received).len()
    }
}
