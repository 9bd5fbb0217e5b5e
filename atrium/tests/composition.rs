//! Composition through the umbrella prelude.
//!
//! A counter model is incremented by a controller on every `tick` event; a
//! plain callback observes the same event.

use atrium::prelude::*;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

/// Exposes `increment` and `value` over the model payload.
struct Counter {
    scope: Arc<std::sync::OnceLock<ProtectedScope>>,
}

impl Class for Counter {
    fn public(&self) -> Capabilities {
        let inc = Arc::clone(&self.scope);
        let get = Arc::clone(&self.scope);
        Capabilities::new()
            .with("increment", move |_| {
                let scope = inc
                    .get()
                    .ok_or_else(|| AtriumError::capability_not_found("setData"))?;
                let n = scope.call("getData", Value::Null)?.as_u64().unwrap_or(0) + 1;
                scope.call("setData", json!(n))?;
                Ok(json!(n))
            })
            .with("value", move |_| match get.get() {
                Some(scope) => scope.call("getData", Value::Null),
                None => Ok(Value::Null),
            })
    }

    fn on_create(&mut self, cx: &CreateContext<'_>) -> Result<Capabilities, AtriumError> {
        cx.protected.call("setData", json!(0))?;
        let _ = self.scope.set(cx.protected.clone());
        Ok(Capabilities::new())
    }
}

/// Increments the counter by the amount carried in the event data.
struct Tick {
    host: Weak<dyn Host>,
    times: u64,
}

impl Class for Tick {
    fn on_create(&mut self, _cx: &CreateContext<'_>) -> Result<Capabilities, AtriumError> {
        let host = self.host.upgrade().ok_or(AtriumError::HostUnavailable)?;
        let counter = host.fetch_model(&"demo.model.Counter".into())?;
        for _ in 0..self.times {
            counter.call("increment", Value::Null)?;
        }
        Ok(Capabilities::new())
    }
}

struct Main;
impl Class for Main {}

fn facade() -> Facade {
    let mut classes = ClassTable::new();
    classes
        .define(ClassDescriptor::new("demo.Main", |_| Main))
        .unwrap();
    classes
        .define(ClassDescriptor::new("demo.model.Counter", |_| Counter {
            scope: Arc::default(),
        }))
        .unwrap();
    classes
        .define(
            ClassDescriptor::new("demo.contro.Tick", |args| Tick {
                host: args.host().clone(),
                times: args
                    .event()
                    .and_then(|e| e.data.as_u64())
                    .unwrap_or(1),
            })
            .with_kind(ModuleKind::Controller),
        )
        .unwrap();
    let config = AtriumConfig::default().with_facade_class("demo.Main");
    Facade::new(classes, (), config).unwrap()
}

#[test]
fn controller_and_callback_share_an_event() {
    let facade = facade();
    facade.startup().unwrap();
    assert!(facade.register_controller("demo.contro.Tick", "tick").unwrap());

    let seen = Arc::new(AtomicUsize::new(0));
    let observer = Arc::clone(&seen);
    facade.subscribe(
        "tick",
        Subscriber::callback(move |_, _| {
            observer.fetch_add(1, Ordering::SeqCst);
        }),
    );

    assert_eq!(facade.publish("tick", json!(2)).unwrap().count(), 2);
    assert_eq!(facade.publish("tick", json!(3)).unwrap().count(), 2);

    let counter = facade.fetch_model("demo.model.Counter").unwrap();
    assert_eq!(counter.call("value", Value::Null).unwrap(), json!(5));
    assert_eq!(seen.load(Ordering::SeqCst), 2);
}

#[test]
fn evicted_counter_starts_over() {
    let facade = facade();
    facade.register_controller("demo.contro.Tick", "tick").unwrap();
    facade.publish("tick", json!(4)).unwrap();
    assert!(facade.evict_model("demo.model.Counter").unwrap());
    facade.publish("tick", Value::Null).unwrap();
    let counter = facade.fetch_model("demo.model.Counter").unwrap();
    assert_eq!(counter.call("value", Value::Null).unwrap(), json!(1));
}
