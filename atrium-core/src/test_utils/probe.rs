//! ProbeClass: a configurable class that records its lifecycle.

use super::call_log::CallLog;
use crate::capability::{Capabilities, ProtectedScope, str_arg};
use crate::class::{Class, ClassDescriptor, ConstructArgs, CreateContext};
use crate::error::AtriumError;
use crate::id::ClassName;
use crate::kind::ModuleKind;
use crate::sync::lock;
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Builder for a class whose levels log to a [`CallLog`]:
///
/// - `new <label> for <requested>` (plus ` on <event> <data>` for controllers)
///   when constructed,
/// - `create <label> sees [<protected names>]` when its create hook runs,
/// - `destroy <label>` when its destroy hook runs.
///
/// Every probe also exposes a public `protected` capability that invokes, by
/// name, a capability from the protected scope it was created with.
#[derive(Debug, Clone)]
pub struct ProbeClass {
    path: ClassName,
    log: CallLog,
    kind: ModuleKind,
    parent: Option<ClassName>,
    public: Vec<(String, Value)>,
    protected: Vec<(String, Value)>,
}

impl ProbeClass {
    /// A probe at `path` logging to `log`.
    pub fn new(path: impl Into<ClassName>, log: &CallLog) -> Self {
        Self {
            path: path.into(),
            log: log.clone(),
            kind: ModuleKind::None,
            parent: None,
            public: Vec::new(),
            protected: Vec::new(),
        }
    }

    /// Declared kind.
    pub fn kind(mut self, kind: ModuleKind) -> Self {
        self.kind = kind;
        self
    }

    /// Declared parent.
    pub fn extends(mut self, parent: impl Into<ClassName>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Expose a public capability returning `value`.
    pub fn public(mut self, name: &str, value: Value) -> Self {
        self.public.push((name.to_owned(), value));
        self
    }

    /// Contribute a protected capability returning `value`.
    pub fn protected(mut self, name: &str, value: Value) -> Self {
        self.protected.push((name.to_owned(), value));
        self
    }

    /// Build the descriptor.
    pub fn descriptor(self) -> ClassDescriptor {
        let ProbeClass {
            path,
            log,
            kind,
            parent,
            public,
            protected,
        } = self;
        let label = path.as_str().to_owned();
        let descriptor = ClassDescriptor::new(path, move |args: &ConstructArgs| {
            Probe::new(&label, &log, args, public.clone(), protected.clone())
        })
        .with_kind(kind);
        match parent {
            Some(parent) => descriptor.extends(parent),
            None => descriptor,
        }
    }
}

struct Probe {
    label: String,
    log: CallLog,
    public: Vec<(String, Value)>,
    protected: Vec<(String, Value)>,
    scope: Arc<Mutex<ProtectedScope>>,
}

impl Probe {
    fn new(
        label: &str,
        log: &CallLog,
        args: &ConstructArgs,
        public: Vec<(String, Value)>,
        protected: Vec<(String, Value)>,
    ) -> Self {
        match args.event() {
            Some(event) => log.push(format!(
                "new {label} for {} on {} {}",
                args.class(),
                event.name,
                event.data
            )),
            None => log.push(format!("new {label} for {}", args.class())),
        }
        Self {
            label: label.to_owned(),
            log: log.clone(),
            public,
            protected,
            scope: Arc::new(Mutex::new(ProtectedScope::new())),
        }
    }
}

fn constants(entries: &[(String, Value)]) -> Capabilities {
    entries.iter().fold(Capabilities::new(), |caps, (name, value)| {
        let value = value.clone();
        caps.with(name.as_str(), move |_| Ok(value.clone()))
    })
}

impl Class for Probe {
    fn public(&self) -> Capabilities {
        let scope = Arc::clone(&self.scope);
        constants(&self.public).with("protected", move |args| {
            let name = str_arg("protected", &args)?;
            let scope = lock(&scope).clone();
            scope.call(name, Value::Null)
        })
    }

    fn on_create(&mut self, cx: &CreateContext<'_>) -> Result<Capabilities, AtriumError> {
        let names: Vec<&str> = cx.protected.names().into_iter().collect();
        self.log
            .push(format!("create {} sees [{}]", self.label, names.join(",")));
        *lock(&self.scope) = cx.protected.clone();
        Ok(constants(&self.protected))
    }

    fn on_destroy(&mut self) {
        self.log.push(format!("destroy {}", self.label));
    }
}
