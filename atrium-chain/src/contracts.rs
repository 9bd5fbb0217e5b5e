//! Built-in base contracts.
//!
//! Every Model, Page and Controller chain is rooted at the matching contract
//! here. The Facade contract is the declared parent of the user's facade
//! class.

use crate::page::PageBase;
use atrium_core::capability::{str_arg, str_field};
use atrium_core::kind::{CONTROLLER_BASE, FACADE_BASE, MODEL_BASE};
use atrium_core::sync::lock;
use atrium_core::{
    AtriumError, Capabilities, Class, ClassDescriptor, ClassName, ClassTable, ConstructArgs,
    CreateContext, EventName, Host, ModuleKind,
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex, Weak};

/// Upgrade a host handle, failing once the composition root is gone.
pub(crate) fn upgrade(host: &Weak<dyn Host>) -> Result<Arc<dyn Host>, AtriumError> {
    host.upgrade().ok_or(AtriumError::HostUnavailable)
}

/// Root of every Model chain.
///
/// Holds the model's data payload and seeds `getData` / `setData` into the
/// protected scope of its descendants. Destroying it evicts the model from
/// its registry and releases the payload.
pub struct ModelBase {
    class: ClassName,
    host: Weak<dyn Host>,
    data: Arc<Mutex<Value>>,
}

impl ModelBase {
    /// Construct the contract for the model requested in `args`.
    pub fn new(args: &ConstructArgs) -> Self {
        Self {
            class: args.class().clone(),
            host: args.host().clone(),
            data: Arc::new(Mutex::new(Value::Null)),
        }
    }

    /// Descriptor registered under [`MODEL_BASE`].
    pub fn descriptor() -> ClassDescriptor {
        ClassDescriptor::new(MODEL_BASE, ModelBase::new).with_kind(ModuleKind::Model)
    }
}

impl Class for ModelBase {
    fn on_create(&mut self, _cx: &CreateContext<'_>) -> Result<Capabilities, AtriumError> {
        let read = Arc::clone(&self.data);
        let write = Arc::clone(&self.data);
        Ok(Capabilities::new()
            .with("getData", move |_| Ok(lock(&read).clone()))
            .with("setData", move |value| {
                *lock(&write) = value;
                Ok(Value::Null)
            }))
    }

    fn on_destroy(&mut self) {
        match self.host.upgrade() {
            Some(host) => {
                if let Err(e) = host.evict_model(&self.class) {
                    tracing::warn!(class = %self.class, error = %e, "model eviction failed during destroy");
                }
            }
            None => tracing::warn!(class = %self.class, "model destroyed after its host went away"),
        }
        *lock(&self.data) = Value::Null;
    }
}

/// Root of every Controller chain. Contributes nothing.
pub struct ControllerBase;

impl ControllerBase {
    /// Descriptor registered under [`CONTROLLER_BASE`].
    pub fn descriptor() -> ClassDescriptor {
        ClassDescriptor::new(CONTROLLER_BASE, |_| ControllerBase).with_kind(ModuleKind::Controller)
    }
}

impl Class for ControllerBase {}

/// Parent of the user's facade class.
///
/// Its public capabilities forward to the composition root, so the facade
/// instance can be driven entirely through JSON values.
pub struct FacadeBase {
    host: Weak<dyn Host>,
}

impl FacadeBase {
    /// Construct the contract against the host in `args`.
    pub fn new(args: &ConstructArgs) -> Self {
        Self {
            host: args.host().clone(),
        }
    }

    /// Descriptor registered under [`FACADE_BASE`].
    pub fn descriptor() -> ClassDescriptor {
        ClassDescriptor::new(FACADE_BASE, FacadeBase::new)
    }

    fn bind(
        &self,
        f: fn(&dyn Host, Value) -> Result<Value, AtriumError>,
    ) -> impl Fn(Value) -> Result<Value, AtriumError> + Send + Sync + 'static {
        let host = self.host.clone();
        move |args| f(&*upgrade(&host)?, args)
    }
}

impl Class for FacadeBase {
    fn public(&self) -> Capabilities {
        Capabilities::new()
            .with(
                "publish",
                self.bind(|host, args| {
                    let event = EventName::from(str_field("publish", &args, "event")?);
                    let data = args.get("data").cloned().unwrap_or(Value::Null);
                    Ok(json!(host.publish(&event, data)?.count()))
                }),
            )
            .with(
                "evictModel",
                self.bind(|host, args| {
                    host.evict_model(&ClassName::from(str_arg("evictModel", &args)?))?;
                    Ok(Value::Null)
                }),
            )
            .with(
                "evictPage",
                self.bind(|host, args| {
                    host.evict_page(&ClassName::from(str_arg("evictPage", &args)?))?;
                    Ok(Value::Null)
                }),
            )
            .with(
                "registerController",
                self.bind(|host, args| {
                    let class = ClassName::from(str_field("registerController", &args, "class")?);
                    let event = EventName::from(str_field("registerController", &args, "event")?);
                    host.register_controller(&class, &event)?;
                    Ok(Value::Null)
                }),
            )
            .with(
                "unregisterController",
                self.bind(|host, args| {
                    host.unregister_controller(&ClassName::from(str_arg(
                        "unregisterController",
                        &args,
                    )?))?;
                    Ok(Value::Null)
                }),
            )
    }
}

/// A class table holding only the four base contracts.
pub fn base_contracts() -> Result<ClassTable, AtriumError> {
    let mut table = ClassTable::new();
    install_base_contracts(&mut table)?;
    Ok(table)
}

/// Define the four base contracts in `table`.
///
/// Fails with [`AtriumError::NamespaceConflict`] if the application already
/// defined something under their paths.
pub fn install_base_contracts(table: &mut ClassTable) -> Result<(), AtriumError> {
    table.define(ModelBase::descriptor())?;
    table.define(PageBase::descriptor())?;
    table.define(ControllerBase::descriptor())?;
    table.define(FacadeBase::descriptor())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_core::kind::PAGE_BASE;
    use atrium_core::test_utils::detached;
    use atrium_core::{Instance, ProtectedScope, Supers};

    #[test]
    fn base_contracts_are_all_defined() {
        let table = base_contracts().unwrap();
        let names: Vec<String> = table
            .class_names()
            .into_iter()
            .map(|c| c.as_str().to_owned())
            .collect();
        assert_eq!(names, vec![CONTROLLER_BASE, FACADE_BASE, MODEL_BASE, PAGE_BASE]);
        assert_eq!(table.resolve(MODEL_BASE).unwrap().kind(), ModuleKind::Model);
    }

    #[test]
    fn installing_twice_conflicts() {
        let mut table = base_contracts().unwrap();
        assert!(matches!(
            install_base_contracts(&mut table),
            Err(AtriumError::NamespaceConflict(_))
        ));
    }

    #[test]
    fn model_base_seeds_data_accessors() {
        let args = ConstructArgs::new("app.model.Hi".into(), detached());
        let inst = Instance::new(
            MODEL_BASE.into(),
            ModuleKind::Model,
            ModelBase::descriptor().construct(&args),
            None,
            Supers::default(),
        );
        let protected = inst.create(&ProtectedScope::new()).unwrap().unwrap();
        assert_eq!(protected.call("getData", Value::Null).unwrap(), Value::Null);
        protected.call("setData", json!({"n": 1})).unwrap();
        assert_eq!(protected.call("getData", Value::Null).unwrap(), json!({"n": 1}));

        // Host is gone: destroy still releases the payload.
        assert!(inst.destroy());
        assert_eq!(protected.call("getData", Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn facade_base_without_host_is_unavailable() {
        let args = ConstructArgs::new("app.Facade".into(), detached());
        let public = FacadeBase::new(&args).public();
        let err = public
            .call("publish", json!({"event": "go", "data": 1}))
            .unwrap_err();
        assert!(matches!(err, AtriumError::HostUnavailable));
        assert_eq!(
            public.names().collect::<Vec<_>>(),
            vec![
                "evictModel",
                "evictPage",
                "publish",
                "registerController",
                "unregisterController"
            ]
        );
    }
}
