use atrium_core::{
    AtriumError, ClassName, ClassTable, ConstructArgs, EventArgs, Host, Instance, ModuleKind,
    ProtectedScope, Supers,
};
use std::collections::HashSet;
use std::sync::{Arc, Weak};

/// What building one level of a chain produces for the level above it.
#[derive(Debug, Default)]
pub struct Built {
    /// Protected scope of every ancestor, merged.
    pub protected: ProtectedScope,
    /// Public surface of the base, captured for the child's `supers`.
    pub supers: Supers,
    /// The instantiated base the child is built on.
    pub base: Option<Instance>,
}

/// Resolves inheritance chains against a class table.
///
/// Cheap to clone: the table is shared and the host is a weak handle.
#[derive(Clone)]
pub struct ChainBuilder {
    classes: Arc<ClassTable>,
    host: Weak<dyn Host>,
}

impl ChainBuilder {
    /// A builder over `classes`, handing `host` to every constructor.
    pub fn new(classes: Arc<ClassTable>, host: Weak<dyn Host>) -> Self {
        Self { classes, host }
    }

    /// The class table.
    pub fn classes(&self) -> &Arc<ClassTable> {
        &self.classes
    }

    /// The host handed to constructors.
    pub fn host(&self) -> &Weak<dyn Host> {
        &self.host
    }

    /// Arguments for constructing `class` as `kind`. Event arguments are
    /// kept only for controllers.
    pub fn construct_args(
        &self,
        class: &ClassName,
        kind: ModuleKind,
        event: Option<EventArgs>,
    ) -> ConstructArgs {
        let args = ConstructArgs::new(class.clone(), self.host.clone());
        match event {
            Some(event) if kind.forwards_event() => args.with_event(event),
            _ => args,
        }
    }

    /// Build the base that `path` will be constructed on.
    ///
    /// Recurses through declared parents first, so the deepest ancestor is
    /// instantiated and created before anything above it. `visited` spans
    /// the whole resolution; meeting a class twice is a cycle.
    pub fn build(
        &self,
        path: &ClassName,
        kind: ModuleKind,
        visited: &mut HashSet<ClassName>,
        args: &ConstructArgs,
    ) -> Result<Built, AtriumError> {
        if !visited.insert(path.clone()) {
            return Err(AtriumError::CyclicInheritance(path.clone()));
        }
        let descriptor = self.classes.resolve(path.as_str())?;

        let (inherited, base) = match descriptor.parent() {
            Some(parent_path) => {
                let parent = self.build(parent_path, kind, visited, args)?;
                let parent_descriptor = self.classes.resolve(parent_path.as_str())?;
                let base = Instance::new(
                    parent_path.clone(),
                    kind,
                    parent_descriptor.construct(args),
                    parent.base,
                    parent.supers,
                );
                (parent.protected, Some(base))
            }
            None => match kind.base_contract() {
                Some(contract) if contract != path.as_str() => {
                    let contract_descriptor = self.classes.resolve(contract)?;
                    let base = Instance::new(
                        contract_descriptor.name().clone(),
                        kind,
                        contract_descriptor.construct(args),
                        None,
                        Supers::default(),
                    );
                    (ProtectedScope::new(), Some(base))
                }
                _ => (ProtectedScope::new(), None),
            },
        };

        let Some(base) = base else {
            return Ok(Built {
                protected: inherited,
                ..Built::default()
            });
        };

        let supers = Supers::from(base.surface().clone());
        let contribution = base.create(&inherited)?.unwrap_or_default();
        let protected = inherited.layered(base.class().clone(), contribution);
        tracing::debug!(
            class = %path,
            base = %base.class(),
            %kind,
            protected = protected.names().len(),
            supers = supers.len(),
            "chain level built"
        );
        Ok(Built {
            protected,
            supers,
            base: Some(base),
        })
    }

    /// Resolve, build and create a fresh instance of `path` as `kind`.
    ///
    /// Nothing is cached; a failure anywhere in the chain leaves no trace.
    pub fn instantiate(
        &self,
        path: &ClassName,
        kind: ModuleKind,
        event: Option<EventArgs>,
    ) -> Result<Instance, AtriumError> {
        let descriptor = self.classes.resolve(path.as_str())?;
        let args = self.construct_args(path, kind, event);
        let mut visited = HashSet::new();
        let Built {
            protected,
            supers,
            base,
        } = self.build(path, kind, &mut visited, &args)?;
        let instance = Instance::new(path.clone(), kind, descriptor.construct(&args), base, supers);
        instance.create(&protected)?;
        tracing::debug!(class = %path, %kind, depth = visited.len(), "instance created");
        Ok(instance)
    }

    /// Walk the declared parents of `path`, resolving every level.
    ///
    /// Returns the lineage from `path` up to the topmost declared ancestor.
    /// Base contracts are not included: they are implied by the kind.
    pub fn inspect(&self, path: &ClassName) -> Result<Vec<ClassName>, AtriumError> {
        let mut lineage = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(path.clone());
        while let Some(class) = current {
            if !visited.insert(class.clone()) {
                return Err(AtriumError::CyclicInheritance(class));
            }
            let descriptor = self.classes.resolve(class.as_str())?;
            current = descriptor.parent().cloned();
            lineage.push(class);
        }
        Ok(lineage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_core::test_utils::{CallLog, ProbeClass, detached};
    use atrium_core::{ClassDescriptor, Class};
    use serde_json::{Value, json};

    fn builder(table: ClassTable) -> ChainBuilder {
        ChainBuilder::new(Arc::new(table), detached())
    }

    #[test]
    fn plain_class_without_parent_has_no_base() {
        let log = CallLog::new();
        let table = ClassTable::new()
            .with(ProbeClass::new("t.Plain", &log).descriptor())
            .unwrap();
        let inst = builder(table)
            .instantiate(&"t.Plain".into(), ModuleKind::None, None)
            .unwrap();
        assert!(inst.base().is_none());
        assert!(inst.supers().is_empty());
        assert_eq!(log.entries(), vec!["new t.Plain for t.Plain", "create t.Plain sees []"]);
    }

    #[test]
    fn parents_are_created_deepest_first() {
        let log = CallLog::new();
        let table = ClassTable::new()
            .with(ProbeClass::new("t.A", &log).protected("a", json!("a")).descriptor())
            .unwrap()
            .with(ProbeClass::new("t.B", &log).extends("t.A").protected("b", json!("b")).descriptor())
            .unwrap()
            .with(ProbeClass::new("t.C", &log).extends("t.B").descriptor())
            .unwrap();
        let inst = builder(table)
            .instantiate(&"t.C".into(), ModuleKind::None, None)
            .unwrap();
        assert_eq!(
            log.matching("create"),
            vec!["create t.A sees []", "create t.B sees [a]", "create t.C sees [a,b]"]
        );
        let lineage: Vec<&str> = inst.lineage().iter().map(|c| c.as_str()).collect();
        assert_eq!(lineage, vec!["t.C", "t.B", "t.A"]);
    }

    #[test]
    fn construct_args_drop_events_for_non_controllers() {
        let b = builder(ClassTable::new());
        let event = EventArgs::new("go", Value::Null);
        assert!(b
            .construct_args(&"x.Y".into(), ModuleKind::Model, Some(event.clone()))
            .event()
            .is_none());
        assert_eq!(
            b.construct_args(&"x.Y".into(), ModuleKind::Controller, Some(event.clone()))
                .event(),
            Some(&event)
        );
    }

    #[test]
    fn missing_parent_is_class_not_found() {
        struct Plain;
        impl Class for Plain {}
        let table = ClassTable::new()
            .with(ClassDescriptor::new("t.Orphan", |_| Plain).extends("t.Missing"))
            .unwrap();
        let err = builder(table)
            .instantiate(&"t.Orphan".into(), ModuleKind::None, None)
            .unwrap_err();
        assert!(matches!(err, AtriumError::ClassNotFound(p) if p == "t.Missing"));
    }

    #[test]
    fn inspect_reports_lineage_and_cycles() {
        let log = CallLog::new();
        let table = ClassTable::new()
            .with(ProbeClass::new("t.A", &log).descriptor())
            .unwrap()
            .with(ProbeClass::new("t.B", &log).extends("t.A").descriptor())
            .unwrap()
            .with(ProbeClass::new("t.X", &log).extends("t.Y").descriptor())
            .unwrap()
            .with(ProbeClass::new("t.Y", &log).extends("t.X").descriptor())
            .unwrap();
        let b = builder(table);
        let lineage = b.inspect(&"t.B".into()).unwrap();
        assert_eq!(lineage, vec![ClassName::from("t.B"), ClassName::from("t.A")]);
        assert!(matches!(
            b.inspect(&"t.X".into()),
            Err(AtriumError::CyclicInheritance(c)) if c.as_str() == "t.X"
        ));
        assert!(log.entries().is_empty());
    }
}
