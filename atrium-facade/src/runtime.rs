//! The composition root behind a [`Facade`](crate::Facade).

use crate::config::AtriumConfig;
use atrium_broadcast::Dispatcher;
use atrium_chain::ChainBuilder;
use atrium_core::{
    AtriumError, ClassName, ClassTable, EventName, Host, Instance, ModuleKind, PageHistory,
    Published, StageBoard, Subscriber, SubscriptionId, TemplateSource,
};
use atrium_registry::{ControllerRegistry, ModuleRegistry};
use serde_json::Value;
use std::sync::{Arc, Weak};

/// Owns every registry, the dispatcher, the class table, the template
/// source, the stage board and the page history.
///
/// Instances built here receive a `Weak` handle to the runtime as their
/// [`Host`]. Dropping the last `Arc<Runtime>` drops every cached instance
/// without running destroy hooks; call [`shutdown`](Self::shutdown) first to
/// run them.
pub struct Runtime {
    classes: Arc<ClassTable>,
    templates: Arc<dyn TemplateSource>,
    chain: ChainBuilder,
    models: ModuleRegistry,
    pages: ModuleRegistry,
    controllers: ControllerRegistry,
    dispatcher: Dispatcher,
    stages: StageBoard,
    history: PageHistory,
}

impl Runtime {
    /// Build a runtime over a fully populated class table.
    pub fn new(
        classes: ClassTable,
        templates: Arc<dyn TemplateSource>,
        config: &AtriumConfig,
    ) -> Arc<Self> {
        let classes = Arc::new(classes);
        Arc::new_cyclic(|runtime: &Weak<Runtime>| {
            let host: Weak<dyn Host> = runtime.clone();
            let chain = ChainBuilder::new(Arc::clone(&classes), host);
            Self {
                models: ModuleRegistry::new(ModuleKind::Model, chain.clone()),
                pages: ModuleRegistry::new(ModuleKind::Page, chain.clone()),
                controllers: ControllerRegistry::new(chain.clone()),
                chain,
                classes,
                templates,
                dispatcher: Dispatcher::new(),
                stages: StageBoard::new(),
                history: PageHistory::with_limit(config.history_limit),
            }
        })
    }

    /// The class table.
    pub fn classes(&self) -> &ClassTable {
        &self.classes
    }

    /// The chain builder every registry uses.
    pub fn chain(&self) -> &ChainBuilder {
        &self.chain
    }

    /// The Model registry.
    pub fn models(&self) -> &ModuleRegistry {
        &self.models
    }

    /// The Page registry.
    pub fn pages(&self) -> &ModuleRegistry {
        &self.pages
    }

    /// The controller subscription table.
    pub fn controllers(&self) -> &ControllerRegistry {
        &self.controllers
    }

    /// The broadcast dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Evict every Page and Model, running their destroy hooks, and drop
    /// every controller subscription.
    pub fn shutdown(&self) {
        let pages = self.pages.clear();
        let models = self.models.clear();
        let controllers = self.controllers.clear(&self.dispatcher);
        tracing::info!(pages, models, controllers, "runtime shut down");
    }
}

impl Host for Runtime {
    fn fetch_model(&self, class: &ClassName) -> Result<Arc<Instance>, AtriumError> {
        self.models.fetch_or_create(class)
    }

    fn fetch_page(&self, class: &ClassName) -> Result<Arc<Instance>, AtriumError> {
        self.pages.fetch_or_create(class)
    }

    fn evict_model(&self, class: &ClassName) -> Result<(), AtriumError> {
        self.models.evict(class).map(drop)
    }

    fn evict_page(&self, class: &ClassName) -> Result<(), AtriumError> {
        self.pages.evict(class).map(drop)
    }

    fn register_controller(&self, class: &ClassName, event: &EventName) -> Result<(), AtriumError> {
        self.controllers
            .subscribe(class, event, &self.dispatcher)
            .map(drop)
    }

    fn unregister_controller(&self, class: &ClassName) -> Result<(), AtriumError> {
        self.controllers.unsubscribe(class, &self.dispatcher).map(drop)
    }

    fn publish(&self, event: &EventName, data: Value) -> Result<Published, AtriumError> {
        self.dispatcher.publish(event, data, &self.controllers)
    }

    fn subscribe(&self, event: &EventName, subscriber: Subscriber) -> SubscriptionId {
        self.dispatcher.subscribe(event, subscriber)
    }

    fn unsubscribe(&self, event: &EventName, id: SubscriptionId) -> bool {
        self.dispatcher.unsubscribe(event, id)
    }

    fn construct(&self, class: &ClassName, kind: Option<ModuleKind>) -> Result<Instance, AtriumError> {
        let kind = match kind {
            Some(kind) => kind,
            None => self.classes.resolve(class.as_str())?.kind(),
        };
        self.chain.instantiate(class, kind, None)
    }

    fn template(&self, path: &str) -> Result<String, AtriumError> {
        self.templates
            .template(path)
            .ok_or_else(|| AtriumError::TemplateNotFound(path.to_owned()))
    }

    fn history(&self) -> &PageHistory {
        &self.history
    }

    fn stages(&self) -> &StageBoard {
        &self.stages
    }
}
