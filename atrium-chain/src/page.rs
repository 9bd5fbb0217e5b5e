//! The Page base contract.

use crate::contracts::upgrade;
use atrium_core::capability::{str_arg, str_field};
use atrium_core::kind::PAGE_BASE;
use atrium_core::sync::lock;
use atrium_core::{
    AtriumError, Capabilities, CapabilityResult, Class, ClassDescriptor, ClassName, ConstructArgs,
    CreateContext, EventName, Host, ModuleKind, Subscriber, SubscriptionId, INVALID_SUBSCRIPTION,
};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex, Weak};

/// What a page shows once attached to its stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
struct Display {
    /// Template path the markup came from, if any.
    template: Option<String>,
    /// The markup itself.
    html: String,
}

#[derive(Debug, Default)]
struct PageState {
    stage: Option<String>,
    display: Option<Display>,
}

/// Shared by every capability of one page instance.
#[derive(Clone)]
struct PageHandle {
    class: ClassName,
    host: Weak<dyn Host>,
    state: Arc<Mutex<PageState>>,
}

type Op = fn(&PageHandle, Value) -> CapabilityResult;

impl PageHandle {
    fn bind(&self, op: Op) -> impl Fn(Value) -> CapabilityResult + Send + Sync + 'static {
        let handle = self.clone();
        move |args| op(&handle, args)
    }

    fn host(&self) -> Result<Arc<dyn Host>, AtriumError> {
        upgrade(&self.host)
    }

    /// Whether the display is attached; with `match_stage`, only if it is
    /// attached to this page's own stage.
    fn is_active(&self, match_stage: bool) -> Result<bool, AtriumError> {
        let (stage, has_display) = {
            let state = lock(&self.state);
            (state.stage.clone(), state.display.is_some())
        };
        if !has_display {
            return Ok(false);
        }
        let Some(host) = self.host.upgrade() else {
            return Ok(false);
        };
        let attached = host.stages().stage_of(&self.class);
        Ok(match (attached, match_stage) {
            (None, _) => false,
            (Some(_), false) => true,
            (Some(on), true) => stage.as_deref() == Some(on.as_str()),
        })
    }

    fn show_page(&self, args: Value) -> CapabilityResult {
        let stage = {
            let state = lock(&self.state);
            match (&state.stage, &state.display) {
                (Some(stage), Some(_)) => stage.clone(),
                _ => return Ok(json!(false)),
            }
        };
        if self.is_active(true)? {
            return Ok(json!(false));
        }
        let host = self.host()?;
        if let Some(previous) = host.stages().attach(&stage, &self.class) {
            tracing::debug!(page = %self.class, %stage, replaced = %previous, "page replaced occupant");
        }
        host.history().push(&self.class, args);
        Ok(json!(true))
    }

    fn set_stage(&self, args: Value) -> CapabilityResult {
        let stage = str_arg("setStage", &args)?;
        if stage.is_empty() {
            return Err(AtriumError::invalid_argument("setStage", "stage handle must not be empty"));
        }
        lock(&self.state).stage = Some(stage.to_owned());
        Ok(args)
    }

    fn get_stage(&self, _args: Value) -> CapabilityResult {
        Ok(lock(&self.state).stage.clone().map_or(Value::Null, Value::String))
    }

    fn del_stage(&self, _args: Value) -> CapabilityResult {
        let Some(stage) = lock(&self.state).stage.take() else {
            return Ok(json!(false));
        };
        if let Some(host) = self.host.upgrade() {
            host.stages().detach(&stage, &self.class);
        }
        Ok(json!(true))
    }

    fn set_display(&self, args: Value) -> CapabilityResult {
        let display = match &args {
            Value::String(path) => {
                let text = self.host()?.template(path)?;
                Display {
                    template: Some(path.clone()),
                    html: text.trim().to_owned(),
                }
            }
            Value::Object(_) => Display {
                template: None,
                html: str_field("setDisplay", &args, "html")?.to_owned(),
            },
            _ => {
                return Err(AtriumError::invalid_argument(
                    "setDisplay",
                    "expected a template path or {\"html\": ...}",
                ));
            }
        };
        let value = serde_json::to_value(&display).map_err(|e| AtriumError::Other(Box::new(e)))?;
        lock(&self.state).display = Some(display);
        Ok(value)
    }

    fn get_display(&self, _args: Value) -> CapabilityResult {
        match &lock(&self.state).display {
            Some(display) => serde_json::to_value(display).map_err(|e| AtriumError::Other(Box::new(e))),
            None => Ok(Value::Null),
        }
    }

    fn del_display(&self, _args: Value) -> CapabilityResult {
        if lock(&self.state).display.take().is_none() {
            return Ok(json!(false));
        }
        if let Some(host) = self.host.upgrade() {
            host.stages().detach_everywhere(&self.class);
        }
        Ok(json!(true))
    }

    fn show_history(&self, args: Value) -> CapabilityResult {
        Ok(json!(self.host()?.history().push(&self.class, args)))
    }

    fn navigate(&self, back: bool) -> CapabilityResult {
        let host = self.host()?;
        let entry = if back {
            host.history().back()
        } else {
            host.history().forward()
        };
        let Some(entry) = entry else {
            return Ok(json!(false));
        };
        let page = host.fetch_page(&entry.class)?;
        if page.responds_to("showPage") {
            page.call("showPage", entry.args)?;
        }
        Ok(json!(true))
    }

    fn show_prev_page(&self, _args: Value) -> CapabilityResult {
        self.navigate(true)
    }

    fn show_next_page(&self, _args: Value) -> CapabilityResult {
        self.navigate(false)
    }

    fn prev_page_active(&self, _args: Value) -> CapabilityResult {
        Ok(json!(self.host()?.history().can_go_back()))
    }

    fn next_page_active(&self, _args: Value) -> CapabilityResult {
        Ok(json!(self.host()?.history().can_go_forward()))
    }

    fn get_template(&self, args: Value) -> CapabilityResult {
        let path = str_arg("getTemplate", &args)?;
        Ok(Value::String(self.host()?.template(path)?))
    }

    fn attach_notice(&self, args: Value) -> CapabilityResult {
        let event = EventName::from(str_field("attachNotice", &args, "event")?);
        let subscriber = args.get("subscriber").and_then(Subscriber::from_value);
        let Some(subscriber) = subscriber else {
            tracing::warn!(page = %self.class, %event, "rejected invalid subscriber");
            return Ok(json!(INVALID_SUBSCRIPTION));
        };
        Ok(json!(self.host()?.subscribe(&event, subscriber).as_i64()))
    }

    fn remove_notice(&self, args: Value) -> CapabilityResult {
        let event = EventName::from(str_field("removeNotice", &args, "event")?);
        let id = args
            .get("id")
            .and_then(Value::as_u64)
            .ok_or_else(|| AtriumError::invalid_argument("removeNotice", "expected numeric field `id`"))?;
        Ok(json!(self.host()?.unsubscribe(&event, SubscriptionId(id))))
    }
}

/// Root of every Page chain.
///
/// A page has a stage (where it shows) and a display (what it shows). Public
/// capabilities are `showPage` and `isActive`; everything else is seeded into
/// the protected scope of descendants:
///
/// | Capability | Argument | Result |
/// |------------|----------|--------|
/// | `setStage` | non-empty stage handle | the handle |
/// | `getStage` / `delStage` | none | handle or null / whether one was set |
/// | `setDisplay` | template path, or `{"html": markup}` | the display |
/// | `getDisplay` / `delDisplay` | none | display or null / whether one was set |
/// | `showHistory` | show arguments | whether an entry was recorded |
/// | `showPrevPage` / `showNextPage` | none | whether the cursor moved |
/// | `prevPageActive` / `nextPageActive` | none | whether it can move |
/// | `getTemplate` | template path | template text |
/// | `attachNotice` | `{"event", "subscriber"}` | subscription id, or `-1` |
/// | `removeNotice` | `{"event", "id"}` | whether it was removed |
///
/// Destroying a page evicts it from its registry and clears its display.
pub struct PageBase {
    handle: PageHandle,
}

impl PageBase {
    /// Construct the contract for the page requested in `args`.
    pub fn new(args: &ConstructArgs) -> Self {
        Self {
            handle: PageHandle {
                class: args.class().clone(),
                host: args.host().clone(),
                state: Arc::new(Mutex::new(PageState::default())),
            },
        }
    }

    /// Descriptor registered under [`PAGE_BASE`].
    pub fn descriptor() -> ClassDescriptor {
        ClassDescriptor::new(PAGE_BASE, PageBase::new).with_kind(ModuleKind::Page)
    }
}

impl Class for PageBase {
    fn public(&self) -> Capabilities {
        let h = &self.handle;
        Capabilities::new()
            .with("showPage", h.bind(PageHandle::show_page))
            .with(
                "isActive",
                h.bind(|h, args| Ok(json!(h.is_active(args.as_bool().unwrap_or(false))?))),
            )
    }

    fn on_create(&mut self, _cx: &CreateContext<'_>) -> Result<Capabilities, AtriumError> {
        let h = &self.handle;
        Ok(Capabilities::new()
            .with("setStage", h.bind(PageHandle::set_stage))
            .with("getStage", h.bind(PageHandle::get_stage))
            .with("delStage", h.bind(PageHandle::del_stage))
            .with("setDisplay", h.bind(PageHandle::set_display))
            .with("getDisplay", h.bind(PageHandle::get_display))
            .with("delDisplay", h.bind(PageHandle::del_display))
            .with("showHistory", h.bind(PageHandle::show_history))
            .with("showPrevPage", h.bind(PageHandle::show_prev_page))
            .with("showNextPage", h.bind(PageHandle::show_next_page))
            .with("prevPageActive", h.bind(PageHandle::prev_page_active))
            .with("nextPageActive", h.bind(PageHandle::next_page_active))
            .with("getTemplate", h.bind(PageHandle::get_template))
            .with("attachNotice", h.bind(PageHandle::attach_notice))
            .with("removeNotice", h.bind(PageHandle::remove_notice)))
    }

    fn on_destroy(&mut self) {
        let h = &self.handle;
        lock(&h.state).display = None;
        let Some(host) = h.host.upgrade() else {
            tracing::warn!(page = %h.class, "page destroyed after its host went away");
            return;
        };
        if let Err(e) = host.evict_page(&h.class) {
            tracing::warn!(page = %h.class, error = %e, "page eviction failed during destroy");
        }
        host.stages().detach_everywhere(&h.class);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_core::test_utils::detached;
    use atrium_core::{Instance, ProtectedScope, Supers};

    fn detached_page() -> (Instance, Capabilities) {
        let args = ConstructArgs::new("app.page.Home".into(), detached());
        let inst = Instance::new(
            PAGE_BASE.into(),
            ModuleKind::Page,
            PageBase::descriptor().construct(&args),
            None,
            Supers::default(),
        );
        let protected = inst.create(&ProtectedScope::new()).unwrap().unwrap();
        (inst, protected)
    }

    #[test]
    fn stage_handle_must_be_a_non_empty_string() {
        let (_, protected) = detached_page();
        assert!(matches!(
            protected.call("setStage", json!("")),
            Err(AtriumError::InvalidArgument { .. })
        ));
        assert!(matches!(
            protected.call("setStage", json!(3)),
            Err(AtriumError::InvalidArgument { .. })
        ));
        assert_eq!(protected.call("setStage", json!("body")).unwrap(), json!("body"));
        assert_eq!(protected.call("getStage", Value::Null).unwrap(), json!("body"));
        assert_eq!(protected.call("delStage", Value::Null).unwrap(), json!(true));
        assert_eq!(protected.call("delStage", Value::Null).unwrap(), json!(false));
    }

    #[test]
    fn literal_markup_needs_no_host() {
        let (inst, protected) = detached_page();
        let shown = protected.call("setDisplay", json!({"html": "<p>hi</p>"})).unwrap();
        assert_eq!(shown, json!({"template": null, "html": "<p>hi</p>"}));
        assert_eq!(protected.call("getDisplay", Value::Null).unwrap(), shown);
        // No stage yet, so nothing to show on.
        assert_eq!(inst.call("showPage", Value::Null).unwrap(), json!(false));
        assert_eq!(inst.call("isActive", json!(true)).unwrap(), json!(false));
    }

    #[test]
    fn display_rejects_other_shapes() {
        let (_, protected) = detached_page();
        assert!(matches!(
            protected.call("setDisplay", json!(42)),
            Err(AtriumError::InvalidArgument { .. })
        ));
        assert!(matches!(
            protected.call("setDisplay", json!("html.home")),
            Err(AtriumError::HostUnavailable)
        ));
    }

    #[test]
    fn invalid_notice_subscriber_is_minus_one() {
        let (_, protected) = detached_page();
        let id = protected
            .call("attachNotice", json!({"event": "go", "subscriber": 5}))
            .unwrap();
        assert_eq!(id, json!(-1));
    }
}
