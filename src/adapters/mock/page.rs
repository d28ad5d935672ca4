//! Scripted pages for lifecycle assertions.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::adapters::{HeadlessContainer, HeadlessView};
use crate::factory::{FactoryRegistry, PageFactory};
use crate::page::{page_ref, Page, PageCore, PageRef, PageState};
use crate::traits::{ContainerRef, ViewRef};

/// A lifecycle hook invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Created,
    Mounted,
    Restored,
    Visible,
    Focused,
    FocusLost,
    Invisible,
    Saved,
    Unmounted,
    Destroyed,
}

/// Shared, ordered record of lifecycle events across many pages.
#[derive(Debug, Clone, Default)]
pub struct LifecycleLog {
    events: Rc<RefCell<Vec<(String, LifecycleEvent)>>>,
}

impl LifecycleLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, page: &str, event: LifecycleEvent) {
        self.events.borrow_mut().push((page.to_string(), event));
    }

    /// Every event, in order.
    pub fn all(&self) -> Vec<(String, LifecycleEvent)> {
        self.events.borrow().clone()
    }

    /// Events of the pages named `page`, in order.
    pub fn events_for(&self, page: &str) -> Vec<LifecycleEvent> {
        self.events
            .borrow()
            .iter()
            .filter(|(name, _)| name == page)
            .map(|(_, event)| *event)
            .collect()
    }

    pub fn count(&self, page: &str, event: LifecycleEvent) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|(name, e)| name == page && *e == event)
            .count()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

/// Factory for [`ScriptedPage`]s.
///
/// Serializes its name and nested seed; the log is re-attached by the
/// constructor registered with [`ScriptedFactory::register`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedFactory {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_seed: Option<String>,
    #[serde(skip)]
    log: LifecycleLog,
}

impl ScriptedFactory {
    pub const KIND: &'static str = "scripted";

    pub fn new(name: impl Into<String>, log: &LifecycleLog) -> Self {
        Self {
            name: name.into(),
            nested_seed: None,
            log: log.clone(),
        }
    }

    /// Pages host a nested stack seeded with a page named `seed` on first
    /// mount.
    pub fn with_nested_seed(mut self, seed: impl Into<String>) -> Self {
        self.nested_seed = Some(seed.into());
        self
    }

    /// Make the kind restorable, logging into `log`.
    pub fn register(registry: &mut FactoryRegistry, log: &LifecycleLog) {
        let log = log.clone();
        registry.register_fn(Self::KIND, move |args: &Value| {
            let mut factory: ScriptedFactory = serde_json::from_value(args.clone())?;
            factory.log = log.clone();
            Ok(Box::new(factory) as Box<dyn PageFactory>)
        });
    }
}

impl PageFactory for ScriptedFactory {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn create_page(&self) -> PageRef {
        page_ref(ScriptedPage {
            core: PageCore::new(),
            name: self.name.clone(),
            nested_seed: self.nested_seed.clone(),
            nested_container: None,
            visits: 0,
            log: self.log.clone(),
        })
    }

    fn to_args(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Page that logs its lifecycle and counts how often it became visible.
///
/// The visit count is saved as the `visits` page value and restored on
/// remount.
pub struct ScriptedPage {
    core: PageCore,
    name: String,
    nested_seed: Option<String>,
    nested_container: Option<ContainerRef>,
    visits: u32,
    log: LifecycleLog,
}

impl ScriptedPage {
    fn record(&self, event: LifecycleEvent) {
        self.log.record(&self.name, event);
    }
}

impl Page for ScriptedPage {
    fn core(&self) -> &PageCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut PageCore {
        &mut self.core
    }

    fn create_view(&mut self, _container: &ContainerRef) -> ViewRef {
        if self.nested_seed.is_some() {
            self.nested_container = Some(HeadlessContainer::new_ref());
        }
        HeadlessView::new_ref(self.name.clone())
    }

    fn on_create(&mut self) {
        self.record(LifecycleEvent::Created);
    }

    fn on_mounted(&mut self, _view: &ViewRef) {
        self.record(LifecycleEvent::Mounted);

        let (Some(seed), Some(container)) = (self.nested_seed.clone(), self.nested_container.clone()) else {
            return;
        };
        let log = self.log.clone();
        match self.core.nested_engine(container) {
            Ok(nested) if nested.is_empty() => {
                if let Err(err) = nested.push(ScriptedFactory::new(seed, &log)) {
                    tracing::warn!(error = %err, "failed to seed nested stack");
                }
            }
            Ok(_) => {}
            Err(err) => tracing::warn!(error = %err, "nested stack unavailable"),
        }
    }

    fn on_restore_state(&mut self, state: &PageState) {
        self.visits = state.get("visits").unwrap_or(0);
        self.record(LifecycleEvent::Restored);
    }

    fn on_visible(&mut self) {
        self.visits += 1;
        self.record(LifecycleEvent::Visible);
    }

    fn on_focus(&mut self) {
        self.record(LifecycleEvent::Focused);
    }

    fn on_focus_lost(&mut self) {
        self.record(LifecycleEvent::FocusLost);
    }

    fn on_invisible(&mut self) {
        self.record(LifecycleEvent::Invisible);
    }

    fn on_save_state(&mut self, state: &mut PageState) {
        if let Err(err) = state.put("visits", &self.visits) {
            tracing::warn!(error = %err, "failed to save visit count");
        }
        self.record(LifecycleEvent::Saved);
    }

    fn on_unmounted(&mut self) {
        self.nested_container = None;
        self.record(LifecycleEvent::Unmounted);
    }

    fn on_destroy(&mut self) {
        self.record(LifecycleEvent::Destroyed);
    }
}
