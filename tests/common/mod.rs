//! Shared fixtures for the integration tests.
//!
//! [`Harness`] wires a root engine to a headless container, a registry that
//! knows [`ScriptedFactory`], a lifecycle log, a counting observer and a
//! delegate that counts empty-stack signals. The host is already started and
//! resumed.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use folio::adapters::mock::{CountingObserver, LifecycleLog, ScriptedFactory};
use folio::adapters::{HeadlessContainer, HeadlessView};
use folio::config::EngineConfig;
use folio::factory::FactoryRegistry;
use folio::page::PageRef;
use folio::stack::StackEngine;
use folio::traits::{ViewProperty, ViewRef};

pub struct Harness {
    pub engine: StackEngine,
    pub container: Rc<RefCell<HeadlessContainer>>,
    pub log: LifecycleLog,
    pub observer: CountingObserver,
    pub empty_signals: Rc<Cell<usize>>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let log = LifecycleLog::new();
        let container = HeadlessContainer::shared();
        let observer = CountingObserver::new();
        let empty_signals = Rc::new(Cell::new(0));

        let mut registry = FactoryRegistry::new();
        ScriptedFactory::register(&mut registry, &log);

        let signals = Rc::clone(&empty_signals);
        let mut engine = StackEngine::new(container.clone())
            .with_config(config)
            .with_registry(registry)
            .with_delegate(move || signals.set(signals.get() + 1));
        engine.add_observer(observer.clone());
        engine.on_start();
        engine.on_resume();

        Self {
            engine,
            container,
            log,
            observer,
            empty_signals,
        }
    }

    pub fn factory(&self, name: &str) -> ScriptedFactory {
        ScriptedFactory::new(name, &self.log)
    }

    /// Push a scripted page and wait for it to settle.
    pub fn push(&mut self, name: &str) -> PageRef {
        let factory = self.factory(name);
        let page = self.engine.push(factory).expect("push failed");
        self.settle();
        page
    }

    pub fn settle(&mut self) {
        settle(&mut self.engine);
    }

    /// Names of the views in the container, back to front.
    pub fn view_names(&self) -> Vec<String> {
        self.container.borrow().view_names()
    }

    pub fn visible_names(&self) -> Vec<String> {
        self.container.borrow().visible_names()
    }
}

/// Tick until idle, failing the test if that takes unreasonably long.
pub fn settle(engine: &mut StackEngine) {
    for _ in 0..32 {
        if engine.tick() {
            return;
        }
    }
    panic!("engine did not settle");
}

/// `focused => visible => mounted` for every entry.
pub fn assert_consistent(engine: &StackEngine) {
    for page in engine.pages() {
        let lifecycle = page.borrow().core().lifecycle();
        assert!(lifecycle.is_consistent(), "inconsistent lifecycle: {lifecycle:?}");
    }
}

/// Only the top entry is visible and focused.
pub fn assert_only_top_focused(engine: &StackEngine) {
    let pages = engine.pages();
    let Some((top, below)) = pages.split_last() else {
        return;
    };
    assert!(top.borrow().core().has_focus(), "top page is not focused");
    for page in below {
        assert!(!page.borrow().core().has_focus(), "covered page holds focus");
        assert!(!page.borrow().core().is_visible(), "covered page is visible");
    }
}

pub fn view_of(page: &PageRef) -> ViewRef {
    page.borrow().core().view().expect("page is not mounted").clone()
}

pub fn property(view: &ViewRef, property: ViewProperty) -> f32 {
    let view = view.borrow();
    view.as_any()
        .downcast_ref::<HeadlessView>()
        .expect("not a headless view")
        .property(property)
}
