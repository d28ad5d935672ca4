//! The stack engine: structural mutations and the scheduling loop.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tokio::sync::mpsc;

use crate::config::{EngineConfig, RetentionPolicy};
use crate::error::{NavError, NavResult};
use crate::factory::{FactoryRegistry, PageFactory};
use crate::page::{lifecycle, EngineContext, PageRef, PageState};
use crate::traits::{ContainerRef, ObserverId, StackChange, StackDelegate, StackObserver, ViewRef};
use crate::transition::{completion_channel, NoTransition, TransitionFactory, TransitionRef};

use super::entry::{EntryId, StackEntry};
use super::host::HostPhase;
use super::navigator::{NavCommand, Navigator};
use super::pending::{PendingOp, PendingTransition};

/// Owns a stack of pages inside one container.
///
/// Mutations update the stack structurally right away and notify observers;
/// the visual transition and the final lifecycle steps follow on later
/// [`tick`](StackEngine::tick)s. Only one mutation may be in flight at a
/// time.
///
/// # Example
///
/// ```ignore
/// let mut engine = StackEngine::new(container)
///     .with_delegate(|| tracing::info!("stack empty"));
/// engine.on_start();
/// engine.on_resume();
///
/// engine.push_with(Inbox::default(), Slide::new(Edge::Right))?;
/// engine.settle().await;
/// ```
pub struct StackEngine {
    pub(super) container: ContainerRef,
    pub(super) delegate: Option<Rc<dyn StackDelegate>>,
    pub(super) registry: Rc<FactoryRegistry>,
    pub(super) config: EngineConfig,
    pub(super) nesting: usize,
    pub(super) entries: Vec<StackEntry>,
    pub(super) retained: HashMap<EntryId, PageState>,
    observers: Vec<(ObserverId, Box<dyn StackObserver>)>,
    next_observer: u64,
    pub(super) pending: Option<PendingTransition>,
    pub(super) phase: HostPhase,
    commands: mpsc::UnboundedReceiver<NavCommand>,
    navigator: Navigator,
    pub(super) destroyed: bool,
}

impl StackEngine {
    /// Root engine with default configuration and registry.
    pub fn new(container: ContainerRef) -> Self {
        Self::build(
            container,
            EngineConfig::default(),
            Rc::new(FactoryRegistry::default()),
            0,
        )
    }

    /// Engine for a page's nested container.
    pub(crate) fn nested_in(container: ContainerRef, context: &EngineContext) -> Self {
        Self::build(
            container,
            context.config.clone(),
            Rc::clone(&context.registry),
            context.nesting + 1,
        )
    }

    fn build(
        container: ContainerRef,
        config: EngineConfig,
        registry: Rc<FactoryRegistry>,
        nesting: usize,
    ) -> Self {
        let (navigator, commands) = Navigator::channel(nesting);
        Self {
            container,
            delegate: None,
            registry,
            config,
            nesting,
            entries: Vec::new(),
            retained: HashMap::new(),
            observers: Vec::new(),
            next_observer: 0,
            pending: None,
            phase: HostPhase::default(),
            commands,
            navigator,
            destroyed: false,
        }
    }

    /// Set the empty-stack delegate.
    pub fn with_delegate<D: StackDelegate + 'static>(mut self, delegate: D) -> Self {
        self.delegate = Some(Rc::new(delegate));
        self
    }

    /// Set the registry used by `restore_state`.
    pub fn with_registry(mut self, registry: impl Into<Rc<FactoryRegistry>>) -> Self {
        self.registry = registry.into();
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    // ---- mutations ----

    /// Push a page with no visible transition.
    pub fn push<F: PageFactory + 'static>(&mut self, factory: F) -> NavResult<PageRef> {
        self.push_boxed(Box::new(factory), None)
    }

    /// Push a page that enters and later leaves with `transition`.
    pub fn push_with<F, T>(&mut self, factory: F, transition: T) -> NavResult<PageRef>
    where
        F: PageFactory + 'static,
        T: TransitionFactory + 'static,
    {
        self.push_boxed(Box::new(factory), Some(Rc::new(transition)))
    }

    /// Push a page built by `factory` on top of the stack.
    ///
    /// The new view is attached at once and observers are notified. The
    /// page becomes visible and focused when the enter transition (and the
    /// exit transition of the page below) completes, at which point the page
    /// below is demoted according to the retention policy.
    ///
    /// # Errors
    ///
    /// [`NavError::InvalidArgument`] for a factory without a kind,
    /// [`NavError::TransitionInFlight`] or [`NavError::Destroyed`].
    pub fn push_boxed(
        &mut self,
        factory: Box<dyn PageFactory>,
        transition: Option<TransitionRef>,
    ) -> NavResult<PageRef> {
        self.ensure_ready("push")?;
        validate_factory(factory.as_ref())?;

        let entry = self.create_entry(factory, transition_or_default(transition), EntryId::new());
        let id = entry.id;
        let page = Rc::clone(&entry.page);
        let outgoing = self.entries.last().map(|e| e.id);

        self.entries.push(entry);
        self.mount_at(self.entries.len() - 1, None);

        tracing::info!(
            nesting = self.nesting,
            entry = %id,
            page = page.borrow().name(),
            size = self.entries.len(),
            "push"
        );
        self.notify();
        self.pending = Some(PendingTransition::new(PendingOp::Push {
            incoming: id,
            outgoing,
        }));
        Ok(page)
    }

    pub fn replace_all<F: PageFactory + 'static>(&mut self, factory: F) -> NavResult<PageRef> {
        self.replace_all_boxed(Box::new(factory), None)
    }

    pub fn replace_all_with<F, T>(&mut self, factory: F, transition: T) -> NavResult<PageRef>
    where
        F: PageFactory + 'static,
        T: TransitionFactory + 'static,
    {
        self.replace_all_boxed(Box::new(factory), Some(Rc::new(transition)))
    }

    /// Destroy every entry, top to bottom, then push.
    ///
    /// The stack is empty for the duration of the call only; observers see
    /// a single change.
    pub fn replace_all_boxed(
        &mut self,
        factory: Box<dyn PageFactory>,
        transition: Option<TransitionRef>,
    ) -> NavResult<PageRef> {
        self.ensure_ready("replace_all")?;
        validate_factory(factory.as_ref())?;

        let removed = self.entries.len();
        while let Some(entry) = self.entries.pop() {
            self.destroy_entry(entry);
        }
        self.retained.clear();
        tracing::info!(nesting = self.nesting, removed, "stack cleared for replace_all");

        self.push_boxed(factory, transition)
    }

    pub fn replace_except_first<F: PageFactory + 'static>(&mut self, factory: F) -> NavResult<PageRef> {
        self.replace_except_first_boxed(Box::new(factory), None)
    }

    pub fn replace_except_first_with<F, T>(&mut self, factory: F, transition: T) -> NavResult<PageRef>
    where
        F: PageFactory + 'static,
        T: TransitionFactory + 'static,
    {
        self.replace_except_first_boxed(Box::new(factory), Some(Rc::new(transition)))
    }

    /// Keep the bottom entry, replace everything above it with one new page.
    ///
    /// Entries strictly between bottom and top are destroyed, the new page is
    /// mounted directly above the bottom entry, and the old top is popped
    /// with its exit transition so the new page is revealed. With one entry
    /// or none this is a plain push.
    pub fn replace_except_first_boxed(
        &mut self,
        factory: Box<dyn PageFactory>,
        transition: Option<TransitionRef>,
    ) -> NavResult<PageRef> {
        self.ensure_ready("replace_except_first")?;
        if self.entries.len() <= 1 {
            return self.push_boxed(factory, transition);
        }
        validate_factory(factory.as_ref())?;

        self.destroy_between();
        let entry = self.create_entry(factory, transition_or_default(transition), EntryId::new());
        let page = Rc::clone(&entry.page);
        tracing::info!(
            nesting = self.nesting,
            entry = %entry.id,
            page = entry.name(),
            "replace_except_first"
        );
        self.entries.insert(1, entry);
        self.mount_at(1, None);

        self.pop_top(true);
        Ok(page)
    }

    /// Return to the bottom entry without a visible transition.
    ///
    /// Entries in between are destroyed, the top entry is popped and the
    /// bottom entry's exit animation is undone. Completes synchronously.
    pub fn go_to_first(&mut self) -> NavResult<()> {
        self.ensure_ready("go_to_first")?;
        if self.entries.len() <= 1 {
            return Ok(());
        }

        self.destroy_between();
        tracing::info!(nesting = self.nesting, "go_to_first");
        self.pop_top(false);
        Ok(())
    }

    /// Pop the top entry.
    ///
    /// With a single entry nothing changes: the delegate is told the stack
    /// would become empty and `Ok(None)` is returned. Otherwise the entry
    /// below is revealed (remounted from its retained state if needed) and
    /// the removed page is returned; it is destroyed when the transition
    /// completes.
    ///
    /// # Errors
    ///
    /// [`NavError::EmptyStack`] on an empty stack.
    pub fn pop(&mut self) -> NavResult<Option<PageRef>> {
        self.ensure_ready("pop")?;
        match self.entries.len() {
            0 => Err(NavError::EmptyStack),
            1 => {
                tracing::info!(nesting = self.nesting, "pop on last entry, signalling empty stack");
                if let Some(delegate) = self.delegate.as_ref() {
                    delegate.on_stack_empty();
                }
                Ok(None)
            }
            _ => Ok(self.pop_top(true)),
        }
    }

    // ---- queries ----

    /// The structurally topmost page.
    pub fn peek_top(&self) -> NavResult<PageRef> {
        self.entries
            .last()
            .map(|entry| Rc::clone(&entry.page))
            .ok_or(NavError::EmptyStack)
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_id(&self) -> Option<EntryId> {
        self.entries.last().map(|entry| entry.id)
    }

    /// Entry ids, bottom to top.
    pub fn entry_ids(&self) -> Vec<EntryId> {
        self.entries.iter().map(|entry| entry.id).collect()
    }

    /// Pages, bottom to top.
    pub fn pages(&self) -> Vec<PageRef> {
        self.entries.iter().map(|entry| Rc::clone(&entry.page)).collect()
    }

    pub fn page(&self, id: EntryId) -> Option<PageRef> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| Rc::clone(&entry.page))
    }

    /// Factory kinds, bottom to top.
    pub fn factory_kinds(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.factory.kind().to_string())
            .collect()
    }

    /// Whether state is being retained for an unmounted entry.
    pub fn has_retained_state(&self, id: EntryId) -> bool {
        self.retained.contains_key(&id)
    }

    pub fn retained_count(&self) -> usize {
        self.retained.len()
    }

    pub fn is_transitioning(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn nesting(&self) -> usize {
        self.nesting
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Rc<FactoryRegistry> {
        &self.registry
    }

    pub fn container(&self) -> &ContainerRef {
        &self.container
    }

    /// Handle for queueing navigation on this engine.
    pub fn navigator(&self) -> Navigator {
        self.navigator.clone()
    }

    // ---- observers ----

    pub fn add_observer<O: StackObserver + 'static>(&mut self, observer: O) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    pub fn clear_observers(&mut self) {
        self.observers.clear();
    }

    pub(super) fn notify(&self) {
        let change = StackChange {
            size: self.entries.len(),
            top: self.top_id(),
            nesting: self.nesting,
        };
        for (_, observer) in &self.observers {
            observer.on_stack_changed(&change);
        }
    }

    // ---- scheduling ----

    /// Run one scheduling turn. Returns true once this engine and every
    /// nested engine below it are idle.
    pub fn tick(&mut self) -> bool {
        if self.destroyed {
            return true;
        }
        self.advance();
        self.tick_nested();
        if self.pending.is_none() {
            self.drain_commands();
        }
        self.is_idle()
    }

    /// Tick every `frame_interval` until idle.
    pub async fn settle(&mut self) {
        let interval = self.config.frame_interval();
        while !self.tick() {
            tokio::time::sleep(interval).await;
        }
    }

    /// No transition in flight here or in any nested engine, and no queued
    /// navigation.
    pub fn is_idle(&self) -> bool {
        if self.destroyed {
            return true;
        }
        if self.pending.is_some() || !self.commands.is_empty() {
            return false;
        }
        self.entries.iter().all(|entry| match entry.page.try_borrow() {
            Ok(page) => page.core().peek_nested().map_or(true, StackEngine::is_idle),
            Err(_) => true,
        })
    }

    fn advance(&mut self) {
        let Some(mut pending) = self.pending.take() else {
            return;
        };

        if pending.awaiting_layout() {
            let waits = self.start_transitions(&pending.op);
            tracing::debug!(
                nesting = self.nesting,
                op = pending.op.name(),
                transitions = waits.len(),
                "transitions started"
            );
            pending.start(waits);
            self.pending = Some(pending);
            return;
        }

        if pending.poll_completion() {
            tracing::debug!(nesting = self.nesting, op = pending.op.name(), "transition complete");
            self.finish(pending.op);
        } else {
            self.pending = Some(pending);
        }
    }

    fn tick_nested(&mut self) {
        for entry in &self.entries {
            // A page borrowed elsewhere is skipped for this turn.
            if let Ok(mut page) = entry.page.try_borrow_mut() {
                if let Some(nested) = page.core_mut().nested_mut() {
                    nested.tick();
                }
            }
        }
    }

    fn drain_commands(&mut self) {
        while self.pending.is_none() && !self.destroyed {
            let Ok(command) = self.commands.try_recv() else {
                break;
            };
            let name = command.name();
            if let Err(err) = self.execute(command) {
                tracing::warn!(
                    nesting = self.nesting,
                    command = name,
                    error = %err,
                    code = err.error_code(),
                    "queued navigation failed"
                );
            }
        }
    }

    fn execute(&mut self, command: NavCommand) -> NavResult<()> {
        match command {
            NavCommand::Push { factory, transition } => self.push_boxed(factory, transition).map(drop),
            NavCommand::Pop => self.pop().map(drop),
            NavCommand::ReplaceAll { factory, transition } => {
                self.replace_all_boxed(factory, transition).map(drop)
            }
            NavCommand::ReplaceExceptFirst { factory, transition } => {
                self.replace_except_first_boxed(factory, transition).map(drop)
            }
            NavCommand::GoToFirst => self.go_to_first(),
        }
    }

    fn start_transitions(&self, op: &PendingOp) -> Vec<tokio::sync::oneshot::Receiver<()>> {
        let mut runs = Vec::with_capacity(2);
        match op {
            PendingOp::Push { incoming, outgoing } => {
                if let Some(entry) = self.entry(*incoming) {
                    if let Some(view) = entry.view() {
                        runs.push(entry.transitions.create_enter(&view));
                    }
                }
                if let Some(entry) = outgoing.and_then(|id| self.entry(id)) {
                    if let Some(view) = entry.view() {
                        runs.push(entry.transitions.create_exit(&view));
                    }
                }
            }
            PendingOp::Pop { incoming, outgoing } => {
                if let Some(view) = outgoing.view() {
                    runs.push(outgoing.transitions.create_exit(&view));
                }
                if let Some(entry) = self.entry(*incoming) {
                    if let Some(view) = entry.view() {
                        runs.push(entry.transitions.create_enter(&view));
                    }
                }
            }
        }

        runs.into_iter()
            .map(|transition| {
                let (done, rx) = completion_channel();
                transition.run(done);
                rx
            })
            .collect()
    }

    fn finish(&mut self, op: PendingOp) {
        match op {
            PendingOp::Push { incoming, outgoing } => {
                if let Some(outgoing) = outgoing {
                    self.demote(outgoing);
                }
                self.promote(incoming);
            }
            PendingOp::Pop { incoming, outgoing } => {
                self.destroy_entry(outgoing);
                self.promote(incoming);
            }
        }
    }

    // ---- entry plumbing ----

    pub(crate) fn context(&self) -> EngineContext {
        EngineContext {
            navigator: self.navigator.clone(),
            config: self.config.clone(),
            registry: Rc::clone(&self.registry),
            nesting: self.nesting,
        }
    }

    pub(super) fn create_entry(
        &self,
        factory: Box<dyn PageFactory>,
        transitions: TransitionRef,
        id: EntryId,
    ) -> StackEntry {
        let page = factory.create_page();
        lifecycle::create(&mut *page.borrow_mut(), id, self.context());
        StackEntry {
            id,
            factory,
            page,
            transitions,
        }
    }

    fn entry(&self, id: EntryId) -> Option<&StackEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Mount the entry at `index`, placing its view above every mounted
    /// entry below it.
    pub(super) fn mount_at(&mut self, index: usize, state: Option<PageState>) -> Option<ViewRef> {
        let slot = self.entries[..index]
            .iter()
            .filter(|entry| entry.is_mounted())
            .count();
        let entry = self.entries.get(index)?;
        let mut page = entry.page.borrow_mut();
        lifecycle::mount(&mut *page, &self.container, slot, state)
    }

    /// Unmount and destroy an entry that has left the stack.
    pub(super) fn destroy_entry(&mut self, entry: StackEntry) {
        self.retained.remove(&entry.id);
        let mut page = entry.page.borrow_mut();
        lifecycle::unmount(&mut *page, &self.container, false);
        lifecycle::destroy(&mut *page);
    }

    /// Destroy every entry strictly between bottom and top, top-most first.
    fn destroy_between(&mut self) {
        let len = self.entries.len();
        if len <= 2 {
            return;
        }
        for index in (1..len - 1).rev() {
            let entry = self.entries.remove(index);
            self.destroy_entry(entry);
        }
    }

    /// Remove the top entry and reveal the one below.
    ///
    /// Animated pops leave a pending transition; otherwise the exit of the
    /// revealed entry is undone and the pop finishes immediately.
    fn pop_top(&mut self, animated: bool) -> Option<PageRef> {
        if self.entries.len() < 2 {
            return None;
        }
        let outgoing = self.entries.pop()?;
        self.retained.remove(&outgoing.id);

        let index = self.entries.len() - 1;
        let incoming = self.entries[index].id;
        let view = self.reveal(index);
        let removed = Rc::clone(&outgoing.page);

        tracing::info!(
            nesting = self.nesting,
            entry = %outgoing.id,
            page = outgoing.name(),
            size = self.entries.len(),
            animated,
            "pop"
        );
        self.notify();

        let op = PendingOp::Pop { incoming, outgoing };
        if animated {
            self.pending = Some(PendingTransition::new(op));
        } else {
            if let Some(view) = view.as_ref() {
                self.entries[index].transitions.undo_exit(view);
            }
            self.finish(op);
        }
        Some(removed)
    }

    /// Make the entry at `index` visible again, remounting it from retained
    /// state if it was unmounted.
    fn reveal(&mut self, index: usize) -> Option<ViewRef> {
        let entry = self.entries.get(index)?;
        let view = if entry.is_mounted() {
            entry.view()
        } else {
            let state = self.retained.remove(&entry.id);
            self.mount_at(index, state)
        };
        if let Some(view) = view.as_ref() {
            view.borrow_mut().set_visible(true);
        }
        view
    }

    pub(super) fn promote(&mut self, id: EntryId) {
        if let Some(entry) = self.entry(id) {
            lifecycle::promote(&mut *entry.page.borrow_mut(), self.phase);
        }
    }

    /// Take a covered entry out of sight according to the retention policy.
    fn demote(&mut self, id: EntryId) {
        let Some(page) = self.entry(id).map(|entry| Rc::clone(&entry.page)) else {
            return;
        };
        let mut page = page.borrow_mut();
        lifecycle::hide(&mut *page);

        match self.config.retention {
            RetentionPolicy::UnmountAndRetain => {
                if let Some(state) = lifecycle::unmount(&mut *page, &self.container, true) {
                    self.retained.insert(id, state);
                }
            }
            RetentionPolicy::KeepMounted => {
                if let Ok(view) = page.core().view() {
                    view.borrow_mut().set_visible(false);
                }
            }
        }
    }

    pub(super) fn ensure_ready(&self, operation: &'static str) -> NavResult<()> {
        if self.destroyed {
            return Err(NavError::Destroyed);
        }
        if self.pending.is_some() {
            return Err(NavError::TransitionInFlight { operation });
        }
        Ok(())
    }
}

fn validate_factory(factory: &dyn PageFactory) -> NavResult<()> {
    if factory.kind().trim().is_empty() {
        return Err(NavError::invalid("page factory has an empty kind"));
    }
    Ok(())
}

fn transition_or_default(transition: Option<TransitionRef>) -> TransitionRef {
    transition.unwrap_or_else(|| Rc::new(NoTransition))
}

impl fmt::Debug for StackEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackEngine")
            .field("nesting", &self.nesting)
            .field("entries", &self.entries)
            .field("retained", &self.retained.len())
            .field("pending", &self.pending.as_ref().map(|p| p.op.name()))
            .field("phase", &self.phase)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}
