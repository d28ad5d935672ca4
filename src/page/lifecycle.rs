//! Page lifecycle state machine.
//!
//! The engine drives pages only through the functions in this module. Each
//! one updates the flags in [`Lifecycle`], forwards the matching host
//! transition to the page's nested engine, and then runs the page hook.
//! Calling a function that does not apply to the current state is a no-op,
//! so the engine can be generous in what it asks for.

use std::rc::Rc;

use crate::stack::{EntryId, HostPhase};
use crate::traits::{ContainerRef, ViewRef};

use super::{EngineContext, Page, PageState};

/// Coarse lifecycle position of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// Constructed and attached to an engine, with no view.
    #[default]
    Created,
    /// The view exists but is not yet in the container.
    ViewBound,
    /// The view is in the container.
    Mounted,
    /// Teardown of the view is in progress.
    Unmounting,
    /// Terminal.
    Destroyed,
}

/// Lifecycle flags of a page.
///
/// `focused` implies `visible`, which implies `Mounted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Lifecycle {
    state: LifecycleState,
    visible: bool,
    focused: bool,
}

impl Lifecycle {
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_mounted(&self) -> bool {
        self.state == LifecycleState::Mounted
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn has_focus(&self) -> bool {
        self.focused
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == LifecycleState::Destroyed
    }

    /// Whether the flag ordering holds.
    pub fn is_consistent(&self) -> bool {
        (!self.focused || self.visible) && (!self.visible || self.is_mounted())
    }
}

/// Attach a fresh page to its engine and run `on_create`.
pub(crate) fn create(page: &mut dyn Page, id: EntryId, context: EngineContext) {
    let core = page.core_mut();
    core.id = Some(id);
    core.context = Some(context);
    core.lifecycle = Lifecycle::default();
    tracing::debug!(page = page.name(), entry = %id, "page created");
    page.on_create();
}

/// Build the page's view and insert it into `container` at `index`.
///
/// Retained `state` is applied in two steps: the view snapshot is restored
/// before the view is attached, and the page hook sees the whole state once
/// the view is mounted.
pub(crate) fn mount(
    page: &mut dyn Page,
    container: &ContainerRef,
    index: usize,
    state: Option<PageState>,
) -> Option<ViewRef> {
    if page.core().lifecycle.state != LifecycleState::Created {
        tracing::warn!(
            page = page.name(),
            state = ?page.core().lifecycle.state,
            "mount requested for a page that is not in the created state"
        );
        return page.core().view.clone();
    }

    let view = page.create_view(container);
    page.core_mut().lifecycle.state = LifecycleState::ViewBound;

    if let Some(view_state) = state.as_ref().and_then(|s| s.view.as_ref()) {
        view.borrow_mut().restore_state(view_state);
    }
    container.borrow_mut().insert_view(index, Rc::clone(&view));

    {
        let core = page.core_mut();
        core.view = Some(Rc::clone(&view));
        core.lifecycle.state = LifecycleState::Mounted;
        if let Some(state) = state.as_ref() {
            core.deferred_view_state = state.view.clone();
            core.deferred_nested = state.nested.clone();
        }
    }

    tracing::debug!(page = page.name(), index, restored = state.is_some(), "page mounted");
    page.on_mounted(&view);
    if let Some(state) = state.as_ref() {
        page.on_restore_state(state);
    }
    Some(view)
}

/// Mark the page visible.
pub(crate) fn show(page: &mut dyn Page) {
    let core = page.core_mut();
    if !core.lifecycle.is_mounted() || core.lifecycle.visible {
        return;
    }
    core.lifecycle.visible = true;
    if let Some(nested) = core.nested.as_mut() {
        nested.on_start();
    }
    page.on_visible();
}

/// Give the page input focus. Refused unless it is visible.
pub(crate) fn focus(page: &mut dyn Page) {
    let core = page.core_mut();
    if core.lifecycle.focused {
        return;
    }
    if !core.lifecycle.visible {
        tracing::debug!(page = page.name(), "focus refused for invisible page");
        return;
    }
    core.lifecycle.focused = true;
    if let Some(nested) = core.nested.as_mut() {
        nested.on_resume();
    }
    page.on_focus();
}

pub(crate) fn blur(page: &mut dyn Page) {
    let core = page.core_mut();
    if !core.lifecycle.focused {
        return;
    }
    core.lifecycle.focused = false;
    if let Some(nested) = core.nested.as_mut() {
        nested.on_pause();
    }
    page.on_focus_lost();
}

/// Mark the page invisible, blurring it first.
pub(crate) fn hide(page: &mut dyn Page) {
    blur(page);
    let core = page.core_mut();
    if !core.lifecycle.visible {
        return;
    }
    if let Some(nested) = core.nested.as_mut() {
        nested.on_stop();
    }
    core.lifecycle.visible = false;
    page.on_invisible();
}

/// Raise the page as far as the host phase allows.
pub(crate) fn promote(page: &mut dyn Page, phase: HostPhase) {
    if phase.started {
        show(page);
    }
    if phase.resumed {
        focus(page);
    }
}

/// Snapshot a mounted page.
///
/// A nested stack that was restored into the page but never instantiated is
/// carried forward unchanged.
pub(crate) fn capture(page: &mut dyn Page) -> crate::error::NavResult<PageState> {
    let mut state = PageState::new();
    {
        let core = page.core_mut();
        if let Some(view) = core.view.as_ref() {
            state.view = view.borrow().save_state();
        }
        state.nested = match core.nested.as_mut() {
            Some(nested) => Some(nested.save_state()?),
            None => core.deferred_nested.clone(),
        };
    }
    page.on_save_state(&mut state);
    Ok(state)
}

/// Tear down the page's view, optionally capturing its state first.
///
/// The page returns to [`LifecycleState::Created`] and may be mounted again.
/// Its nested engine, if any, is destroyed; a captured state keeps a snapshot
/// of it.
pub(crate) fn unmount(page: &mut dyn Page, container: &ContainerRef, save: bool) -> Option<PageState> {
    hide(page);
    if !page.core().lifecycle.is_mounted() {
        return None;
    }
    page.core_mut().lifecycle.state = LifecycleState::Unmounting;

    let saved = if save {
        match capture(page) {
            Ok(state) => Some(state),
            Err(err) => {
                tracing::error!(
                    page = page.name(),
                    error = %err,
                    code = err.error_code(),
                    "failed to capture page state, dropping it"
                );
                None
            }
        }
    } else {
        None
    };

    if let Some(mut nested) = page.core_mut().nested.take() {
        nested.on_destroy();
    }
    page.on_unmounted();

    let core = page.core_mut();
    if let Some(view) = core.view.take() {
        if !container.borrow_mut().remove_view(&view) {
            tracing::warn!("unmounted view was not attached to its container");
        }
    }
    core.deferred_view_state = None;
    core.deferred_nested = None;
    core.lifecycle.state = LifecycleState::Created;
    tracing::debug!(page = page.name(), saved = saved.is_some(), "page unmounted");
    saved
}

/// Run the terminal hook. Returns false if the page was already destroyed.
pub(crate) fn destroy(page: &mut dyn Page) -> bool {
    if page.core().lifecycle.is_destroyed() {
        tracing::warn!(page = page.name(), "page destroyed twice");
        return false;
    }

    let core = page.core_mut();
    if let Some(mut nested) = core.nested.take() {
        nested.on_destroy();
    }
    core.deferred_view_state = None;
    core.deferred_nested = None;
    core.context = None;
    core.lifecycle = Lifecycle {
        state: LifecycleState::Destroyed,
        visible: false,
        focused: false,
    };
    tracing::debug!(page = page.name(), "page destroyed");
    page.on_destroy();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{LifecycleEvent, LifecycleLog, ScriptedFactory};
    use crate::adapters::HeadlessContainer;
    use crate::factory::PageFactory;
    use crate::stack::StackEngine;

    fn context() -> EngineContext {
        StackEngine::new(HeadlessContainer::new_ref()).context()
    }

    #[test]
    fn test_default_lifecycle() {
        let lifecycle = Lifecycle::default();
        assert_eq!(lifecycle.state(), LifecycleState::Created);
        assert!(!lifecycle.is_visible());
        assert!(lifecycle.is_consistent());
    }

    #[test]
    fn test_full_cycle_order() {
        let log = LifecycleLog::new();
        let page = ScriptedFactory::new("a", &log).create_page();
        let container = HeadlessContainer::new_ref();
        let mut page = page.borrow_mut();

        create(&mut *page, EntryId::new(), context());
        mount(&mut *page, &container, 0, None);
        promote(&mut *page, HostPhase::running());
        unmount(&mut *page, &container, false);
        destroy(&mut *page);

        assert_eq!(
            log.events_for("a"),
            vec![
                LifecycleEvent::Created,
                LifecycleEvent::Mounted,
                LifecycleEvent::Visible,
                LifecycleEvent::Focused,
                LifecycleEvent::FocusLost,
                LifecycleEvent::Invisible,
                LifecycleEvent::Unmounted,
                LifecycleEvent::Destroyed,
            ]
        );
        assert_eq!(container.borrow().child_count(), 0);
    }

    #[test]
    fn test_focus_requires_visibility() {
        let log = LifecycleLog::new();
        let page = ScriptedFactory::new("a", &log).create_page();
        let container = HeadlessContainer::new_ref();
        let mut page = page.borrow_mut();

        create(&mut *page, EntryId::new(), context());
        mount(&mut *page, &container, 0, None);
        focus(&mut *page);

        assert!(!page.core().has_focus());
        assert_eq!(log.count("a", LifecycleEvent::Focused), 0);
    }

    #[test]
    fn test_show_before_mount_is_ignored() {
        let log = LifecycleLog::new();
        let page = ScriptedFactory::new("a", &log).create_page();
        let mut page = page.borrow_mut();

        create(&mut *page, EntryId::new(), context());
        show(&mut *page);
        assert!(!page.core().is_visible());
    }

    #[test]
    fn test_unmount_with_save_captures_page_values() {
        let log = LifecycleLog::new();
        let page = ScriptedFactory::new("a", &log).create_page();
        let container = HeadlessContainer::new_ref();
        let mut page = page.borrow_mut();

        create(&mut *page, EntryId::new(), context());
        mount(&mut *page, &container, 0, None);
        promote(&mut *page, HostPhase::running());
        let state = unmount(&mut *page, &container, true).unwrap();

        assert_eq!(state.get::<u32>("visits"), Some(1));
        assert_eq!(page.core().lifecycle().state(), LifecycleState::Created);
        assert_eq!(log.count("a", LifecycleEvent::Saved), 1);
    }

    #[test]
    fn test_remount_restores_state() {
        let log = LifecycleLog::new();
        let page = ScriptedFactory::new("a", &log).create_page();
        let container = HeadlessContainer::new_ref();
        let mut page = page.borrow_mut();

        create(&mut *page, EntryId::new(), context());
        mount(&mut *page, &container, 0, None);
        promote(&mut *page, HostPhase::running());
        let state = unmount(&mut *page, &container, true);
        mount(&mut *page, &container, 0, state);

        assert_eq!(log.count("a", LifecycleEvent::Restored), 1);
        assert!(page.core().is_mounted());
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let log = LifecycleLog::new();
        let page = ScriptedFactory::new("a", &log).create_page();
        let mut page = page.borrow_mut();

        create(&mut *page, EntryId::new(), context());
        assert!(destroy(&mut *page));
        assert!(!destroy(&mut *page));
        assert_eq!(log.count("a", LifecycleEvent::Destroyed), 1);
    }
}
