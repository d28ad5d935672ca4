use std::fmt;
use std::rc::Rc;

use crate::config::EngineConfig;
use crate::error::{NavError, NavResult};
use crate::factory::FactoryRegistry;
use crate::stack::{EntryId, Navigator, SavedStack, StackEngine};
use crate::traits::{ContainerRef, ViewRef, ViewState};

use super::lifecycle::Lifecycle;

/// What a page inherits from the engine that created it.
#[derive(Clone)]
pub(crate) struct EngineContext {
    pub(crate) navigator: Navigator,
    pub(crate) config: EngineConfig,
    pub(crate) registry: Rc<FactoryRegistry>,
    pub(crate) nesting: usize,
}

/// Bookkeeping every page embeds.
///
/// Owned by the page, mutated only by the engine's lifecycle driver. Pages
/// read it to learn their own state and to reach their nested stack.
#[derive(Default)]
pub struct PageCore {
    pub(super) id: Option<EntryId>,
    pub(super) lifecycle: Lifecycle,
    pub(super) view: Option<ViewRef>,
    pub(super) nested: Option<StackEngine>,
    pub(super) deferred_nested: Option<SavedStack>,
    pub(super) deferred_view_state: Option<ViewState>,
    pub(super) context: Option<EngineContext>,
}

impl PageCore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stack entry this page belongs to.
    pub fn id(&self) -> Option<EntryId> {
        self.id
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_mounted(&self) -> bool {
        self.lifecycle.is_mounted()
    }

    pub fn is_visible(&self) -> bool {
        self.lifecycle.is_visible()
    }

    pub fn has_focus(&self) -> bool {
        self.lifecycle.has_focus()
    }

    pub fn is_destroyed(&self) -> bool {
        self.lifecycle.is_destroyed()
    }

    /// Depth of the engine that owns this page.
    pub fn nesting(&self) -> Option<usize> {
        self.context.as_ref().map(|ctx| ctx.nesting)
    }

    /// The live view.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::NotMounted`] while the page has no view.
    pub fn view(&self) -> NavResult<&ViewRef> {
        self.view.as_ref().ok_or(NavError::NotMounted)
    }

    /// Handle for requesting navigation on the owning stack.
    ///
    /// Requests run on the engine's next idle scheduling turn.
    pub fn navigator(&self) -> Option<Navigator> {
        self.context.as_ref().map(|ctx| ctx.navigator.clone())
    }

    /// The page's nested stack, created on first use inside `container`.
    ///
    /// The nested engine inherits the owner's configuration and factory
    /// registry. If a snapshot was retained for this page it is restored
    /// into the new engine, and the engine is started and resumed to match
    /// the page's own flags.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::NotMounted`] unless the page is mounted, or a
    /// restore error if the retained snapshot cannot be rebuilt.
    pub fn nested_engine(&mut self, container: ContainerRef) -> NavResult<&mut StackEngine> {
        if !self.is_mounted() {
            return Err(NavError::NotMounted);
        }

        if self.nested.is_none() {
            let context = self.context.as_ref().ok_or(NavError::NotMounted)?;
            let mut engine = StackEngine::nested_in(container, context);
            if let Some(saved) = self.deferred_nested.as_ref() {
                engine.restore_state(saved.clone())?;
            }
            self.deferred_nested = None;
            if self.is_visible() {
                engine.on_start();
            }
            if self.has_focus() {
                engine.on_resume();
            }
            self.nested = Some(engine);
        }

        self.nested.as_mut().ok_or(NavError::NotMounted)
    }

    /// The nested stack, if one has been created.
    pub fn nested_mut(&mut self) -> Option<&mut StackEngine> {
        self.nested.as_mut()
    }

    pub fn peek_nested(&self) -> Option<&StackEngine> {
        self.nested.as_ref()
    }

    /// Apply a retained view snapshot to the live view a second time.
    ///
    /// Useful for pages that rebuild view content in `on_mounted` after the
    /// engine already restored the freshly created view. Returns false when
    /// there is nothing to apply.
    pub fn restore_view_state(&mut self) -> bool {
        match (self.view.as_ref(), self.deferred_view_state.take()) {
            (Some(view), Some(state)) => {
                view.borrow_mut().restore_state(&state);
                true
            }
            _ => false,
        }
    }
}

impl fmt::Debug for PageCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageCore")
            .field("id", &self.id)
            .field("lifecycle", &self.lifecycle)
            .field("has_view", &self.view.is_some())
            .field("nested", &self.nested.as_ref().map(StackEngine::size))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_core() {
        let mut core = PageCore::new();
        assert!(core.id().is_none());
        assert!(matches!(core.view(), Err(NavError::NotMounted)));
        assert!(core.navigator().is_none());
        assert!(core.nested_mut().is_none());
        assert!(!core.restore_view_state());
    }

    #[test]
    fn test_nested_engine_requires_mount() {
        let mut core = PageCore::new();
        let container = crate::adapters::HeadlessContainer::new_ref();
        assert!(matches!(core.nested_engine(container), Err(NavError::NotMounted)));
    }
}
