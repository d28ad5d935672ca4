//! Pages: the unit of screen logic the stack sequences.
//!
//! A page is any type that implements [`Page`] and embeds a [`PageCore`].
//! The core does the bookkeeping (lifecycle flags, live view, nested engine,
//! deferred state); the page itself only builds its view and reacts to the
//! lifecycle hooks it cares about. Hooks are plain notifications: the flag
//! updates and nested-engine forwarding happen before a hook runs, so an
//! implementation never has to call back into a base implementation.
//!
//! Lifecycle, driven exclusively by the stack engine:
//!
//! ```text
//! on_create → create_view → on_mounted → [on_restore_state]
//!           → on_visible → on_focus
//!           → on_focus_lost → on_invisible → [on_save_state] → on_unmounted
//!           → on_destroy
//! ```

mod core;
pub(crate) mod lifecycle;
mod state;

pub use self::core::PageCore;
pub(crate) use self::core::EngineContext;
pub use lifecycle::{Lifecycle, LifecycleState};
pub use state::PageState;

use std::cell::RefCell;
use std::rc::Rc;

use crate::traits::{ContainerRef, ViewRef};

/// Shared handle to a page.
pub type PageRef = Rc<RefCell<dyn Page>>;

/// Wrap a page into a [`PageRef`].
pub fn page_ref<P: Page + 'static>(page: P) -> PageRef {
    Rc::new(RefCell::new(page))
}

/// The capability every screen implements.
///
/// # Example
///
/// ```ignore
/// use folio::page::{Page, PageCore};
///
/// #[derive(Default)]
/// struct SettingsPage {
///     core: PageCore,
/// }
///
/// impl Page for SettingsPage {
///     fn core(&self) -> &PageCore { &self.core }
///     fn core_mut(&mut self) -> &mut PageCore { &mut self.core }
///
///     fn create_view(&mut self, _container: &ContainerRef) -> ViewRef {
///         HeadlessView::new_ref("settings")
///     }
/// }
/// ```
pub trait Page {
    /// Shared lifecycle bookkeeping.
    fn core(&self) -> &PageCore;

    fn core_mut(&mut self) -> &mut PageCore;

    /// Build the visual root for `container`. Called on every mount.
    fn create_view(&mut self, container: &ContainerRef) -> ViewRef;

    /// Name used in log output.
    fn name(&self) -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    fn on_create(&mut self) {}

    /// The view is attached to the container.
    fn on_mounted(&mut self, _view: &ViewRef) {}

    /// State retained from a previous mount is available.
    fn on_restore_state(&mut self, _state: &PageState) {}

    fn on_visible(&mut self) {}

    fn on_focus(&mut self) {}

    fn on_focus_lost(&mut self) {}

    fn on_invisible(&mut self) {}

    /// Add page-level values to a state snapshot.
    fn on_save_state(&mut self, _state: &mut PageState) {}

    /// The view is about to leave the container.
    fn on_unmounted(&mut self) {}

    fn on_destroy(&mut self) {}
}
