//! View trait abstraction.
//!
//! A view is the visual root a page produces for its container. The engine
//! only toggles its visibility, snapshots its state and hands it to
//! transitions; everything else is up to the host.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::transition::Animation;

/// Opaque serialized view state (scroll offsets, text input, ...).
pub type ViewState = serde_json::Value;

/// Shared handle to a view. Views live on the single control thread.
pub type ViewRef = Rc<RefCell<dyn View>>;

/// A property a transition may animate.
///
/// Translations are expressed as fractions of the view's own extent, so
/// `TranslationX = 1.0` places the view one full width to the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewProperty {
    Opacity,
    TranslationX,
    TranslationY,
}

impl ViewProperty {
    /// Resting value of the property when no transition is applied.
    pub fn resting_value(self) -> f32 {
        match self {
            ViewProperty::Opacity => 1.0,
            ViewProperty::TranslationX | ViewProperty::TranslationY => 0.0,
        }
    }
}

/// Trait for a page's visual root.
///
/// # Example
///
/// ```ignore
/// use folio::traits::{View, ViewRef};
///
/// fn hide(view: &ViewRef) {
///     view.borrow_mut().set_visible(false);
/// }
/// ```
pub trait View: Any {
    /// Show or hide the view without detaching it.
    fn set_visible(&mut self, visible: bool);

    /// Whether the view is currently shown.
    fn is_visible(&self) -> bool;

    /// Snapshot the view hierarchy state, if it has any.
    fn save_state(&self) -> Option<ViewState> {
        None
    }

    /// Re-apply a snapshot taken by [`View::save_state`].
    fn restore_state(&mut self, _state: &ViewState) {}

    /// Begin animating a property. The host renderer interpolates it.
    fn animate(&mut self, _animation: Animation) {}

    /// Snap a property back to its resting value.
    fn reset(&mut self, _property: ViewProperty) {}

    /// Downcasting support for hosts that render concrete view types.
    fn as_any(&self) -> &dyn Any;
}
