//! Container trait abstraction.

use std::cell::RefCell;
use std::rc::Rc;

use super::view::ViewRef;

/// Shared handle to a container.
pub type ContainerRef = Rc<RefCell<dyn Container>>;

/// Trait for the physical parent that hosts page views.
///
/// Children are ordered back to front: index 0 is drawn first and sits
/// beneath everything else. The engine only ever inserts at an index it
/// computed from the stack, and removes views it inserted itself.
pub trait Container {
    /// Insert a view at `index`, clamped to the current child count.
    fn insert_view(&mut self, index: usize, view: ViewRef);

    /// Detach a view. Returns false if it was not a child.
    fn remove_view(&mut self, view: &ViewRef) -> bool;

    /// Number of attached views.
    fn child_count(&self) -> usize;

    /// View at `index`, back to front.
    fn child_at(&self, index: usize) -> Option<ViewRef>;

    /// Append a view on top of every other child.
    fn push_view(&mut self, view: ViewRef) {
        let top = self.child_count();
        self.insert_view(top, view);
    }
}
