//! Host delegate and stack observer traits.

use crate::stack::EntryId;

/// Told when a pop would leave the stack empty.
///
/// The root engine's host usually closes the enclosing screen here. Nested
/// engines have no delegate.
pub trait StackDelegate {
    fn on_stack_empty(&self);
}

impl<F: Fn()> StackDelegate for F {
    fn on_stack_empty(&self) {
        self()
    }
}

/// Summary handed to observers after a structural mutation.
///
/// The change is reported immediately, before any transition runs: for a
/// push the new view is already on top of the container, for a pop the old
/// view is still attached until its exit transition completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackChange {
    /// Stack size after the mutation.
    pub size: usize,
    /// Entry that is now structurally on top.
    pub top: Option<EntryId>,
    /// Depth of the engine that changed (0 for the root).
    pub nesting: usize,
}

impl StackChange {
    /// Whether a back affordance makes sense for this stack.
    pub fn can_go_back(&self) -> bool {
        self.size > 1
    }
}

/// Listener for stack changes.
pub trait StackObserver {
    fn on_stack_changed(&self, change: &StackChange);
}

impl<F: Fn(&StackChange)> StackObserver for F {
    fn on_stack_changed(&self, change: &StackChange) {
        self(change)
    }
}

/// Handle returned by `StackEngine::add_observer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(crate) u64);
