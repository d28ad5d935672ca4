use std::cell::RefCell;
use std::rc::Rc;

use crate::traits::{StackChange, StackObserver};

/// Observer that records every change. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct CountingObserver {
    changes: Rc<RefCell<Vec<StackChange>>>,
}

impl CountingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.changes.borrow().len()
    }

    pub fn last(&self) -> Option<StackChange> {
        self.changes.borrow().last().copied()
    }

    /// Reported sizes, in order.
    pub fn sizes(&self) -> Vec<usize> {
        self.changes.borrow().iter().map(|c| c.size).collect()
    }
}

impl StackObserver for CountingObserver {
    fn on_stack_changed(&self, change: &StackChange) {
        self.changes.borrow_mut().push(*change);
    }
}
