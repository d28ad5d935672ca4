//! Transitions that complete on demand.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::traits::ViewRef;
use crate::transition::{Transition, TransitionDone, TransitionFactory};

/// Which side of a mutation a transition animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Enter,
    Exit,
}

#[derive(Debug, Default)]
struct Shared {
    running: RefCell<Vec<(Direction, TransitionDone)>>,
    started: Cell<usize>,
    undone: Cell<usize>,
}

/// Transition factory whose transitions hang until completed by the test.
///
/// Clones share their state, so a test keeps one handle and gives a clone
/// to the engine.
#[derive(Debug, Clone, Default)]
pub struct ManualTransitions {
    shared: Rc<Shared>,
}

impl ManualTransitions {
    pub const KIND: &'static str = "manual";

    pub fn new() -> Self {
        Self::default()
    }

    /// Transitions started and not yet completed.
    pub fn running(&self) -> usize {
        self.shared.running.borrow().len()
    }

    pub fn running_directions(&self) -> Vec<Direction> {
        self.shared.running.borrow().iter().map(|(d, _)| *d).collect()
    }

    /// Transitions started so far.
    pub fn started(&self) -> usize {
        self.shared.started.get()
    }

    /// How many times an exit was undone.
    pub fn undone(&self) -> usize {
        self.shared.undone.get()
    }

    /// Complete every running transition. Returns how many were completed.
    pub fn complete_all(&self) -> usize {
        let running: Vec<_> = self.shared.running.borrow_mut().drain(..).collect();
        let count = running.len();
        for (_, done) in running {
            done.complete();
        }
        count
    }

    /// Complete the oldest running transition.
    pub fn complete_next(&self) -> bool {
        let next = {
            let mut running = self.shared.running.borrow_mut();
            (!running.is_empty()).then(|| running.remove(0))
        };
        match next {
            Some((_, done)) => {
                done.complete();
                true
            }
            None => false,
        }
    }

    /// Drop every running transition without completing it.
    pub fn abandon_all(&self) -> usize {
        let running: Vec<_> = self.shared.running.borrow_mut().drain(..).collect();
        running.len()
    }
}

struct ManualTransition {
    direction: Direction,
    shared: Rc<Shared>,
}

impl Transition for ManualTransition {
    fn run(self: Box<Self>, done: TransitionDone) {
        self.shared.started.set(self.shared.started.get() + 1);
        self.shared.running.borrow_mut().push((self.direction, done));
    }
}

impl TransitionFactory for ManualTransitions {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn create_enter(&self, _view: &ViewRef) -> Box<dyn Transition> {
        Box::new(ManualTransition {
            direction: Direction::Enter,
            shared: Rc::clone(&self.shared),
        })
    }

    fn create_exit(&self, _view: &ViewRef) -> Box<dyn Transition> {
        Box::new(ManualTransition {
            direction: Direction::Exit,
            shared: Rc::clone(&self.shared),
        })
    }

    fn undo_exit(&self, _view: &ViewRef) {
        self.shared.undone.set(self.shared.undone.get() + 1);
    }
}
