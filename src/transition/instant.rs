//! The default, zero-duration transition.

use crate::traits::ViewRef;

use super::{Transition, TransitionDone, TransitionFactory};

/// Transition factory whose transitions do nothing and finish at once.
///
/// Completion still travels through the engine's completion channel, so the
/// engine observes it on its next scheduling turn like any other transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoTransition;

impl NoTransition {
    pub const KIND: &'static str = "none";
}

struct Instant;

impl Transition for Instant {
    fn run(self: Box<Self>, done: TransitionDone) {
        done.complete();
    }
}

impl TransitionFactory for NoTransition {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn create_enter(&self, _view: &ViewRef) -> Box<dyn Transition> {
        Box::new(Instant)
    }

    fn create_exit(&self, _view: &ViewRef) -> Box<dyn Transition> {
        Box::new(Instant)
    }

    fn undo_exit(&self, _view: &ViewRef) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::HeadlessView;
    use crate::transition::completion_channel;

    #[test]
    fn test_instant_completes_when_run() {
        let view = HeadlessView::new_ref("v");
        let (done, mut rx) = completion_channel();
        NoTransition.create_enter(&view).run(done);
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn test_args_are_null() {
        assert_eq!(NoTransition.to_args().unwrap(), serde_json::Value::Null);
    }
}
