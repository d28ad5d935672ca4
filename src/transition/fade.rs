//! Cross-fade transition.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::traits::{ViewProperty, ViewRef};

use super::{AnimatedTransition, Animation, Easing, Transition, TransitionFactory};

/// Fades a page in on enter and out on exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fade {
    pub enter_ms: u64,
    pub exit_ms: u64,
    #[serde(default)]
    pub easing: Easing,
}

impl Fade {
    pub const KIND: &'static str = "fade";

    pub fn new(enter: Duration, exit: Duration) -> Self {
        Self {
            enter_ms: enter.as_millis() as u64,
            exit_ms: exit.as_millis() as u64,
            easing: Easing::Linear,
        }
    }

    fn animation(&self, from: f32, to: f32, ms: u64) -> Animation {
        Animation {
            property: ViewProperty::Opacity,
            from,
            to,
            duration: Duration::from_millis(ms),
            easing: self.easing,
        }
    }
}

impl Default for Fade {
    fn default() -> Self {
        Self::new(Duration::from_millis(250), Duration::from_millis(250))
    }
}

impl TransitionFactory for Fade {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn to_args(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn create_enter(&self, view: &ViewRef) -> Box<dyn Transition> {
        Box::new(AnimatedTransition::new(view, self.animation(0.0, 1.0, self.enter_ms)))
    }

    fn create_exit(&self, view: &ViewRef) -> Box<dyn Transition> {
        Box::new(AnimatedTransition::new(view, self.animation(1.0, 0.0, self.exit_ms)))
    }

    fn undo_exit(&self, view: &ViewRef) {
        view.borrow_mut().reset(ViewProperty::Opacity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::HeadlessView;
    use crate::transition::completion_channel;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_args_roundtrip() {
        let fade = Fade::new(Duration::from_millis(120), Duration::from_millis(80));
        let args = fade.to_args().unwrap();
        let back: Fade = serde_json::from_value(args).unwrap();
        assert_eq!(back, fade);
    }

    #[test]
    fn test_exit_animates_opacity_down() {
        let view = Rc::new(RefCell::new(HeadlessView::new("v")));
        let as_ref: ViewRef = view.clone();
        let (done, _rx) = completion_channel();
        Fade::default().create_exit(&as_ref).run(done);

        let last = view.borrow().last_animation().unwrap();
        assert_eq!(last.property, ViewProperty::Opacity);
        assert_eq!((last.from, last.to), (1.0, 0.0));
    }

    #[test]
    fn test_undo_exit_resets_opacity() {
        let view = Rc::new(RefCell::new(HeadlessView::new("v")));
        let as_ref: ViewRef = view.clone();
        let (done, _rx) = completion_channel();
        Fade::default().create_exit(&as_ref).run(done);
        Fade::default().undo_exit(&as_ref);

        assert_eq!(view.borrow().property(ViewProperty::Opacity), 1.0);
    }
}
