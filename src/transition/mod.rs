//! Visual transitions between the two affected pages of a stack mutation.
//!
//! A [`Transition`] is an opaque handle: the engine runs it and waits for its
//! [`TransitionDone`] to fire. Completion travels over a oneshot channel the
//! engine polls on its own thread, so a transition can never re-enter engine
//! state from its callback.
//!
//! A [`TransitionFactory`] builds the enter and exit transitions for one
//! entry and knows how to undo an exit that was skipped. Factories are
//! persisted with their entry as a `Descriptor` (kind + args), so every
//! factory must be reconstructible from its `to_args` output.

mod easing;
mod fade;
mod instant;
mod slide;

pub use easing::Easing;
pub use fade::Fade;
pub use instant::NoTransition;
pub use slide::{Edge, Slide};

use std::rc::Rc;
use std::time::Duration;

use tokio::sync::oneshot;

use crate::traits::{ViewProperty, ViewRef};

/// Shared handle to a transition factory.
pub type TransitionRef = Rc<dyn TransitionFactory>;

/// A property animation the host renderer should interpolate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    pub property: ViewProperty,
    pub from: f32,
    pub to: f32,
    pub duration: Duration,
    pub easing: Easing,
}

impl Animation {
    /// Interpolated value after `elapsed`.
    pub fn value_at(&self, elapsed: Duration) -> f32 {
        let t = if self.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
        };
        self.from + (self.to - self.from) * self.easing.apply(t)
    }
}

/// Completion signal handed to a running transition.
#[derive(Debug)]
pub struct TransitionDone {
    tx: oneshot::Sender<()>,
}

impl TransitionDone {
    /// Signal that the transition has finished.
    pub fn complete(self) {
        // The receiver is gone only if the engine was destroyed mid-flight.
        let _ = self.tx.send(());
    }
}

pub(crate) fn completion_channel() -> (TransitionDone, oneshot::Receiver<()>) {
    let (tx, rx) = oneshot::channel();
    (TransitionDone { tx }, rx)
}

/// Fire `done` once `duration` has elapsed on the tokio timer.
///
/// Outside a tokio runtime there is no timer to wait on, so the transition
/// completes right away.
pub fn complete_after(done: TransitionDone, duration: Duration) {
    if duration.is_zero() {
        done.complete();
        return;
    }

    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                tokio::time::sleep(duration).await;
                done.complete();
            });
        }
        Err(_) => {
            tracing::warn!(
                duration_ms = duration.as_millis() as u64,
                "no tokio runtime for timed transition, completing immediately"
            );
            done.complete();
        }
    }
}

/// A running visual effect.
pub trait Transition {
    /// Start the effect. `done` must be completed exactly when it ends.
    fn run(self: Box<Self>, done: TransitionDone);
}

/// Produces the enter/exit transitions of one stack entry.
pub trait TransitionFactory {
    /// Registry key used to rebuild this factory after restoration.
    fn kind(&self) -> &str;

    /// Arguments needed to rebuild this factory.
    fn to_args(&self) -> Result<serde_json::Value, serde_json::Error> {
        Ok(serde_json::Value::Null)
    }

    /// Transition that brings `view` on screen.
    fn create_enter(&self, view: &ViewRef) -> Box<dyn Transition>;

    /// Transition that takes `view` off screen.
    fn create_exit(&self, view: &ViewRef) -> Box<dyn Transition>;

    /// Synchronously reset whatever the exit transition would have animated.
    fn undo_exit(&self, view: &ViewRef);
}

/// Transition that starts a property animation and completes when it ends.
pub struct AnimatedTransition {
    view: ViewRef,
    animation: Animation,
}

impl AnimatedTransition {
    pub fn new(view: &ViewRef, animation: Animation) -> Self {
        Self {
            view: Rc::clone(view),
            animation,
        }
    }
}

impl Transition for AnimatedTransition {
    fn run(self: Box<Self>, done: TransitionDone) {
        self.view.borrow_mut().animate(self.animation);
        complete_after(done, self.animation.duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_animation_endpoints() {
        let animation = Animation {
            property: ViewProperty::Opacity,
            from: 0.0,
            to: 1.0,
            duration: Duration::from_millis(200),
            easing: Easing::Linear,
        };
        assert_eq!(animation.value_at(Duration::ZERO), 0.0);
        assert!((animation.value_at(Duration::from_millis(100)) - 0.5).abs() < 0.001);
        assert_eq!(animation.value_at(Duration::from_secs(5)), 1.0);
    }

    #[test]
    fn test_zero_duration_animation_is_at_target() {
        let animation = Animation {
            property: ViewProperty::TranslationX,
            from: -1.0,
            to: 0.0,
            duration: Duration::ZERO,
            easing: Easing::EaseInOut,
        };
        assert_eq!(animation.value_at(Duration::ZERO), 0.0);
    }

    #[test]
    fn test_completion_without_runtime_is_immediate() {
        let (done, mut rx) = completion_channel();
        complete_after(done, Duration::from_secs(10));
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_waits_for_timer() {
        let (done, mut rx) = completion_channel();
        complete_after(done, Duration::from_millis(300));
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(301)).await;
        assert!(rx.try_recv().is_ok());
    }
}
