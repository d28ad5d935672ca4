//! Slide transitions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::traits::{ViewProperty, ViewRef};

use super::{AnimatedTransition, Animation, Easing, Transition, TransitionFactory};

/// Container edge a page slides in from and back out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    fn property(self) -> ViewProperty {
        match self {
            Edge::Left | Edge::Right => ViewProperty::TranslationX,
            Edge::Top | Edge::Bottom => ViewProperty::TranslationY,
        }
    }

    fn offscreen(self) -> f32 {
        match self {
            Edge::Left | Edge::Top => -1.0,
            Edge::Right | Edge::Bottom => 1.0,
        }
    }
}

/// Slides a page in from an edge on enter and back to it on exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    pub edge: Edge,
    pub duration_ms: u64,
}

impl Slide {
    pub const KIND: &'static str = "slide";

    pub fn new(edge: Edge) -> Self {
        Self {
            edge,
            duration_ms: 300,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = duration.as_millis() as u64;
        self
    }

    fn animation(&self, from: f32, to: f32) -> Animation {
        Animation {
            property: self.edge.property(),
            from,
            to,
            duration: Duration::from_millis(self.duration_ms),
            easing: Easing::EaseInOut,
        }
    }
}

impl TransitionFactory for Slide {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn to_args(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn create_enter(&self, view: &ViewRef) -> Box<dyn Transition> {
        let animation = self.animation(self.edge.offscreen(), 0.0);
        Box::new(AnimatedTransition::new(view, animation))
    }

    fn create_exit(&self, view: &ViewRef) -> Box<dyn Transition> {
        let animation = self.animation(0.0, self.edge.offscreen());
        Box::new(AnimatedTransition::new(view, animation))
    }

    fn undo_exit(&self, view: &ViewRef) {
        view.borrow_mut().reset(self.edge.property());
    }
}
