//! The demo's three colour pages.

use std::rc::Rc;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

use crate::factory::PageDescriptor;
use crate::page::{page_ref, Page, PageCore, PageRef};
use crate::traits::{ContainerRef, ViewRef};
use crate::transition::{Edge, Fade, Slide, TransitionRef};

use super::view::{PanelView, TuiContainer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Swatch {
    Red,
    Green,
    Blue,
}

impl Swatch {
    pub fn title(self) -> &'static str {
        match self {
            Swatch::Red => "Red",
            Swatch::Green => "Green",
            Swatch::Blue => "Blue",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Swatch::Red => Color::Rgb(170, 40, 40),
            Swatch::Green => Color::Rgb(40, 140, 60),
            Swatch::Blue => Color::Rgb(40, 70, 170),
        }
    }

    /// Transition each swatch enters and leaves with.
    pub fn transition(self) -> TransitionRef {
        match self {
            Swatch::Red => Rc::new(Fade::default()),
            Swatch::Green => Rc::new(Slide::new(Edge::Left)),
            Swatch::Blue => Rc::new(Slide::new(Edge::Right)),
        }
    }

    /// Blue pages host a nested stack.
    pub fn hosts_nested(self) -> bool {
        matches!(self, Swatch::Blue)
    }
}

/// Factory for a [`ColorPage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorFactory {
    pub swatch: Swatch,
}

impl ColorFactory {
    pub fn new(swatch: Swatch) -> Self {
        Self { swatch }
    }
}

impl PageDescriptor for ColorFactory {
    const KIND: &'static str = "color";

    fn create_page(&self) -> PageRef {
        page_ref(ColorPage {
            core: PageCore::new(),
            swatch: self.swatch,
        })
    }
}

pub struct ColorPage {
    core: PageCore,
    swatch: Swatch,
}

impl Page for ColorPage {
    fn core(&self) -> &PageCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut PageCore {
        &mut self.core
    }

    fn create_view(&mut self, _container: &ContainerRef) -> ViewRef {
        let depth = self.core.nesting().unwrap_or(0);
        let title = match depth {
            0 => self.swatch.title().to_string(),
            n => format!("{} (depth {n})", self.swatch.title()),
        };
        let view = PanelView::new(title, self.swatch.color());
        if self.swatch.hosts_nested() {
            view.with_nested(TuiContainer::shared()).into_ref()
        } else {
            view.into_ref()
        }
    }

    fn name(&self) -> &'static str {
        self.swatch.title()
    }

    fn on_mounted(&mut self, view: &ViewRef) {
        if !self.swatch.hosts_nested() {
            return;
        }
        let Some(container) = nested_container(view) else {
            return;
        };
        match self.core.nested_engine(container) {
            // A restored nested stack is left as it was.
            Ok(nested) if nested.is_empty() => {
                let red = Swatch::Red;
                if let Err(err) = nested.push_boxed(Box::new(ColorFactory::new(red)), Some(red.transition())) {
                    tracing::warn!(error = %err, "failed to seed nested stack");
                }
            }
            Ok(_) => {}
            Err(err) => tracing::warn!(error = %err, code = err.error_code(), "no nested stack"),
        }
    }

    fn on_visible(&mut self) {
        tracing::info!(page = self.swatch.title(), nesting = ?self.core.nesting(), "visible");
    }

    fn on_focus(&mut self) {
        tracing::info!(page = self.swatch.title(), nesting = ?self.core.nesting(), "focused");
    }

    fn on_destroy(&mut self) {
        tracing::debug!(page = self.swatch.title(), "destroyed");
    }
}

fn nested_container(view: &ViewRef) -> Option<ContainerRef> {
    let view = view.borrow();
    view.as_any().downcast_ref::<PanelView>()?.nested_container()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::PageFactory;

    #[test]
    fn test_factory_args_roundtrip() {
        let factory = ColorFactory::new(Swatch::Green);
        let args = factory.to_args().unwrap();
        assert_eq!(args, serde_json::json!({"swatch": "green"}));
        let back: ColorFactory = serde_json::from_value(args).unwrap();
        assert_eq!(back, factory);
    }

    #[test]
    fn test_transitions_per_swatch() {
        assert_eq!(Swatch::Red.transition().kind(), "fade");
        assert_eq!(Swatch::Green.transition().kind(), "slide");
        assert!(Swatch::Blue.hosts_nested());
        assert!(!Swatch::Green.hosts_nested());
    }
}
