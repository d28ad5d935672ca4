//! ratatui-backed view and container.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Clear, Paragraph};
use ratatui::Frame;
use serde_json::json;
use tokio::time::Instant;

use crate::traits::{Container, ContainerRef, View, ViewProperty, ViewRef, ViewState};
use crate::transition::Animation;

/// A coloured panel, optionally hosting a nested container in its lower
/// half.
pub struct PanelView {
    title: String,
    color: Color,
    visible: bool,
    touches: Cell<u32>,
    animations: HashMap<ViewProperty, (Animation, Instant)>,
    nested: Option<Rc<RefCell<TuiContainer>>>,
}

impl PanelView {
    pub fn new(title: impl Into<String>, color: Color) -> Self {
        Self {
            title: title.into(),
            color,
            visible: true,
            touches: Cell::new(0),
            animations: HashMap::new(),
            nested: None,
        }
    }

    pub fn with_nested(mut self, container: Rc<RefCell<TuiContainer>>) -> Self {
        self.nested = Some(container);
        self
    }

    pub fn into_ref(self) -> ViewRef {
        Rc::new(RefCell::new(self))
    }

    /// Container for a nested stack, if this panel hosts one.
    pub fn nested_container(&self) -> Option<ContainerRef> {
        self.nested.clone().map(|c| c as ContainerRef)
    }

    pub fn touch(&self) -> u32 {
        self.touches.set(self.touches.get() + 1);
        self.touches.get()
    }

    pub fn touches(&self) -> u32 {
        self.touches.get()
    }

    /// Value of `property` at `now`.
    pub fn value_at(&self, property: ViewProperty, now: Instant) -> f32 {
        match self.animations.get(&property) {
            Some((animation, started)) => animation.value_at(now.saturating_duration_since(*started)),
            None => property.resting_value(),
        }
    }

    /// Whether any animation is still moving.
    pub fn is_animating(&self, now: Instant) -> bool {
        let own = self
            .animations
            .values()
            .any(|(animation, started)| now.saturating_duration_since(*started) < animation.duration);
        own || self
            .nested
            .as_ref()
            .is_some_and(|nested| nested.borrow().is_animating(now))
    }

    fn render(&self, frame: &mut Frame, area: Rect, now: Instant) {
        let dx = self.value_at(ViewProperty::TranslationX, now);
        let dy = self.value_at(ViewProperty::TranslationY, now);
        let opacity = self.value_at(ViewProperty::Opacity, now).clamp(0.0, 1.0);

        let Some(target) = shift(area, dx, dy) else {
            return;
        };

        let style = Style::default().bg(fade(self.color, opacity)).fg(Color::White);
        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .style(style);
        let inner = block.inner(target);
        frame.render_widget(Clear, target);
        frame.render_widget(block, target);

        let [text_area, nested_area] =
            Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(inner);
        let text = vec![
            Line::from(format!("touches: {}", self.touches.get())),
            Line::from("space to touch").style(Style::default().add_modifier(Modifier::DIM)),
        ];
        frame.render_widget(Paragraph::new(text), text_area);

        if let Some(nested) = self.nested.as_ref() {
            let nested_block = Block::bordered().title(" nested ").style(style);
            let nested_inner = nested_block.inner(nested_area);
            frame.render_widget(nested_block, nested_area);
            nested.borrow().render(frame, nested_inner, now);
        }
    }
}

impl View for PanelView {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn save_state(&self) -> Option<ViewState> {
        Some(json!({ "touches": self.touches.get() }))
    }

    fn restore_state(&mut self, state: &ViewState) {
        if let Some(touches) = state.get("touches").and_then(|t| t.as_u64()) {
            self.touches.set(touches as u32);
        }
    }

    fn animate(&mut self, animation: Animation) {
        self.animations.insert(animation.property, (animation, Instant::now()));
    }

    fn reset(&mut self, property: ViewProperty) {
        self.animations.remove(&property);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Container that draws its [`PanelView`] children back to front.
#[derive(Default)]
pub struct TuiContainer {
    children: Vec<ViewRef>,
}

impl TuiContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, now: Instant) {
        for child in &self.children {
            let view = child.borrow();
            if !view.is_visible() {
                continue;
            }
            if let Some(panel) = view.as_any().downcast_ref::<PanelView>() {
                panel.render(frame, area, now);
            }
        }
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.children.iter().any(|child| {
            child
                .borrow()
                .as_any()
                .downcast_ref::<PanelView>()
                .is_some_and(|panel| panel.is_animating(now))
        })
    }
}

impl Container for TuiContainer {
    fn insert_view(&mut self, index: usize, view: ViewRef) {
        let index = index.min(self.children.len());
        self.children.insert(index, view);
    }

    fn remove_view(&mut self, view: &ViewRef) -> bool {
        let before = self.children.len();
        self.children.retain(|child| !Rc::ptr_eq(child, view));
        before != self.children.len()
    }

    fn child_count(&self) -> usize {
        self.children.len()
    }

    fn child_at(&self, index: usize) -> Option<ViewRef> {
        self.children.get(index).cloned()
    }
}

/// Move `area` by a fraction of its own size, clipped to the original.
fn shift(area: Rect, dx: f32, dy: f32) -> Option<Rect> {
    let x = area.x as i32 + (dx * area.width as f32).round() as i32;
    let y = area.y as i32 + (dy * area.height as f32).round() as i32;
    let left = x.max(area.x as i32);
    let top = y.max(area.y as i32);
    let right = (x + area.width as i32).min(area.right() as i32);
    let bottom = (y + area.height as i32).min(area.bottom() as i32);
    if right <= left || bottom <= top {
        return None;
    }
    Some(Rect::new(
        left as u16,
        top as u16,
        (right - left) as u16,
        (bottom - top) as u16,
    ))
}

/// Blend `color` towards black.
fn fade(color: Color, opacity: f32) -> Color {
    let (r, g, b) = match color {
        Color::Rgb(r, g, b) => (r, g, b),
        Color::Red => (170, 40, 40),
        Color::Green => (40, 140, 60),
        Color::Blue => (40, 70, 170),
        other => return other,
    };
    let scale = |c: u8| (c as f32 * opacity).round() as u8;
    Color::Rgb(scale(r), scale(g), scale(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transition::Easing;
    use std::time::Duration;

    #[test]
    fn test_shift_clips_to_area() {
        let area = Rect::new(0, 0, 100, 20);
        assert_eq!(shift(area, 0.0, 0.0), Some(area));
        assert_eq!(shift(area, 0.5, 0.0), Some(Rect::new(50, 0, 50, 20)));
        assert_eq!(shift(area, -0.25, 0.0), Some(Rect::new(0, 0, 75, 20)));
        assert_eq!(shift(area, 1.0, 0.0), None);
    }

    #[test]
    fn test_fade_scales_rgb() {
        assert_eq!(fade(Color::Rgb(200, 100, 0), 0.5), Color::Rgb(100, 50, 0));
        assert_eq!(fade(Color::Reset, 0.5), Color::Reset);
    }

    #[test]
    fn test_view_state_roundtrip() {
        let source = PanelView::new("a", Color::Red);
        source.touch();
        source.touch();
        let mut target = PanelView::new("a", Color::Red);
        target.restore_state(&source.save_state().unwrap());
        assert_eq!(target.touches(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_animation_progresses_with_clock() {
        let mut view = PanelView::new("a", Color::Blue);
        view.animate(Animation {
            property: ViewProperty::TranslationX,
            from: 1.0,
            to: 0.0,
            duration: Duration::from_millis(100),
            easing: Easing::Linear,
        });
        assert!(view.is_animating(Instant::now()));

        tokio::time::advance(Duration::from_millis(50)).await;
        let halfway = view.value_at(ViewProperty::TranslationX, Instant::now());
        assert!((halfway - 0.5).abs() < 0.01);

        tokio::time::advance(Duration::from_millis(60)).await;
        assert!(!view.is_animating(Instant::now()));
        assert_eq!(view.value_at(ViewProperty::TranslationX, Instant::now()), 0.0);
    }
}
