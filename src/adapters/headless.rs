//! In-memory container and view.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::traits::{Container, ContainerRef, View, ViewProperty, ViewRef, ViewState};
use crate::transition::Animation;

/// View that keeps everything in memory.
///
/// Animations jump straight to their target value; the full animation is
/// kept so callers can inspect what a transition asked for.
#[derive(Debug, Clone)]
pub struct HeadlessView {
    name: String,
    visible: bool,
    properties: HashMap<ViewProperty, f32>,
    animations: Vec<Animation>,
    state: Option<ViewState>,
}

impl HeadlessView {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            properties: HashMap::new(),
            animations: Vec::new(),
            state: None,
        }
    }

    /// A new view behind a [`ViewRef`].
    pub fn new_ref(name: impl Into<String>) -> ViewRef {
        Rc::new(RefCell::new(Self::new(name)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value of `property`.
    pub fn property(&self, property: ViewProperty) -> f32 {
        self.properties
            .get(&property)
            .copied()
            .unwrap_or_else(|| property.resting_value())
    }

    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    pub fn last_animation(&self) -> Option<Animation> {
        self.animations.last().copied()
    }

    /// Content returned by the next `save_state`.
    pub fn set_state(&mut self, state: ViewState) {
        self.state = Some(state);
    }

    pub fn state(&self) -> Option<&ViewState> {
        self.state.as_ref()
    }
}

impl View for HeadlessView {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn save_state(&self) -> Option<ViewState> {
        self.state.clone()
    }

    fn restore_state(&mut self, state: &ViewState) {
        self.state = Some(state.clone());
    }

    fn animate(&mut self, animation: Animation) {
        self.properties.insert(animation.property, animation.to);
        self.animations.push(animation);
    }

    fn reset(&mut self, property: ViewProperty) {
        self.properties.remove(&property);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Container that keeps its children in a vector, back to front.
#[derive(Default)]
pub struct HeadlessContainer {
    children: Vec<ViewRef>,
}

impl HeadlessContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new container behind a [`ContainerRef`].
    pub fn new_ref() -> ContainerRef {
        Rc::new(RefCell::new(Self::new()))
    }

    /// A new container with a concrete handle, for callers that want to
    /// inspect it after handing a [`ContainerRef`] to an engine.
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn children(&self) -> &[ViewRef] {
        &self.children
    }

    /// Names of the [`HeadlessView`] children, back to front.
    pub fn view_names(&self) -> Vec<String> {
        self.children
            .iter()
            .filter_map(|view| {
                view.borrow()
                    .as_any()
                    .downcast_ref::<HeadlessView>()
                    .map(|v| v.name().to_string())
            })
            .collect()
    }

    /// Names of the children that are currently visible.
    pub fn visible_names(&self) -> Vec<String> {
        self.children
            .iter()
            .filter_map(|view| {
                let view = view.borrow();
                let headless = view.as_any().downcast_ref::<HeadlessView>()?;
                view.is_visible().then(|| headless.name().to_string())
            })
            .collect()
    }
}

impl Container for HeadlessContainer {
    fn insert_view(&mut self, index: usize, view: ViewRef) {
        let index = index.min(self.children.len());
        self.children.insert(index, view);
    }

    fn remove_view(&mut self, view: &ViewRef) -> bool {
        let before = self.children.len();
        self.children.retain(|child| !Rc::ptr_eq(child, view));
        self.children.len() != before
    }

    fn child_count(&self) -> usize {
        self.children.len()
    }

    fn child_at(&self, index: usize) -> Option<ViewRef> {
        self.children.get(index).cloned()
    }
}
