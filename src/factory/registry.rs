//! Kind-keyed constructors for page and transition factories.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::RestoreError;
use crate::transition::{Fade, NoTransition, Slide, TransitionFactory, TransitionRef};

use super::{Descriptor, PageDescriptor, PageFactory};

type PageCtor = Box<dyn Fn(&Value) -> Result<Box<dyn PageFactory>, serde_json::Error>>;
type TransitionCtor = Box<dyn Fn(&Value) -> Result<TransitionRef, serde_json::Error>>;

/// Rebuilds factories from their descriptors during restoration.
///
/// The built-in transitions (`none`, `fade`, `slide`) are always present.
/// Page kinds must be registered by the host. A registry is shared by a
/// root engine and all of its nested engines.
pub struct FactoryRegistry {
    pages: HashMap<String, PageCtor>,
    transitions: HashMap<String, TransitionCtor>,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            pages: HashMap::new(),
            transitions: HashMap::new(),
        };
        registry
            .register_transition_fn(NoTransition::KIND, |_| Ok(Rc::new(NoTransition)))
            .register_transition::<Fade>(Fade::KIND)
            .register_transition::<Slide>(Slide::KIND);
        registry
    }

    /// Register a serde page descriptor under its `KIND`.
    pub fn register<T: PageDescriptor>(&mut self) -> &mut Self {
        self.register_fn(T::KIND, |args| {
            let factory: T = serde_json::from_value(args.clone())?;
            Ok(Box::new(factory))
        })
    }

    /// Register a custom page constructor.
    pub fn register_fn<F>(&mut self, kind: impl Into<String>, ctor: F) -> &mut Self
    where
        F: Fn(&Value) -> Result<Box<dyn PageFactory>, serde_json::Error> + 'static,
    {
        let kind = kind.into();
        if self.pages.insert(kind.clone(), Box::new(ctor)).is_some() {
            tracing::debug!(kind = %kind, "page factory kind re-registered");
        }
        self
    }

    /// Register a serde transition factory.
    pub fn register_transition<T>(&mut self, kind: impl Into<String>) -> &mut Self
    where
        T: TransitionFactory + DeserializeOwned + 'static,
    {
        self.register_transition_fn(kind, |args| {
            let factory: T = serde_json::from_value(args.clone())?;
            Ok(Rc::new(factory))
        })
    }

    /// Register a custom transition constructor.
    pub fn register_transition_fn<F>(&mut self, kind: impl Into<String>, ctor: F) -> &mut Self
    where
        F: Fn(&Value) -> Result<TransitionRef, serde_json::Error> + 'static,
    {
        self.transitions.insert(kind.into(), Box::new(ctor));
        self
    }

    pub fn has_page_kind(&self, kind: &str) -> bool {
        self.pages.contains_key(kind)
    }

    pub fn has_transition_kind(&self, kind: &str) -> bool {
        self.transitions.contains_key(kind)
    }

    /// Rebuild a page factory.
    ///
    /// # Errors
    ///
    /// [`RestoreError::UnknownFactory`] for an unregistered kind, or
    /// [`RestoreError::Corrupt`] if the arguments do not deserialize.
    pub fn page_factory(&self, descriptor: &Descriptor) -> Result<Box<dyn PageFactory>, RestoreError> {
        let ctor = self
            .pages
            .get(&descriptor.kind)
            .ok_or_else(|| RestoreError::UnknownFactory(descriptor.kind.clone()))?;
        Ok(ctor(&descriptor.args)?)
    }

    /// Rebuild a transition factory.
    pub fn transition(&self, descriptor: &Descriptor) -> Result<TransitionRef, RestoreError> {
        let ctor = self
            .transitions
            .get(&descriptor.kind)
            .ok_or_else(|| RestoreError::UnknownTransition(descriptor.kind.clone()))?;
        Ok(ctor(&descriptor.args)?)
    }
}

impl Default for FactoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pages: Vec<_> = self.pages.keys().collect();
        let mut transitions: Vec<_> = self.transitions.keys().collect();
        pages.sort();
        transitions.sort();
        f.debug_struct("FactoryRegistry")
            .field("pages", &pages)
            .field("transitions", &transitions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{LifecycleLog, ScriptedFactory};
    use crate::transition::Edge;
    use serde_json::json;

    #[test]
    fn test_builtin_transitions() {
        let registry = FactoryRegistry::new();
        for kind in ["none", "fade", "slide"] {
            assert!(registry.has_transition_kind(kind), "missing {kind}");
        }

        let slide = registry
            .transition(&Descriptor::new("slide", json!({"edge": "top", "duration_ms": 10})))
            .unwrap();
        let expected = Slide {
            edge: Edge::Top,
            duration_ms: 10,
        };
        assert_eq!(slide.kind(), "slide");
        assert_eq!(slide.to_args().unwrap(), serde_json::to_value(expected).unwrap());
    }

    #[test]
    fn test_unknown_kinds() {
        let registry = FactoryRegistry::new();
        assert!(matches!(
            registry.page_factory(&Descriptor::new("ghost", Value::Null)),
            Err(RestoreError::UnknownFactory(kind)) if kind == "ghost"
        ));
        assert!(matches!(
            registry.transition(&Descriptor::new("warp", Value::Null)),
            Err(RestoreError::UnknownTransition(_))
        ));
    }

    #[test]
    fn test_bad_args_are_corrupt() {
        let registry = FactoryRegistry::new();
        let result = registry.transition(&Descriptor::new("slide", json!({"edge": 12})));
        assert!(matches!(result, Err(RestoreError::Corrupt(_))));
    }

    #[test]
    fn test_registered_page_roundtrip() {
        let log = LifecycleLog::new();
        let mut registry = FactoryRegistry::new();
        ScriptedFactory::register(&mut registry, &log);

        let original = ScriptedFactory::new("inbox", &log);
        let descriptor = Descriptor::of_page(&original).unwrap();
        let rebuilt = registry.page_factory(&descriptor).unwrap();

        assert_eq!(rebuilt.kind(), ScriptedFactory::KIND);
        assert_eq!(rebuilt.to_args().unwrap(), original.to_args().unwrap());
    }
}
