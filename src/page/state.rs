//! Deferred per-page state.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::stack::SavedStack;
use crate::traits::ViewState;

/// State captured when a page is unmounted but retained, or when the whole
/// stack is saved.
///
/// Holds three independent parts: the view hierarchy snapshot, free-form
/// page values written in `Page::on_save_state`, and the page's nested
/// stack if it owned one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<ViewState>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub values: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested: Option<SavedStack>,
}

impl PageState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a page value under `key`.
    pub fn put<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), serde_json::Error> {
        self.values.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Read a page value. Missing or mistyped values yield `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.view.is_none() && self.values.is_empty() && self.nested.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get() {
        let mut state = PageState::new();
        state.put("scroll", &42u32).unwrap();
        state.put("query", &"rust").unwrap();

        assert_eq!(state.get::<u32>("scroll"), Some(42));
        assert_eq!(state.get::<String>("query").as_deref(), Some("rust"));
        assert!(state.contains("scroll"));
    }

    #[test]
    fn test_get_wrong_type_is_none() {
        let mut state = PageState::new();
        state.put("scroll", &"not a number").unwrap();
        assert_eq!(state.get::<u32>("scroll"), None);
        assert_eq!(state.get::<u32>("missing"), None);
    }

    #[test]
    fn test_empty_state_serializes_compactly() {
        let json = serde_json::to_string(&PageState::new()).unwrap();
        assert_eq!(json, "{}");
        assert!(serde_json::from_str::<PageState>(&json).unwrap().is_empty());
    }
}
