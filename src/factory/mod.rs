//! Page factories and their persistable descriptors.
//!
//! A stack entry remembers how its page was built so the page can be rebuilt
//! after its view was torn down, and so the whole stack can be restored in
//! another process. Factories describe themselves as a [`Descriptor`]: a
//! registry kind plus serialized arguments. The [`FactoryRegistry`] turns a
//! descriptor back into a factory.
//!
//! Most factories are plain serde types and implement [`PageDescriptor`],
//! which provides [`PageFactory`] for free:
//!
//! ```ignore
//! #[derive(Serialize, Deserialize)]
//! struct Profile { user: String }
//!
//! impl PageDescriptor for Profile {
//!     const KIND: &'static str = "profile";
//!     fn create_page(&self) -> PageRef {
//!         page_ref(ProfilePage::new(&self.user))
//!     }
//! }
//!
//! registry.register::<Profile>();
//! engine.push(Profile { user: "ada".into() })?;
//! ```

mod registry;

pub use registry::FactoryRegistry;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::page::PageRef;
use crate::transition::TransitionFactory;

/// Reconstructible recipe for a page.
pub trait PageFactory {
    /// Registry key.
    fn kind(&self) -> &str;

    /// Build a fresh page instance.
    fn create_page(&self) -> PageRef;

    /// Arguments the registry needs to rebuild this factory.
    fn to_args(&self) -> Result<Value, serde_json::Error>;
}

/// A serde type that doubles as its own page factory.
pub trait PageDescriptor: Serialize + DeserializeOwned + 'static {
    const KIND: &'static str;

    fn create_page(&self) -> PageRef;
}

impl<T: PageDescriptor> PageFactory for T {
    fn kind(&self) -> &str {
        T::KIND
    }

    fn create_page(&self) -> PageRef {
        PageDescriptor::create_page(self)
    }

    fn to_args(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Serialized form of a page or transition factory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub args: Value,
}

impl Descriptor {
    pub fn new(kind: impl Into<String>, args: Value) -> Self {
        Self {
            kind: kind.into(),
            args,
        }
    }

    pub fn of_page(factory: &dyn PageFactory) -> Result<Self, serde_json::Error> {
        Ok(Self::new(factory.kind(), factory.to_args()?))
    }

    pub fn of_transition(factory: &dyn TransitionFactory) -> Result<Self, serde_json::Error> {
        Ok(Self::new(factory.kind(), factory.to_args()?))
    }
}
