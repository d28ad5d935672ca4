//! Trait abstractions for the host collaborators.
//!
//! The engine never renders anything itself. These traits are the seams a
//! host implements so the engine can attach views, report emptiness and
//! announce stack changes.
//!
//! # Traits
//!
//! - [`View`] - Opaque visual root produced by a page
//! - [`Container`] - The physical parent that holds page views
//! - [`StackDelegate`] - Told when popping would empty the stack
//! - [`StackObserver`] - Told after every structural mutation

pub mod container;
pub mod delegate;
pub mod view;

pub use container::{Container, ContainerRef};
pub use delegate::{ObserverId, StackChange, StackDelegate, StackObserver};
pub use view::{View, ViewProperty, ViewRef, ViewState};
