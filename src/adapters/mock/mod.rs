//! Test doubles.
//!
//! # Available Mocks
//!
//! - [`ScriptedFactory`] / [`ScriptedPage`] - pages that record every
//!   lifecycle hook into a shared [`LifecycleLog`]
//! - [`ManualTransitions`] - transition factory whose transitions finish
//!   only when the test says so
//! - [`CountingObserver`] - stack observer that keeps every change it saw

pub mod observer;
pub mod page;
pub mod transition;

pub use observer::CountingObserver;
pub use page::{LifecycleEvent, LifecycleLog, ScriptedFactory, ScriptedPage};
pub use transition::{Direction, ManualTransitions};
