//! Concrete implementations of the host traits.
//!
//! # Adapters
//!
//! - [`HeadlessContainer`] - in-memory container that records its children
//! - [`HeadlessView`] - in-memory view that records visibility, property
//!   animations and a settable state snapshot
//!
//! Headless hosts are enough to drive a full engine without a renderer,
//! which is how the test suite and the benchmarks run it.
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::ScriptedFactory`] - page factory whose pages log every lifecycle step
//! - [`mock::ManualTransitions`] - transitions completed on demand
//! - [`mock::CountingObserver`] - observer that counts notifications

pub mod headless;
pub mod mock;

pub use headless::{HeadlessContainer, HeadlessView};
