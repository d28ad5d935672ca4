//! The navigation stack engine.
//!
//! A [`StackEngine`] owns an ordered stack of entries inside one container.
//! Each entry pairs a page with the factory that built it, which is what
//! gets persisted. The engine drives every page's lifecycle, coordinates
//! the transition between the two pages a mutation affects, and forwards
//! host lifecycle calls to the top page and its nested stack.
//!
//! # Scheduling
//!
//! Everything runs on one thread. A mutation changes the stack structurally
//! and notifies observers before it returns; the visual part follows on
//! later calls to [`StackEngine::tick`]:
//!
//! 1. the turn after a view is attached, its transitions are started;
//! 2. once every transition has signalled completion, the covered or
//!    removed page is torn down and the new top page is made visible and
//!    focused.
//!
//! Hosts call `tick` once per frame, or `settle().await` to run turns until
//! the engine is idle.

mod engine;
mod entry;
mod host;
mod navigator;
mod pending;
mod persist;

pub use engine::StackEngine;
pub use entry::EntryId;
pub use host::HostPhase;
pub use navigator::Navigator;
pub use persist::{SavedEntry, SavedStack, SAVED_STACK_VERSION};
