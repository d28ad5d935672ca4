//! folio - a navigation stack engine.
//!
//! A [`StackEngine`](stack::StackEngine) sequences pages inside a host
//! container: it drives each page through its lifecycle, coordinates the
//! transition between the two pages a mutation affects, persists the stack
//! as a list of page factories and hosts nested stacks inside pages.
//!
//! The `folio` binary is a terminal demo built on the same engine.

pub mod adapters;
pub mod config;
pub mod demo;
pub mod error;
pub mod factory;
pub mod page;
pub mod stack;
pub mod terminal;
pub mod traits;
pub mod transition;
