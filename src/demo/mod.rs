//! Terminal demo host.
//!
//! Three colour pages in a ratatui screen: Red fades, Green slides in from
//! the left and Blue slides in from the right while hosting a nested stack
//! of its own. The stack is written to disk on quit and restored on the
//! next launch.

mod app;
mod pages;
mod store;
mod view;

pub use app::{run, DemoApp};
pub use pages::{ColorFactory, ColorPage, Swatch};
pub use store::StackStore;
pub use view::{PanelView, TuiContainer};
