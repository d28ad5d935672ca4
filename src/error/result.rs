//! Result type alias for navigation operations.

use super::nav::NavError;

/// Type alias for Results using [`NavError`].
///
/// # Example
///
/// ```ignore
/// use folio::error::NavResult;
///
/// fn open_settings(engine: &mut StackEngine) -> NavResult<PageRef> {
///     engine.push(SettingsFactory::default())
/// }
/// ```
pub type NavResult<T> = Result<T, NavError>;
