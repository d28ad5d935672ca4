//! Errors raised while turning a `SavedStack` back into live entries.

use thiserror::Error;

use crate::stack::EntryId;

/// Restoration failures. Restoration is all-or-nothing, so any of these
/// leaves the target engine untouched.
#[derive(Debug, Error)]
pub enum RestoreError {
    /// No page factory is registered under this kind.
    #[error("unknown page factory kind '{0}'")]
    UnknownFactory(String),

    /// No transition factory is registered under this kind.
    #[error("unknown transition kind '{0}'")]
    UnknownTransition(String),

    /// Two saved entries share one identifier.
    #[error("duplicate entry id {0} in saved stack")]
    DuplicateEntry(EntryId),

    /// The snapshot was written by a newer format.
    #[error("unsupported saved stack version {found} (max {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The serialized data itself is unreadable.
    #[error("corrupt stack data: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_version_message() {
        let err = RestoreError::UnsupportedVersion {
            found: 9,
            supported: 1,
        };
        assert_eq!(
            err.to_string(),
            "unsupported saved stack version 9 (max 1)"
        );
    }
}
