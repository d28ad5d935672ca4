//! Errors raised by stack and page operations.

use thiserror::Error;

use super::restore::RestoreError;

/// Error type for every fallible navigation operation.
#[derive(Debug, Error)]
pub enum NavError {
    /// A required collaborator is structurally unusable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The stack has no entries.
    #[error("navigation stack is empty")]
    EmptyStack,

    /// The page has no live view.
    #[error("page has not been mounted")]
    NotMounted,

    /// A previous mutation has not reached its completion callback yet.
    #[error("a transition is already in flight on this container ({operation} rejected)")]
    TransitionInFlight { operation: &'static str },

    /// The host already forwarded `on_destroy`.
    #[error("stack engine has been destroyed")]
    Destroyed,

    /// Persisted stack data could not be turned back into a stack.
    #[error("failed to restore stack state: {0}")]
    Restore(#[from] RestoreError),

    /// A factory or page state could not be serialized.
    #[error("failed to serialize stack state: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl NavError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        NavError::InvalidArgument(message.into())
    }

    /// Short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            NavError::InvalidArgument(_) => "E_NAV_INVALID_ARG",
            NavError::EmptyStack => "E_NAV_EMPTY",
            NavError::NotMounted => "E_NAV_NOT_MOUNTED",
            NavError::TransitionInFlight { .. } => "E_NAV_IN_FLIGHT",
            NavError::Destroyed => "E_NAV_DESTROYED",
            NavError::Restore(_) => "E_NAV_RESTORE",
            NavError::Serialize(_) => "E_NAV_SERIALIZE",
        }
    }
}
