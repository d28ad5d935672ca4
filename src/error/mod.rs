//! Error handling for the navigation stack.
//!
//! Every condition here is a programmer error surfaced immediately; nothing
//! is retried. The one expected "failure", popping the last entry, is not an
//! error at all: it is reported to the host through
//! [`StackDelegate::on_stack_empty`](crate::traits::StackDelegate).
//!
//! | Error | Raised when |
//! |-------|-------------|
//! | `InvalidArgument` | a collaborator is structurally unusable |
//! | `EmptyStack` | a query needs a top entry and there is none |
//! | `NotMounted` | a live view is required but the page has none |
//! | `TransitionInFlight` | a mutation is requested before the previous one settled |
//! | `Destroyed` | the engine was already torn down by the host |
//! | `Restore` | persisted stack data is missing or corrupt |

mod nav;
mod restore;
mod result;

pub use nav::NavError;
pub use restore::RestoreError;
pub use result::NavResult;

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn test_restore_error_converts_into_nav_error() {
        let err: NavError = RestoreError::UnknownFactory("missing".to_string()).into();
        assert!(matches!(err, NavError::Restore(_)));
        assert_eq!(err.error_code(), "E_NAV_RESTORE");
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_corrupt_json_flows_through_restore() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: NavError = RestoreError::from(json_err).into();
        assert!(err.to_string().starts_with("failed to restore stack state"));
    }
}
