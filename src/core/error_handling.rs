//! Generic error reporting at the binary edge
//!
//! Library code returns typed errors; the binary decides how loudly to report
//! them. Errors that a user can fix (bad configuration values) are shown
//! verbatim, everything else is shown as the failing operation with the
//! detail kept at debug level.

/// Errors that know whether the user can act on them
///
/// When `is_user_actionable()` returns `true`, `user_message()` must return
/// `Some(message)`; otherwise it returns `None`.
pub trait ContextualError: std::error::Error {
    /// True when the error carries a message the user can act on directly
    fn is_user_actionable(&self) -> bool;

    /// The message to show when the error is user-actionable
    fn user_message(&self) -> Option<&str>;
}

/// Log a fatal error with a detail level that matches its kind
///
/// # Examples
/// ```rust,no_run
/// # use eventqueue::core::error_handling::log_error_with_context;
/// # use eventqueue::queue::api::QueueError;
/// let err = QueueError::InvalidConfiguration {
///     message: "batch_size must be at least 1".to_string(),
/// };
/// log_error_with_context(&err, "Queue construction");
/// // Logs: "FATAL: batch_size must be at least 1"
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => log::error!("FATAL: {}", user_msg),
        _ => log::error!("FATAL: {} failed", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::api::QueueError;

    #[test]
    fn test_configuration_errors_are_user_actionable() {
        let error = QueueError::InvalidConfiguration {
            message: "max_queue_depth must be at least 1".to_string(),
        };

        assert!(error.is_user_actionable());
        assert_eq!(
            error.user_message(),
            Some("max_queue_depth must be at least 1")
        );
    }

    #[test]
    fn test_internal_errors_are_system_errors() {
        let error = QueueError::Internal {
            message: "mutex poisoned".to_string(),
        };

        assert!(!error.is_user_actionable());
        assert_eq!(error.user_message(), None);

        // Must not panic for either kind
        log_error_with_context(&error, "Queue drain");
    }
}
