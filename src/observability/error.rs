//! Error types for observability sinks

#[derive(Debug, Clone, thiserror::Error)]
pub enum ObservabilityError {
    #[error("Failed to deliver {report} to {} subscribers: {failed_subscribers:?}", .failed_subscribers.len())]
    PublishFailed {
        report: String,
        failed_subscribers: Vec<String>,
    },

    #[error("Sink unavailable: {message}")]
    SinkUnavailable { message: String },
}

impl crate::core::error_handling::ContextualError for ObservabilityError {
    fn is_user_actionable(&self) -> bool {
        false
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}
