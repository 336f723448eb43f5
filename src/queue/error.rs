//! Queue Error Types

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueueError {
    #[error("Invalid queue configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Queue is full (max size: {max_size})")]
    QueueFull { max_size: usize },

    #[error("Internal queue error: {message}")]
    Internal { message: String },
}

impl QueueError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        QueueError::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// True for errors a producer can recover from by backing off
    pub fn is_recoverable(&self) -> bool {
        matches!(self, QueueError::QueueFull { .. })
    }
}

impl crate::core::error_handling::ContextualError for QueueError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, QueueError::InvalidConfiguration { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            QueueError::InvalidConfiguration { message } => Some(message),
            _ => None,
        }
    }
}

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;
