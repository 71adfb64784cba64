use novade_core::CoreError;
use thiserror::Error;

/// Everything that can go wrong inside the delivery core.
///
/// None of these cross the [`crate::NotificationService`] boundary; they are
/// produced by the capability traits, logged where they are absorbed and
/// otherwise only observable in tests.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Transport error during '{operation}': {message}")]
    Transport { operation: String, message: String },

    #[error("Malformed inbound payload: {0}")]
    Parse(String),

    #[error("Notification history persistence error during operation '{operation}': {message}")]
    Persistence {
        operation: String,
        message: String,
        #[source]
        source: CoreError,
    },

    #[error("Notification history (de)serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Subscriber '{key}' failed: {reason}")]
    Subscriber { key: String, reason: String },

    #[error("Notification permission not granted")]
    PermissionDenied,

    #[error("Presentation failed: {0}")]
    Presentation(String),

    #[error("Internal notification error: {0}")]
    InternalError(String),
}

impl NotificationError {
    pub fn transport(operation: impl Into<String>, message: impl ToString) -> Self {
        NotificationError::Transport {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    pub fn persistence_from_core(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: CoreError,
    ) -> Self {
        NotificationError::Persistence {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }
}
