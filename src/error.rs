use thiserror::Error;

/// Errors produced by [`EventEmitter`](crate::EventEmitter) operations.
///
/// `Validation` and `Capacity` are registration failures. They are delivered to
/// `error` listeners when that slot is populated and returned to the caller
/// otherwise. `Config` and `ConfigLoad` are always returned to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmitterError {
    #[error("listener must be callable, got {got}")]
    Validation { got: String },

    #[error("max listeners exceeded for event '{event}' (max: {max})")]
    Capacity { event: String, max: usize },

    #[error("max listeners must be a positive integer, got {0}")]
    Config(String),

    #[error("failed to load config: {0}")]
    ConfigLoad(String),

    // raised by handlers
    #[error("listener failed: {0}")]
    Listener(String),
}

pub type EmitterResult<T> = Result<T, EmitterError>;

impl EmitterError {
    pub fn listener<S: Into<String>>(message: S) -> Self {
        EmitterError::Listener(message.into())
    }

    /// Registration failures may be redirected to `error` listeners.
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            EmitterError::Validation { .. } | EmitterError::Capacity { .. }
        )
    }
}
