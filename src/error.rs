//! Error types for the loss layers.

/// Crate result type.
pub type Result<T> = std::result::Result<T, LossError>;

/// Errors raised while configuring or running a layer.
#[derive(Debug, thiserror::Error)]
pub enum LossError {
    /// Bad layer configuration, fixable by the caller.
    #[error("config error: {reason}")]
    Config {
        /// Description of what went wrong
        reason: String,
    },

    /// Input tensors with incompatible shapes.
    #[error("shape error: {reason}")]
    Shape {
        /// Description of what went wrong
        reason: String,
    },

    /// Broken internal invariant. Not recoverable; the computation must stop.
    #[error("fatal error: {reason}")]
    Fatal {
        /// Description of what went wrong
        reason: String,
    },

    /// Reading or writing a config file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Config JSON could not be parsed or written.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LossError {
    pub fn config(reason: impl Into<String>) -> Self {
        LossError::Config { reason: reason.into() }
    }

    pub fn shape(reason: impl Into<String>) -> Self {
        LossError::Shape { reason: reason.into() }
    }

    pub fn fatal(reason: impl Into<String>) -> Self {
        LossError::Fatal { reason: reason.into() }
    }

    /// True for defect-class errors that callers should not try to recover from.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LossError::Fatal { .. })
    }
}
