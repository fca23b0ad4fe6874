use thiserror::Error;
use tonic::{Code, Status};

/// Error types for plugin operations.
#[derive(Debug, Error)]
pub enum PluginError {
    /// Configuration rejected by a plugin-level context.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Configuration payload is not valid UTF-8.
    #[error("Configuration is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// No plugin is registered under the requested identifier.
    #[error("Unknown plugin: {0}")]
    UnknownPlugin(String),

    /// No live context has the given id.
    #[error("Unknown context: {0}")]
    UnknownContext(u32),

    /// A live context already uses the given id.
    #[error("Context {0} already exists")]
    DuplicateContext(u32),

    /// An event arrived out of lifecycle order.
    #[error("Lifecycle violation on context {context_id}: {message}")]
    Lifecycle { context_id: u32, message: String },

    /// Server initialization or runtime error.
    #[error("Server error: {0}")]
    Server(String),

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// gRPC transport error.
    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
}

impl PluginError {
    pub(crate) fn lifecycle(context_id: u32, message: impl Into<String>) -> Self {
        PluginError::Lifecycle {
            context_id,
            message: message.into(),
        }
    }
}

impl From<PluginError> for Status {
    fn from(err: PluginError) -> Self {
        let code = match &err {
            PluginError::Configuration(_) | PluginError::InvalidUtf8(_) => Code::InvalidArgument,
            PluginError::UnknownPlugin(_) | PluginError::UnknownContext(_) => Code::NotFound,
            PluginError::DuplicateContext(_) => Code::AlreadyExists,
            PluginError::Lifecycle { .. } => Code::FailedPrecondition,
            PluginError::Server(_) | PluginError::Io(_) => Code::Internal,
            PluginError::Transport(_) => Code::Unavailable,
        };
        Status::new(code, err.to_string())
    }
}

/// Result type for plugin operations.
pub type Result<T> = std::result::Result<T, PluginError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_maps_to_failed_precondition() {
        let status = Status::from(PluginError::lifecycle(7, "delete before done"));
        assert_eq!(status.code(), Code::FailedPrecondition);
        assert!(status.message().contains("context 7"));
    }

    #[test]
    fn bad_utf8_maps_to_invalid_argument() {
        let err = String::from_utf8(vec![0xff, 0xfe]).unwrap_err();
        let status = Status::from(PluginError::from(err));
        assert_eq!(status.code(), Code::InvalidArgument);
    }

    #[test]
    fn unknown_ids_map_to_not_found() {
        assert_eq!(
            Status::from(PluginError::UnknownContext(3)).code(),
            Code::NotFound
        );
        assert_eq!(
            Status::from(PluginError::UnknownPlugin("nope".to_string())).code(),
            Code::NotFound
        );
        assert_eq!(
            Status::from(PluginError::DuplicateContext(3)).code(),
            Code::AlreadyExists
        );
    }
}
