//! Error types for ffpass-av.

use std::path::PathBuf;

use crate::driver::ExecutionError;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while assembling or running an encode.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required external tool is not available.
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// Failed to parse tool output.
    #[error("failed to parse {tool} output: {message}")]
    ParseError { tool: String, message: String },

    /// An input file could not be probed.
    #[error("unable to probe {}: {message}", path.display())]
    Probe { path: PathBuf, message: String },

    /// Caller-provided configuration is structurally invalid.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The encoder process exited abnormally.
    #[error("encoding failed")]
    Encoding {
        #[source]
        source: ExecutionError,
    },

    /// Unsupported operation or media.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Pass workspace could not be created or released.
    #[error("workspace error: {0}")]
    Workspace(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a tool not found error.
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// Create a parse error.
    pub fn parse_error(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a probe failure for `path`.
    pub fn probe(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Probe {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Wrap a driver failure as an encoding error.
    pub fn encoding(source: ExecutionError) -> Self {
        Self::Encoding { source }
    }

    /// The underlying driver failure, if this is an encoding error.
    pub fn execution(&self) -> Option<&ExecutionError> {
        match self {
            Self::Encoding { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn encoding_error_keeps_driver_detail() {
        let err = Error::encoding(ExecutionError::new("ffmpeg", Some(1), "bad pass"));
        assert_eq!(err.to_string(), "encoding failed");
        let source = err.source().expect("source");
        assert!(source.to_string().contains("bad pass"));
        assert_eq!(err.execution().and_then(|e| e.code()), Some(1));
    }

    #[test]
    fn probe_error_names_path() {
        let err = Error::probe("/media/a.mp4", "no streams");
        assert_eq!(err.to_string(), "unable to probe /media/a.mp4: no streams");
    }
}
