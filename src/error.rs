use std::io;
use thiserror::Error;

/// Custom result type alias for the application
pub type Result<T> = std::result::Result<T, ReadmeError>;

/// User-facing text for clone failures. The underlying git output is only logged.
pub const CLONE_FAILED_MESSAGE: &str =
    "Failed to clone repository. Please check the URL and make sure the repository is public.";

/// User-facing text for anything unanticipated.
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred while generating the README.";

/// Errors that can occur while turning a repository into a README
#[derive(Debug, Error)]
pub enum ReadmeError {
    /// Missing or invalid configuration, e.g. no model credential
    #[error("Config error: {0}")]
    Config(String),

    /// Input validation errors (malformed request or URL)
    #[error("Validation error: {0}")]
    Validation(String),

    /// The shallow clone failed or timed out
    #[error("Clone error: {0}")]
    Clone(String),

    /// The model returned no usable text; carries the provider feedback verbatim
    #[error("Generation blocked: {0}")]
    GenerationBlocked(String),

    /// Transport or protocol failures talking to the model provider
    #[error("LLM error: {0}")]
    Llm(String),

    /// I/O errors
    #[error("IO error: {0}")]
    IO(#[from] io::Error),

    /// JSON parsing/serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Directory traversal errors
    #[error("Walkdir error: {0}")]
    Walkdir(#[from] walkdir::Error),

    /// Anything else
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReadmeError {
    /// HTTP status the error maps to when it reaches a caller
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            _ => 500,
        }
    }

    /// Message that is safe to show to the caller.
    ///
    /// Clone and internal failures are reduced to a generic text; the detail
    /// stays in the server log.
    pub fn public_message(&self) -> String {
        match self {
            Self::Config(msg) => format!("Server configuration error: {}", msg),
            Self::Validation(msg) => format!("Invalid request: {}", msg),
            Self::Clone(_) => CLONE_FAILED_MESSAGE.to_string(),
            Self::GenerationBlocked(feedback) => format!(
                "README generation failed: the model returned no content. Feedback: {}",
                feedback
            ),
            _ => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }

    /// Whether the detail of this error should be logged at error level
    pub fn is_internal(&self) -> bool {
        !matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ReadmeError::Validation("bad".into()).status_code(), 400);
        assert_eq!(ReadmeError::Config("no key".into()).status_code(), 500);
        assert_eq!(ReadmeError::Clone("exit 128".into()).status_code(), 500);
        assert_eq!(ReadmeError::GenerationBlocked("SAFETY".into()).status_code(), 500);
    }

    #[test]
    fn test_public_message_hides_clone_detail() {
        let error = ReadmeError::Clone("fatal: could not read Username for 'https://x'".into());
        let message = error.public_message();
        assert_eq!(message, CLONE_FAILED_MESSAGE);
        assert!(!message.contains("Username"));
    }

    #[test]
    fn test_public_message_keeps_provider_feedback() {
        let error = ReadmeError::GenerationBlocked(r#"{"finishReason":"SAFETY"}"#.into());
        assert!(error.public_message().contains(r#"{"finishReason":"SAFETY"}"#));
    }

    #[test]
    fn test_internal_errors_are_generic() {
        let error = ReadmeError::Llm("connection reset by peer".into());
        assert_eq!(error.public_message(), INTERNAL_ERROR_MESSAGE);
        assert!(error.is_internal());
        assert!(!ReadmeError::Validation("x".into()).is_internal());
    }
}
