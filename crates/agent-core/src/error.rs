//! Agent error types.

/// Errors that end a session.
///
/// Tool failures never surface here; they are fed back to the model as
/// observations. Everything in this enum is fatal to the current session.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// API key not configured.
    #[error("API key not configured")]
    ApiKeyMissing,

    /// The provider could not be constructed or the request could not be sent.
    #[error("provider error: {0}")]
    Provider(String),

    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Result type for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;
