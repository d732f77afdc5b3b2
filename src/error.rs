//! Error types for the tutor core.

use crate::llm::error::LlmError;

/// Top-level error type for the tutor.
#[derive(Debug, thiserror::Error)]
pub enum TutorError {
    /// Configuration could not be read, parsed or written.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A turn was submitted with neither text nor an image.
    #[error("a message needs text or an image")]
    EmptyUtterance,

    /// A turn was submitted while a previous turn is still resolving.
    #[error("a previous message is still being answered")]
    TurnInProgress,

    /// The voice platform lacks the requested capability.
    #[error("voice {0} is not supported on this platform")]
    VoiceUnsupported(&'static str),

    /// `listen` was called while another listen is outstanding.
    #[error("already listening")]
    ListenInProgress,

    /// Speech recognition or synthesis failed.
    #[error("voice error: {0}")]
    Voice(String),

    /// An image attachment could not be loaded.
    #[error("image error: {0}")]
    Image(String),

    /// A generation backend error that escaped the resolver.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, TutorError>;
