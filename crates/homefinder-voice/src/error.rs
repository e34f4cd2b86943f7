use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoiceError {
    #[error("speech recognition is not supported")]
    Unsupported,

    #[error("voice component was disposed")]
    Disposed,

    #[error("already listening")]
    AlreadyListening,

    #[error("recognition failed: {0}")]
    Recognition(String),

    #[error("synthesis failed: {0}")]
    Synthesis(String),
}
