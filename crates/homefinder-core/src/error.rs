use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a single untrusted property record was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("required field '{0}' is missing or unusable")]
    MissingField(&'static str),

    #[error("field '{field}' has an unusable value: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("record is not a JSON object")]
    NotAnObject,
}

/// Failures of the generative lookup. Callers treat every variant as
/// "no generated results".
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("generative lookup is not configured: {0}")]
    NotConfigured(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("lookup endpoint answered with status {status}")]
    Status { status: u16, body: String },

    #[error("response carried no message content")]
    MissingContent,

    #[error("response text contains no JSON array")]
    NoArray,

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}
