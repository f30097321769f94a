use thiserror::Error;

#[derive(Error, Debug)]
pub enum PyletError {
    // Event errors
    #[error("Event file not found: {path}")]
    EventNotFound { path: String },

    #[error("Malformed event JSON: {0}")]
    MalformedEvent(String),

    #[error("No script provided (pass SCRIPT inline or use --file)")]
    ScriptMissing,

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Generic wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PyletError>;
