#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Remote call {function} failed: {message}")]
    Remote { function: String, message: String },

    #[error("{0} is not a supported image type")]
    UnsupportedMedia(String),

    #[error("Check-in failed: {0}")]
    CheckIn(String),

    #[error("Record registration failed: {0}")]
    Registration(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No identity registered on this device")]
    MissingIdentity,

    #[error("No files selected")]
    EmptySelection,

    #[error("A send session is already open")]
    SessionActive,

    #[error("The send session is still processing")]
    SessionInProgress,

    #[error("No send session is open")]
    NoSession,
}

pub type Result<T> = std::result::Result<T, Error>;
