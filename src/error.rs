use thiserror::Error;

#[derive(Debug, Error)]
pub enum WizardyError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Download error: {0}")]
    DownloadError(String),
    #[error("Authentication error: {0}")]
    AuthError(String),
    #[error("Vertex AI error: {0}")]
    VertexError(String),
    #[error("Response error: {0}")]
    ResponseError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl WizardyError {
    pub fn missing_field(field: &str) -> Self {
        WizardyError::RequestError(format!("Missing required field '{}'", field))
    }

    /// The message without its category prefix.
    pub fn detail(&self) -> String {
        match self {
            WizardyError::ConfigError(msg)
            | WizardyError::StorageError(msg)
            | WizardyError::RequestError(msg)
            | WizardyError::DownloadError(msg)
            | WizardyError::AuthError(msg)
            | WizardyError::VertexError(msg)
            | WizardyError::ResponseError(msg)
            | WizardyError::SerializationError(msg) => msg.clone(),
            WizardyError::IoError(e) => e.to_string(),
        }
    }
}

impl From<serde_json::Error> for WizardyError {
    fn from(e: serde_json::Error) -> Self {
        WizardyError::SerializationError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WizardyError>;
