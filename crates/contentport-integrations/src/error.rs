use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntegrationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} API error ({status}): {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Media processing failed: {0}")]
    MediaProcessing(String),
}

impl IntegrationError {
    pub fn api(service: &'static str, status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            service,
            status,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IntegrationError>;
