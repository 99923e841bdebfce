use thiserror::Error;

/// MuseMate errors
#[derive(Error, Debug)]
pub enum MuseError {
    #[error("Configuration Error: {0}")]
    ConfigError(String),

    #[error("Request Error: {0}")]
    RequestError(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("HTTP Error: {status_code} - {message}")]
    HttpError { status_code: u16, message: String },

    #[error("API Error: {message} (type: {error_type})")]
    ApiError { message: String, error_type: String },

    #[error("Response Error: {0}")]
    ResponseError(String),

    #[error("Parsing Error: {0}")]
    ParsingError(String),
}

impl MuseError {
    /// Short name of the failure, used when building diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConfigError(_) => "ConfigError",
            Self::RequestError(_) => "RequestError",
            Self::Timeout(_) => "Timeout",
            Self::HttpError { .. } => "HttpError",
            Self::ApiError { .. } => "ApiError",
            Self::ResponseError(_) => "ResponseError",
            Self::ParsingError(_) => "ParsingError",
        }
    }

    /// Classifies a transport failure, keeping timeouts distinguishable
    pub(crate) fn from_send(context: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(format!("{}: {}", context, err))
        } else {
            Self::RequestError(format!("{}: {}", context, err))
        }
    }
}

/// Result type for MuseMate operations
pub type MuseResult<T> = Result<T, MuseError>;
