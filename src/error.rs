use std::io;
use thiserror::Error;

/// Custom result type for the SDK
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of an [`Error`], used to tell "it never finished"
/// apart from "the call itself broke".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The polling budget ran out while the status stayed transient
    Timeout,
    /// Polling was cancelled while waiting between attempts
    Interrupted,
    /// The remote call (or a local precondition for it) failed
    FetchFailed,
    /// The response could not be mapped onto a result
    ParseFailed,
}

/// Error types for the Reality Defender SDK
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Authentication failure (401, 403, or a plan restriction reported as 400)
    #[error("{message}")]
    Unauthorized { status: u16, message: String },

    /// Resource not found
    #[error("Resource not found")]
    NotFound,

    /// 5xx response from the API
    #[error("API error: {message}")]
    ServerError { status: u16, message: String },

    /// Any other non-success response from the API
    #[error("Invalid request: {message}")]
    ApiError { status: u16, message: String },

    /// Invalid file
    #[error("Invalid file: {0}")]
    InvalidFile(String),

    /// Upload failed
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// Invalid request, rejected before reaching the API
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidData(String),

    /// The result stayed in a transient state for the whole polling budget
    #[error("Timed out waiting for result {request_id} after {attempts} attempts")]
    Timeout { request_id: String, attempts: u32 },

    /// A results page kept analyzing items for the whole polling budget
    #[error("Timed out waiting for results page {page} after {attempts} attempts")]
    PageTimeout { page: u32, attempts: u32 },

    /// Polling was cancelled while waiting for the next attempt
    #[error("Polling interrupted for {request_id}")]
    Interrupted { request_id: String },

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    IOError(#[from] io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Timeout { .. } | Error::PageTimeout { .. } => ErrorKind::Timeout,
            Error::Interrupted { .. } => ErrorKind::Interrupted,
            Error::JsonError(_) | Error::InvalidData(_) => ErrorKind::ParseFailed,
            _ => ErrorKind::FetchFailed,
        }
    }

    /// HTTP status code reported by the API, if this error came from a response
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Unauthorized { status, .. }
            | Error::ServerError { status, .. }
            | Error::ApiError { status, .. } => Some(*status),
            Error::NotFound => Some(404),
            Error::RequestError(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether polling gave up because the budget ran out
    pub fn is_timeout(&self) -> bool {
        self.kind() == ErrorKind::Timeout
    }
}
