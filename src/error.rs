// src/error.rs
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], used to pick the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidRequest,
    InvalidAmount,
    UpstreamUnavailable,
    UpstreamTimeout,
    MalformedUpstreamResponse,
    ArithmeticOverflow,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid amount {value:?}: {reason}")]
    InvalidAmount { value: String, reason: String },

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("upstream request timed out: {0}")]
    UpstreamTimeout(String),

    #[error("malformed upstream response: {0}")]
    MalformedUpstreamResponse(String),

    #[error("balance replay overflowed 256-bit range")]
    ArithmeticOverflow,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Error::InvalidAmount { .. } => ErrorKind::InvalidAmount,
            Error::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            Error::UpstreamTimeout(_) => ErrorKind::UpstreamTimeout,
            Error::MalformedUpstreamResponse(_) => ErrorKind::MalformedUpstreamResponse,
            Error::ArithmeticOverflow => ErrorKind::ArithmeticOverflow,
        }
    }

    pub(crate) fn invalid_amount(value: &str, reason: impl Into<String>) -> Self {
        Error::InvalidAmount {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Transport-level failures: a timeout gets its own kind, everything else
/// (connect, non-2xx status, body read) is "unavailable".
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::UpstreamTimeout(err.to_string())
        } else if err.is_decode() {
            Error::MalformedUpstreamResponse(err.to_string())
        } else {
            Error::UpstreamUnavailable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::MalformedUpstreamResponse(err.to_string())
    }
}
