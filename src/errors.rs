use axum::http::StatusCode;
use std::fmt;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

/// Failure of a single backend call. Shown inline, never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    Status {
        code: u16,
        reason: Option<&'static str>,
    },
    Transport(String),
    Decode(String),
    InvalidUrl(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Status {
                code,
                reason: Some(reason),
            } => write!(f, "{code} {reason}"),
            FetchError::Status { code, reason: None } => write!(f, "{code}"),
            FetchError::Transport(message) | FetchError::Decode(message) => f.write_str(message),
            FetchError::InvalidUrl(message) => write!(f, "invalid backend url: {message}"),
        }
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    Unparsable(String),
    MixedGranularity,
    Inverted { start: String, end: String },
}

impl fmt::Display for WindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowError::Unparsable(value) => write!(f, "invalid date value: {value}"),
            WindowError::MixedGranularity => f.write_str("start and end must use the same granularity"),
            WindowError::Inverted { start, end } => {
                write!(f, "start {start} is after end {end}")
            }
        }
    }
}

impl std::error::Error for WindowError {}

#[derive(Debug)]
pub struct ConfigError {
    pub key: &'static str,
    pub message: String,
}

impl ConfigError {
    pub fn invalid(key: &'static str, err: impl fmt::Display) -> Self {
        Self {
            key,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {}", self.key, self.message)
    }
}

impl std::error::Error for ConfigError {}
