//! Error definitions for the runner.

use http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP client error: {source}")]
    HttpClient {
        #[from]
        source: reqwest::Error,
    },

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Timeout: {message}")]
    Timeout { message: String },

    #[error("Response contained no text: {reason}")]
    EmptyResponse { reason: String },
}

impl Error {
    /// 远端返回的 HTTP 状态码（仅 `ApiError`）。
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 是否为配额/限流错误（HTTP 429）。
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(StatusCode::TOO_MANY_REQUESTS.as_u16())
    }
}

impl From<dotenvy::Error> for Error {
    fn from(err: dotenvy::Error) -> Self {
        Self::InvalidConfig {
            message: format!("Failed to read env file: {err}"),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_is_detected_from_status() {
        let err = Error::ApiError {
            status: 429,
            message: "Resource has been exhausted".into(),
        };
        assert!(err.is_rate_limited());
        assert_eq!(err.status(), Some(429));

        let err = Error::ApiError {
            status: 400,
            message: "API key not valid".into(),
        };
        assert!(!err.is_rate_limited());
    }

    #[test]
    fn non_api_errors_have_no_status() {
        let err = Error::InvalidConfig {
            message: "missing".into(),
        };
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "Invalid configuration: missing");
    }
}
