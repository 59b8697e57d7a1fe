use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("missing access token")]
    MissingCredential,
    #[error("unauthorized ({status}): {message}")]
    Unauthorized { status: u16, message: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error(transparent)]
    Config(#[from] SettingsError),
}

impl DataSourceError {
    pub fn from_api_error(status: u16, error: ApiError) -> Self {
        match error.code {
            ErrorCode::Unauthorized | ErrorCode::Forbidden => DataSourceError::Unauthorized {
                status,
                message: error.message,
            },
            ErrorCode::NotFound => DataSourceError::NotFound(error.message),
            _ => DataSourceError::Status {
                status,
                message: error.message,
            },
        }
    }

    /// True when the failure can only be fixed by signing in again.
    pub fn requires_reauth(&self) -> bool {
        matches!(
            self,
            DataSourceError::MissingCredential | DataSourceError::Unauthorized { .. }
        )
    }
}

/// A fetch or commit that did not go through, as kept in view state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Failure {
    pub message: String,
    /// Only a new access token will fix it.
    pub requires_reauth: bool,
}

impl From<&DataSourceError> for Failure {
    fn from(err: &DataSourceError) -> Self {
        Self {
            message: err.to_string(),
            requires_reauth: err.requires_reauth(),
        }
    }
}

/// Client-side refusal to commit a buffer. No request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
    #[error("{field} must be a whole number, got '{value}'")]
    InvalidNumber { field: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("api url must not be empty")]
    EmptyApiUrl,
    #[error("invalid api url '{url}': {reason}")]
    InvalidApiUrl { url: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_maps_to_reauth() {
        let err = DataSourceError::from_api_error(403, ApiError::new(ErrorCode::Forbidden, "no"));
        assert!(err.requires_reauth());
    }

    #[test]
    fn validation_status_is_not_reauth() {
        let err =
            DataSourceError::from_api_error(422, ApiError::new(ErrorCode::Validation, "bad age"));
        assert!(!err.requires_reauth());
        assert_eq!(err.to_string(), "server returned 422: bad age");
    }

    #[test]
    fn failure_keeps_message_and_reauth_flag() {
        let failure = Failure::from(&DataSourceError::MissingCredential);
        assert!(failure.requires_reauth);
        assert_eq!(failure.to_string(), "missing access token");
    }
}
