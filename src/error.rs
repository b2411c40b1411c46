/******************************************************************************
    Author: Joaquín Béjar García
    Email: jb@taunais.com
    Date: 14/6/25
 ******************************************************************************/
use std::fmt;
use std::fmt::{Display, Formatter};
use reqwest::StatusCode;

/// Outcome of a single GET against the orders API.
#[derive(Debug)]
pub enum FetchError {
    Network(reqwest::Error),
    Status(StatusCode, String),
    Json(serde_json::Error),
}

impl FetchError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Status(s, _) => Some(*s),
            FetchError::Network(e) => e.status(),
            FetchError::Json(_) => None,
        }
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Network(e) => write!(f, "network error: {e}"),
            FetchError::Status(s, body) => write!(f, "unexpected http status: {s}, body: {body}"),
            FetchError::Json(e) => write!(f, "json error: {e}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network(err)
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Json(err)
    }
}

#[derive(Debug)]
pub enum AuthError {
    Network(reqwest::Error),
    Json(serde_json::Error),
    BadCredentials,
    Unexpected(StatusCode),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Network(e) => write!(f, "network error: {e}"),
            AuthError::Json(e)    => write!(f, "json error: {e}"),
            AuthError::BadCredentials => write!(f, "bad credentials"),
            AuthError::Unexpected(s) => write!(f, "unexpected http status: {s}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self { AuthError::Network(e) }
}
impl From<serde_json::Error> for AuthError {
    fn from(e: serde_json::Error) -> Self { AuthError::Json(e) }
}

/// Failure to append a page. The store either refused the row or could not be reached.
#[derive(Debug)]
pub enum StorageError {
    Transport(FetchError),
    Rejected(StatusCode, String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Transport(e) => write!(f, "transport error: {e}"),
            StorageError::Rejected(s, body) => write!(f, "insert rejected with status {s}: {body}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Transport(e) => Some(e),
            StorageError::Rejected(..) => None,
        }
    }
}

impl From<FetchError> for StorageError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Status(status, body) => StorageError::Rejected(status, body),
            other => StorageError::Transport(other),
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    Config(String),
    Auth(AuthError),
    Fetch(FetchError),
    Storage(StorageError),
    InvalidWindow(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg)  => write!(f, "configuration error: {msg}"),
            AppError::Auth(e)      => write!(f, "auth error: {e}"),
            AppError::Fetch(e)     => write!(f, "fetch error: {e}"),
            AppError::Storage(e)   => write!(f, "storage error: {e}"),
            AppError::InvalidWindow(msg) => write!(f, "invalid window: {msg}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Auth(e) => Some(e),
            AppError::Fetch(e) => Some(e),
            AppError::Storage(e) => Some(e),
            AppError::Config(_) | AppError::InvalidWindow(_) => None,
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self { AppError::Auth(e) }
}
impl From<FetchError> for AppError {
    fn from(e: FetchError) -> Self { AppError::Fetch(e) }
}
impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self { AppError::Storage(e) }
}

#[cfg(test)]
mod tests_errors {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fetch_status_is_exposed() {
        let err = FetchError::Status(StatusCode::SERVICE_UNAVAILABLE, "busy".to_string());
        assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
        assert_eq!(
            err.to_string(),
            "unexpected http status: 503 Service Unavailable, body: busy"
        );
    }

    #[test]
    fn test_app_error_wraps_source() {
        let err: AppError = AuthError::BadCredentials.into();
        assert_eq!(err.to_string(), "auth error: bad credentials");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_storage_error_from_fetch_error() {
        let rejected: StorageError =
            FetchError::Status(StatusCode::CONFLICT, "duplicate".to_string()).into();
        assert!(matches!(rejected, StorageError::Rejected(StatusCode::CONFLICT, ref body) if body == "duplicate"));
        assert!(std::error::Error::source(&rejected).is_none());

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let transport: StorageError = FetchError::Json(json_err).into();
        assert!(matches!(transport, StorageError::Transport(FetchError::Json(_))));
        assert!(std::error::Error::source(&transport).is_some());
    }
}
