/// Failures of a single request to the backend.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Unauthorized: {}", .0.as_deref().unwrap_or("credential rejected"))]
    Unauthorized(Option<String>),

    #[error("Bad request: {}", .0.as_deref().unwrap_or("the server rejected the request"))]
    BadRequest(Option<String>),

    #[error("Forbidden: {}", .0.as_deref().unwrap_or("not allowed"))]
    Forbidden(Option<String>),

    #[error("Not found: {}", .0.as_deref().unwrap_or("the resource does not exist"))]
    NotFound(Option<String>),

    #[error("Service unavailable.")]
    Unavailable(Option<String>),

    #[error("There was an error with the service: Status {status}.")]
    Status { status: u16, detail: Option<String> },

    #[error("Couldn't reach the server: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response from the server: {0}")]
    Decode(String),
}

impl ApiError {
    /// Message supplied by the server, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized(v)
            | ApiError::BadRequest(v)
            | ApiError::Forbidden(v)
            | ApiError::NotFound(v)
            | ApiError::Unavailable(v)
            | ApiError::Status { detail: v, .. } => v.as_deref(),
            ApiError::Validation(v) => Some(v),
            ApiError::Http(_) | ApiError::Decode(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }
}

/// Failures surfaced by the session. Every variant carries something a user can read.
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    Remote(String),

    #[error("Your session has expired. Please log in again.")]
    StaleCredential,

    #[error("Unexpected response from the server: {0}")]
    Decode(String),

    #[error("You are not logged in.")]
    NotAuthenticated,

    #[error("Failed to store the session: {0}")]
    Storage(String),
}

impl SessionError {
    /// Maps a request failure to the session taxonomy. `fallback` is used when the server did not
    /// say anything useful.
    pub(crate) fn from_api(err: ApiError, fallback: &str) -> Self {
        let reason = err.detail().unwrap_or(fallback).to_string();
        match err {
            ApiError::Validation(v) => SessionError::Validation(v),
            ApiError::Decode(v) => SessionError::Decode(v),
            ApiError::Unauthorized(_) => SessionError::Authentication(reason),
            _ => SessionError::Remote(reason),
        }
    }

    /// Like [`SessionError::from_api`] for login and registration, where a rejected request means
    /// the credentials were wrong.
    pub(crate) fn from_auth(err: ApiError, fallback: &str) -> Self {
        match err {
            ApiError::BadRequest(_) | ApiError::Unauthorized(_) => {
                SessionError::Authentication(err.detail().unwrap_or(fallback).to_string())
            }
            err => SessionError::from_api(err, fallback),
        }
    }
}

impl From<std::io::Error> for SessionError {
    fn from(value: std::io::Error) -> Self {
        SessionError::Storage(value.to_string())
    }
}
