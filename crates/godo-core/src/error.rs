//! Error types for API operations.
//!
//! Failures fall into four groups: construction errors raised before any
//! network activity, transport errors passed through from `reqwest`, API
//! errors for every non-2xx response, and decoding errors for success
//! responses whose body cannot be read as the expected JSON.

use crate::response::Response;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::warn;

/// Main error type for API operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The base URL or request path could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request body could not be encoded as JSON
    #[error("Failed to serialize request body: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The underlying HTTP transport failed
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The API answered with a status outside `200..300`
    #[error(transparent)]
    Api(Box<ErrorResponse>),

    /// A success response carried a body that could not be decoded
    #[error("Failed to decode response body: {0}")]
    Decoding(#[source] serde_json::Error),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A caller-supplied argument cannot address a resource
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Specialized result type for API operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => "INVALID_URL",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Api(_) => "API_ERROR",
            Self::Decoding(_) => "DECODING_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
        }
    }

    /// Returns the HTTP status code carried by an API error.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api(err) => Some(err.response.status()),
            _ => None,
        }
    }

    /// Returns the structured error when this is an API error.
    #[must_use]
    pub fn as_api_error(&self) -> Option<&ErrorResponse> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }

    /// Returns true if the API reported the resource as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

impl From<ErrorResponse> for Error {
    fn from(err: ErrorResponse) -> Self {
        Self::Api(Box::new(err))
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Config(err.to_string())
    }
}

/// A field-level validation detail nested inside an API error body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Resource the error applies to
    #[serde(default)]
    pub resource: String,
    /// Field the error applies to
    #[serde(default)]
    pub field: String,
    /// Machine-readable error code
    #[serde(default)]
    pub code: String,
}

/// An API failure: the response that caused it plus whatever the body said.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    /// The offending response
    pub response: Response,
    /// Human-readable message, empty when the body carried none
    pub message: String,
    /// Field-level sub-errors, in the order the server sent them
    pub errors: Vec<FieldError>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<Vec<FieldError>>,
}

impl ErrorResponse {
    /// Build an error from a failed response and its raw body.
    ///
    /// An empty or malformed body is not an error in itself: the result then
    /// carries only the response.
    #[must_use]
    pub fn from_body(response: Response, body: &[u8]) -> Self {
        let parsed = if body.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            serde_json::from_slice::<ErrorBody>(body).ok()
        };

        let (message, errors) = parsed
            .map(|body| {
                (
                    body.message.unwrap_or_default(),
                    body.errors.unwrap_or_default(),
                )
            })
            .unwrap_or_default();

        Self {
            response,
            message,
            errors,
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {}",
            self.response.method(),
            self.response.url(),
            self.response.status().as_u16()
        )?;
        if !self.message.is_empty() {
            write!(f, " {}", self.message)?;
        }
        for sub in &self.errors {
            write!(f, " [{}.{}: {}]", sub.resource, sub.field, sub.code)?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorResponse {}

/// Classify a response: statuses in `200..300` pass through, everything else
/// becomes an [`Error::Api`].
///
/// # Errors
///
/// Returns [`Error::Api`] for any status outside `200..300`.
pub fn check_response(response: Response, body: &[u8]) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let err = ErrorResponse::from_body(response, body);
    warn!(
        method = %err.response.method(),
        url = %err.response.url(),
        status = err.response.status().as_u16(),
        message = %err.message,
        "API request failed"
    );
    Err(err.into())
}
