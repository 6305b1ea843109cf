use std::time::Duration;

use http::StatusCode;

use crate::response::Response;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error(transparent)]
    Response(#[from] ResponseError),

    #[error(transparent)]
    Timeout(#[from] TimeoutError),

    #[error(transparent)]
    Abort(#[from] AbortError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid URL: {message}")]
    InvalidUrl { message: String },

    #[error("Invalid HTTP method: {method}")]
    InvalidMethod { method: String },

    #[error("Invalid header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Query error: {0}")]
    Query(#[from] reqkit_query::Error),

    #[error("Request task failed: {message}")]
    Task { message: String },

    #[error("No tokio runtime available to run the request")]
    NoRuntime,

    #[error(transparent)]
    Custom(BoxError),
}

/// Coarse classification of an [`Error`], for failure hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The transport could not produce a response.
    Transport,
    /// A response arrived with a status outside 2xx.
    Status,
    /// The configured timeout elapsed first.
    Timeout,
    /// The caller's cancellation token fired first.
    Cancelled,
    /// Anything else: invalid input, decoding, user errors.
    Other,
}

impl Error {
    /// Wrap any error, e.g. a domain error raised from a failure hook.
    pub fn custom(error: impl Into<BoxError>) -> Self {
        Error::Custom(error.into())
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Http(_) | Error::Transport { .. } => FailureKind::Transport,
            Error::Response(_) => FailureKind::Status,
            Error::Timeout(_) => FailureKind::Timeout,
            Error::Abort(_) => FailureKind::Cancelled,
            _ => FailureKind::Other,
        }
    }

    /// The status code, when this is a [`ResponseError`].
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Response(e) => Some(e.status()),
            _ => None,
        }
    }

    pub fn response(&self) -> Option<&Response> {
        match self {
            Error::Response(e) => Some(e.response()),
            _ => None,
        }
    }

    /// Take the response out of a [`ResponseError`], e.g. to read an error body.
    pub fn into_response(self) -> Result<Response, Error> {
        match self {
            Error::Response(e) => Ok(e.into_response()),
            other => Err(other),
        }
    }

    /// Downcast a [`Error::Custom`] payload.
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Error::Custom(e) => e.downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// The transport returned a response whose status is outside 2xx.
#[derive(thiserror::Error, Debug)]
#[error("Request failed with status code {}", .response.status())]
pub struct ResponseError {
    response: Response,
}

impl ResponseError {
    pub fn new(response: Response) -> Self {
        Self { response }
    }

    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn into_response(self) -> Response {
        self.response
    }
}

/// The configured timeout elapsed before the transport settled.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Request timed out after {}ms", .timeout.as_millis())]
pub struct TimeoutError {
    timeout: Duration,
}

impl TimeoutError {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// The caller's cancellation token fired before the transport settled.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[error("Request was aborted")]
pub struct AbortError;
