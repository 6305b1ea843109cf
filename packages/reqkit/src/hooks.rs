//! Caller-supplied hooks: failure handling, dynamic options, JSON transform.
//!
//! Both async hooks are implemented for plain closures returning a
//! `'static` future, so most callers never name the traits:
//!
//! ```rust,ignore
//! let options = Options::new()
//!     .get_options(|_url, _current| async move {
//!         Ok(Options::new().header("authorization", read_token().await))
//!     })
//!     .on_failure(|error, attempt: FailedAttempt| async move {
//!         if error.status() == Some(StatusCode::UNAUTHORIZED) {
//!             return attempt.retry(attempt.options().clone().without_failure_hook()).await;
//!         }
//!         Err(error)
//!     });
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Error;
use crate::options::Options;
use crate::pipeline;
use crate::response::Response;
use crate::transport::Transport;

/// Post-parse transform applied to JSON bodies of successful responses.
pub type JsonTransform = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Handles a failed attempt.
///
/// The returned result becomes the outcome of the original call:
/// - `Err(error)` rethrows the original failure,
/// - any other `Err` replaces it,
/// - `attempt.retry(..).await` reissues the request,
/// - `Ok(response)` substitutes a response.
///
/// The hook stays in the options of a retried attempt unless the hook
/// removes it (see [`Options::without_failure_hook`]); a retry that keeps
/// failing with the hook in place will be handled again.
#[async_trait]
pub trait FailureHook: Send + Sync {
    async fn on_failure(&self, error: Error, attempt: FailedAttempt) -> Result<Response, Error>;
}

#[async_trait]
impl<F, Fut> FailureHook for F
where
    F: Fn(Error, FailedAttempt) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
{
    async fn on_failure(&self, error: Error, attempt: FailedAttempt) -> Result<Response, Error> {
        self(error, attempt).await
    }
}

/// Computes extra options (usually headers) right before a request is sent.
///
/// Receives the resolved URL and the options merged so far. When the URL
/// cannot be resolved yet, e.g. a relative path with no prefix configured,
/// it receives the input as given. The result is
/// merged on top of them once the future completes; an error fails the
/// request as-is.
#[async_trait]
pub trait OptionsProvider: Send + Sync {
    async fn options(&self, url: &str, current: &Options) -> Result<Options, Error>;
}

#[async_trait]
impl<F, Fut> OptionsProvider for F
where
    F: Fn(String, Options) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Options, Error>> + Send + 'static,
{
    async fn options(&self, url: &str, current: &Options) -> Result<Options, Error> {
        self(url.to_string(), current.clone()).await
    }
}

/// The context of an attempt that failed, handed to a [`FailureHook`].
pub struct FailedAttempt {
    url: String,
    options: Options,
    transport: Arc<dyn Transport>,
}

impl FailedAttempt {
    pub(crate) fn new(url: String, options: Options, transport: Arc<dyn Transport>) -> Self {
        Self {
            url,
            options,
            transport,
        }
    }

    /// The URL or path the request was issued with, before prefixing.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The full options used for the failed attempt.
    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn into_options(self) -> Options {
        self.options
    }

    /// Reissue the request to the same URL with `options`.
    ///
    /// This runs the whole pipeline again: option resolution, timeout and
    /// cancellation, and the failure hook if `options` still carries one.
    pub async fn retry(&self, options: Options) -> Result<Response, Error> {
        pipeline::execute(Arc::clone(&self.transport), self.url.clone(), options).await
    }

    /// Reissue the request to a different URL or path.
    pub async fn retry_to(&self, url: impl Into<String>, options: Options) -> Result<Response, Error> {
        pipeline::execute(Arc::clone(&self.transport), url.into(), options).await
    }
}

impl std::fmt::Debug for FailedAttempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailedAttempt")
            .field("url", &self.url)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
