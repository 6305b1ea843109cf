//! # reqkit
//!
//! Configurable HTTP request instances.
//!
//! An [`Instance`] carries shared [`Options`] (prefix URL, headers, query
//! parameters, timeout, hooks). Every verb call merges its own options on
//! top, starts the request right away and returns a [`PendingResponse`].
//!
//! ## Instances
//!
//! ```ignore
//! use reqkit::{create, Options};
//! use std::time::Duration;
//!
//! let api = create(
//!     Options::new()
//!         .prefix_url("https://api.example.com/v1")
//!         .header("accept", "application/json")
//!         .timeout(Duration::from_secs(10)),
//! );
//!
//! // GET https://api.example.com/v1/users?page=2
//! let users: Vec<User> = api.get("users", Options::new().param("page", 2)).json().await?;
//!
//! // A child instance; `api` is unaffected
//! let admin = api.extend(Options::new().header("x-role", "admin"));
//! ```
//!
//! ## Dynamic headers
//!
//! `get_options` runs right before each attempt and may await:
//!
//! ```ignore
//! let api = create(Options::new().get_options(move |_url, _current| {
//!     let tokens = tokens.clone();
//!     async move {
//!         Ok(Options::new().header("authorization", format!("Bearer {}", tokens.current().await)))
//!     }
//! }));
//! ```
//!
//! ## Failures and retry
//!
//! Non-2xx responses fail with [`ResponseError`], timeouts with
//! [`TimeoutError`], caller cancellation with [`AbortError`]. An
//! `on_failure` hook decides what the caller finally sees:
//!
//! ```ignore
//! let api = create(Options::new().on_failure(|error, attempt| async move {
//!     match error.kind() {
//!         FailureKind::Status | FailureKind::Transport => {
//!             attempt.retry(attempt.options().clone().without_failure_hook()).await
//!         }
//!         _ => Err(error),
//!     }
//! }));
//! ```

pub mod error;
pub mod hooks;
pub mod options;
pub mod pending;
pub mod request;
pub mod response;
pub mod transport;
pub mod types;

mod coordinator;
mod instance;
mod pipeline;
mod resolve;

pub use error::{AbortError, BoxError, Error, FailureKind, ResponseError, TimeoutError};
pub use hooks::{FailedAttempt, FailureHook, JsonTransform, OptionsProvider};
pub use instance::{create, Instance};
pub use options::{Options, OptionsConfig};
pub use pending::PendingResponse;
pub use request::Request;
pub use response::{Blob, Response};
pub use transport::{ReqwestTransport, Transport};
pub use types::{Headers, Method};

pub use reqkit_query::{parse, serialize, Brackets, ParamValue, Params, QuerySerializer, RepeatedKeys};
pub use tokio_util::sync::CancellationToken;
