//! The handle returned by every verb.
//!
//! A [`PendingResponse`] is created with its request already running on the
//! tokio runtime. Await it for the raw [`Response`], or call one of the body
//! readers to wait and decode in one step:
//!
//! ```rust,ignore
//! let user: User = api.get("users/1", None).json().await?;
//! let page = api.get("index.html", None).text().await?;
//! let response = api.head("health", None).await?;
//! ```
//!
//! Every reader consumes the handle, so a body can only be read once.

use std::future::IntoFuture;

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::error::Error;
use crate::hooks::JsonTransform;
use crate::response::{Blob, Response};

enum Inner {
    Running(JoinHandle<Result<Response, Error>>),
    Failed(Error),
}

/// An in-flight request with typed body accessors.
pub struct PendingResponse {
    inner: Inner,
    on_json: Option<JsonTransform>,
}

impl PendingResponse {
    /// Start `attempt` on the current runtime.
    ///
    /// Outside a tokio runtime nothing is started and the handle resolves to
    /// [`Error::NoRuntime`].
    pub(crate) fn spawn(
        attempt: BoxFuture<'static, Result<Response, Error>>,
        on_json: Option<JsonTransform>,
    ) -> Self {
        let inner = match Handle::try_current() {
            Ok(handle) => Inner::Running(handle.spawn(attempt)),
            Err(_) => Inner::Failed(Error::NoRuntime),
        };
        Self { inner, on_json }
    }

    /// Whether the request has settled. Never blocks.
    pub fn is_finished(&self) -> bool {
        match &self.inner {
            Inner::Running(task) => task.is_finished(),
            Inner::Failed(_) => true,
        }
    }

    async fn settle(self) -> Result<Response, Error> {
        match self.inner {
            Inner::Running(task) => match task.await {
                Ok(result) => result,
                Err(join_error) => Err(Error::Task {
                    message: join_error.to_string(),
                }),
            },
            Inner::Failed(error) => Err(error),
        }
    }

    /// Decode the body as JSON, apply `on_json` if configured, then
    /// deserialize into `T`.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, Error> {
        let value = self.json_value().await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Decode the body as a JSON value, after `on_json`.
    pub async fn json_value(self) -> Result<Value, Error> {
        let on_json = self.on_json.clone();
        let value: Value = self.settle().await?.json().await?;
        Ok(match on_json {
            Some(transform) => transform(value),
            None => value,
        })
    }

    pub async fn text(self) -> Result<String, Error> {
        self.settle().await?.text().await
    }

    /// The body as a raw byte buffer.
    pub async fn bytes(self) -> Result<Bytes, Error> {
        self.settle().await?.bytes().await
    }

    pub async fn blob(self) -> Result<Blob, Error> {
        self.settle().await?.blob().await
    }

    /// Wait for the request and drain the body, keeping only success or failure.
    pub async fn discard(self) -> Result<(), Error> {
        self.settle().await?.bytes().await?;
        Ok(())
    }
}

impl IntoFuture for PendingResponse {
    type Output = Result<Response, Error>;
    type IntoFuture = BoxFuture<'static, Result<Response, Error>>;

    fn into_future(self) -> Self::IntoFuture {
        self.settle().boxed()
    }
}

impl std::fmt::Debug for PendingResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingResponse")
            .field("finished", &self.is_finished())
            .field("on_json", &self.on_json.is_some())
            .finish()
    }
}
