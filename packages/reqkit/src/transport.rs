//! HTTP transport abstraction.
//!
//! The pipeline never talks to the network directly; it hands a fully built
//! [`Request`] to a [`Transport`] together with a cancellation token. This
//! keeps the pipeline testable without network calls.

use async_trait::async_trait;
use reqwest::Client;
use tokio_util::sync::CancellationToken;

use crate::error::Error;
use crate::request::Request;
use crate::response::Response;

/// Trait for sending HTTP requests.
///
/// Implementations should stop work and return promptly once `signal` is
/// cancelled. The returned [`Response`] is handed back regardless of its
/// status; status classification happens in the pipeline.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request, signal: CancellationToken) -> Result<Response, Error>;
}

/// Production transport using reqwest.
///
/// The client is used as-is: no timeout is configured on it, timeouts are
/// enforced per request by the pipeline.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client (proxies, TLS, connection pool settings).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: Request, signal: CancellationToken) -> Result<Response, Error> {
        let mut req_builder = self
            .client
            .request(request.method.into(), request.url)
            .headers(request.headers);

        if let Some(version) = request.extensions.get::<http::Version>() {
            req_builder = req_builder.version(*version);
        }

        if let Some(body) = request.body {
            req_builder = req_builder.body(body);
        }

        tokio::select! {
            result = req_builder.send() => Ok(Response::from_reqwest(result?)),
            _ = signal.cancelled() => Err(Error::Transport {
                message: "request cancelled".to_string(),
            }),
        }
    }
}
