//! HTTP response model.
//!
//! A [`Response`] carries status, final URL and headers up front. The body
//! is read at most once: every body accessor takes `self`, so a response
//! that has been read is gone.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::Error;

#[derive(Debug)]
enum Body {
    Buffered(Bytes),
    Streaming(reqwest::Response),
}

/// A response returned by a [`Transport`](crate::Transport).
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    url: Url,
    headers: HeaderMap,
    body: Body,
}

impl Response {
    /// Build a response from an in-memory body.
    ///
    /// Used by custom transports and test doubles.
    pub fn from_parts(
        status: StatusCode,
        url: Url,
        headers: HeaderMap,
        body: impl Into<Bytes>,
    ) -> Self {
        Self {
            status,
            url,
            headers,
            body: Body::Buffered(body.into()),
        }
    }

    pub(crate) fn from_reqwest(response: reqwest::Response) -> Self {
        Self {
            status: response.status(),
            url: response.url().clone(),
            headers: response.headers().clone(),
            body: Body::Streaming(response),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Whether the status is in the 2xx range.
    pub fn ok(&self) -> bool {
        self.status.is_success()
    }

    /// Final URL of the response (after redirects, if the transport follows them).
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Read the whole body as raw bytes.
    pub async fn bytes(self) -> Result<Bytes, Error> {
        match self.body {
            Body::Buffered(bytes) => Ok(bytes),
            Body::Streaming(response) => Ok(response.bytes().await?),
        }
    }

    /// Read the body as text.
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected.
    pub async fn text(self) -> Result<String, Error> {
        match self.body {
            Body::Buffered(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Body::Streaming(response) => Ok(response.text().await?),
        }
    }

    /// Read the body and deserialize it as JSON.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, Error> {
        let bytes = self.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Read the body together with its content type.
    pub async fn blob(self) -> Result<Blob, Error> {
        let content_type = self.content_type().map(str::to_string);
        let bytes = self.bytes().await?;
        Ok(Blob {
            bytes,
            content_type,
        })
    }
}

/// A binary body plus the content type it was served with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

impl Blob {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}
