//! Request options and how they merge.
//!
//! Options come in layers: an instance's own options, then the options of a
//! single call. [`Options::merge`] combines two layers: scalar fields are
//! taken from the override when set, `headers` and `params` are key-wise
//! unions where the override wins per key.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::Extensions;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use reqkit_query::{ParamValue, Params, QuerySerializer};

use crate::error::Error;
use crate::hooks::{FailedAttempt, FailureHook, JsonTransform, OptionsProvider};
use crate::response::Response;
use crate::types::{Headers, Method};

/// Configuration for an instance or a single request.
///
/// Every field is public; the builder methods are shorthands. Fields left
/// unset fall through to the layer below when merged.
#[derive(Clone, Default)]
pub struct Options {
    /// Prepended to relative URLs.
    pub prefix_url: Option<String>,
    pub method: Option<Method>,
    pub headers: Headers,
    pub params: Params,
    pub timeout: Option<Duration>,
    /// Caller-owned cancellation token. Never cancelled by reqkit itself.
    pub signal: Option<CancellationToken>,
    /// Replaces the default repeated-key query serializer.
    pub serializer: Option<Arc<dyn QuerySerializer>>,
    pub on_json: Option<JsonTransform>,
    pub on_failure: Option<Arc<dyn FailureHook>>,
    pub get_options: Option<Arc<dyn OptionsProvider>>,
    pub body: Option<Bytes>,
    /// JSON body; takes precedence over `body`.
    pub json: Option<Value>,
    /// Passed to the transport untouched.
    pub extensions: Extensions,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `other` on top of `self`.
    ///
    /// Neither input is modified and the result shares no mutable state with
    /// them; hooks are shared through `Arc`.
    pub fn merge(&self, other: &Options) -> Options {
        let mut extensions = self.extensions.clone();
        extensions.extend(other.extensions.clone());

        Options {
            prefix_url: other.prefix_url.clone().or_else(|| self.prefix_url.clone()),
            method: other.method.or(self.method),
            headers: self.headers.merge(&other.headers),
            params: self.params.merge(&other.params),
            timeout: other.timeout.or(self.timeout),
            signal: other.signal.clone().or_else(|| self.signal.clone()),
            serializer: other.serializer.clone().or_else(|| self.serializer.clone()),
            on_json: other.on_json.clone().or_else(|| self.on_json.clone()),
            on_failure: other.on_failure.clone().or_else(|| self.on_failure.clone()),
            get_options: other.get_options.clone().or_else(|| self.get_options.clone()),
            body: other.body.clone().or_else(|| self.body.clone()),
            json: other.json.clone().or_else(|| self.json.clone()),
            extensions,
        }
    }

    pub fn prefix_url(mut self, prefix_url: impl Into<String>) -> Self {
        self.prefix_url = Some(prefix_url.into());
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = self.headers.merge(&headers);
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key, value);
        self
    }

    pub fn params(mut self, params: Params) -> Self {
        self.params = self.params.merge(&params);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }

    pub fn serializer(mut self, serializer: impl QuerySerializer + 'static) -> Self {
        self.serializer = Some(Arc::new(serializer));
        self
    }

    pub fn on_json<F>(mut self, transform: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.on_json = Some(Arc::new(transform));
        self
    }

    pub fn on_failure<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Error, FailedAttempt) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, Error>> + Send + 'static,
    {
        self.on_failure = Some(Arc::new(hook));
        self
    }

    /// Like [`Options::on_failure`], for types implementing [`FailureHook`].
    pub fn failure_hook(mut self, hook: impl FailureHook + 'static) -> Self {
        self.on_failure = Some(Arc::new(hook));
        self
    }

    pub fn without_failure_hook(mut self) -> Self {
        self.on_failure = None;
        self
    }

    pub fn get_options<F, Fut>(mut self, provider: F) -> Self
    where
        F: Fn(String, Options) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Options, Error>> + Send + 'static,
    {
        self.get_options = Some(Arc::new(provider));
        self
    }

    /// Like [`Options::get_options`], for types implementing [`OptionsProvider`].
    pub fn options_provider(mut self, provider: impl OptionsProvider + 'static) -> Self {
        self.get_options = Some(Arc::new(provider));
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn json(mut self, json: Value) -> Self {
        self.json = Some(json);
        self
    }

    /// Serialize `body` as the JSON body.
    pub fn with_body(mut self, body: &impl Serialize) -> Result<Self, serde_json::Error> {
        self.json = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn extension<T: Clone + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.extensions.insert(value);
        self
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("prefix_url", &self.prefix_url)
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("params", &self.params)
            .field("timeout", &self.timeout)
            .field("signal", &self.signal.is_some())
            .field("serializer", &self.serializer.is_some())
            .field("on_json", &self.on_json.is_some())
            .field("on_failure", &self.on_failure.is_some())
            .field("get_options", &self.get_options.is_some())
            .field("body", &self.body)
            .field("json", &self.json)
            .finish()
    }
}

/// Static options loadable from a configuration file.
///
/// ```rust
/// use reqkit::{Options, OptionsConfig};
///
/// let config: OptionsConfig = serde_json::from_str(r#"{
///     "prefix_url": "https://api.example.com/v1",
///     "headers": { "accept": "application/json" },
///     "params": { "per_page": 50 },
///     "timeout_ms": 5000
/// }"#).unwrap();
///
/// let options = Options::try_from(config).unwrap();
/// assert_eq!(options.headers.get("Accept"), Some("application/json"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<Method>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub params: serde_json::Map<String, Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl TryFrom<OptionsConfig> for Options {
    type Error = Error;

    fn try_from(config: OptionsConfig) -> Result<Self, Self::Error> {
        Ok(Options {
            prefix_url: config.prefix_url,
            method: config.method,
            headers: config.headers.into_iter().collect(),
            params: Params::from_json(Value::Object(config.params))?,
            timeout: config.timeout_ms.map(Duration::from_millis),
            ..Options::default()
        })
    }
}
