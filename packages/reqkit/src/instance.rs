//! Instances: shared options plus verb methods.

use std::sync::{Arc, PoisonError, RwLock};

use crate::options::Options;
use crate::pending::PendingResponse;
use crate::pipeline;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::Method;

/// Create an instance backed by a default [`ReqwestTransport`].
pub fn create(options: Options) -> Instance {
    Instance::new(options)
}

/// A reusable request configuration with verb methods.
///
/// Cloning an `Instance` gives another handle to the *same* options cell:
/// [`Instance::configure`] through either handle affects both. Use
/// [`Instance::extend`] for an independent child.
///
/// The options cell is read once at the start of every call, so changes
/// made with `configure` apply to requests issued afterwards and never to
/// requests already in flight.
#[derive(Clone)]
pub struct Instance {
    options: Arc<RwLock<Options>>,
    transport: Arc<dyn Transport>,
}

impl Instance {
    pub fn new(options: Options) -> Self {
        Self::with_transport(options, ReqwestTransport::new())
    }

    pub fn with_transport(options: Options, transport: impl Transport + 'static) -> Self {
        Self::with_shared_transport(options, Arc::new(transport))
    }

    pub fn with_shared_transport(options: Options, transport: Arc<dyn Transport>) -> Self {
        Self {
            options: Arc::new(RwLock::new(options)),
            transport,
        }
    }

    /// A snapshot of the current options.
    pub fn options(&self) -> Options {
        self.options
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Mutate the options in place. Later requests through this instance,
    /// and through its clones, see the change.
    pub fn configure(&self, update: impl FnOnce(&mut Options)) {
        let mut options = self
            .options
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        update(&mut options);
    }

    /// A new instance with `patch` merged over this instance's options.
    ///
    /// The child shares the transport but not the options: configuring one
    /// never affects the other.
    pub fn extend(&self, patch: Options) -> Instance {
        let merged = self.options().merge(&patch);
        Self::with_shared_transport(merged, Arc::clone(&self.transport))
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    /// Issue a request. The request is started before this returns.
    pub fn request(
        &self,
        method: Method,
        url: impl Into<String>,
        options: impl Into<Option<Options>>,
    ) -> PendingResponse {
        let mut merged = match options.into() {
            Some(call) => self.options().merge(&call),
            None => self.options(),
        };
        merged.method = Some(method);

        let on_json = merged.on_json.clone();
        let attempt = pipeline::execute(Arc::clone(&self.transport), url.into(), merged);
        PendingResponse::spawn(attempt, on_json)
    }

    pub fn get(&self, url: impl Into<String>, options: impl Into<Option<Options>>) -> PendingResponse {
        self.request(Method::GET, url, options)
    }

    pub fn post(&self, url: impl Into<String>, options: impl Into<Option<Options>>) -> PendingResponse {
        self.request(Method::POST, url, options)
    }

    pub fn put(&self, url: impl Into<String>, options: impl Into<Option<Options>>) -> PendingResponse {
        self.request(Method::PUT, url, options)
    }

    pub fn patch(&self, url: impl Into<String>, options: impl Into<Option<Options>>) -> PendingResponse {
        self.request(Method::PATCH, url, options)
    }

    pub fn delete(&self, url: impl Into<String>, options: impl Into<Option<Options>>) -> PendingResponse {
        self.request(Method::DELETE, url, options)
    }

    pub fn head(&self, url: impl Into<String>, options: impl Into<Option<Options>>) -> PendingResponse {
        self.request(Method::HEAD, url, options)
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("options", &self.options())
            .finish_non_exhaustive()
    }
}
