//! Client Facade: base URL, lazily-built queue, verb methods.
//!
//! # Design
//! `Client` is an ordinary value; several can coexist, each with its own base
//! URL. Every verb takes explicit headers and params, so nothing from one
//! call can leak into another (reuse of earlier values is opt-in through
//! `Session`). Each client tags its requests with its own cancellation token:
//! `cancel` only reaches requests this client issued, even when a queue is
//! shared.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::{BaseUrl, ClientConfig, QueueConfig};
use crate::error::ClientError;
use crate::http::{Headers, HttpMethod, Params, RequestDescriptor};
use crate::listener::{Listener, Outcome};
use crate::queue::RequestQueue;
use crate::request::{Request, RequestId};
use crate::transport::{Transport, UreqTransport};

#[derive(Default)]
pub struct ClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    queue: Option<Arc<RequestQueue>>,
}

impl ClientBuilder {
    pub fn queue_config(mut self, queue: QueueConfig) -> Self {
        self.config.queue = queue;
        self
    }

    /// Transport used when the client builds its own queue.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Share an existing queue instead of building one on first use.
    pub fn queue(mut self, queue: Arc<RequestQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn build(self) -> Client {
        Client {
            base_url: self.config.base_url,
            queue_config: self.config.queue,
            transport: self.transport,
            state: Mutex::new(State {
                queue: self.queue,
                token: CancellationToken::new(),
                stopped: false,
            }),
        }
    }
}

struct State {
    queue: Option<Arc<RequestQueue>>,
    token: CancellationToken,
    stopped: bool,
}

pub struct Client {
    base_url: BaseUrl,
    queue_config: QueueConfig,
    /// Only consulted when this client builds its own queue; `None` means a
    /// `UreqTransport` is created at that point.
    transport: Option<Arc<dyn Transport>>,
    state: Mutex<State>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("queue_config", &self.queue_config)
            .finish_non_exhaustive()
    }
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        ClientBuilder {
            config,
            ..ClientBuilder::default()
        }
        .build()
    }

    pub fn builder(base_url: Option<&str>) -> ClientBuilder {
        ClientBuilder {
            config: ClientConfig {
                base_url: BaseUrl::new(base_url),
                queue: QueueConfig::default(),
            },
            ..ClientBuilder::default()
        }
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// The full URL a request for `path` is sent to.
    pub fn resolve(&self, path: &str) -> String {
        self.base_url.resolve(path)
    }

    pub fn get(&self, path: &str, listener: impl Listener) -> Result<RequestId, ClientError> {
        self.dispatch(HttpMethod::Get, path, Headers::new(), Params::new(), listener)
    }

    pub fn post(
        &self,
        path: &str,
        headers: Headers,
        params: Params,
        listener: impl Listener,
    ) -> Result<RequestId, ClientError> {
        self.dispatch(HttpMethod::Post, path, headers, params, listener)
    }

    pub fn put(
        &self,
        path: &str,
        headers: Headers,
        params: Params,
        listener: impl Listener,
    ) -> Result<RequestId, ClientError> {
        self.dispatch(HttpMethod::Put, path, headers, params, listener)
    }

    pub fn patch(
        &self,
        path: &str,
        headers: Headers,
        params: Params,
        listener: impl Listener,
    ) -> Result<RequestId, ClientError> {
        self.dispatch(HttpMethod::Patch, path, headers, params, listener)
    }

    pub fn delete(
        &self,
        path: &str,
        headers: Headers,
        params: Params,
        listener: impl Listener,
    ) -> Result<RequestId, ClientError> {
        self.dispatch(HttpMethod::Delete, path, headers, params, listener)
    }

    /// Build a descriptor for `path` and enqueue it. Returns immediately; the
    /// listener is called later from a queue worker thread.
    ///
    /// On `Err` the listener has been dropped without a call.
    pub fn dispatch(
        &self,
        method: HttpMethod,
        path: &str,
        headers: Headers,
        params: Params,
        listener: impl Listener,
    ) -> Result<RequestId, ClientError> {
        let descriptor = RequestDescriptor::new(method, self.resolve(path), headers, params);
        self.send(descriptor, Box::new(listener))
    }

    /// Like `dispatch`, but completion is a receiver that resolves with the
    /// outcome, or errors if the request is cancelled or the queue stops.
    pub fn request(
        &self,
        method: HttpMethod,
        path: &str,
        headers: Headers,
        params: Params,
    ) -> Result<oneshot::Receiver<Outcome>, ClientError> {
        let (tx, rx) = oneshot::channel();
        self.dispatch(method, path, headers, params, tx)?;
        Ok(rx)
    }

    /// Enqueue an already built descriptor.
    pub fn send(&self, descriptor: RequestDescriptor, listener: Box<dyn Listener>) -> Result<RequestId, ClientError> {
        let (queue, token) = {
            let mut state = self.lock();
            if state.stopped {
                return Err(ClientError::Stopped);
            }
            let queue = match &state.queue {
                Some(queue) => Arc::clone(queue),
                None => {
                    let transport: Arc<dyn Transport> = match &self.transport {
                        Some(transport) => Arc::clone(transport),
                        None => Arc::new(UreqTransport::new(&self.queue_config)),
                    };
                    let queue = Arc::new(RequestQueue::new(&self.queue_config, transport)?);
                    state.queue = Some(Arc::clone(&queue));
                    queue
                }
            };
            (queue, state.token.clone())
        };
        queue.add(Request::new(descriptor, listener), token)
    }

    /// Cancel every request this client has issued so far. Requests issued
    /// afterwards are unaffected.
    ///
    /// Best effort: a result already being delivered may still arrive.
    pub fn cancel(&self) {
        let previous = std::mem::replace(&mut self.lock().token, CancellationToken::new());
        previous.cancel();
        debug!(base_url = %self.base_url, "cancelled outstanding requests");
    }

    /// Stop the underlying queue. Pending listeners are dropped and later
    /// calls return `ClientError::Stopped`. A shared queue stops for every
    /// client using it.
    pub fn stop(&self) {
        let queue = {
            let mut state = self.lock();
            state.stopped = true;
            state.queue.clone()
        };
        if let Some(queue) = queue {
            queue.stop();
        }
        debug!(base_url = %self.base_url, "client stopped");
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
