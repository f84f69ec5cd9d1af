//! The scheduling half of the request queue.
//!
//! # Design
//! A `RequestQueue` owns a multi-thread tokio runtime. Each request becomes a
//! task that runs the blocking `Transport` on the runtime's blocking pool and
//! then calls the listener from a worker thread, so `add` never blocks the
//! caller. Cancellation is per `CancellationToken`, which lets several
//! clients share one queue without cancelling each other's requests.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::QueueConfig;
use crate::error::ClientError;
use crate::request::{Request, RequestId, RequestState};
use crate::transport::Transport;

pub struct RequestQueue {
    runtime: Mutex<Option<Runtime>>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for RequestQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestQueue")
            .field("stopped", &self.is_stopped())
            .finish_non_exhaustive()
    }
}

impl RequestQueue {
    pub fn new(config: &QueueConfig, transport: Arc<dyn Transport>) -> Result<Self, ClientError> {
        let workers = config.workers.max(1);
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(workers)
            .max_blocking_threads(workers)
            .thread_name("goma-worker")
            .enable_all()
            .build()?;
        debug!(workers, "request queue started");
        Ok(Self {
            runtime: Mutex::new(Some(runtime)),
            transport,
        })
    }

    /// Spawn `request`. Its listener is dropped uncalled if `token` is
    /// cancelled before the result is delivered.
    pub fn add(&self, request: Request, token: CancellationToken) -> Result<RequestId, ClientError> {
        let runtime = self.lock();
        let runtime = runtime.as_ref().ok_or(ClientError::Stopped)?;
        let id = request.id();
        request.trace_state(RequestState::Enqueued);
        runtime.spawn(request.run(Arc::clone(&self.transport), token));
        Ok(id)
    }

    /// Shut the runtime down without waiting for in-flight work. Pending
    /// listeners are dropped. Calling this again is a no-op.
    pub fn stop(&self) {
        if let Some(runtime) = self.lock().take() {
            runtime.shutdown_background();
            info!("request queue stopped");
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.lock().is_none()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Runtime>> {
        self.runtime.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for RequestQueue {
    fn drop(&mut self) {
        // Dropping a runtime from inside a listener would otherwise panic.
        self.stop();
    }
}
