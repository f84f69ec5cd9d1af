//! Request Builder: one descriptor plus the listener waiting for it.
//!
//! # Design
//! A `Request` walks `Created -> Enqueued -> {Succeeded | Failed | Cancelled}`.
//! `complete` is the only place a listener is called, and it consumes the
//! request, so the terminal states are mutually exclusive by construction.
//! The raw `TransportError` stays on this side: it is logged, and only its
//! flattened message reaches the caller.

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::TransportError;
use crate::http::RequestDescriptor;
use crate::listener::{deliver, Listener, Outcome};
use crate::transport::Transport;

/// Identifies one dispatched request in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Created,
    Enqueued,
    Succeeded,
    Failed,
    Cancelled,
}

pub struct Request {
    id: RequestId,
    descriptor: Arc<RequestDescriptor>,
    listener: Box<dyn Listener>,
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("id", &self.id)
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

impl Request {
    pub fn new(descriptor: RequestDescriptor, listener: Box<dyn Listener>) -> Self {
        let request = Self {
            id: RequestId::new(),
            descriptor: Arc::new(descriptor),
            listener,
        };
        request.trace_state(RequestState::Created);
        request
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }

    /// Convert a transport result into exactly one listener call.
    pub fn complete(self, result: Result<Option<String>, TransportError>) -> RequestState {
        match result {
            Ok(body) => {
                self.trace_state(RequestState::Succeeded);
                deliver(self.listener, Outcome::Success(body));
                RequestState::Succeeded
            }
            Err(err) => {
                warn!(
                    request_id = %self.id,
                    method = %self.descriptor.method(),
                    url = self.descriptor.url(),
                    error = ?err,
                    "request failed"
                );
                self.trace_state(RequestState::Failed);
                deliver(self.listener, Outcome::Failure(err.message()));
                RequestState::Failed
            }
        }
    }

    /// Drop the listener without calling it.
    pub fn cancel(self) -> RequestState {
        self.trace_state(RequestState::Cancelled);
        RequestState::Cancelled
    }

    /// Run the transport on the blocking pool unless `token` fires first.
    pub(crate) async fn run(self, transport: Arc<dyn Transport>, token: CancellationToken) -> RequestState {
        if token.is_cancelled() {
            return self.cancel();
        }

        let descriptor = Arc::clone(&self.descriptor);
        let call = tokio::task::spawn_blocking(move || transport.execute(&descriptor));

        tokio::select! {
            biased;
            _ = token.cancelled() => self.cancel(),
            joined = call => {
                // The network call may win the race against a cancel issued
                // just before delivery.
                if token.is_cancelled() {
                    return self.cancel();
                }
                let result = joined.unwrap_or_else(|join_err| Err(TransportError::Other(join_err.to_string())));
                self.complete(result)
            }
        }
    }

    pub(crate) fn trace_state(&self, state: RequestState) {
        debug!(
            request_id = %self.id,
            method = %self.descriptor.method(),
            url = self.descriptor.url(),
            ?state,
            "request state"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Headers, HttpMethod, Params};
    use std::sync::Mutex;
    use tracing_test::traced_test;

    fn descriptor() -> RequestDescriptor {
        RequestDescriptor::new(HttpMethod::Post, "http://host/api/items", Headers::new(), Params::new())
    }

    fn recording() -> (Arc<Mutex<Vec<Outcome>>>, Box<dyn Listener>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let slot = seen.clone();
        let listener = move |outcome: Outcome| slot.lock().unwrap().push(outcome);
        (seen, Box::new(listener))
    }

    #[test]
    fn request_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn success_reaches_on_success_once() {
        let (seen, listener) = recording();
        let state = Request::new(descriptor(), listener).complete(Ok(Some("done".into())));
        assert_eq!(state, RequestState::Succeeded);
        assert_eq!(*seen.lock().unwrap(), vec![Outcome::Success(Some("done".into()))]);
    }

    #[test]
    fn failure_is_flattened_to_a_message() {
        let (seen, listener) = recording();
        let state = Request::new(descriptor(), listener).complete(Err(TransportError::Connection("refused".into())));
        assert_eq!(state, RequestState::Failed);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![Outcome::Failure(Some("connection error: refused".into()))]
        );
    }

    #[test]
    fn cancel_drops_listener_without_callback() {
        let (seen, listener) = recording();
        let state = Request::new(descriptor(), listener).cancel();
        assert_eq!(state, RequestState::Cancelled);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    #[traced_test]
    fn failure_is_logged_locally() {
        let (_seen, listener) = recording();
        Request::new(descriptor(), listener).complete(Err(TransportError::Status {
            status: 500,
            body: "stack".into(),
        }));
        assert!(logs_contain("request failed"));
        assert!(logs_contain("http://host/api/items"));
    }

    struct Fixed(Result<Option<String>, ()>);

    impl Transport for Fixed {
        fn execute(&self, _: &RequestDescriptor) -> Result<Option<String>, TransportError> {
            self.0.clone().map_err(|_| TransportError::Unknown)
        }
    }

    #[tokio::test]
    async fn run_delivers_transport_result() {
        let (seen, listener) = recording();
        let state = Request::new(descriptor(), listener)
            .run(Arc::new(Fixed(Ok(Some("body".into())))), CancellationToken::new())
            .await;
        assert_eq!(state, RequestState::Succeeded);
        assert_eq!(*seen.lock().unwrap(), vec![Outcome::Success(Some("body".into()))]);
    }

    #[tokio::test]
    async fn run_unknown_error_gives_null_message() {
        let (seen, listener) = recording();
        let state = Request::new(descriptor(), listener)
            .run(Arc::new(Fixed(Err(()))), CancellationToken::new())
            .await;
        assert_eq!(state, RequestState::Failed);
        assert_eq!(*seen.lock().unwrap(), vec![Outcome::Failure(None)]);
    }

    #[tokio::test]
    async fn run_with_cancelled_token_skips_transport() {
        let (seen, listener) = recording();
        let token = CancellationToken::new();
        token.cancel();
        let state = Request::new(descriptor(), listener)
            .run(Arc::new(Fixed(Ok(None))), token)
            .await;
        assert_eq!(state, RequestState::Cancelled);
        assert!(seen.lock().unwrap().is_empty());
    }
}
