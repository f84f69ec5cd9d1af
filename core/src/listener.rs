//! Result delivery.
//!
//! A `Listener` is the caller's success/error callback pair. Both methods
//! consume the boxed listener, so a listener can be called at most once and
//! only on one branch. Dropping it without a call means the request was
//! cancelled.

use tokio::sync::oneshot;

/// The single discriminated result of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Response body text.
    Success(Option<String>),
    /// Flattened error message.
    Failure(Option<String>),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

pub trait Listener: Send + 'static {
    fn on_success(self: Box<Self>, body: Option<String>);
    fn on_error(self: Box<Self>, message: Option<String>);
}

impl<F> Listener for F
where
    F: FnOnce(Outcome) + Send + 'static,
{
    fn on_success(self: Box<Self>, body: Option<String>) {
        (*self)(Outcome::Success(body))
    }

    fn on_error(self: Box<Self>, message: Option<String>) {
        (*self)(Outcome::Failure(message))
    }
}

/// Future-style completion: the receiver resolves with the outcome, or with
/// `RecvError` if the request was cancelled.
impl Listener for oneshot::Sender<Outcome> {
    fn on_success(self: Box<Self>, body: Option<String>) {
        let _ = self.send(Outcome::Success(body));
    }

    fn on_error(self: Box<Self>, message: Option<String>) {
        let _ = self.send(Outcome::Failure(message));
    }
}

/// Route `outcome` to the matching branch of `listener`.
pub fn deliver(listener: Box<dyn Listener>, outcome: Outcome) {
    match outcome {
        Outcome::Success(body) => listener.on_success(body),
        Outcome::Failure(message) => listener.on_error(message),
    }
}
