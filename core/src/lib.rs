//! HTTP client facade with callback-based result delivery.
//!
//! # Overview
//! A `Client` turns `(method, path, headers, params)` into a request against
//! its base URL, hands it to a background queue and reports the result to a
//! `Listener` exactly once: `on_success` with the body text or `on_error`
//! with a flattened message. Calls return immediately.
//!
//! # Design
//! - `Client` is a plain value with its own base URL and cancellation scope;
//!   `global::init` offers a process-wide instance for hosts that want one.
//! - Headers and params are explicit per call. `Session` is the opt-in way
//!   to reuse the previous call's values.
//! - The queue owns a tokio runtime; the network call itself goes through the
//!   blocking `Transport` trait (`UreqTransport` by default).
//! - Bodies are url-encoded forms only.

pub mod client;
pub mod config;
pub mod error;
pub mod global;
pub mod http;
pub mod listener;
pub mod queue;
pub mod request;
pub mod session;
pub mod transport;

pub use client::{Client, ClientBuilder};
pub use config::{BaseUrl, ClientConfig, QueueConfig};
pub use error::{ClientError, ConfigError, TransportError};
pub use global::{global, init};
pub use http::{Headers, HttpMethod, Params, RequestDescriptor};
pub use listener::{Listener, Outcome};
pub use queue::RequestQueue;
pub use request::{RequestId, RequestState};
pub use session::{Defaults, Session};
pub use transport::{Transport, UreqTransport};
