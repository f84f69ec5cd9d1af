//! The network half of the request queue.
//!
//! # Design
//! `Transport` is a blocking, object-safe seam: the queue runs it on its
//! blocking pool and the client never touches the network directly. Tests
//! swap in scripted transports; production uses `UreqTransport`.

use tracing::trace;

use crate::config::QueueConfig;
use crate::error::TransportError;
use crate::http::{HttpMethod, RequestDescriptor, FORM_CONTENT_TYPE};

/// Executes one request and returns the response body text.
pub trait Transport: Send + Sync + 'static {
    fn execute(&self, request: &RequestDescriptor) -> Result<Option<String>, TransportError>;
}

/// Default transport backed by a shared `ureq` agent.
///
/// Status codes are returned as data so non-2xx responses can be turned into
/// `TransportError::Status` with their body; redirects, TLS and connection
/// reuse are left to `ureq`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(config: &QueueConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(&QueueConfig::default())
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &RequestDescriptor) -> Result<Option<String>, TransportError> {
        let url = request.url();
        let body = request.form_body();
        trace!(method = %request.method(), url, has_body = body.is_some(), "executing request");

        let without_body = match request.method() {
            HttpMethod::Get => Some(self.agent.get(url)),
            HttpMethod::Delete => Some(self.agent.delete(url)),
            HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch => None,
        };

        let result = match (without_body, body) {
            (Some(mut builder), None) => {
                for (name, value) in request.headers() {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            (without_body, body) => {
                let mut builder = match without_body {
                    Some(builder) => builder.force_send_body(),
                    None => match request.method() {
                        HttpMethod::Put => self.agent.put(url),
                        HttpMethod::Patch => self.agent.patch(url),
                        _ => self.agent.post(url),
                    },
                };
                for (name, value) in request.headers() {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match body {
                    Some(body) => {
                        if !request.has_content_type() {
                            builder = builder.content_type(FORM_CONTENT_TYPE);
                        }
                        builder.send(body.as_bytes())
                    }
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(map_ureq_error)?;
        let status = response.status().as_u16();
        // No cap on the body size: any 2xx body goes to `on_success` whole.
        let text = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_string()
            .map_err(map_ureq_error)?;

        if !(200..300).contains(&status) {
            return Err(TransportError::Status { status, body: text });
        }
        Ok(Some(text))
    }
}

fn map_ureq_error(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::Timeout(_) => TransportError::Timeout,
        ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => {
            TransportError::Connection(err.to_string())
        }
        ureq::Error::Io(io) => TransportError::Connection(io.to_string()),
        other => TransportError::Other(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Headers, Params};

    #[test]
    fn unreachable_host_is_a_transport_error() {
        // Port 9 (discard) on localhost is closed on test machines.
        let transport = UreqTransport::default();
        let req = RequestDescriptor::new(HttpMethod::Get, "http://127.0.0.1:9/", Headers::new(), Params::new());
        let err = transport.execute(&req).unwrap_err();
        assert!(err.message().is_some());
    }

    #[test]
    fn malformed_url_is_a_transport_error() {
        let transport = UreqTransport::default();
        let req = RequestDescriptor::new(HttpMethod::Post, "not a url", Headers::new(), Params::new());
        assert!(transport.execute(&req).is_err());
    }
}
