//! Opt-in reuse of headers and params across calls.
//!
//! A `Session` remembers the last headers and params it was given. Passing
//! `None` for either reuses the remembered value; passing `Some` replaces it.
//! The state belongs to the session, not to the client, so two sessions on
//! the same client never see each other's values.

use std::sync::{Mutex, PoisonError};

use crate::client::Client;
use crate::error::ClientError;
use crate::http::{Headers, HttpMethod, Params};
use crate::listener::Listener;
use crate::request::RequestId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Defaults {
    pub headers: Headers,
    pub params: Params,
}

#[derive(Debug)]
pub struct Session<'a> {
    client: &'a Client,
    defaults: Mutex<Defaults>,
}

impl<'a> Session<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self::with_defaults(client, Defaults::default())
    }

    pub fn with_defaults(client: &'a Client, defaults: Defaults) -> Self {
        Self {
            client,
            defaults: Mutex::new(defaults),
        }
    }

    pub fn client(&self) -> &'a Client {
        self.client
    }

    pub fn get(&self, path: &str, listener: impl Listener) -> Result<RequestId, ClientError> {
        self.client.get(path, listener)
    }

    pub fn post(
        &self,
        path: &str,
        headers: Option<Headers>,
        params: Option<Params>,
        listener: impl Listener,
    ) -> Result<RequestId, ClientError> {
        self.dispatch(HttpMethod::Post, path, headers, params, listener)
    }

    pub fn put(
        &self,
        path: &str,
        headers: Option<Headers>,
        params: Option<Params>,
        listener: impl Listener,
    ) -> Result<RequestId, ClientError> {
        self.dispatch(HttpMethod::Put, path, headers, params, listener)
    }

    pub fn patch(
        &self,
        path: &str,
        headers: Option<Headers>,
        params: Option<Params>,
        listener: impl Listener,
    ) -> Result<RequestId, ClientError> {
        self.dispatch(HttpMethod::Patch, path, headers, params, listener)
    }

    pub fn delete(
        &self,
        path: &str,
        headers: Option<Headers>,
        params: Option<Params>,
        listener: impl Listener,
    ) -> Result<RequestId, ClientError> {
        self.dispatch(HttpMethod::Delete, path, headers, params, listener)
    }

    /// The values the next call would reuse.
    pub fn defaults(&self) -> Defaults {
        self.defaults.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn clear(&self) {
        *self.defaults.lock().unwrap_or_else(PoisonError::into_inner) = Defaults::default();
    }

    fn dispatch(
        &self,
        method: HttpMethod,
        path: &str,
        headers: Option<Headers>,
        params: Option<Params>,
        listener: impl Listener,
    ) -> Result<RequestId, ClientError> {
        let snapshot = {
            let mut defaults = self.defaults.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(headers) = headers {
                defaults.headers = headers;
            }
            if let Some(params) = params {
                defaults.params = params;
            }
            defaults.clone()
        };
        self.client
            .dispatch(method, path, snapshot.headers, snapshot.params, listener)
    }
}
