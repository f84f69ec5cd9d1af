//! Process-wide client for hosts that want a single facade.
//!
//! The first `init` wins. Later calls return the same client and ignore
//! their arguments, including a different base URL.

use std::sync::OnceLock;

use tracing::debug;

use crate::client::Client;
use crate::config::QueueConfig;

static GLOBAL: OnceLock<Client> = OnceLock::new();

pub fn init(context: QueueConfig, base_url: Option<&str>) -> &'static Client {
    GLOBAL.get_or_init(|| {
        debug!(?base_url, "initializing global client");
        Client::builder(base_url).queue_config(context).build()
    })
}

/// The global client, if `init` has run.
pub fn global() -> Option<&'static Client> {
    GLOBAL.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    // The only test touching the process-wide client.
    #[test]
    fn init_is_idempotent() {
        let first = init(QueueConfig::default(), Some("http://host/api"));
        let second = init(QueueConfig::default(), Some("http://elsewhere/"));
        assert!(std::ptr::eq(first, second));
        assert_eq!(second.base_url().as_str(), "http://host/api/");
        assert!(std::ptr::eq(global().unwrap(), first));
    }
}
