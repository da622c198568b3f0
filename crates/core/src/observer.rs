//! Request/response observation for outbound calls.
//!
//! Clients take an observer explicitly instead of consulting a process-wide
//! debug switch. The server picks [`TracingObserver`] when wire dumping is
//! enabled in config and [`NoopObserver`] otherwise.

use std::sync::Arc;

use tracing::debug;

/// Hook invoked around every outbound HTTP exchange.
pub trait WireObserver: Send + Sync {
    /// Called before the request is sent. `body` is `None` for bodiless requests.
    fn on_request(&self, method: &str, url: &str, body: Option<&[u8]>);

    /// Called once the response status is known. `body` is only present when
    /// the caller already buffered it.
    fn on_response(&self, status: u16, url: &str, body: Option<&[u8]>);
}

/// Observer that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl WireObserver for NoopObserver {
    fn on_request(&self, _method: &str, _url: &str, _body: Option<&[u8]>) {}

    fn on_response(&self, _status: u16, _url: &str, _body: Option<&[u8]>) {}
}

/// Observer that dumps requests and responses at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl WireObserver for TracingObserver {
    fn on_request(&self, method: &str, url: &str, body: Option<&[u8]>) {
        match body {
            Some(b) => debug!(
                method,
                url,
                body = %String::from_utf8_lossy(b),
                "outbound request"
            ),
            None => debug!(method, url, "outbound request"),
        }
    }

    fn on_response(&self, status: u16, url: &str, body: Option<&[u8]>) {
        match body {
            Some(b) => debug!(
                status,
                url,
                body = %String::from_utf8_lossy(b),
                "inbound response"
            ),
            None => debug!(status, url, "inbound response"),
        }
    }
}

/// Pick an observer from the `dump_wire` flag.
pub fn observer_for(dump_wire: bool) -> Arc<dyn WireObserver> {
    if dump_wire {
        Arc::new(TracingObserver)
    } else {
        Arc::new(NoopObserver)
    }
}
