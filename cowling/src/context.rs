//! Engine context handle.
//!
//! The context owns the engine's I/O threads and the inproc namespace.
//! Cloning is cheap (the engine refcounts the underlying context); teardown
//! happens when the last clone is dropped. Sockets sharing an inproc
//! endpoint must come from the same context.

use crate::error::Result;
use crate::socket::Socket;
use crate::socket_type::SocketType;

/// Shared handle on one engine context.
#[derive(Clone)]
pub struct Context {
    inner: zmq::Context,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Create a new engine context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: zmq::Context::new(),
        }
    }

    /// Create a socket of the given kind under this context.
    ///
    /// Sugar for [`Socket::new`].
    pub fn socket(&self, kind: SocketType) -> Result<Socket> {
        Socket::new(self, kind)
    }

    pub(crate) fn raw(&self) -> &zmq::Context {
        &self.inner
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Context")
    }
}
