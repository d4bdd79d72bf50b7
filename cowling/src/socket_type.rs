//! Socket kind enumeration.
//!
//! The kind is fixed at socket construction and maps 1:1 to the native
//! engine's socket-type constants; routing behaviour between kinds is
//! entirely the engine's business.

use std::fmt;

/// Messaging pattern a socket participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketType {
    /// PAIR socket for exclusive bidirectional communication.
    ///
    /// The one kind that tolerates only a single peer.
    Pair,

    /// PUB socket for publishing messages to subscribers
    Pub,

    /// SUB socket for subscribing to published messages
    Sub,

    /// REQ socket for synchronous request-reply client
    Req,

    /// REP socket for synchronous request-reply server
    Rep,

    /// DEALER socket for asynchronous request-reply patterns
    Dealer,

    /// ROUTER socket for routing messages by identity
    Router,

    /// PULL socket for receiving messages from pushers
    Pull,

    /// PUSH socket for sending messages to pullers
    Push,

    /// XPUB socket for extended publisher with subscription awareness
    XPub,

    /// XSUB socket for extended subscriber with dynamic subscriptions
    XSub,

    /// STREAM socket for raw TCP connections
    Stream,
}

impl SocketType {
    /// Get the socket kind as a string name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pair => "PAIR",
            Self::Pub => "PUB",
            Self::Sub => "SUB",
            Self::Req => "REQ",
            Self::Rep => "REP",
            Self::Dealer => "DEALER",
            Self::Router => "ROUTER",
            Self::Pull => "PULL",
            Self::Push => "PUSH",
            Self::XPub => "XPUB",
            Self::XSub => "XSUB",
            Self::Stream => "STREAM",
        }
    }

    /// Map to the engine's native socket-type constant.
    pub(crate) fn to_raw(self) -> zmq::SocketType {
        match self {
            Self::Pair => zmq::PAIR,
            Self::Pub => zmq::PUB,
            Self::Sub => zmq::SUB,
            Self::Req => zmq::REQ,
            Self::Rep => zmq::REP,
            Self::Dealer => zmq::DEALER,
            Self::Router => zmq::ROUTER,
            Self::Pull => zmq::PULL,
            Self::Push => zmq::PUSH,
            Self::XPub => zmq::XPUB,
            Self::XSub => zmq::XSUB,
            Self::Stream => zmq::STREAM,
        }
    }
}

impl fmt::Display for SocketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_type_display() {
        assert_eq!(SocketType::Dealer.to_string(), "DEALER");
        assert_eq!(SocketType::Router.to_string(), "ROUTER");
        assert_eq!(SocketType::Pub.to_string(), "PUB");
    }

    #[test]
    fn test_native_mapping() {
        assert_eq!(SocketType::Pair.to_raw(), zmq::PAIR);
        assert_eq!(SocketType::Sub.to_raw(), zmq::SUB);
        assert_eq!(SocketType::Stream.to_raw(), zmq::STREAM);
    }
}
